//! RecordStore: registration records and the chains that link them.
//!
//! Records live in a [`SlotMap`]; bucket chains are `next` links threaded
//! through the records, so a chain is a singly linked list of everything
//! registered at one address. The generational keys mean a handle to an
//! evicted record can never alias a later registration that reuses the
//! slot.

use slotmap::SlotMap;

use crate::interop::{Address, ProxyHandle};
use crate::probe_table::{CapacityError, ProbeTable};

slotmap::new_key_type! {
    pub(crate) struct RecordKey;
}

/// One registration in a bucket chain.
#[derive(Debug)]
pub(crate) enum Record<P> {
    /// The proxy's own registration at its primary address.
    Primary(P),
    /// A secondary registration at a superclass address. Holds the primary's
    /// proxy as a back-reference; it has no object of its own and is never
    /// handed to the managed runtime.
    Alias(P),
}

impl<P> Record<P> {
    /// The proxy this record resolves to: itself for a primary, the
    /// back-referenced primary for an alias.
    #[inline]
    pub(crate) fn proxy(&self) -> &P {
        match self {
            Record::Primary(p) | Record::Alias(p) => p,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node<P> {
    pub(crate) record: Record<P>,
    pub(crate) next: Option<RecordKey>,
}

pub(crate) struct RecordStore<P> {
    table: ProbeTable<RecordKey>,
    records: SlotMap<RecordKey, Node<P>>,
}

impl<P: ProxyHandle> RecordStore<P> {
    pub(crate) fn new() -> Self {
        Self {
            table: ProbeTable::new(),
            records: SlotMap::with_key(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    /// Register `record` at `addr`, pushing it onto the front of whatever
    /// chain is already there.
    pub(crate) fn push(&mut self, addr: Address, record: Record<P>) -> Result<(), CapacityError> {
        self.table.reserve(addr)?;
        let next = self.table.chain_head(addr);
        let key = self.records.insert(Node { record, next });
        self.table.claim(addr, key);
        Ok(())
    }

    /// Unlink and return the first record at `addr` belonging to `proxy`.
    /// The match goes through [`Record::proxy`], so an alias is matched by
    /// its back-reference: a chain holding aliases for several different
    /// primaries releases only the right one. When the chain empties, the
    /// bucket is left stale rather than unused.
    pub(crate) fn unlink(&mut self, addr: Address, proxy: &P) -> Option<Record<P>> {
        let head = self.table.chain_head(addr)?;
        let mut prev: Option<RecordKey> = None;
        let mut cur = Some(head);
        while let Some(key) = cur {
            let node = &self.records[key];
            let next = node.next;
            if node.record.proxy() == proxy {
                match prev {
                    None => match next {
                        Some(new_head) => self.table.set_head(addr, new_head),
                        None => self.table.clear_chain(addr),
                    },
                    Some(prev_key) => self.records[prev_key].next = next,
                }
                let node = self.records.remove(key).expect("record resolved above");
                return Some(node.record);
            }
            prev = cur;
            cur = next;
        }
        None
    }

    /// Tear the whole chain at `addr` out of the table, leaving the bucket
    /// stale. Alias records are dropped outright; the proxies of primary
    /// records are returned so the caller can run destroy notification once
    /// the table is consistent again.
    pub(crate) fn evict(&mut self, addr: Address) -> Vec<P> {
        let Some(head) = self.table.chain_head(addr) else {
            return Vec::new();
        };
        self.table.clear_chain(addr);
        let mut evicted = Vec::new();
        let mut cur = Some(head);
        while let Some(key) = cur {
            let node = self.records.remove(key).expect("chained record is allocated");
            cur = node.next;
            if let Record::Primary(p) = node.record {
                evicted.push(p);
            }
        }
        evicted
    }

    /// Iterate the chain registered at `addr`, newest registration first.
    pub(crate) fn chain(&self, addr: Address) -> Chain<'_, P> {
        Chain {
            records: &self.records,
            cur: self.table.chain_head(addr),
        }
    }

    /// Every record in the store, in slot order.
    pub(crate) fn records(&self) -> impl Iterator<Item = &Record<P>> {
        self.records.values().map(|node| &node.record)
    }
}

pub(crate) struct Chain<'a, P> {
    records: &'a SlotMap<RecordKey, Node<P>>,
    cur: Option<RecordKey>,
}

impl<'a, P> Iterator for Chain<'a, P> {
    type Item = &'a Record<P>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cur?;
        let node = &self.records[key];
        self.cur = node.next;
        Some(&node.record)
    }
}
