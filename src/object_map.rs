//! ObjectMap: the public facade composing the probe table, the record
//! store and the alias resolver.
//!
//! The owning runtime calls [`add_object`](ObjectMap::add_object) when it
//! wraps a native pointer, [`remove_object`](ObjectMap::remove_object) when
//! a proxy is destroyed, and [`find_object`](ObjectMap::find_object) when a
//! native pointer re-enters the managed world and must resolve to its
//! existing proxy instead of being wrapped again.

use crate::interop::{Address, ProxyHandle};
use crate::probe_table::CapacityError;
use crate::reentrancy::ReentryFlag;
use crate::store::{Record, RecordStore};

/// Identity map from native addresses to managed proxies.
///
/// Single-threaded by design: the owning runtime serializes all access. The
/// only re-entrant path is [`ProxyHandle::destroy_notify`], which runs with
/// the map consistent and may call back into it.
pub struct ObjectMap<P: ProxyHandle> {
    store: RecordStore<P>,
    reentry: ReentryFlag,
}

impl<P: ProxyHandle> ObjectMap<P> {
    pub fn new() -> Self {
        Self {
            store: RecordStore::new(),
            reentry: ReentryFlag::new(),
        }
    }

    /// Number of table records, alias registrations included.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.len() == 0
    }

    /// Register `proxy` as the managed identity of the native object at
    /// `addr`, then register aliases for every superclass address of
    /// `class` that differs from `addr`.
    ///
    /// If `addr` already has a chain and `proxy` does not carry the
    /// shares-address flag, the native storage is taken to have been reused:
    /// the old chain is torn down first, and each evicted primary gets a
    /// [`destroy_notify`](ProxyHandle::destroy_notify) once the chain is
    /// unlinked (so the callback may re-enter the map). With the flag set,
    /// the new record simply joins the chain.
    ///
    /// Fails only when a table reorganisation cannot allocate; the map is
    /// then left as if the call had not happened.
    pub fn add_object(
        &mut self,
        addr: Address,
        proxy: P,
        class: &P::Class,
    ) -> Result<(), CapacityError> {
        debug_assert!(addr != 0, "null addresses are never registered");
        debug_assert!(!proxy.in_map(), "proxy is already registered");

        if !proxy.shares_address() {
            let evicted = {
                let _section = self.reentry.enter();
                self.store.evict(addr)
            };
            for old in &evicted {
                // The in-map flag stays set: the usual response is a
                // remove_object call from the proxy's own teardown, which
                // still has this proxy's aliases to clean up.
                old.destroy_notify(self);
            }
        }

        let _section = self.reentry.enter();
        self.store.push(addr, Record::Primary(proxy.clone()))?;
        if let Err(e) = self.store.add_aliases(addr, &proxy, class, class) {
            // Roll back whatever made it in so the caller sees a clean
            // failure: aliases first, then the primary.
            self.store.remove_aliases(addr, &proxy, class, class);
            let _ = self.store.unlink(addr, &proxy);
            return Err(e);
        }
        proxy.set_in_map(true);
        Ok(())
    }

    /// Remove `proxy`'s registrations: every alias, then the primary.
    ///
    /// Returns `true` when the primary record was found and removed. A proxy
    /// that is not flagged as registered is a successful no-op; so is one
    /// whose chain was already torn down by an address-reuse eviction. A
    /// proxy whose native address is gone has nothing left to walk; its
    /// flag is cleared and any leftover records fall to later eviction.
    pub fn remove_object(&mut self, proxy: &P, class: &P::Class) -> bool {
        if !proxy.in_map() {
            return false;
        }
        let Some(addr) = proxy.raw_address() else {
            proxy.set_in_map(false);
            return false;
        };

        let _section = self.reentry.enter();
        self.store.remove_aliases(addr, proxy, class, class);
        let removed = self.store.unlink(addr, proxy).is_some();
        proxy.set_in_map(false);
        removed
    }

    /// Resolve a native address to its registered proxy.
    ///
    /// Walks the chain at `addr`, resolving aliases to their primaries, and
    /// returns the first proxy that is live, still has a native address, and
    /// whose runtime type is `class` or a managed subtype. Proxies
    /// mid-teardown or already destructed natively stay chained but never
    /// match; exhausting the chain is an ordinary not-found.
    pub fn find_object(&self, addr: Address, class: &P::Class) -> Option<P> {
        let _section = self.reentry.enter();
        for record in self.store.chain(addr) {
            let proxy = record.proxy();
            if !proxy.is_live() || proxy.raw_address().is_none() {
                continue;
            }
            if proxy.runtime_type_matches(class) {
                return Some(proxy.clone());
            }
        }
        None
    }

    /// Run `visitor` over every registered proxy, for bulk sweeps such as
    /// runtime shutdown. Aliases resolve to their primary, so each proxy is
    /// seen once per registration, not once per table record.
    pub fn visit_all(&self, mut visitor: impl FnMut(&P)) {
        let _section = self.reentry.enter();
        for record in self.store.records() {
            if let Record::Primary(p) = record {
                visitor(p);
            }
        }
    }
}

impl<P: ProxyHandle> Default for ObjectMap<P> {
    fn default() -> Self {
        Self::new()
    }
}
