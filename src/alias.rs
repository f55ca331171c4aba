//! Alias registration for multiply-inherited native objects.
//!
//! A native object reachable through several inheritance paths can sit at a
//! different numeric address per base class. The resolver walks the class
//! graph and registers a [`Record::Alias`] at every such address, so a
//! native pointer to any base sub-object still finds the one proxy.
//!
//! The walk relies on single-inheritance-first layout: the *first* direct
//! superclass of any class shares its derived object's address and never
//! needs an alias of its own, but its ancestors are still walked. Casts are
//! always computed by the object's most-derived class from the primary
//! address, because that is the only class that knows the full layout.

use crate::interop::{Address, ClassDescriptor, ProxyHandle};
use crate::probe_table::CapacityError;
use crate::store::{Record, RecordStore};

impl<P: ProxyHandle> RecordStore<P> {
    /// Register an alias for every superclass address of `current` that
    /// differs from `addr`. `base` stays the object's most-derived class for
    /// the whole recursion; `current` descends through the graph.
    pub(crate) fn add_aliases(
        &mut self,
        addr: Address,
        proxy: &P,
        base: &P::Class,
        current: &P::Class,
    ) -> Result<(), CapacityError> {
        let Some((&first, rest)) = current.superclasses().split_first() else {
            return Ok(());
        };
        self.add_aliases(addr, proxy, base, first)?;
        for &sup in rest {
            self.add_aliases(addr, proxy, base, sup)?;
            let sup_addr = base.cast(addr, sup);
            if sup_addr != addr {
                self.push(sup_addr, Record::Alias(proxy.clone()))?;
            }
        }
        Ok(())
    }

    /// Mirror of [`add_aliases`](RecordStore::add_aliases): unlink the alias
    /// at every differing superclass address. An alias that is already gone
    /// is skipped, not an error: the chain it sat in may have been torn
    /// down by an address-reuse eviction before this proxy's teardown ran.
    pub(crate) fn remove_aliases(
        &mut self,
        addr: Address,
        proxy: &P,
        base: &P::Class,
        current: &P::Class,
    ) {
        let Some((&first, rest)) = current.superclasses().split_first() else {
            return;
        };
        self.remove_aliases(addr, proxy, base, first);
        for &sup in rest {
            self.remove_aliases(addr, proxy, base, sup);
            let sup_addr = base.cast(addr, sup);
            if sup_addr != addr {
                let _ = self.unlink(sup_addr, proxy);
            }
        }
    }
}
