//! objmap: a single-threaded identity map from native object addresses to
//! their managed proxies, for interop runtimes that wrap foreign,
//! non-garbage-collected objects.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: given a native pointer, find the one proxy that already wraps
//!   it, even when multiple inheritance makes the same object reachable
//!   at several numeric addresses, in safe, verifiable layers.
//! - Layers:
//!   - ProbeTable: prime-sized open-addressing array with double hashing,
//!     stale-bucket tombstones, and a bounded-load-factor reorganisation
//!     policy; maps addresses to chain-head handles and nothing else.
//!   - RecordStore: slotmap-backed records (Primary | Alias) threaded into
//!     per-address chains on top of ProbeTable, plus the recursive alias
//!     resolver that registers every superclass address that differs from
//!     the primary.
//!   - ObjectMap: public facade adding liveness filtering on lookup,
//!     address-reuse eviction with destroy notification, and the per-proxy
//!     registration flag.
//!
//! Constraints
//! - Single-threaded: the owning runtime serializes all access; the guard
//!   types are `!Send`/`!Sync`.
//! - Addresses are identity keys: co-location at one address is a chain,
//!   not a collision, and is expected (embedded sub-objects, reused
//!   storage).
//! - Stale buckets keep their key until the next reorganisation so probe
//!   sequences that crossed them stay valid; an unused bucket is the only
//!   correct "not found".
//! - Reorganisation is decided before the claim that needs it, so an
//!   allocation failure surfaces as [`CapacityError`] with the table
//!   untouched.
//!
//! Reentrancy policy
//! - A debug-only flag guards every public entry point. The single
//!   sanctioned re-entry window is [`ProxyHandle::destroy_notify`], invoked
//!   during address-reuse eviction after the affected chain is unlinked;
//!   it receives the map by `&mut` and may call
//!   [`ObjectMap::remove_object`] for the evicted proxy's remaining
//!   aliases.
//!
//! Notes and non-goals
//! - Not a general-purpose hash map: keys are pointer identities, the
//!   probe/growth policy is fixed, and lookups filter on proxy liveness.
//! - Alias records are table plumbing; they are never handed to the
//!   managed runtime, and sweeps visit each proxy once.
//! - Class metadata and proxy lifecycle are supplied by the runtime
//!   through the [`ClassDescriptor`] and [`ProxyHandle`] traits; the map
//!   never inspects native memory itself.

mod alias;
mod interop;
mod object_map;
pub mod probe_table;
mod probe_table_proptest;
mod reentrancy;
mod store;
#[cfg(test)]
mod testutil;

// Public surface
pub use interop::{Address, ClassDescriptor, ProxyHandle};
pub use object_map::ObjectMap;
pub use probe_table::CapacityError;
