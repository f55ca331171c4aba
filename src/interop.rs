//! Contracts between the map and the owning interop runtime.
//!
//! The map never inspects native memory or managed objects itself; it sees
//! them only through these two traits. Class metadata answers "what are your
//! superclasses" and "where does this sub-object live", proxies answer
//! identity and lifecycle questions.

use crate::object_map::ObjectMap;

/// Memory location of a native object, used as the identity key.
///
/// The null address is reserved; it never names a registered object.
pub type Address = usize;

/// Metadata for one native class in the wrapped hierarchy.
pub trait ClassDescriptor {
    /// Direct superclasses, in declaration order. An empty slice terminates
    /// the alias-registration recursion.
    fn superclasses(&self) -> &[&Self];

    /// Map `addr`, the address of an object of this (most-derived) class, to
    /// the address of its `target` sub-object, where `target` is this class
    /// or one of its transitive superclasses.
    ///
    /// The resolver assumes a single-inheritance-first layout: the first
    /// direct superclass of any class in the hierarchy is never relocated
    /// relative to the derived object. A metadata provider targeting an ABI
    /// that moves the first base must list that base later in
    /// [`superclasses`](ClassDescriptor::superclasses) order instead.
    fn cast(&self, addr: Address, target: &Self) -> Address;
}

/// The managed runtime's handle to a proxy object.
///
/// `Clone` must be cheap (the map stores one clone per table record) and
/// `PartialEq` must compare proxy identity, not contents.
pub trait ProxyHandle: Clone + PartialEq {
    type Class: ClassDescriptor;

    /// Current address of the wrapped native object, or `None` once the
    /// native side has been destructed.
    fn raw_address(&self) -> Option<Address>;

    /// False while the managed side of the proxy is mid-teardown. Non-live
    /// proxies stay chained in the table but are invisible to lookups.
    fn is_live(&self) -> bool;

    /// Registration flag. The map sets it on a successful
    /// [`add_object`](ObjectMap::add_object) and clears it in
    /// [`remove_object`](ObjectMap::remove_object); implementations just
    /// store the bit.
    fn in_map(&self) -> bool;
    fn set_in_map(&self, in_map: bool);

    /// True when this proxy legitimately co-locates with an existing
    /// registration (an object embedded at the start of another object's
    /// storage). When false, a registration at an occupied address is taken
    /// as address reuse and evicts the previous chain.
    fn shares_address(&self) -> bool;

    /// Whether this proxy's runtime type is `class` or a managed subtype of
    /// it.
    fn runtime_type_matches(&self, class: &Self::Class) -> bool;

    /// Forced-eviction callback: the native storage was reused while this
    /// proxy still considered itself registered. The map has already
    /// unlinked the affected chain when this runs, so the implementation may
    /// call back into `map`, typically
    /// [`remove_object`](ObjectMap::remove_object), which will still find
    /// this proxy's aliases at their other addresses.
    fn destroy_notify(&self, map: &mut ObjectMap<Self>);
}
