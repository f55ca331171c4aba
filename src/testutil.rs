#![cfg(test)]

//! Shared unit-test fixtures: a leaked class graph with explicit sub-object
//! offsets, and a proxy whose lifecycle bits are plain `Cell` flags.

use std::cell::Cell;
use std::rc::Rc;

use crate::{Address, ClassDescriptor, ObjectMap, ProxyHandle};

pub(crate) struct TestClass {
    pub(crate) name: &'static str,
    supers: Vec<&'static TestClass>,
    /// Offsets of (transitive) superclass sub-objects within this layout,
    /// by class name; absent means offset zero.
    offsets: Vec<(&'static str, usize)>,
}

impl TestClass {
    pub(crate) fn leak(
        name: &'static str,
        supers: &[&'static TestClass],
        offsets: &[(&'static str, usize)],
    ) -> &'static TestClass {
        Box::leak(Box::new(TestClass {
            name,
            supers: supers.to_vec(),
            offsets: offsets.to_vec(),
        }))
    }

    fn offset_of(&self, name: &str) -> usize {
        self.offsets
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(0, |(_, off)| *off)
    }

    fn derives_from(&self, other: &TestClass) -> bool {
        std::ptr::eq(self, other) || self.supers.iter().any(|s| s.derives_from(other))
    }
}

impl ClassDescriptor for TestClass {
    fn superclasses(&self) -> &[&Self] {
        &self.supers
    }

    fn cast(&self, addr: Address, target: &Self) -> Address {
        addr + self.offset_of(target.name)
    }
}

/// A class with no superclasses.
pub(crate) fn plain_class(name: &'static str) -> &'static TestClass {
    TestClass::leak(name, &[], &[])
}

/// `C : B1, B2` with the `B2` sub-object at `b2_off` inside `C`. `B1`
/// shares the primary address, single-inheritance-first style.
pub(crate) fn dual_base(
    b2_off: usize,
) -> (&'static TestClass, &'static TestClass, &'static TestClass) {
    let b1 = plain_class("B1");
    let b2 = plain_class("B2");
    let c = TestClass::leak("C", &[b1, b2], &[("B2", b2_off)]);
    (c, b1, b2)
}

struct ProxyState {
    class: &'static TestClass,
    addr: Cell<Option<Address>>,
    live: Cell<bool>,
    in_map: Cell<bool>,
    shared: Cell<bool>,
    notified: Cell<usize>,
    unregister_on_notify: Cell<bool>,
}

#[derive(Clone)]
pub(crate) struct TestProxy {
    state: Rc<ProxyState>,
}

impl TestProxy {
    pub(crate) fn new(addr: Address, class: &'static TestClass) -> Self {
        TestProxy {
            state: Rc::new(ProxyState {
                class,
                addr: Cell::new(Some(addr)),
                live: Cell::new(true),
                in_map: Cell::new(false),
                shared: Cell::new(false),
                notified: Cell::new(0),
                unregister_on_notify: Cell::new(false),
            }),
        }
    }

    pub(crate) fn class(&self) -> &'static TestClass {
        self.state.class
    }

    /// Builder: mark the proxy as legitimately co-located.
    pub(crate) fn shared(self) -> Self {
        self.state.shared.set(true);
        self
    }

    /// Builder: make destroy_notify call remove_object on its own proxy,
    /// the way a runtime destructor would.
    pub(crate) fn unregister_on_notify(self) -> Self {
        self.state.unregister_on_notify.set(true);
        self
    }

    pub(crate) fn set_live(&self, live: bool) {
        self.state.live.set(live);
    }

    /// Simulate native-side destruction: the address accessor goes dark.
    pub(crate) fn drop_native(&self) {
        self.state.addr.set(None);
    }

    pub(crate) fn notified(&self) -> usize {
        self.state.notified.get()
    }
}

impl PartialEq for TestProxy {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl std::fmt::Debug for TestProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TestProxy")
            .field("class", &self.state.class.name)
            .field("addr", &self.state.addr.get())
            .finish()
    }
}

impl ProxyHandle for TestProxy {
    type Class = TestClass;

    fn raw_address(&self) -> Option<Address> {
        self.state.addr.get()
    }

    fn is_live(&self) -> bool {
        self.state.live.get()
    }

    fn in_map(&self) -> bool {
        self.state.in_map.get()
    }

    fn set_in_map(&self, in_map: bool) {
        self.state.in_map.set(in_map);
    }

    fn shares_address(&self) -> bool {
        self.state.shared.get()
    }

    fn runtime_type_matches(&self, class: &TestClass) -> bool {
        self.state.class.derives_from(class)
    }

    fn destroy_notify(&self, map: &mut ObjectMap<Self>) {
        self.state.notified.set(self.state.notified.get() + 1);
        if self.state.unregister_on_notify.get() {
            map.remove_object(self, self.state.class);
        }
    }
}
