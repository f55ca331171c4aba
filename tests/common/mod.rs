//! Integration-test fixtures: a leaked class graph with explicit sub-object
//! offsets and a Cell-flag proxy implementing the collaborator traits.

// Each test binary compiles its own copy and uses a different subset.
#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use objmap::{Address, ClassDescriptor, ObjectMap, ProxyHandle};

pub struct FixtureClass {
    pub name: &'static str,
    supers: Vec<&'static FixtureClass>,
    offsets: Vec<(&'static str, usize)>,
}

impl FixtureClass {
    pub fn leak(
        name: &'static str,
        supers: &[&'static FixtureClass],
        offsets: &[(&'static str, usize)],
    ) -> &'static FixtureClass {
        Box::leak(Box::new(FixtureClass {
            name,
            supers: supers.to_vec(),
            offsets: offsets.to_vec(),
        }))
    }

    pub fn plain(name: &'static str) -> &'static FixtureClass {
        Self::leak(name, &[], &[])
    }

    fn offset_of(&self, name: &str) -> usize {
        self.offsets
            .iter()
            .find(|(n, _)| *n == name)
            .map_or(0, |(_, off)| *off)
    }

    fn derives_from(&self, other: &FixtureClass) -> bool {
        std::ptr::eq(self, other) || self.supers.iter().any(|s| s.derives_from(other))
    }
}

impl ClassDescriptor for FixtureClass {
    fn superclasses(&self) -> &[&Self] {
        &self.supers
    }

    fn cast(&self, addr: Address, target: &Self) -> Address {
        addr + self.offset_of(target.name)
    }
}

struct ProxyState {
    class: &'static FixtureClass,
    addr: Cell<Option<Address>>,
    live: Cell<bool>,
    in_map: Cell<bool>,
    shared: Cell<bool>,
    notified: Cell<usize>,
    unregister_on_notify: Cell<bool>,
}

#[derive(Clone)]
pub struct FixtureProxy {
    state: Rc<ProxyState>,
}

impl FixtureProxy {
    pub fn new(addr: Address, class: &'static FixtureClass) -> Self {
        FixtureProxy {
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

    pub fn class(&self) -> &'static FixtureClass {
        self.state.class
    }

    pub fn shared(self) -> Self {
        self.state.shared.set(true);
        self
    }

    pub fn unregister_on_notify(self) -> Self {
        self.state.unregister_on_notify.set(true);
        self
    }

    pub fn set_live(&self, live: bool) {
        self.state.live.set(live);
    }

    pub fn drop_native(&self) {
        self.state.addr.set(None);
    }

    pub fn notified(&self) -> usize {
        self.state.notified.get()
    }
}

impl PartialEq for FixtureProxy {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl std::fmt::Debug for FixtureProxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureProxy")
            .field("class", &self.state.class.name)
            .field("addr", &self.state.addr.get())
            .finish()
    }
}

impl ProxyHandle for FixtureProxy {
    type Class = FixtureClass;

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

    fn runtime_type_matches(&self, class: &FixtureClass) -> bool {
        self.state.class.derives_from(class)
    }

    fn destroy_notify(&self, map: &mut ObjectMap<Self>) {
        self.state.notified.set(self.state.notified.get() + 1);
        if self.state.unregister_on_notify.get() {
            map.remove_object(self, self.state.class);
        }
    }
}
