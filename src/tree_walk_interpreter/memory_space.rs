use super::RuntimeValue;
use crate::scope::ScopeId;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

pub type MemorySpaceRef = Rc<RefCell<MemorySpace>>;

/// Marks a space as the storage of a class instance.
#[derive(Debug, Clone)]
pub struct ClassTag {
    pub name: String,
    /// The class body scope, where member methods are found.
    pub members: ScopeId,
}

/// Where a link points: a value slot in a space that outlives the link.
#[derive(Debug, Clone)]
pub struct Link {
    owner: Weak<RefCell<MemorySpace>>,
    name: String,
}

/// Runtime storage for one lexical region: a block, a call, or an instance.
#[derive(Debug, Default)]
pub struct MemorySpace {
    values: HashMap<String, RuntimeValue>,
    /// Aliases made with `type name = &target`, bound when declared.
    links: HashMap<String, Link>,
    parent: Option<MemorySpaceRef>,
    class: Option<ClassTag>,
}

impl MemorySpace {
    pub fn wrap(self) -> MemorySpaceRef {
        Rc::new(RefCell::new(self))
    }
    pub fn new() -> Self {
        Self::default()
    }
    pub fn new_with_parent(parent: MemorySpaceRef) -> Self {
        MemorySpace {
            parent: Some(parent),
            ..Default::default()
        }
    }
    pub fn new_instance(parent: MemorySpaceRef, class: ClassTag) -> Self {
        MemorySpace {
            parent: Some(parent),
            class: Some(class),
            ..Default::default()
        }
    }
    pub fn class(&self) -> Option<&ClassTag> {
        self.class.as_ref()
    }

    /// The value slot `name` denotes when seen from `space`. A link is
    /// already bound to a value slot, so it is returned as is.
    pub fn resolve_slot(space: &MemorySpaceRef, name: &str) -> Option<Link> {
        let mut current = space.clone();
        loop {
            let next = {
                let borrowed = current.borrow();
                if let Some(link) = borrowed.links.get(name) {
                    return Some(link.clone());
                }
                if borrowed.values.contains_key(name) {
                    return Some(Link {
                        owner: Rc::downgrade(&current),
                        name: name.to_string(),
                    });
                }
                borrowed.parent.clone()?
            };
            current = next;
        }
    }

    pub fn define(&mut self, name: &str, value: RuntimeValue) {
        self.links.remove(name);
        self.values.insert(name.to_string(), value);
    }
    pub fn define_link(&mut self, name: &str, link: Link) {
        self.values.remove(name);
        self.links.insert(name.to_string(), link);
    }
    pub fn get(&self, name: &str) -> Option<RuntimeValue> {
        if let Some(link) = self.links.get(name) {
            return self.read_link(link);
        }
        self.values.get(name).cloned().or_else(|| {
            self.parent
                .as_ref()
                .and_then(|parent| parent.borrow().get(name))
        })
    }
    pub fn assign(&mut self, name: &str, value: RuntimeValue) -> Option<RuntimeValue> {
        if let Some(link) = self.links.get(name).cloned() {
            return self.write_link(&link, value);
        }
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value.clone();
            Some(value)
        } else if let Some(parent) = &self.parent {
            parent.borrow_mut().assign(name, value)
        } else {
            None
        }
    }
    /// Reads a slot of this space only, following links.
    pub fn get_field(&self, name: &str) -> Option<RuntimeValue> {
        match self.links.get(name) {
            Some(link) => self.read_link(link),
            None => self.values.get(name).cloned(),
        }
    }
    /// Writes a slot of this space only, creating it when missing.
    pub fn set_field(&mut self, name: &str, value: RuntimeValue) -> Option<RuntimeValue> {
        match self.links.get(name).cloned() {
            Some(link) => self.write_link(&link, value),
            None => {
                self.values.insert(name.to_string(), value.clone());
                Some(value)
            }
        }
    }

    fn is_owner_of(&self, link: &Link) -> bool {
        link.owner
            .upgrade()
            .map_or(false, |owner| std::ptr::eq(owner.as_ptr(), self))
    }
    // Link targets are always plain value slots, so a read or write is one hop.
    fn read_link(&self, link: &Link) -> Option<RuntimeValue> {
        if self.is_owner_of(link) {
            return self.values.get(&link.name).cloned();
        }
        let owner = link.owner.upgrade()?;
        let owner = owner.borrow();
        owner.values.get(&link.name).cloned()
    }
    fn write_link(&mut self, link: &Link, value: RuntimeValue) -> Option<RuntimeValue> {
        if self.is_owner_of(link) {
            let slot = self.values.get_mut(&link.name)?;
            *slot = value.clone();
            return Some(value);
        }
        let owner = link.owner.upgrade()?;
        let mut owner = owner.borrow_mut();
        let slot = owner.values.get_mut(&link.name)?;
        *slot = value.clone();
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(value: i64) -> RuntimeValue {
        RuntimeValue::Int(value)
    }

    #[test]
    fn lookups_walk_outwards() {
        let globals = MemorySpace::new().wrap();
        globals.borrow_mut().define("x", int(1));
        let mut inner = MemorySpace::new_with_parent(globals.clone());
        assert_eq!(inner.get("x"), Some(int(1)));
        assert_eq!(inner.assign("x", int(2)), Some(int(2)));
        assert_eq!(globals.borrow().get("x"), Some(int(2)));
        assert_eq!(inner.assign("missing", int(0)), None);
        assert_eq!(inner.get_field("x"), None);
    }

    fn link(space: &MemorySpaceRef, name: &str) -> Link {
        MemorySpace::resolve_slot(space, name).unwrap()
    }

    #[test]
    fn links_read_and_write_their_target() {
        let space = MemorySpace::new().wrap();
        space.borrow_mut().define("y", int(100));
        let to_y = link(&space, "y");
        space.borrow_mut().define_link("f", to_y);
        let through_f = link(&space, "f");
        space.borrow_mut().define_link("x", through_f);
        assert_eq!(space.borrow().get("x"), Some(int(100)));
        space.borrow_mut().assign("x", int(101));
        assert_eq!(space.borrow().get("y"), Some(int(101)));
        assert_eq!(space.borrow().get_field("f"), Some(int(101)));
    }

    #[test]
    fn links_to_each_other_collapse_onto_one_slot() {
        let globals = MemorySpace::new().wrap();
        globals.borrow_mut().define("x", int(1));
        let inner = MemorySpace::new_with_parent(globals.clone()).wrap();
        let outer_x = link(&inner, "x");
        inner.borrow_mut().define_link("y", outer_x);
        let through_y = link(&inner, "y");
        inner.borrow_mut().define_link("x", through_y);
        assert_eq!(inner.borrow().get("x"), Some(int(1)));
        inner.borrow_mut().assign("y", int(3));
        assert_eq!(inner.borrow().get("x"), Some(int(3)));
        assert_eq!(globals.borrow().get("x"), Some(int(3)));
    }

    #[test]
    fn shadowing_the_target_keeps_the_original_slot() {
        let globals = MemorySpace::new().wrap();
        globals.borrow_mut().define("x", int(1));
        let inner = MemorySpace::new_with_parent(globals.clone()).wrap();
        let outer_x = link(&inner, "x");
        inner.borrow_mut().define_link("y", outer_x);
        inner.borrow_mut().define("x", int(5));
        assert_eq!(inner.borrow().get("y"), Some(int(1)));
    }

    #[test]
    fn self_named_links_point_outwards() {
        let globals = MemorySpace::new().wrap();
        globals.borrow_mut().define("a", int(7));
        let inner = MemorySpace::new_with_parent(globals.clone()).wrap();
        let outer_a = link(&inner, "a");
        inner.borrow_mut().define_link("a", outer_a);
        assert_eq!(inner.borrow().get("a"), Some(int(7)));
        inner.borrow_mut().assign("a", int(8));
        assert_eq!(globals.borrow().get("a"), Some(int(8)));
    }
}
