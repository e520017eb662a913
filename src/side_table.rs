use std::{collections::HashMap, marker::PhantomData};

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub struct UniqueId(usize);

/// Hands out node ids for one parse. The resolver keeps drawing from the same
/// generator when it synthesizes nodes, so ids never collide within a program.
#[derive(Debug, Clone, Default)]
pub struct UniqueIdGenerator {
    next: usize,
}
impl UniqueIdGenerator {
    pub fn new() -> Self {
        Self { next: 0 }
    }
    pub fn next_id(&mut self) -> UniqueId {
        let id = UniqueId(self.next);
        self.next += 1;
        id
    }
    pub fn issued(&self) -> usize {
        self.next
    }
}

pub trait Unique {
    fn id(&self) -> UniqueId;
}

/// Per-node annotations stored beside the tree instead of inside it.
#[derive(Debug)]
pub struct SideTable<Owner: Unique, T> {
    values: HashMap<UniqueId, T>,
    owner: PhantomData<Owner>,
}
impl<Owner: Unique, T> SideTable<Owner, T> {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            owner: PhantomData,
        }
    }
    pub fn get(&self, owner: &Owner) -> Option<&T> {
        self.values.get(&owner.id())
    }
    /// Records `value` unless the owner already has one; a slot is written at
    /// most once and the first write wins.
    pub fn set_once(&mut self, owner: &Owner, value: T) -> Result<(), T> {
        match self.values.entry(owner.id()) {
            std::collections::hash_map::Entry::Occupied(_) => Err(value),
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(value);
                Ok(())
            }
        }
    }
    pub fn len(&self) -> usize {
        self.values.len()
    }
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
impl<Owner: Unique, T> Default for SideTable<Owner, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node(UniqueId);
    impl Unique for Node {
        fn id(&self) -> UniqueId {
            self.0
        }
    }

    #[test]
    fn first_write_wins() {
        let mut ids = UniqueIdGenerator::new();
        let node = Node(ids.next_id());
        let mut table = SideTable::<Node, &str>::new();
        assert!(table.set_once(&node, "first").is_ok());
        assert_eq!(table.set_once(&node, "second"), Err("second"));
        assert_eq!(table.get(&node), Some(&"first"));
        assert_eq!(ids.issued(), 1);
    }
}
