use std::collections::HashMap;
use std::hash::Hash;

use index_vec::{Idx, IndexSlice, IndexVec};

/// Hash-consing arena. Interning a value equal to one already present
/// returns the existing id, so ids are assigned in first-seen order.
#[derive(Debug, Clone)]
pub struct Pool<I: Idx, T> {
    items: IndexVec<I, T>,
    index: HashMap<T, I>,
}

impl<I: Idx, T: Clone + Eq + Hash> Pool<I, T> {
    pub fn new() -> Self {
        Pool {
            items: IndexVec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the id of `item` and whether it was newly inserted.
    pub fn intern(&mut self, item: T) -> (I, bool) {
        if let Some(&id) = self.index.get(&item) {
            return (id, false);
        }
        let id = self.items.push(item.clone());
        self.index.insert(item, id);
        (id, true)
    }

    pub fn lookup(&self, item: &T) -> Option<I> {
        self.index.get(item).copied()
    }

    pub fn get(&self, id: I) -> &T {
        &self.items[id]
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &IndexSlice<I, [T]> {
        &self.items
    }

    pub fn into_vec(self) -> IndexVec<I, T> {
        self.items
    }
}

impl<I: Idx, T: Clone + Eq + Hash> Default for Pool<I, T> {
    fn default() -> Self {
        Self::new()
    }
}
