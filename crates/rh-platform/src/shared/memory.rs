//! In-memory document collections
//!
//! Backs the `InMemory*Repository` implementations used by tests and by the
//! `memory` store backend. Each collection is a vector behind a
//! `parking_lot::RwLock`; predicates run under the lock so check-and-write
//! helpers such as [`MemoryCollection::insert_unless`] are atomic.

use std::sync::Arc;

use bson::oid::ObjectId;
use parking_lot::RwLock;

/// A record that can live in a [`MemoryCollection`].
pub trait Document: Clone + Send + Sync + 'static {
    fn object_id(&self) -> ObjectId;
}

pub struct MemoryCollection<T> {
    docs: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for MemoryCollection<T> {
    fn clone(&self) -> Self {
        Self { docs: Arc::clone(&self.docs) }
    }
}

impl<T: Document> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Document> MemoryCollection<T> {
    pub fn new() -> Self {
        Self { docs: Arc::new(RwLock::new(Vec::new())) }
    }

    pub fn insert(&self, doc: T) {
        self.docs.write().push(doc);
    }

    /// Insert unless an existing document satisfies `conflicts`.
    /// Returns false when the insert was refused.
    pub fn insert_unless<F>(&self, doc: T, conflicts: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let mut docs = self.docs.write();
        if docs.iter().any(|d| conflicts(d)) {
            return false;
        }
        docs.push(doc);
        true
    }

    pub fn find_by_id(&self, id: &ObjectId) -> Option<T> {
        self.find_one(|d| d.object_id() == *id)
    }

    pub fn find_one<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.docs.read().iter().find(|d| predicate(d)).cloned()
    }

    pub fn find_all<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.docs.read().iter().filter(|d| predicate(d)).cloned().collect()
    }

    pub fn count<F>(&self, predicate: F) -> u64
    where
        F: Fn(&T) -> bool,
    {
        self.docs.read().iter().filter(|d| predicate(d)).count() as u64
    }

    /// Apply `update` to every matching document, returning the matched count.
    pub fn update_where<F, U>(&self, predicate: F, mut update: U) -> u64
    where
        F: Fn(&T) -> bool,
        U: FnMut(&mut T),
    {
        let mut matched = 0;
        for doc in self.docs.write().iter_mut().filter(|d| predicate(d)) {
            update(doc);
            matched += 1;
        }
        matched
    }

    pub fn delete_where<F>(&self, predicate: F) -> u64
    where
        F: Fn(&T) -> bool,
    {
        let mut docs = self.docs.write();
        let before = docs.len();
        docs.retain(|d| !predicate(d));
        (before - docs.len()) as u64
    }

    pub fn len(&self) -> usize {
        self.docs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: ObjectId,
        owner: String,
        body: String,
    }

    impl Document for Note {
        fn object_id(&self) -> ObjectId {
            self.id
        }
    }

    fn note(owner: &str, body: &str) -> Note {
        Note { id: ObjectId::new(), owner: owner.to_string(), body: body.to_string() }
    }

    #[test]
    fn test_insert_unless_refuses_conflict() {
        let notes = MemoryCollection::new();
        assert!(notes.insert_unless(note("a", "1"), |n: &Note| n.owner == "a"));
        assert!(!notes.insert_unless(note("a", "2"), |n: &Note| n.owner == "a"));
        assert!(notes.insert_unless(note("b", "3"), |n: &Note| n.owner == "b"));
        assert_eq!(notes.len(), 2);
    }

    #[test]
    fn test_update_and_delete_counts() {
        let notes = MemoryCollection::new();
        notes.insert(note("a", "1"));
        notes.insert(note("a", "2"));
        notes.insert(note("b", "3"));

        let matched = notes.update_where(|n| n.owner == "a", |n| n.body.push('!'));
        assert_eq!(matched, 2);
        assert_eq!(notes.count(|n| n.body.ends_with('!')), 2);

        assert_eq!(notes.delete_where(|n| n.owner == "a"), 2);
        assert_eq!(notes.len(), 1);
    }

    #[test]
    fn test_clones_share_storage() {
        let notes = MemoryCollection::new();
        let other = notes.clone();
        let n = note("a", "1");
        notes.insert(n.clone());
        assert_eq!(other.find_by_id(&n.id), Some(n));
    }
}
