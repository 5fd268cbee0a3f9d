//! Immutable resource snapshots.

use crate::resource::{CollectionName, FullName, Resource};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Named collections of resources, in insertion order per collection.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    collections: BTreeMap<CollectionName, Vec<Arc<Resource>>>,
}

impl Snapshot {
    /// Creates an empty snapshot with no declared collections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `collection` as present, even if it stays empty.
    pub fn declare(&mut self, collection: CollectionName) {
        self.collections.entry(collection).or_default();
    }

    /// Adds a resource to the collection its origin names.
    ///
    /// Returns false, leaving the snapshot unchanged, if the collection
    /// already holds a resource with the same full name.
    pub fn insert(&mut self, resource: Resource) -> bool {
        let collection = resource.origin().collection().clone();
        let entries = self.collections.entry(collection).or_default();
        if entries.iter().any(|r| r.full_name() == resource.full_name()) {
            return false;
        }
        entries.push(Arc::new(resource));
        true
    }

    /// Returns true if `collection` was declared or has resources.
    #[must_use]
    pub fn has_collection(&self, collection: &CollectionName) -> bool {
        self.collections.contains_key(collection)
    }

    /// Returns the resources of `collection`; empty when it is unknown.
    #[must_use]
    pub fn resources(&self, collection: &CollectionName) -> &[Arc<Resource>] {
        self.collections
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Finds a resource by full name.
    #[must_use]
    pub fn find(&self, collection: &CollectionName, name: &FullName) -> Option<&Arc<Resource>> {
        self.resources(collection)
            .iter()
            .find(|r| r.full_name() == name)
    }

    /// Returns the total number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.collections.values().map(Vec::len).sum()
    }

    /// Returns true when no resource is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the declared collection names.
    pub fn collections(&self) -> impl Iterator<Item = &CollectionName> {
        self.collections.keys()
    }
}
