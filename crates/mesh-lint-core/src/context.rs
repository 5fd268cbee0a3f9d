//! Query context handed to analyzers.

use crate::diag::{Message, MessageCatalog, Messages};
use crate::resource::{CollectionName, FullName, Resource};
use crate::snapshot::Snapshot;
use std::cell::RefCell;
use std::sync::Arc;

/// Read access to a snapshot plus a sink for findings.
///
/// All methods take `&self`, so analyzers may query the context or report
/// from inside a [`Context::for_each`] visitor.
pub trait Context {
    /// Visits every resource of `collection` in snapshot order until `visit`
    /// returns false. Unknown collections visit nothing.
    fn for_each(&self, collection: &CollectionName, visit: &mut dyn FnMut(&Arc<Resource>) -> bool);

    /// Returns true if `collection` holds a resource named `name`.
    fn exists(&self, collection: &CollectionName, name: &FullName) -> bool {
        self.find(collection, name).is_some()
    }

    /// Looks up a resource by full name.
    fn find(&self, collection: &CollectionName, name: &FullName) -> Option<Arc<Resource>>;

    /// Records a finding.
    fn report(&self, message: Message);

    /// Returns the message catalog for this run.
    fn catalog(&self) -> &MessageCatalog;
}

/// [`Context`] over a shared [`Snapshot`] with a private message sink.
#[derive(Debug)]
pub struct SnapshotContext<'a> {
    snapshot: &'a Snapshot,
    catalog: &'a MessageCatalog,
    messages: RefCell<Messages>,
}

impl<'a> SnapshotContext<'a> {
    /// Creates a context with an empty sink.
    #[must_use]
    pub fn new(snapshot: &'a Snapshot, catalog: &'a MessageCatalog) -> Self {
        Self {
            snapshot,
            catalog,
            messages: RefCell::new(Messages::new()),
        }
    }

    /// Consumes the context and returns what was reported.
    #[must_use]
    pub fn into_messages(self) -> Messages {
        self.messages.into_inner()
    }
}

impl Context for SnapshotContext<'_> {
    fn for_each(&self, collection: &CollectionName, visit: &mut dyn FnMut(&Arc<Resource>) -> bool) {
        for resource in self.snapshot.resources(collection) {
            if !visit(resource) {
                break;
            }
        }
    }

    fn find(&self, collection: &CollectionName, name: &FullName) -> Option<Arc<Resource>> {
        self.snapshot.find(collection, name).cloned()
    }

    fn report(&self, message: Message) {
        self.messages.borrow_mut().add(message);
    }

    fn catalog(&self) -> &MessageCatalog {
        self.catalog
    }
}
