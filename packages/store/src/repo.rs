//! # DocumentStore: the document database seam
//!
//! [`DocumentStore`] is the contract the dashboard consumes. It is a
//! trait object (`Rc<dyn DocumentStore>`) so the same UI runs against the
//! hosted store ([`api::FirestoreStore`](../../api/src/firestore/mod.rs)) or
//! the in-memory [`crate::MemoryStore`].
//!
//! | Method | Contract |
//! |--------|----------|
//! | [`subscribe`](DocumentStore::subscribe) | Opens a live listener on one collection. The stream yields a full [`SnapshotEvent::Snapshot`] for the current contents first, then one per change; failures arrive as [`SnapshotEvent::Error`]. Dropping the stream closes the listener. |
//! | [`add`](DocumentStore::add) | Creates a document with a store-assigned id and returns the id. |
//! | [`update`](DocumentStore::update) | Overwrites all item fields of an existing document. Fails with `not-found` if it does not exist. |
//! | [`delete`](DocumentStore::delete) | Removes a document. Deleting a missing document succeeds. |
//!
//! Mutations never touch the caller's view of the data directly; their effect
//! becomes visible through the next snapshot on any open listener.

use async_trait::async_trait;
use futures::stream::LocalBoxStream;

use crate::error::StoreError;
use crate::models::{DreamItem, ItemFields};
use crate::path::{CollectionPath, DocPath};

/// One delivery on a collection listener.
#[derive(Clone, Debug, PartialEq)]
pub enum SnapshotEvent {
    /// The complete, current contents of the collection.
    Snapshot(Vec<DreamItem>),
    /// The listener failed; later events may still follow.
    Error(StoreError),
}

/// Stream of snapshot events for one collection listener.
pub type SnapshotStream = LocalBoxStream<'static, SnapshotEvent>;

/// Async document database operations used by the app.
#[async_trait(?Send)]
pub trait DocumentStore {
    fn subscribe(&self, path: &CollectionPath) -> SnapshotStream;

    async fn add(&self, path: &CollectionPath, fields: &ItemFields) -> Result<String, StoreError>;

    async fn update(&self, doc: &DocPath, fields: &ItemFields) -> Result<(), StoreError>;

    async fn delete(&self, doc: &DocPath) -> Result<(), StoreError>;
}
