use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::events::EventHub;
use crate::lock;
use crate::models::{DreamItem, ItemFields};
use crate::path::{CollectionPath, DocPath};
use crate::repo::{DocumentStore, SnapshotEvent, SnapshotStream};

/// In-memory DocumentStore for tests and the offline demo backend.
///
/// Listeners are push-based: every successful mutation publishes a fresh
/// snapshot of the touched collection. Documents are ordered by id.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    collections: HashMap<CollectionPath, BTreeMap<String, ItemFields>>,
    hubs: HashMap<CollectionPath, EventHub<SnapshotEvent>>,
    denied: HashSet<CollectionPath>,
}

impl Inner {
    fn snapshot(&self, path: &CollectionPath) -> Vec<DreamItem> {
        self.collections
            .get(path)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| DreamItem::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn publish(&self, path: &CollectionPath) {
        if let Some(hub) = self.hubs.get(path) {
            hub.emit(SnapshotEvent::Snapshot(self.snapshot(path)));
        }
    }

    fn check_access(&self, path: &CollectionPath) -> Result<(), StoreError> {
        if self.denied.contains(path) {
            Err(StoreError::permission_denied())
        } else {
            Ok(())
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current contents of a collection, bypassing access rules.
    pub fn documents(&self, path: &CollectionPath) -> Vec<DreamItem> {
        lock(&self.inner).snapshot(path)
    }

    /// Number of open listeners on a collection.
    pub fn listener_count(&self, path: &CollectionPath) -> usize {
        lock(&self.inner)
            .hubs
            .get(path)
            .map(EventHub::listener_count)
            .unwrap_or(0)
    }

    /// Reject reads and writes on `path` with `permission-denied`.
    /// Open listeners receive the error immediately.
    pub fn deny_reads(&self, path: &CollectionPath) {
        let mut inner = lock(&self.inner);
        inner.denied.insert(path.clone());
        if let Some(hub) = inner.hubs.get(path) {
            hub.emit(SnapshotEvent::Error(StoreError::permission_denied()));
        }
    }

    /// Lift a [`deny_reads`](Self::deny_reads); open listeners get a fresh snapshot.
    pub fn allow_reads(&self, path: &CollectionPath) {
        let mut inner = lock(&self.inner);
        if inner.denied.remove(path) {
            inner.publish(path);
        }
    }

    /// Push an arbitrary listener error to every open listener on `path`.
    pub fn inject_error(&self, path: &CollectionPath, error: StoreError) {
        if let Some(hub) = lock(&self.inner).hubs.get(path) {
            hub.emit(SnapshotEvent::Error(error));
        }
    }
}

#[async_trait(?Send)]
impl DocumentStore for MemoryStore {
    fn subscribe(&self, path: &CollectionPath) -> SnapshotStream {
        let mut inner = lock(&self.inner);
        let initial = match inner.check_access(path) {
            Ok(()) => SnapshotEvent::Snapshot(inner.snapshot(path)),
            Err(e) => SnapshotEvent::Error(e),
        };
        let hub = inner.hubs.entry(path.clone()).or_default();
        tracing::debug!(%path, "memory listener opened");
        Box::pin(hub.subscribe_with(initial))
    }

    async fn add(&self, path: &CollectionPath, fields: &ItemFields) -> Result<String, StoreError> {
        let mut inner = lock(&self.inner);
        inner.check_access(path)?;
        let id = Uuid::new_v4().simple().to_string();
        inner
            .collections
            .entry(path.clone())
            .or_default()
            .insert(id.clone(), fields.clone());
        inner.publish(path);
        Ok(id)
    }

    async fn update(&self, doc: &DocPath, fields: &ItemFields) -> Result<(), StoreError> {
        let mut inner = lock(&self.inner);
        inner.check_access(doc.collection())?;
        let stored = inner
            .collections
            .get_mut(doc.collection())
            .and_then(|docs| docs.get_mut(doc.id()))
            .ok_or_else(|| StoreError::not_found(doc))?;
        *stored = fields.clone();
        inner.publish(doc.collection());
        Ok(())
    }

    async fn delete(&self, doc: &DocPath) -> Result<(), StoreError> {
        let mut inner = lock(&self.inner);
        inner.check_access(doc.collection())?;
        let removed = inner
            .collections
            .get_mut(doc.collection())
            .and_then(|docs| docs.remove(doc.id()))
            .is_some();
        if removed {
            inner.publish(doc.collection());
        }
        Ok(())
    }
}
