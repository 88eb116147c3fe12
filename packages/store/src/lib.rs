use std::sync::{Mutex, MutexGuard, PoisonError};

pub mod error;
pub mod events;
pub mod models;
pub mod path;
pub mod repo;

mod memory;
pub use memory::MemoryStore;

pub use error::{StoreError, StoreErrorCode};
pub use events::{EventHub, Subscription};
pub use models::{DreamItem, ItemFields, Priority};
pub use path::{CollectionPath, DocPath};
pub use repo::{DocumentStore, SnapshotEvent, SnapshotStream};

/// Lock a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
