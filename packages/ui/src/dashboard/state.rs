//! What the dashboard shows for the current listener.

use store::{DreamItem, SnapshotEvent, StoreError};

pub const PERMISSION_DENIED_MESSAGE: &str = "Permission Denied: Could not load your items. Please ensure your Firestore security rules are set up correctly in the Firebase console.";
pub const FETCH_ERROR_MESSAGE: &str = "An error occurred while fetching your items.";

/// The three mutually exclusive render states of the dashboard.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum DashboardState {
    #[default]
    Loading,
    /// The listener failed; holds the user-facing message.
    Failed(String),
    /// The latest snapshot, possibly empty.
    Ready(Vec<DreamItem>),
}

impl DashboardState {
    /// Fold one listener event into the state. Each snapshot replaces the
    /// list wholesale; errors replace it with a message.
    pub fn apply(&mut self, event: SnapshotEvent) {
        *self = match event {
            SnapshotEvent::Snapshot(items) => {
                tracing::debug!(count = items.len(), "snapshot received");
                DashboardState::Ready(items)
            }
            SnapshotEvent::Error(e) => {
                tracing::error!(code = %e.code, "error fetching items: {}", e.message);
                DashboardState::Failed(user_message(&e).to_string())
            }
        };
    }

    pub fn items(&self) -> &[DreamItem] {
        match self {
            DashboardState::Ready(items) => items,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            DashboardState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// The floating add button appears only over a non-empty list.
    pub fn shows_add_button(&self) -> bool {
        !self.items().is_empty()
    }
}

/// Map a listener failure to one of the two messages the dashboard shows.
pub fn user_message(error: &StoreError) -> &'static str {
    if error.is_permission_denied() {
        PERMISSION_DENIED_MESSAGE
    } else {
        FETCH_ERROR_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use store::{CollectionPath, DocumentStore, ItemFields, MemoryStore, Priority, StoreErrorCode};

    fn fields(name: &str) -> ItemFields {
        ItemFields::new(name, format!("https://img/{name}.png"), 10.0, Priority::GoodToHave)
    }

    #[test]
    fn test_error_classification() {
        let mut state = DashboardState::Loading;
        state.apply(SnapshotEvent::Error(StoreError::permission_denied()));
        assert_eq!(state.error(), Some(PERMISSION_DENIED_MESSAGE));
        assert!(!state.shows_add_button());

        for code in [StoreErrorCode::Unavailable, StoreErrorCode::Unauthenticated] {
            state.apply(SnapshotEvent::Error(StoreError::new(code, "boom")));
            assert_eq!(state.error(), Some(FETCH_ERROR_MESSAGE));
        }

        state.apply(SnapshotEvent::Snapshot(vec![]));
        assert_eq!(state, DashboardState::Ready(vec![]));
        assert!(state.error().is_none());
        assert!(!state.shows_add_button());
    }

    #[tokio::test]
    async fn test_list_tracks_latest_snapshot() {
        let store = MemoryStore::new();
        let path = CollectionPath::dream_items("u1");
        let mut events = store.subscribe(&path);
        let mut state = DashboardState::default();

        state.apply(events.next().await.unwrap());
        assert_eq!(state, DashboardState::Ready(vec![]));

        let keep = store.add(&path, &fields("camera")).await.unwrap();
        state.apply(events.next().await.unwrap());
        let drop_id = store.add(&path, &fields("bike")).await.unwrap();
        state.apply(events.next().await.unwrap());
        assert_eq!(state.items().len(), 2);
        assert!(state.shows_add_button());

        store.delete(&path.doc(drop_id.clone())).await.unwrap();
        state.apply(events.next().await.unwrap());
        let ids: Vec<_> = state.items().iter().map(|item| item.id.clone()).collect();
        assert_eq!(ids, vec![keep]);
    }

    #[tokio::test]
    async fn test_no_items_leak_across_identities() {
        let store = MemoryStore::new();
        let alice = CollectionPath::dream_items("alice");
        let bob = CollectionPath::dream_items("bob");
        store.add(&alice, &fields("yacht")).await.unwrap();

        let mut state = DashboardState::default();
        let mut events = store.subscribe(&alice);
        state.apply(events.next().await.unwrap());
        assert_eq!(state.items().len(), 1);

        // Identity change: drop the old listener and start over.
        drop(events);
        state = DashboardState::default();
        let mut events = store.subscribe(&bob);
        state.apply(events.next().await.unwrap());
        assert!(state.items().is_empty());
        assert_eq!(store.listener_count(&alice), 0);

        store.add(&alice, &fields("island")).await.unwrap();
        store.add(&bob, &fields("bicycle")).await.unwrap();
        state.apply(events.next().await.unwrap());
        let names: Vec<_> = state.items().iter().map(|item| item.name().to_string()).collect();
        assert_eq!(names, vec!["bicycle"]);
    }

    #[tokio::test]
    async fn test_recovers_after_permission_error() {
        let store = MemoryStore::new();
        let path = CollectionPath::dream_items("u1");
        store.deny_reads(&path);

        let mut events = store.subscribe(&path);
        let mut state = DashboardState::default();
        state.apply(events.next().await.unwrap());
        assert_eq!(state.error(), Some(PERMISSION_DENIED_MESSAGE));

        store.allow_reads(&path);
        state.apply(events.next().await.unwrap());
        assert!(state.error().is_none());
    }
}
