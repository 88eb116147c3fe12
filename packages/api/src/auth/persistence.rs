//! Signed-in session persistence.
//!
//! Only the refresh token and the identity are stored; ID tokens are always
//! minted fresh after a restore. The browser build keeps the record in
//! `localStorage`, native builds keep it in memory for the process lifetime.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// What survives a page reload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    pub uid: String,
    pub email: String,
    pub refresh_token: String,
}

/// Storage slot for one persisted session.
pub trait SessionStorage {
    fn load(&self) -> Option<PersistedSession>;
    fn save(&self, session: &PersistedSession);
    fn clear(&self);
}

/// Process-local storage.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    slot: RefCell<Option<PersistedSession>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for InMemoryStorage {
    fn load(&self) -> Option<PersistedSession> {
        self.slot.borrow().clone()
    }

    fn save(&self, session: &PersistedSession) {
        *self.slot.borrow_mut() = Some(session.clone());
    }

    fn clear(&self) {
        self.slot.borrow_mut().take();
    }
}

/// `window.localStorage` under a fixed key.
///
/// All failures (storage disabled, quota, corrupt JSON) degrade to
/// "no persisted session".
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Debug)]
pub struct BrowserStorage {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl BrowserStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(target_arch = "wasm32")]
impl SessionStorage for BrowserStorage {
    fn load(&self) -> Option<PersistedSession> {
        let raw = Self::storage()?.get_item(&self.key).ok()??;
        serde_json::from_str(&raw).ok()
    }

    fn save(&self, session: &PersistedSession) {
        let Some(storage) = Self::storage() else {
            return;
        };
        match serde_json::to_string(session) {
            Ok(raw) => {
                if storage.set_item(&self.key, &raw).is_err() {
                    tracing::warn!("could not persist session");
                }
            }
            Err(e) => tracing::warn!("could not encode session: {e}"),
        }
    }

    fn clear(&self) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(&self.key);
        }
    }
}

/// The platform's default storage for a given API key.
pub fn default_storage(api_key: &str) -> Rc<dyn SessionStorage> {
    #[cfg(target_arch = "wasm32")]
    {
        Rc::new(BrowserStorage::new(format!("dreamcart:authUser:{api_key}")))
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = api_key;
        Rc::new(InMemoryStorage::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_round_trip() {
        let storage = InMemoryStorage::new();
        assert!(storage.load().is_none());

        let session = PersistedSession {
            uid: "u1".into(),
            email: "a@b.c".into(),
            refresh_token: "r".into(),
        };
        storage.save(&session);
        assert_eq!(storage.load(), Some(session));

        storage.clear();
        assert!(storage.load().is_none());
    }
}
