//! Backend wiring.
//!
//! [`Services`] bundles the two backend seams the UI talks to. It is built
//! once from [`AppConfig`] and provided to the component tree as context.

use std::rc::Rc;

use store::{DocumentStore, MemoryStore};

use crate::auth::{FirebaseAuth, IdentityService, MemoryAuth};
use crate::config::{AppConfig, Backend};
use crate::firestore::FirestoreStore;

#[derive(Clone)]
pub struct Services {
    pub identity: Rc<dyn IdentityService>,
    pub documents: Rc<dyn DocumentStore>,
}

impl Services {
    pub fn new(identity: Rc<dyn IdentityService>, documents: Rc<dyn DocumentStore>) -> Self {
        Self {
            identity,
            documents,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match config.backend {
            Backend::Firebase => {
                tracing::info!(project = %config.firebase.project_id, "using firebase backend");
                let auth = FirebaseAuth::new(config.firebase.clone());
                let documents =
                    FirestoreStore::new(&config.firebase, &config.sync, Rc::new(auth.clone()));
                Self::new(Rc::new(auth), Rc::new(documents))
            }
            Backend::Memory => {
                tracing::info!("using in-memory backend");
                Self::in_memory()
            }
        }
    }

    /// Fresh in-memory identity and document services.
    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryAuth::new()), Rc::new(MemoryStore::new()))
    }
}

impl PartialEq for Services {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.identity, &other.identity) && Rc::ptr_eq(&self.documents, &other.documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_from_config() {
        let config = AppConfig::from_toml("backend = \"memory\"").unwrap();
        let services = Services::from_config(&config);
        assert!(services.identity.current().is_none());
        assert!(services == services.clone());
        assert!(services != Services::in_memory());
    }
}
