//! Email/password identity.
//!
//! [`IdentityService`] is the seam the session layer consumes. Two
//! implementations ship: [`FirebaseAuth`] over the Identity Toolkit REST API
//! and [`MemoryAuth`] for tests and the offline backend.

mod error;
mod firebase;
mod memory;
mod persistence;

pub use error::{codes, strip_vendor_prefix, AuthError, VENDOR_PREFIX};
pub use firebase::FirebaseAuth;
pub use memory::MemoryAuth;
pub use persistence::{default_storage, InMemoryStorage, PersistedSession, SessionStorage};

use async_trait::async_trait;
use futures::stream::LocalBoxStream;
use serde::{Deserialize, Serialize};

/// The signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

impl Identity {
    pub fn new(uid: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
        }
    }
}

/// Auth-state changes: `Some` when signed in, `None` when signed out.
pub type AuthStream = LocalBoxStream<'static, Option<Identity>>;

#[async_trait(?Send)]
pub trait IdentityService {
    /// Listen for auth-state changes.
    ///
    /// Once the initial state is known, the stream starts with it; afterwards
    /// it yields one item per change. Dropping the stream unsubscribes.
    fn subscribe(&self) -> AuthStream;

    /// Resolve the initial auth state (e.g. from a persisted session) and
    /// announce it to listeners. Calling it again is a no-op.
    async fn restore(&self);

    async fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The signed-in user right now, if the state is known.
    fn current(&self) -> Option<Identity>;
}

/// Source of bearer tokens for authenticated requests.
#[async_trait(?Send)]
pub trait AccessTokens {
    /// A currently valid ID token, or `None` when signed out.
    ///
    /// Fails when a due refresh could not reach the identity service.
    async fn id_token(&self) -> Result<Option<String>, AuthError>;
}
