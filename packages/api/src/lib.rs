//! # API crate: backend services for Dream Cart
//!
//! Everything the UI needs from the outside world, behind two traits:
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`auth`] | [`IdentityService`]: email/password sign-up, sign-in, sign-out, auth-state stream. Firebase Identity Toolkit and in-memory implementations. |
//! | [`firestore`] | [`FirestoreStore`]: the [`store::DocumentStore`] implementation over the Firestore REST API. |
//! | [`config`] | [`AppConfig`]: backend selection and Firebase project settings. |
//! | [`services`] | [`Services`]: the wired-up pair handed to the UI. |
//! | [`clock`] | Wall-clock and sleep helpers that work in the browser and natively. |

pub mod auth;
pub mod clock;
pub mod config;
pub mod firestore;
pub mod services;

pub use auth::{AccessTokens, AuthError, AuthStream, Identity, IdentityService};
pub use config::{AppConfig, Backend, FirebaseConfig, SyncConfig};
pub use firestore::FirestoreStore;
pub use services::Services;
