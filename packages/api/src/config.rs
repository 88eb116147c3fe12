//! # Application configuration: `dreamcart.toml`
//!
//! [`AppConfig`] is the one documented place where the backend connection is
//! described. It is built once at startup and handed to
//! [`Services::from_config`](crate::Services::from_config); nothing else in
//! the workspace reads configuration.
//!
//! ## Structure
//!
//! ```toml
//! backend = "firebase"        # or "memory"
//!
//! [firebase]
//! api_key = "..."
//! auth_domain = "my-app.firebaseapp.com"
//! project_id = "my-app"
//! storage_bucket = "my-app.firebasestorage.app"
//! messaging_sender_id = "..."
//! app_id = "..."
//!
//! [sync]
//! poll_interval_secs = 5
//! ```
//!
//! The three `*_endpoint` keys under `[firebase]` default to the public
//! Google APIs and only need setting when pointing at an emulator.
//!
//! ## Sources
//!
//! | Constructor | Layers (lowest first) |
//! |-------------|-----------------------|
//! | [`AppConfig::from_toml`] | built-in defaults, the given TOML text |
//! | [`AppConfig::load`] (native only) | built-in defaults, `./dreamcart.toml` if present, `DREAMCART__*` environment variables (after loading `.env`) |

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat};
use serde::Deserialize;

pub const DEFAULT_IDENTITY_ENDPOINT: &str = "https://identitytoolkit.googleapis.com/v1";
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://securetoken.googleapis.com/v1";
pub const DEFAULT_FIRESTORE_ENDPOINT: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Which backend implementation the app talks to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Firebase Authentication + Cloud Firestore over REST.
    #[default]
    Firebase,
    /// In-process memory backend; nothing is persisted.
    Memory,
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default)]
    pub firebase: FirebaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// Firebase web-app settings, as shown in the Firebase console.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FirebaseConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub auth_domain: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub storage_bucket: String,
    #[serde(default)]
    pub messaging_sender_id: String,
    #[serde(default)]
    pub app_id: String,
    #[serde(default = "default_identity_endpoint")]
    pub identity_endpoint: String,
    #[serde(default = "default_token_endpoint")]
    pub token_endpoint: String,
    #[serde(default = "default_firestore_endpoint")]
    pub firestore_endpoint: String,
}

/// Live listener settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SyncConfig {
    /// Seconds between collection refreshes. Values below 1 are treated as 1.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl SyncConfig {
    pub fn poll_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

fn default_identity_endpoint() -> String {
    DEFAULT_IDENTITY_ENDPOINT.to_string()
}

fn default_token_endpoint() -> String {
    DEFAULT_TOKEN_ENDPOINT.to_string()
}

fn default_firestore_endpoint() -> String {
    DEFAULT_FIRESTORE_ENDPOINT.to_string()
}

fn default_poll_interval() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

impl AppConfig {
    fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("backend", "firebase")?
            .set_default("firebase.identity_endpoint", DEFAULT_IDENTITY_ENDPOINT)?
            .set_default("firebase.token_endpoint", DEFAULT_TOKEN_ENDPOINT)?
            .set_default("firebase.firestore_endpoint", DEFAULT_FIRESTORE_ENDPOINT)?
            .set_default("sync.poll_interval_secs", DEFAULT_POLL_INTERVAL_SECS as i64)
    }

    /// Parse configuration from TOML text layered over the defaults.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    /// Load configuration from `./dreamcart.toml` and `DREAMCART__*` variables.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::defaults()?
            .add_source(
                File::with_name("dreamcart.toml")
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix("DREAMCART").separator("__"))
            .build()?
            .try_deserialize::<Self>()?
            .validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.backend == Backend::Firebase {
            let required = [
                ("firebase.api_key", &self.firebase.api_key),
                ("firebase.project_id", &self.firebase.project_id),
            ];
            for (key, value) in required {
                if value.trim().is_empty() {
                    return Err(ConfigError::Message(format!(
                        "missing required setting `{key}`"
                    )));
                }
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_fills_endpoint_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [firebase]
            api_key = "key"
            project_id = "dream-cart-app"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, Backend::Firebase);
        assert_eq!(config.firebase.project_id, "dream-cart-app");
        assert_eq!(config.firebase.identity_endpoint, DEFAULT_IDENTITY_ENDPOINT);
        assert_eq!(config.firebase.firestore_endpoint, DEFAULT_FIRESTORE_ENDPOINT);
        assert_eq!(config.sync.poll_interval_secs, 5);
    }

    #[test]
    fn test_firebase_backend_requires_keys() {
        let err = AppConfig::from_toml("backend = \"firebase\"").unwrap_err();
        assert!(err.to_string().contains("firebase.api_key"));
    }

    #[test]
    fn test_memory_backend_needs_nothing() {
        let config = AppConfig::from_toml("backend = \"memory\"").unwrap();
        assert_eq!(config.backend, Backend::Memory);
    }

    #[test]
    fn test_poll_interval_has_a_floor() {
        let config = AppConfig::from_toml(
            "backend = \"memory\"\n[sync]\npoll_interval_secs = 0",
        )
        .unwrap();
        assert_eq!(config.sync.poll_interval(), std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_load_reads_environment() {
        std::env::set_var("DREAMCART__BACKEND", "memory");
        std::env::set_var("DREAMCART__SYNC__POLL_INTERVAL_SECS", "9");
        let config = AppConfig::load().unwrap();
        assert_eq!(config.backend, Backend::Memory);
        assert_eq!(config.sync.poll_interval_secs, 9);
    }
}
