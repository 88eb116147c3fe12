use std::cell::RefCell;
use std::rc::Rc;

use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use store::EventHub;

use super::error::codes;
use super::persistence::{default_storage, PersistedSession, SessionStorage};
use super::{AccessTokens, AuthError, AuthStream, Identity, IdentityService};
use crate::clock;
use crate::config::FirebaseConfig;

/// Tokens this close to expiry are refreshed before use.
const REFRESH_MARGIN_MS: f64 = 60_000.0;
const DEFAULT_TOKEN_LIFETIME_SECS: f64 = 3600.0;

/// Identity Toolkit (email/password) client.
///
/// Cheap to clone; clones share the signed-in session and the listener hub.
#[derive(Clone)]
pub struct FirebaseAuth {
    inner: Rc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    config: FirebaseConfig,
    storage: Rc<dyn SessionStorage>,
    state: RefCell<State>,
    hub: EventHub<Option<Identity>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Unresolved,
    Restoring,
    Resolved,
}

struct State {
    phase: Phase,
    session: Option<ActiveSession>,
}

#[derive(Clone)]
struct ActiveSession {
    identity: Identity,
    id_token: String,
    refresh_token: String,
    expires_at_ms: f64,
}

impl ActiveSession {
    fn persisted(&self) -> PersistedSession {
        PersistedSession {
            uid: self.identity.uid.clone(),
            email: self.identity.email.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: String,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
    user_id: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

impl FirebaseAuth {
    /// Client with the platform's default session storage.
    pub fn new(config: FirebaseConfig) -> Self {
        let storage = default_storage(&config.api_key);
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: FirebaseConfig, storage: Rc<dyn SessionStorage>) -> Self {
        Self {
            inner: Rc::new(Inner {
                http: reqwest::Client::new(),
                config,
                storage,
                state: RefCell::new(State {
                    phase: Phase::Unresolved,
                    session: None,
                }),
                hub: EventHub::new(),
            }),
        }
    }

    async fn password_call(
        &self,
        method: &str,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        let url = identity_url(&self.inner.config, method);
        let response = self
            .inner
            .http
            .post(url)
            .json(&PasswordRequest {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(AuthError::network)?;
        let body: PasswordResponse = read_json(response).await?;

        let email = if body.email.is_empty() {
            email.to_string()
        } else {
            body.email
        };
        let session = ActiveSession {
            identity: Identity::new(body.local_id, email),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at_ms: expires_at(clock::now_millis(), body.expires_in.as_deref()),
        };
        let identity = session.identity.clone();
        self.establish(session);
        Ok(identity)
    }

    async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
        email: &str,
    ) -> Result<ActiveSession, AuthError> {
        let url = token_url(&self.inner.config);
        let response = self
            .inner
            .http
            .post(url)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(format!(
                "grant_type=refresh_token&refresh_token={}",
                urlencoding::encode(refresh_token)
            ))
            .send()
            .await
            .map_err(AuthError::network)?;
        let body: RefreshResponse = read_json(response).await?;

        Ok(ActiveSession {
            identity: Identity::new(body.user_id, email),
            id_token: body.id_token,
            refresh_token: body.refresh_token,
            expires_at_ms: expires_at(clock::now_millis(), body.expires_in.as_deref()),
        })
    }

    fn establish(&self, session: ActiveSession) {
        self.inner.storage.save(&session.persisted());
        let identity = session.identity.clone();
        {
            let mut state = self.inner.state.borrow_mut();
            state.session = Some(session);
            state.phase = Phase::Resolved;
        }
        tracing::info!(uid = %identity.uid, "signed in");
        self.inner.hub.emit(Some(identity));
    }

    fn drop_session(&self) {
        self.inner.storage.clear();
        let had_session = {
            let mut state = self.inner.state.borrow_mut();
            state.phase = Phase::Resolved;
            state.session.take().is_some()
        };
        if had_session {
            tracing::info!("signed out");
        }
        self.inner.hub.emit(None);
    }
}

#[async_trait(?Send)]
impl IdentityService for FirebaseAuth {
    fn subscribe(&self) -> AuthStream {
        let state = self.inner.state.borrow();
        let subscription = if state.phase == Phase::Resolved {
            let current = state.session.as_ref().map(|s| s.identity.clone());
            self.inner.hub.subscribe_with(current)
        } else {
            self.inner.hub.subscribe()
        };
        subscription.boxed_local()
    }

    async fn restore(&self) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.phase != Phase::Unresolved {
                return;
            }
            state.phase = Phase::Restoring;
        }

        let restored = match self.inner.storage.load() {
            Some(persisted) => {
                match self
                    .exchange_refresh_token(&persisted.refresh_token, &persisted.email)
                    .await
                {
                    Ok(session) => Some(session),
                    Err(e) => {
                        tracing::warn!("could not restore session: {e}");
                        if e.code != codes::NETWORK_REQUEST_FAILED {
                            self.inner.storage.clear();
                        }
                        None
                    }
                }
            }
            None => None,
        };

        // A sign-in that completed while restoring wins.
        if self.inner.state.borrow().phase == Phase::Resolved {
            return;
        }
        match restored {
            Some(session) => self.establish(session),
            None => {
                self.inner.state.borrow_mut().phase = Phase::Resolved;
                self.inner.hub.emit(None);
            }
        }
    }

    async fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.password_call("signUp", email, password).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        self.password_call("signInWithPassword", email, password)
            .await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.drop_session();
        Ok(())
    }

    fn current(&self) -> Option<Identity> {
        self.inner
            .state
            .borrow()
            .session
            .as_ref()
            .map(|s| s.identity.clone())
    }
}

#[async_trait(?Send)]
impl AccessTokens for FirebaseAuth {
    async fn id_token(&self) -> Result<Option<String>, AuthError> {
        let Some(session) = self.inner.state.borrow().session.clone() else {
            return Ok(None);
        };
        if !needs_refresh(session.expires_at_ms, clock::now_millis()) {
            return Ok(Some(session.id_token));
        }

        match self
            .exchange_refresh_token(&session.refresh_token, &session.identity.email)
            .await
        {
            Ok(fresh) => {
                let token = fresh.id_token.clone();
                self.inner.storage.save(&fresh.persisted());
                let mut state = self.inner.state.borrow_mut();
                // Only replace the session we refreshed; a sign-out may have raced us.
                if state
                    .session
                    .as_ref()
                    .is_some_and(|s| s.identity.uid == fresh.identity.uid)
                {
                    state.session = Some(fresh);
                }
                Ok(Some(token))
            }
            Err(e) if e.code == codes::NETWORK_REQUEST_FAILED => {
                tracing::warn!("token refresh failed: {e}");
                Err(e)
            }
            Err(e) => {
                tracing::warn!("refresh token rejected, signing out: {e}");
                self.drop_session();
                Ok(None)
            }
        }
    }
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AuthError> {
    let status = response.status();
    if status.is_success() {
        return response.json::<T>().await.map_err(AuthError::internal);
    }
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => Err(AuthError::from_server(&envelope.error.message)),
        Err(_) => Err(AuthError::internal(format!("HTTP {status}"))),
    }
}

fn identity_url(config: &FirebaseConfig, method: &str) -> String {
    format!(
        "{}/accounts:{method}?key={}",
        config.identity_endpoint.trim_end_matches('/'),
        urlencoding::encode(&config.api_key)
    )
}

fn token_url(config: &FirebaseConfig) -> String {
    format!(
        "{}/token?key={}",
        config.token_endpoint.trim_end_matches('/'),
        urlencoding::encode(&config.api_key)
    )
}

fn expires_at(now_ms: f64, expires_in: Option<&str>) -> f64 {
    let lifetime = expires_in
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs > 0.0)
        .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS);
    now_ms + lifetime * 1000.0
}

fn needs_refresh(expires_at_ms: f64, now_ms: f64) -> bool {
    expires_at_ms - now_ms <= REFRESH_MARGIN_MS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::InMemoryStorage;
    use futures::FutureExt;

    fn config() -> FirebaseConfig {
        FirebaseConfig {
            api_key: "k y".into(),
            project_id: "dream-cart-app".into(),
            identity_endpoint: "http://localhost:9099/identitytoolkit.googleapis.com/v1/".into(),
            token_endpoint: "http://localhost:9099/securetoken.googleapis.com/v1".into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_urls() {
        assert_eq!(
            identity_url(&config(), "signUp"),
            "http://localhost:9099/identitytoolkit.googleapis.com/v1/accounts:signUp?key=k%20y"
        );
        assert_eq!(
            token_url(&config()),
            "http://localhost:9099/securetoken.googleapis.com/v1/token?key=k%20y"
        );
    }

    #[test]
    fn test_token_expiry() {
        assert_eq!(expires_at(1_000.0, Some("3600")), 3_601_000.0);
        assert_eq!(expires_at(0.0, Some("garbage")), 3_600_000.0);
        assert_eq!(expires_at(0.0, None), 3_600_000.0);

        assert!(!needs_refresh(200_000.0, 100_000.0));
        assert!(needs_refresh(150_000.0, 100_000.0));
        assert!(needs_refresh(50_000.0, 100_000.0));
    }

    #[test]
    fn test_error_envelope_shape() {
        let body = r#"{"error":{"code":400,"message":"EMAIL_EXISTS","errors":[]}}"#;
        let envelope: ErrorEnvelope = serde_json::from_str(body).unwrap();
        let err = AuthError::from_server(&envelope.error.message);
        assert_eq!(err.code, codes::EMAIL_ALREADY_IN_USE);
    }

    #[test]
    fn test_refresh_response_shape() {
        let body = r#"{"id_token":"t","refresh_token":"r","expires_in":"3600","user_id":"u1","token_type":"Bearer"}"#;
        let parsed: RefreshResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.user_id, "u1");
        assert_eq!(parsed.expires_in.as_deref(), Some("3600"));
    }

    #[tokio::test]
    async fn test_restore_without_session_announces_signed_out() {
        let auth = FirebaseAuth::with_storage(config(), Rc::new(InMemoryStorage::new()));
        let mut early = auth.subscribe();

        auth.restore().await;
        assert_eq!(early.next().await, Some(None));

        // Late listeners get the resolved state immediately.
        let mut late = auth.subscribe();
        assert_eq!(late.next().await, Some(None));
        assert!(auth.current().is_none());
        assert_eq!(auth.id_token().await, Ok(None));
    }

    #[tokio::test]
    async fn test_restore_runs_once() {
        let auth = FirebaseAuth::with_storage(config(), Rc::new(InMemoryStorage::new()));
        auth.restore().await;
        let hub = auth.inner.hub.clone();
        let mut listener = hub.subscribe();
        auth.restore().await;
        assert!(listener.next().now_or_never().is_none());
        assert_eq!(auth.inner.state.borrow().phase, Phase::Resolved);

        let someone = Some(Identity::new("u9", "u9@example.com"));
        hub.emit(someone.clone());
        assert_eq!(listener.next().await, Some(someone));
    }

    #[tokio::test]
    async fn test_sign_out_clears_storage() {
        let storage = Rc::new(InMemoryStorage::new());
        storage.save(&PersistedSession {
            uid: "u1".into(),
            email: "a@b.c".into(),
            refresh_token: "r".into(),
        });
        let auth = FirebaseAuth::with_storage(config(), storage.clone());

        auth.sign_out().await.unwrap();
        assert!(storage.load().is_none());
        let mut stream = auth.subscribe();
        assert_eq!(stream.next().await, Some(None));
    }
}
