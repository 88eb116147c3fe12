use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use futures::StreamExt;
use store::EventHub;
use uuid::Uuid;

use super::error::codes;
use super::{AccessTokens, AuthError, AuthStream, Identity, IdentityService};

const MIN_PASSWORD_LEN: usize = 6;

/// In-process identity service.
///
/// Applies the same validation rules and error codes as the hosted service so
/// the login form behaves identically against either backend. The initial
/// state is "signed out" and is known immediately.
#[derive(Clone, Default)]
pub struct MemoryAuth {
    inner: Rc<Inner>,
}

#[derive(Default)]
struct Inner {
    accounts: RefCell<HashMap<String, Account>>,
    current: RefCell<Option<Identity>>,
    hub: EventHub<Option<Identity>>,
}

struct Account {
    uid: String,
    password: String,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of auth-state listeners still open.
    pub fn listener_count(&self) -> usize {
        self.inner.hub.listener_count()
    }

    fn set_current(&self, identity: Option<Identity>) {
        *self.inner.current.borrow_mut() = identity.clone();
        self.inner.hub.emit(identity);
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[async_trait(?Send)]
impl IdentityService for MemoryAuth {
    fn subscribe(&self) -> AuthStream {
        let current = self.inner.current.borrow().clone();
        self.inner.hub.subscribe_with(current).boxed_local()
    }

    async fn restore(&self) {}

    async fn register(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        if !looks_like_email(&email) {
            return Err(AuthError::from_code(codes::INVALID_EMAIL));
        }
        if password.is_empty() {
            return Err(AuthError::from_code(codes::MISSING_PASSWORD));
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::with_detail(
                codes::WEAK_PASSWORD,
                "Password should be at least 6 characters",
            ));
        }

        let identity = {
            let mut accounts = self.inner.accounts.borrow_mut();
            if accounts.contains_key(&email) {
                return Err(AuthError::from_code(codes::EMAIL_ALREADY_IN_USE));
            }
            let uid = Uuid::new_v4().simple().to_string();
            accounts.insert(
                email.clone(),
                Account {
                    uid: uid.clone(),
                    password: password.to_string(),
                },
            );
            Identity::new(uid, email)
        };
        tracing::info!(uid = %identity.uid, "registered");
        self.set_current(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let email = normalize_email(email);
        if !looks_like_email(&email) {
            return Err(AuthError::from_code(codes::INVALID_EMAIL));
        }
        if password.is_empty() {
            return Err(AuthError::from_code(codes::MISSING_PASSWORD));
        }

        let identity = {
            let accounts = self.inner.accounts.borrow();
            match accounts.get(&email) {
                Some(account) if account.password == password => {
                    Identity::new(account.uid.clone(), email.clone())
                }
                _ => return Err(AuthError::from_code(codes::INVALID_CREDENTIAL)),
            }
        };
        tracing::info!(uid = %identity.uid, "signed in");
        self.set_current(Some(identity.clone()));
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.set_current(None);
        Ok(())
    }

    fn current(&self) -> Option<Identity> {
        self.inner.current.borrow().clone()
    }
}

#[async_trait(?Send)]
impl AccessTokens for MemoryAuth {
    async fn id_token(&self) -> Result<Option<String>, AuthError> {
        Ok(self.current().map(|identity| format!("memory:{}", identity.uid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_signs_in_and_notifies() {
        let auth = MemoryAuth::new();
        let mut events = auth.subscribe();
        assert_eq!(events.next().await, Some(None));

        let identity = auth.register("Dreamer@Example.com", "secret1").await.unwrap();
        assert_eq!(identity.email, "dreamer@example.com");
        assert_eq!(events.next().await, Some(Some(identity.clone())));
        assert_eq!(auth.current(), Some(identity));
    }

    #[tokio::test]
    async fn test_register_validation() {
        let auth = MemoryAuth::new();

        let err = auth.register("not-an-email", "secret1").await.unwrap_err();
        assert_eq!(err.code, codes::INVALID_EMAIL);

        let err = auth.register("a@b.c", "").await.unwrap_err();
        assert_eq!(err.code, codes::MISSING_PASSWORD);

        let err = auth.register("a@b.c", "12345").await.unwrap_err();
        assert_eq!(err.code, codes::WEAK_PASSWORD);
        assert_eq!(
            err.message,
            "Firebase: Password should be at least 6 characters (auth/weak-password)."
        );

        auth.register("a@b.c", "123456").await.unwrap();
        let err = auth.register("a@b.c", "abcdef").await.unwrap_err();
        assert_eq!(err.message, "Firebase: Error (auth/email-already-in-use).");
    }

    #[tokio::test]
    async fn test_sign_in_checks_credentials() {
        let auth = MemoryAuth::new();
        let registered = auth.register("a@b.c", "123456").await.unwrap();
        auth.sign_out().await.unwrap();
        assert!(auth.current().is_none());

        let err = auth.sign_in("a@b.c", "wrong!").await.unwrap_err();
        assert_eq!(err.code, codes::INVALID_CREDENTIAL);
        let err = auth.sign_in("nobody@b.c", "123456").await.unwrap_err();
        assert_eq!(err.code, codes::INVALID_CREDENTIAL);

        let signed_in = auth.sign_in("a@b.c", "123456").await.unwrap();
        assert_eq!(signed_in.uid, registered.uid);
        assert_eq!(auth.id_token().await, Ok(Some(format!("memory:{}", registered.uid))));
    }

    #[tokio::test]
    async fn test_dropped_listener_unsubscribes() {
        let auth = MemoryAuth::new();
        let stream = auth.subscribe();
        assert_eq!(auth.listener_count(), 1);
        drop(stream);
        assert_eq!(auth.listener_count(), 0);
    }
}
