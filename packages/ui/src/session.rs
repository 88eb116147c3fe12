//! Session context and hooks for the UI.

use api::{Identity, Services};
use dioxus::prelude::*;
use futures::StreamExt;

/// Who is signed in, and whether that is known yet.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub identity: Option<Identity>,
    /// True until the identity service reports its first auth state.
    pub is_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            identity: None,
            is_loading: true,
        }
    }
}

impl SessionState {
    /// Record an auth-state event.
    pub fn observe(&mut self, identity: Option<Identity>) {
        self.identity = identity;
        self.is_loading = false;
    }

    pub fn uid(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.uid.as_str())
    }
}

/// The backend services provided at the root of the app.
pub fn use_services() -> Services {
    use_context::<Services>()
}

/// Get the current session state.
/// Returns a signal that updates when the user signs in or out.
pub fn use_session() -> Signal<SessionState> {
    use_context::<Signal<SessionState>>()
}

/// Provider component that tracks the signed-in identity.
/// Must be rendered below a `Services` context provider.
#[component]
pub fn SessionProvider(children: Element) -> Element {
    let services = use_services();
    let mut session = use_signal(SessionState::default);

    // One auth-state listener for the provider's lifetime; the stream is
    // dropped (and unsubscribed) when the task is cancelled on unmount.
    use_future(move || {
        let identity = services.identity.clone();
        async move {
            let mut events = identity.subscribe();
            identity.restore().await;
            while let Some(event) = events.next().await {
                tracing::debug!(signed_in = event.is_some(), "auth state changed");
                session.with_mut(|state| state.observe(event));
            }
        }
    });

    use_context_provider(|| session);

    rsx! {
        {children}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::auth::MemoryAuth;
    use api::IdentityService;

    #[test]
    fn test_loading_until_first_event() {
        let mut state = SessionState::default();
        assert!(state.is_loading);

        state.observe(None);
        assert!(!state.is_loading);
        assert!(state.identity.is_none());

        state.observe(Some(Identity::new("u1", "a@b.c")));
        assert_eq!(state.uid(), Some("u1"));

        state.observe(None);
        assert!(!state.is_loading);
        assert_eq!(state.uid(), None);
    }

    #[tokio::test]
    async fn test_follows_identity_stream() {
        let auth = MemoryAuth::new();
        let mut events = auth.subscribe();
        auth.restore().await;
        let mut state = SessionState::default();

        state.observe(events.next().await.flatten());
        assert!(!state.is_loading);
        assert!(state.identity.is_none());

        let identity = auth.register("dreamer@example.com", "hunter22").await.unwrap();
        state.observe(events.next().await.flatten());
        assert_eq!(state.identity, Some(identity));
    }
}
