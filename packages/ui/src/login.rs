//! Sign-in / sign-up screen.

use api::auth::AuthError;
use api::{Identity, IdentityService};
use dioxus::prelude::*;

use crate::icons::FaSpinner;
use crate::session::use_services;
use crate::Icon;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoginMode {
    #[default]
    SignIn,
    Register,
}

impl LoginMode {
    pub fn toggled(self) -> Self {
        match self {
            LoginMode::SignIn => LoginMode::Register,
            LoginMode::Register => LoginMode::SignIn,
        }
    }

    pub fn submit_label(self) -> &'static str {
        match self {
            LoginMode::SignIn => "Log In",
            LoginMode::Register => "Sign Up",
        }
    }

    pub fn toggle_prompt(self) -> &'static str {
        match self {
            LoginMode::SignIn => "Don't have an account?",
            LoginMode::Register => "Already have an account?",
        }
    }

    /// Label of the button that switches to the other mode.
    pub fn toggle_label(self) -> &'static str {
        self.toggled().submit_label()
    }

    /// Run this mode's auth operation.
    pub async fn perform(
        self,
        identity: &dyn IdentityService,
        email: &str,
        password: &str,
    ) -> Result<Identity, AuthError> {
        match self {
            LoginMode::SignIn => identity.sign_in(email, password).await,
            LoginMode::Register => identity.register(email, password).await,
        }
    }
}

/// State of the login form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub mode: LoginMode,
    pub error: Option<String>,
    pub busy: bool,
}

impl LoginForm {
    /// Switch between sign-in and sign-up. The email is kept.
    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.error = None;
        self.password.clear();
    }

    /// Mark the form busy and hand out what to submit.
    pub fn begin(&mut self) -> (LoginMode, String, String) {
        self.busy = true;
        self.error = None;
        (self.mode, self.email.clone(), self.password.clone())
    }

    pub fn finish(&mut self, result: Result<Identity, AuthError>) {
        self.busy = false;
        if let Err(e) = result {
            self.error = Some(e.display_message());
        }
    }
}

#[component]
pub fn LoginScreen() -> Element {
    let services = use_services();
    let mut form = use_signal(LoginForm::default);

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if form.peek().busy {
            return;
        }
        let identity = services.identity.clone();
        let (mode, email, password) = form.with_mut(LoginForm::begin);
        spawn(async move {
            let result = mode.perform(identity.as_ref(), &email, &password).await;
            form.with_mut(|f| f.finish(result));
        });
    };

    let state = form();
    let submit_label = state.mode.submit_label();
    let toggle_prompt = state.mode.toggle_prompt();
    let toggle_label = state.mode.toggle_label();

    rsx! {
        div {
            class: "login-page",
            div { class: "login-backdrop" }
            div {
                class: "login-card animate-fade-in",
                h1 { class: "login-title", "Dream Cart" }
                p { class: "login-tagline", "Visualize your future purchases." }

                form {
                    onsubmit: handle_submit,
                    div {
                        class: "field-stack",
                        input {
                            class: "text-input",
                            r#type: "email",
                            placeholder: "Email",
                            required: true,
                            value: "{state.email}",
                            oninput: move |evt: FormEvent| form.with_mut(|f| f.email = evt.value()),
                        }
                        input {
                            class: "text-input",
                            r#type: "password",
                            placeholder: "Password",
                            required: true,
                            value: "{state.password}",
                            oninput: move |evt: FormEvent| form.with_mut(|f| f.password = evt.value()),
                        }
                    }

                    if let Some(err) = &state.error {
                        p { class: "form-error text-center", "{err}" }
                    }

                    button {
                        class: "primary-button full-width",
                        r#type: "submit",
                        disabled: state.busy,
                        if state.busy {
                            Icon { icon: FaSpinner, class: "spin", width: 20, height: 20 }
                        } else {
                            "{submit_label}"
                        }
                    }
                }

                p {
                    class: "login-toggle",
                    "{toggle_prompt}"
                    button {
                        class: "link-button",
                        r#type: "button",
                        onclick: move |_| form.with_mut(LoginForm::toggle_mode),
                        "{toggle_label}"
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use api::auth::{codes, MemoryAuth};

    #[test]
    fn test_toggle_clears_error_and_password() {
        let mut form = LoginForm {
            email: "dreamer@example.com".into(),
            password: "secret".into(),
            error: Some("Error (auth/invalid-credential).".into()),
            ..Default::default()
        };

        form.toggle_mode();
        assert_eq!(form.mode, LoginMode::Register);
        assert_eq!(form.email, "dreamer@example.com");
        assert!(form.password.is_empty());
        assert!(form.error.is_none());

        form.toggle_mode();
        assert_eq!(form.mode, LoginMode::SignIn);
    }

    #[test]
    fn test_texts_follow_mode() {
        assert_eq!(LoginMode::SignIn.submit_label(), "Log In");
        assert_eq!(LoginMode::SignIn.toggle_prompt(), "Don't have an account?");
        assert_eq!(LoginMode::SignIn.toggle_label(), "Sign Up");
        assert_eq!(LoginMode::Register.submit_label(), "Sign Up");
        assert_eq!(LoginMode::Register.toggle_prompt(), "Already have an account?");
        assert_eq!(LoginMode::Register.toggle_label(), "Log In");
    }

    #[test]
    fn test_failure_shows_message_without_vendor_prefix() {
        let mut form = LoginForm::default();
        let _ = form.begin();
        assert!(form.busy);

        form.finish(Err(AuthError::from_code(codes::INVALID_CREDENTIAL)));
        assert!(!form.busy);
        assert_eq!(form.error.as_deref(), Some("Error (auth/invalid-credential)."));

        let _ = form.begin();
        assert!(form.error.is_none());
        form.finish(Ok(Identity::new("u1", "a@b.c")));
        assert!(form.error.is_none());
    }

    #[tokio::test]
    async fn test_register_through_identity_service() {
        let auth = MemoryAuth::new();
        let mut form = LoginForm {
            email: "dreamer@example.com".into(),
            password: "123".into(),
            mode: LoginMode::Register,
            ..Default::default()
        };

        let (mode, email, password) = form.begin();
        let result = mode.perform(&auth, &email, &password).await;
        form.finish(result);
        assert_eq!(
            form.error.as_deref(),
            Some("Password should be at least 6 characters (auth/weak-password).")
        );

        form.password = "1234567".into();
        let (mode, email, password) = form.begin();
        let result = mode.perform(&auth, &email, &password).await;
        assert!(result.is_ok());
        form.finish(result);
        assert!(form.error.is_none());
        assert_eq!(auth.current().map(|i| i.email), Some("dreamer@example.com".into()));
    }
}
