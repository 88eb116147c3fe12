use api::{AppConfig, Services};
use dioxus::prelude::*;
use ui::icons::FaSpinner;
use ui::{use_session, Dashboard, Icon, LoginScreen, SessionProvider};

const MAIN_CSS: Asset = asset!("/assets/main.css");
const CONFIG: &str = include_str!("../dreamcart.toml");

fn main() {
    dioxus::logger::initialize_default();
    dioxus::launch(App);
}

#[component]
fn App() -> Element {
    let config = use_hook(|| {
        AppConfig::from_toml(CONFIG).map_err(|e| {
            tracing::error!("invalid configuration: {e}");
            e.to_string()
        })
    });

    rsx! {
        document::Link { rel: "stylesheet", href: MAIN_CSS }

        {match config {
            Ok(config) => rsx! {
                Backend { config }
            },
            Err(message) => rsx! {
                ConfigError { message }
            },
        }}
    }
}

/// Builds the services once and provides them to the tree.
#[component]
fn Backend(config: AppConfig) -> Element {
    use_context_provider(|| Services::from_config(&config));

    rsx! {
        SessionProvider {
            AppContent {}
        }
    }
}

/// Loader until the auth state is known, then the dashboard or the login screen.
#[component]
fn AppContent() -> Element {
    let session = use_session();
    let state = session();

    if state.is_loading {
        return rsx! {
            div {
                class: "app-loader",
                Icon { icon: FaSpinner, class: "spin accent", width: 40, height: 40 }
            }
        };
    }

    if state.identity.is_some() {
        rsx! { Dashboard {} }
    } else {
        rsx! { LoginScreen {} }
    }
}

#[component]
fn ConfigError(message: String) -> Element {
    rsx! {
        div {
            class: "app-loader",
            div {
                class: "error-panel",
                h2 { "Configuration Error" }
                p { class: "error-message", "{message}" }
            }
        }
    }
}
