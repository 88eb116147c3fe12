//! The signed-in screen: live item grid, add/edit dialog and sign-out.

mod state;

pub use state::{user_message, DashboardState, FETCH_ERROR_MESSAGE, PERMISSION_DENIED_MESSAGE};

use std::rc::Rc;

use dioxus::core::spawn_forever;
use dioxus::prelude::*;
use futures::StreamExt;
use store::{CollectionPath, DocumentStore, DreamItem, ItemFields};

use crate::icons::{FaPlus, FaRightFromBracket, FaSpinner};
use crate::item_card::ItemCard;
use crate::item_modal::ItemModal;
use crate::session::{use_services, use_session};
use crate::Icon;

/// Which dialog is open.
#[derive(Clone, Debug, PartialEq)]
enum Editor {
    New,
    Edit(DreamItem),
}

impl Editor {
    fn item(&self) -> Option<DreamItem> {
        match self {
            Editor::New => None,
            Editor::Edit(item) => Some(item.clone()),
        }
    }
}

/// Write an item without waiting for the round-trip; the listener picks up
/// the result. Failures are only logged.
fn save_item(
    documents: Rc<dyn DocumentStore>,
    path: CollectionPath,
    editing: Option<String>,
    fields: ItemFields,
) {
    spawn_forever(async move {
        match editing {
            Some(id) => {
                if let Err(e) = documents.update(&path.doc(id), &fields).await {
                    tracing::error!("error updating item: {e}");
                }
            }
            None => {
                if let Err(e) = documents.add(&path, &fields).await {
                    tracing::error!("error adding item: {e}");
                }
            }
        }
    });
}

fn delete_item(documents: Rc<dyn DocumentStore>, path: CollectionPath, id: String) {
    spawn_forever(async move {
        if let Err(e) = documents.delete(&path.doc(id)).await {
            tracing::error!("error deleting item: {e}");
        }
    });
}

#[component]
pub fn Dashboard() -> Element {
    let services = use_services();
    let session = use_session();
    let mut state = use_signal(DashboardState::default);
    let mut editor = use_signal(|| Option::<Editor>::None);

    // Re-subscribes whenever the session changes; restarting the resource
    // drops the previous stream, which closes its listener.
    let documents = services.documents.clone();
    let _listener = use_resource(move || {
        let documents = documents.clone();
        let uid = session().identity.map(|identity| identity.uid);
        async move {
            state.set(DashboardState::Loading);
            let Some(uid) = uid else {
                return;
            };
            let path = CollectionPath::dream_items(uid);
            tracing::debug!(%path, "subscribing to items");
            let mut events = documents.subscribe(&path);
            while let Some(event) = events.next().await {
                state.with_mut(|s| s.apply(event));
            }
        }
    });

    let collection = move || {
        session
            .peek()
            .uid()
            .map(|uid| CollectionPath::dream_items(uid.to_string()))
    };

    let documents = services.documents.clone();
    let handle_save = move |fields: ItemFields| {
        let Some(path) = collection() else {
            return;
        };
        let editing = match editor.peek().as_ref() {
            Some(Editor::Edit(item)) => Some(item.id.clone()),
            _ => None,
        };
        save_item(documents.clone(), path, editing, fields);
    };

    let documents = services.documents.clone();
    let handle_delete = move |id: String| {
        if let Some(path) = collection() {
            delete_item(documents.clone(), path, id);
        }
    };

    let identity = services.identity.clone();
    let handle_sign_out = move |_| {
        let identity = identity.clone();
        spawn(async move {
            if let Err(e) = identity.sign_out().await {
                tracing::error!("error signing out: {e}");
            }
        });
    };

    let email = session()
        .identity
        .map(|identity| identity.email)
        .unwrap_or_default();
    let current = state();

    rsx! {
        div {
            class: "dashboard",
            div { class: "grid-backdrop" }
            div {
                class: "dashboard-content",
                header {
                    class: "dashboard-header",
                    h1 { class: "brand", "My Dream Cart" }
                    div {
                        class: "header-user",
                        span { class: "user-email", "{email}" }
                        button {
                            class: "icon-button",
                            title: "Sign out",
                            onclick: handle_sign_out,
                            Icon { icon: FaRightFromBracket, width: 20, height: 20 }
                        }
                    }
                }

                main {
                    class: "dashboard-main",
                    {match &current {
                        DashboardState::Loading => rsx! {
                            div {
                                class: "centered-loader",
                                Icon { icon: FaSpinner, class: "spin accent", width: 32, height: 32 }
                            }
                        },
                        DashboardState::Failed(message) => rsx! {
                            div {
                                class: "error-panel",
                                h2 { "Failed to Load Data" }
                                p { class: "error-message", "{message}" }
                                p {
                                    class: "error-hint",
                                    "Please go to Firestore > Rules in your Firebase project and ensure they allow reads for authenticated users."
                                }
                            }
                        },
                        DashboardState::Ready(items) if items.is_empty() => rsx! {
                            div {
                                class: "empty-state",
                                h2 { "Your Dream Cart is Empty" }
                                p { "Let's add something you're aspiring to own!" }
                                button {
                                    class: "primary-button",
                                    onclick: move |_| editor.set(Some(Editor::New)),
                                    Icon { icon: FaPlus, width: 16, height: 16 }
                                    "Add First Dream"
                                }
                            }
                        },
                        DashboardState::Ready(items) => rsx! {
                            div {
                                class: "item-grid",
                                for item in items.iter().cloned() {
                                    ItemCard {
                                        key: "{item.id}",
                                        item: item.clone(),
                                        on_edit: move |item| editor.set(Some(Editor::Edit(item))),
                                        on_delete: handle_delete.clone(),
                                    }
                                }
                            }
                        },
                    }}
                }

                if current.shows_add_button() {
                    button {
                        class: "fab",
                        title: "Add a dream",
                        onclick: move |_| editor.set(Some(Editor::New)),
                        Icon { icon: FaPlus, width: 32, height: 32 }
                    }
                }

                if let Some(open) = editor() {
                    ItemModal {
                        item: open.item(),
                        on_close: move |_| editor.set(None),
                        on_save: handle_save.clone(),
                    }
                }
            }
        }
    }
}
