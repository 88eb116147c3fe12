//! This crate contains all shared UI for the workspace.
//!
//! | Component | State type | Role |
//! |-----------|------------|------|
//! | [`SessionProvider`] | [`SessionState`] | Tracks the signed-in identity for the whole tree. |
//! | [`LoginScreen`] | [`LoginForm`] | Email/password sign-in and sign-up. |
//! | [`Dashboard`] | [`DashboardState`] | Live item grid with add, edit, delete and sign-out. |
//! | [`ItemCard`] | | One item. |
//! | [`ItemModal`] | [`ItemForm`] | Add/edit dialog with inline validation. |

// Re-export icon library
pub use dioxus_free_icons::Icon;
pub mod icons {
    pub use dioxus_free_icons::icons::fa_solid_icons::*;
}

mod session;
pub use session::{use_services, use_session, SessionProvider, SessionState};

mod login;
pub use login::{LoginForm, LoginMode, LoginScreen};

pub mod dashboard;
pub use dashboard::{Dashboard, DashboardState};

mod item_card;
pub use item_card::{format_price, ItemCard, PLACEHOLDER_IMAGE};

mod item_modal;
pub use item_modal::{parse_price, ItemForm, ItemModal, FORM_ERROR};

mod modal_overlay;
pub use modal_overlay::ModalOverlay;

mod priority;
