use dioxus::prelude::*;
use store::models::sanitize_price;
use store::{DreamItem, ItemFields, Priority};

use crate::icons::FaXmark;
use crate::modal_overlay::ModalOverlay;
use crate::priority::priority_options;
use crate::Icon;

pub const FORM_ERROR: &str = "Please fill in at least the name and image URL.";

/// Controlled state of the add/edit form.
#[derive(Clone, Debug, PartialEq)]
pub struct ItemForm {
    pub name: String,
    pub image_url: String,
    /// Raw text of the price input.
    pub price: String,
    pub priority: Priority,
    pub error: Option<String>,
}

impl ItemForm {
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            image_url: String::new(),
            price: String::new(),
            priority: Priority::GoodToHave,
            error: None,
        }
    }

    pub fn editing(item: &DreamItem) -> Self {
        Self {
            name: item.name().to_string(),
            image_url: item.image_url().to_string(),
            price: item.price().to_string(),
            priority: item.priority(),
            error: None,
        }
    }

    pub fn for_item(item: Option<&DreamItem>) -> Self {
        item.map(Self::editing).unwrap_or_else(Self::blank)
    }

    /// Validate the form. On success returns the fields to save.
    pub fn submit(&mut self) -> Option<ItemFields> {
        if self.name.is_empty() || self.image_url.is_empty() {
            self.error = Some(FORM_ERROR.to_string());
            return None;
        }
        self.error = None;
        Some(ItemFields::new(
            self.name.clone(),
            self.image_url.clone(),
            parse_price(&self.price),
            self.priority,
        ))
    }
}

/// Parse the longest numeric prefix of `input`, the way browsers read a
/// number field. Anything unparsable, negative or non-finite yields 0.
pub fn parse_price(input: &str) -> f64 {
    let s = input.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let mut j = end + 1;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - (end + 1);
        end = j;
    }
    if digits == 0 {
        return 0.0;
    }

    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut j = end + 1;
        if j < bytes.len() && matches!(bytes[j], b'+' | b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < bytes.len() && bytes[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            end = j;
        }
    }

    sanitize_price(s[..end].parse::<f64>().unwrap_or(0.0))
}

/// Add/edit dialog for one item.
///
/// `item` is `None` when creating. `on_save` receives the validated fields;
/// the dialog closes right after.
#[component]
pub fn ItemModal(
    item: Option<DreamItem>,
    on_close: EventHandler<()>,
    on_save: EventHandler<ItemFields>,
) -> Element {
    let editing = item.is_some();
    let mut form = use_signal(move || ItemForm::for_item(item.as_ref()));

    let handle_submit = move |evt: FormEvent| {
        evt.prevent_default();
        if let Some(fields) = form.with_mut(ItemForm::submit) {
            on_save.call(fields);
            on_close.call(());
        }
    };

    let state = form();
    let title = if editing { "Edit Dream Item" } else { "Add a New Dream" };
    let submit_label = if editing { "Save Changes" } else { "Add to Cart" };

    rsx! {
        ModalOverlay {
            on_close: move |_| on_close.call(()),
            button {
                class: "modal-close",
                r#type: "button",
                onclick: move |_| on_close.call(()),
                Icon { icon: FaXmark, width: 20, height: 20 }
            }
            h2 { class: "modal-title", "{title}" }
            form {
                onsubmit: handle_submit,
                div {
                    class: "field-stack",
                    input {
                        class: "text-input",
                        r#type: "text",
                        placeholder: "Item Name (e.g., Sony Headphones)",
                        value: "{state.name}",
                        oninput: move |evt: FormEvent| form.with_mut(|f| f.name = evt.value()),
                    }
                    input {
                        class: "text-input",
                        r#type: "text",
                        placeholder: "Image URL",
                        value: "{state.image_url}",
                        oninput: move |evt: FormEvent| form.with_mut(|f| f.image_url = evt.value()),
                    }
                    input {
                        class: "text-input",
                        r#type: "number",
                        placeholder: "Estimated Price",
                        value: "{state.price}",
                        oninput: move |evt: FormEvent| form.with_mut(|f| f.price = evt.value()),
                    }
                    div {
                        label { class: "field-label", "Priority" }
                        div {
                            class: "priority-picker",
                            for (priority, label, class) in priority_options(state.priority) {
                                button {
                                    key: "{priority}",
                                    r#type: "button",
                                    class: "{class}",
                                    onclick: move |_| form.with_mut(|f| f.priority = priority),
                                    "{label}"
                                }
                            }
                        }
                    }
                }
                if let Some(err) = &state.error {
                    p { class: "form-error", "{err}" }
                }
                div {
                    class: "modal-actions",
                    button {
                        class: "primary-button",
                        r#type: "submit",
                        "{submit_label}"
                    }
                }
            }
        }
    }
}
