use dioxus::prelude::*;
use store::DreamItem;

use crate::icons::{FaPenToSquare, FaSpinner, FaTrashCan};
use crate::priority::priority_class;
use crate::Icon;

/// Shown when an item's own image fails to load.
pub const PLACEHOLDER_IMAGE: &str = "https://placehold.co/600x400/0f172a/94a3b8?text=Image+Not+Found";

/// Group digits with commas and keep at most three fraction digits,
/// e.g. `1234567.8916` → `1,234,567.892`. Prices are never negative.
pub fn format_price(price: f64) -> String {
    let fixed = format!("{:.3}", price.max(0.0));
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if fraction.is_empty() {
        grouped
    } else {
        format!("{grouped}.{fraction}")
    }
}

/// Price line of a card; free items show none.
pub fn price_label(price: f64) -> Option<String> {
    (price > 0.0).then(|| format!("${}", format_price(price)))
}

/// The image to show, falling back to the placeholder once loading failed.
pub fn image_source(url: &str, failed: bool) -> &str {
    if failed {
        PLACEHOLDER_IMAGE
    } else {
        url
    }
}

/// One wishlist item with edit and delete buttons.
#[component]
pub fn ItemCard(
    item: DreamItem,
    on_edit: EventHandler<DreamItem>,
    on_delete: EventHandler<String>,
) -> Element {
    let mut deleting = use_signal(|| false);
    let mut image_failed = use_signal(|| false);

    let edit_item = item.clone();
    let delete_id = item.id.clone();
    let src = image_source(item.image_url(), image_failed()).to_string();
    let tier = priority_class(item.priority());
    let badge_class = format!("badge {tier}");
    let name = item.name().to_string();
    let badge_label = item.priority().label();
    let price = price_label(item.price());

    rsx! {
        div {
            class: "item-card animate-fade-in {tier}",
            div {
                class: "card-actions",
                button {
                    class: "icon-button edit",
                    onclick: move |_| on_edit.call(edit_item.clone()),
                    Icon { icon: FaPenToSquare, width: 16, height: 16 }
                }
                button {
                    class: "icon-button delete",
                    disabled: deleting(),
                    onclick: move |_| {
                        deleting.set(true);
                        on_delete.call(delete_id.clone());
                    },
                    if deleting() {
                        Icon { icon: FaSpinner, class: "spin", width: 16, height: 16 }
                    } else {
                        Icon { icon: FaTrashCan, width: 16, height: 16 }
                    }
                }
            }
            img {
                class: "card-image",
                src: "{src}",
                alt: "{name}",
                onerror: move |_| {
                    if !image_failed() {
                        image_failed.set(true);
                    }
                },
            }
            div {
                class: "card-body",
                div {
                    class: "card-heading",
                    h3 { class: "card-title", "{name}" }
                    span { class: "{badge_class}", "{badge_label}" }
                }
                if let Some(price) = price {
                    p { class: "card-price", "{price}" }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(349.0), "349");
        assert_eq!(format_price(1299.99), "1,299.99");
        assert_eq!(format_price(1234567.8916), "1,234,567.892");
        assert_eq!(format_price(1000000.0), "1,000,000");
        assert_eq!(format_price(0.5), "0.5");
        assert_eq!(format_price(999.9999), "1,000");
    }

    #[test]
    fn test_price_only_when_positive() {
        assert_eq!(price_label(0.0), None);
        assert_eq!(price_label(25000.0).as_deref(), Some("$25,000"));
    }

    #[test]
    fn test_image_fallback() {
        assert_eq!(image_source("https://img/x.png", false), "https://img/x.png");
        assert_eq!(image_source("https://img/x.png", true), PLACEHOLDER_IMAGE);
    }
}
