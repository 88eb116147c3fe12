//! # Domain models for wishlist items
//!
//! Defines the data structures delivered by a [`crate::DocumentStore`] when a
//! collection snapshot arrives, and the field set written back by add/update.
//! These types are `Serialize + Deserialize` with the wire names the hosted
//! document store uses (`imageUrl`, kebab-case priority tags).
//!
//! ## Types
//!
//! | Type | Represents |
//! |------|-----------|
//! | [`DreamItem`] | One stored wishlist entry: the document id plus its [`ItemFields`]. |
//! | [`ItemFields`] | The four user-editable fields. Add and edit always write all four together. |
//! | [`Priority`] | The display tier: `must-have`, `good-to-have` (default), `long-term-goal`. |
//!
//! Decoding is lenient: a missing `price` reads as `0`, and a missing or
//! unrecognised `priority` reads as [`Priority::GoodToHave`].

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Priority tier of a wishlist item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    MustHave,
    #[default]
    GoodToHave,
    LongTermGoal,
}

impl Priority {
    /// All tiers, in the order the item form offers them.
    pub const ALL: [Priority; 3] = [
        Priority::MustHave,
        Priority::GoodToHave,
        Priority::LongTermGoal,
    ];

    /// The wire tag stored in the document.
    pub fn as_str(self) -> &'static str {
        match self {
            Priority::MustHave => "must-have",
            Priority::GoodToHave => "good-to-have",
            Priority::LongTermGoal => "long-term-goal",
        }
    }

    /// Parse a wire tag. Unknown tags fall back to the default tier.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "must-have" => Priority::MustHave,
            "long-term-goal" => Priority::LongTermGoal,
            _ => Priority::GoodToHave,
        }
    }

    /// Human-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Priority::MustHave => "Must Have!",
            Priority::GoodToHave => "Good to Have",
            Priority::LongTermGoal => "Long-term Goal",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn lenient_priority<'de, D>(deserializer: D) -> Result<Priority, D::Error>
where
    D: Deserializer<'de>,
{
    let tag = Option::<String>::deserialize(deserializer)?;
    Ok(tag.as_deref().map(Priority::from_tag).unwrap_or_default())
}

fn lenient_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let price = Option::<f64>::deserialize(deserializer)?;
    Ok(sanitize_price(price.unwrap_or(0.0)))
}

/// Clamp a price into the stored domain: finite and non-negative.
pub fn sanitize_price(price: f64) -> f64 {
    if price.is_finite() && price > 0.0 {
        price
    } else {
        0.0
    }
}

/// The user-editable fields of a wishlist item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: f64,
    #[serde(default, deserialize_with = "lenient_priority")]
    pub priority: Priority,
}

impl ItemFields {
    pub fn new(
        name: impl Into<String>,
        image_url: impl Into<String>,
        price: f64,
        priority: Priority,
    ) -> Self {
        Self {
            name: name.into(),
            image_url: image_url.into(),
            price: sanitize_price(price),
            priority,
        }
    }
}

/// A wishlist item as delivered in a collection snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DreamItem {
    /// Document id assigned by the store.
    pub id: String,
    #[serde(flatten)]
    pub fields: ItemFields,
}

impl DreamItem {
    pub fn new(id: impl Into<String>, fields: ItemFields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    pub fn name(&self) -> &str {
        &self.fields.name
    }

    pub fn image_url(&self) -> &str {
        &self.fields.image_url
    }

    pub fn price(&self) -> f64 {
        self.fields.price
    }

    pub fn priority(&self) -> Priority {
        self.fields.priority
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_uses_wire_names() {
        let json = r#"{"name":"Headphones","imageUrl":"https://img/x.png","price":349.5,"priority":"must-have"}"#;
        let fields: ItemFields = serde_json::from_str(json).unwrap();
        assert_eq!(fields.name, "Headphones");
        assert_eq!(fields.image_url, "https://img/x.png");
        assert_eq!(fields.price, 349.5);
        assert_eq!(fields.priority, Priority::MustHave);

        let encoded = serde_json::to_value(&fields).unwrap();
        assert_eq!(encoded["imageUrl"], "https://img/x.png");
        assert_eq!(encoded["priority"], "must-have");
    }

    #[test]
    fn test_decode_defaults_missing_price_and_priority() {
        let fields: ItemFields =
            serde_json::from_str(r#"{"name":"Bike","imageUrl":"u"}"#).unwrap();
        assert_eq!(fields.price, 0.0);
        assert_eq!(fields.priority, Priority::GoodToHave);
    }

    #[test]
    fn test_unknown_priority_falls_back() {
        let fields: ItemFields =
            serde_json::from_str(r#"{"name":"Bike","imageUrl":"u","priority":"someday"}"#)
                .unwrap();
        assert_eq!(fields.priority, Priority::GoodToHave);
        assert_eq!(Priority::from_tag("long-term-goal"), Priority::LongTermGoal);
    }

    #[test]
    fn test_negative_price_is_clamped() {
        let fields = ItemFields::new("Car", "u", -10.0, Priority::LongTermGoal);
        assert_eq!(fields.price, 0.0);
        assert_eq!(sanitize_price(f64::NAN), 0.0);
        assert_eq!(sanitize_price(f64::INFINITY), 0.0);
        assert_eq!(sanitize_price(12.25), 12.25);
    }

    #[test]
    fn test_dream_item_flattens_fields() {
        let item = DreamItem::new("abc", ItemFields::new("Watch", "w", 99.0, Priority::default()));
        let value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["id"], "abc");
        assert_eq!(value["name"], "Watch");
        assert_eq!(value["priority"], "good-to-have");
    }
}
