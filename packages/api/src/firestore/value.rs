//! Firestore REST document encoding.
//!
//! Documents travel as `{"name": ".../documents/users/u/dreamItems/abc",
//! "fields": {"price": {"integerValue": "20"}, ...}}`. Only the value kinds
//! a wishlist item uses are modelled; anything else decodes as "absent".

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use store::{DreamItem, ItemFields, Priority};

/// Largest integer a double represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Value {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_value: Option<String>,
    /// int64 values are sent as decimal strings.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "int_as_string"
    )]
    pub integer_value: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_double"
    )]
    pub double_value: Option<f64>,
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Self {
            string_value: Some(s.into()),
            ..Self::default()
        }
    }

    /// Whole numbers in the safe range are stored as integers, like the web SDK does.
    pub fn number(n: f64) -> Self {
        if n.is_finite() && n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
            Self {
                integer_value: Some(format!("{}", n as i64)),
                ..Self::default()
            }
        } else {
            Self {
                double_value: Some(n),
                ..Self::default()
            }
        }
    }

    fn as_str(&self) -> Option<&str> {
        self.string_value.as_deref()
    }

    fn as_f64(&self) -> Option<f64> {
        if let Some(int) = &self.integer_value {
            return int.trim().parse::<i64>().ok().map(|i| i as f64);
        }
        self.double_value
    }
}

fn int_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_double<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    // Non-finite doubles arrive as the strings "NaN", "Infinity", "-Infinity".
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.parse::<f64>().ok(),
        _ => None,
    })
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub fields: HashMap<String, Value>,
}

impl Document {
    /// Request body for a create or update.
    pub fn from_fields(fields: &ItemFields) -> Self {
        let mut map = HashMap::with_capacity(4);
        map.insert("name".to_string(), Value::string(&fields.name));
        map.insert("imageUrl".to_string(), Value::string(&fields.image_url));
        map.insert("price".to_string(), Value::number(fields.price));
        map.insert(
            "priority".to_string(),
            Value::string(fields.priority.as_str()),
        );
        Self {
            name: None,
            fields: map,
        }
    }

    /// Last path segment of the resource name.
    pub fn id(&self) -> Option<&str> {
        self.name
            .as_deref()
            .and_then(|name| name.rsplit('/').next())
            .filter(|id| !id.is_empty())
    }

    /// Decode into an item. Missing or mistyped fields take their defaults.
    pub fn to_item(&self) -> Option<DreamItem> {
        let id = self.id()?;
        let text = |key: &str| {
            self.fields
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let price = self
            .fields
            .get("price")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        let priority = self
            .fields
            .get("priority")
            .and_then(Value::as_str)
            .map(Priority::from_tag)
            .unwrap_or_default();
        Some(DreamItem::new(
            id,
            ItemFields::new(text("name"), text("imageUrl"), price, priority),
        ))
    }
}

/// One page of `documents.list`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prices_pick_integer_or_double() {
        assert_eq!(Value::number(20.0).integer_value.as_deref(), Some("20"));
        assert_eq!(Value::number(0.0).integer_value.as_deref(), Some("0"));
        assert_eq!(Value::number(19.99).double_value, Some(19.99));
        assert_eq!(Value::number(1e300).double_value, Some(1e300));
    }

    #[test]
    fn test_encode_body() {
        let fields = ItemFields::new("Camera", "https://img/c.png", 1299.0, Priority::MustHave);
        let json = serde_json::to_value(Document::from_fields(&fields)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "fields": {
                    "name": {"stringValue": "Camera"},
                    "imageUrl": {"stringValue": "https://img/c.png"},
                    "price": {"integerValue": "1299"},
                    "priority": {"stringValue": "must-have"}
                }
            })
        );
    }

    #[test]
    fn test_decode_listing() {
        let body = r#"{
            "documents": [
                {
                    "name": "projects/p/databases/(default)/documents/users/u1/dreamItems/abc",
                    "fields": {
                        "name": {"stringValue": "Bike"},
                        "imageUrl": {"stringValue": "https://img/b.png"},
                        "price": {"doubleValue": 499.5},
                        "priority": {"stringValue": "long-term-goal"}
                    },
                    "createTime": "2024-01-01T00:00:00Z"
                },
                {
                    "name": "projects/p/databases/(default)/documents/users/u1/dreamItems/def",
                    "fields": {
                        "name": {"stringValue": "Mystery"},
                        "price": {"stringValue": "a lot"},
                        "priority": {"stringValue": "someday"}
                    }
                }
            ],
            "nextPageToken": "next"
        }"#;
        let page: ListResponse = serde_json::from_str(body).unwrap();
        assert_eq!(page.next_page_token.as_deref(), Some("next"));

        let items: Vec<DreamItem> = page.documents.iter().filter_map(Document::to_item).collect();
        assert_eq!(items[0].id, "abc");
        assert_eq!(items[0].price(), 499.5);
        assert_eq!(items[0].priority(), Priority::LongTermGoal);

        assert_eq!(items[1].id, "def");
        assert_eq!(items[1].image_url(), "");
        assert_eq!(items[1].price(), 0.0);
        assert_eq!(items[1].priority(), Priority::GoodToHave);
    }

    #[test]
    fn test_integer_values_decode() {
        let doc: Document = serde_json::from_str(
            r#"{"name":"a/b/x","fields":{"price":{"integerValue":"42"}}}"#,
        )
        .unwrap();
        assert_eq!(doc.to_item().unwrap().price(), 42.0);
    }

    #[test]
    fn test_empty_listing() {
        let page: ListResponse = serde_json::from_str("{}").unwrap();
        assert!(page.documents.is_empty());
        assert!(page.next_page_token.is_none());
    }
}
