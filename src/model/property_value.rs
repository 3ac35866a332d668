//! Typed property values as they appear on a post.

use crate::record_map::is_truthy;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A resolved property value.
///
/// Serialized untagged so a post reads as a flat JSON object:
/// strings, string lists, date objects, a URL or `null`, user lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    List(Vec<String>),
    Date(DateValue),
    /// Attachment URL; `None` when the attachment couldn't be decoded.
    File(Option<String>),
    People(Vec<Person>),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateValue> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    /// The value itself for text, the first entry for a list.
    pub fn first_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(items) => items.first().map(String::as_str),
            _ => None,
        }
    }

    /// Whether the value counts as present: empty strings and missing
    /// attachments don't, lists always do.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Text(s) => !s.is_empty(),
            Self::File(url) => url.as_deref().is_some_and(|u| !u.is_empty()),
            Self::List(_) | Self::Date(_) | Self::People(_) => true,
        }
    }
}

/// A date or date range. `start_date` is `YYYY-MM-DD`; everything else
/// Notion attaches (`end_date`, `start_time`, `time_zone`, ...) is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(flatten)]
    pub details: IndexMap<String, Value>,
}

impl DateValue {
    pub fn starting(start_date: impl Into<String>) -> Self {
        Self {
            start_date: Some(start_date.into()),
            details: IndexMap::new(),
        }
    }

    pub fn end_date(&self) -> Option<&str> {
        self.details
            .get("end_date")
            .filter(|v| is_truthy(v))
            .and_then(Value::as_str)
    }
}

/// A resolved workspace member.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Person {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub profile_photo: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_untagged() {
        let values = vec![
            PropertyValue::Text("hi".into()),
            PropertyValue::List(vec!["a".into(), "b".into()]),
            PropertyValue::Date(DateValue::starting("2024-01-15")),
            PropertyValue::File(None),
            PropertyValue::People(vec![Person {
                id: Some("u1".into()),
                name: Some("Kim".into()),
                profile_photo: None,
            }]),
        ];
        assert_eq!(
            serde_json::to_value(&values).unwrap(),
            json!([
                "hi",
                ["a", "b"],
                {"start_date": "2024-01-15"},
                null,
                [{"id": "u1", "name": "Kim", "profile_photo": null}]
            ])
        );
    }

    #[test]
    fn date_details_are_kept() {
        let date: DateValue = serde_json::from_value(json!({
            "start_date": "2024-01-01",
            "end_date": "2024-01-03",
            "date_format": "relative"
        }))
        .unwrap();
        assert_eq!(date.end_date(), Some("2024-01-03"));
        assert_eq!(
            serde_json::to_value(&date).unwrap(),
            json!({"start_date": "2024-01-01", "end_date": "2024-01-03", "date_format": "relative"})
        );
    }

    #[test]
    fn truthiness() {
        assert!(!PropertyValue::Text(String::new()).is_truthy());
        assert!(PropertyValue::List(vec![]).is_truthy());
        assert!(!PropertyValue::File(None).is_truthy());
        assert_eq!(
            PropertyValue::List(vec!["Public".into()]).first_text(),
            Some("Public")
        );
    }
}
