//! Decoders for raw property values.
//!
//! A raw property value is a rich-text decoration array:
//! `[[text, [decoration, ...]?], ...]`. Mentions show up as the `‣` token
//! followed by their payload, e.g. `["‣", [["d", {date}]]]` for dates and
//! `["‣", [["u", user_id]]]` for people.

use crate::constants::{EQUATION_TOKEN, MENTION_TOKEN};
use crate::error::DecodeError;
use crate::model::DateValue;
use crate::record_map::is_truthy;
use serde_json::Value;

/// Concatenates the text runs of a decoration array, skipping mention and
/// equation placeholders. A bare string is returned as-is.
pub fn text_content(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        Value::Array(runs) => runs
            .iter()
            .filter_map(|run| run.get(0))
            .filter_map(|text| match text {
                Value::String(s) if s == MENTION_TOKEN || s == EQUATION_TOKEN => None,
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        _ => String::new(),
    }
}

/// Finds the first date mention, depth first, and returns it without its
/// `type` discriminator.
pub fn date_value(raw: &Value) -> Result<DateValue, DecodeError> {
    let mut token = find_date_token(raw).cloned().ok_or(DecodeError::NoDateToken)?;

    if let Some(fields) = token.as_object_mut() {
        fields.shift_remove("type");
    }

    serde_json::from_value(token).map_err(|e| DecodeError::UnexpectedShape {
        property: "date",
        detail: e.to_string(),
    })
}

fn find_date_token(raw: &Value) -> Option<&Value> {
    let items = raw.as_array()?;

    if items.first().and_then(Value::as_str) == Some(MENTION_TOKEN) {
        let decoration = items.get(1).and_then(|d| d.get(0));
        if decoration.and_then(|d| d.get(0)).and_then(Value::as_str) == Some("d") {
            if let Some(date) = decoration.and_then(|d| d.get(1)).filter(|v| is_truthy(v)) {
                return Some(date);
            }
        }
    }

    items.iter().find_map(find_date_token)
}

/// Splits the text of a (multi) select on commas. No text, no items.
pub fn select_list(raw: &Value) -> Vec<String> {
    let text = text_content(raw);
    if text.is_empty() {
        Vec::new()
    } else {
        text.split(',').map(str::to_string).collect()
    }
}

/// The raw URL of the first attachment: `raw[0][1][0][1]`.
pub fn first_file_url(raw: &Value) -> Result<&str, DecodeError> {
    raw.get(0)
        .and_then(|file| file.get(1))
        .and_then(|decorations| decorations.get(0))
        .and_then(|link| link.get(1))
        .and_then(Value::as_str)
        .ok_or_else(|| DecodeError::UnexpectedShape {
            property: "file",
            detail: format!("no attachment link in {}", raw),
        })
}

/// User ids referenced by a person property, in order.
///
/// The reference array is flattened one level; every element shaped like
/// `[[_, user_id], ...]` with a non-empty id contributes that id.
pub fn person_references(raw: &Value) -> Vec<String> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .flat_map(|item| match item {
            Value::Array(inner) => inner.iter().collect::<Vec<_>>(),
            other => vec![other],
        })
        .filter_map(|reference| {
            reference
                .get(0)
                .filter(|pointer| pointer.is_array())
                .and_then(|pointer| pointer.get(1))
                .and_then(Value::as_str)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        })
        .collect()
}
