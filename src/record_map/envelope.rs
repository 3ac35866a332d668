//! Versioned record envelopes.
//!
//! Depending on the API version, a record map entry is either the record
//! itself, `{ "value": record, "role": .. }`, or
//! `{ "spaceId": .., "value": { "value": record, "role": .. } }`.
//! Entries are classified once on ingress; nothing downstream looks at
//! envelopes again.

use serde_json::Value;

/// The shape a record arrived in, carrying the unwrapped record.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// `value.value` was present and truthy.
    Nested(Value),
    /// `value` was present and truthy.
    Wrapped(Value),
    /// Neither; the entry is taken as the record itself.
    Bare(Value),
}

impl Envelope {
    /// Classifies a raw entry, preferring the deepest truthy `value`.
    pub fn classify(mut raw: Value) -> Self {
        if let Some(outer) = raw.get_mut("value") {
            if let Some(inner) = outer.get_mut("value") {
                if is_truthy(inner) {
                    return Self::Nested(inner.take());
                }
            }
            if is_truthy(outer) {
                return Self::Wrapped(outer.take());
            }
        }
        Self::Bare(raw)
    }

    /// How many `value` layers were peeled off.
    pub fn depth(&self) -> usize {
        match self {
            Self::Nested(_) => 2,
            Self::Wrapped(_) => 1,
            Self::Bare(_) => 0,
        }
    }

    pub fn into_record(self) -> Value {
        match self {
            Self::Nested(record) | Self::Wrapped(record) | Self::Bare(record) => record,
        }
    }
}

/// JavaScript truthiness, which is what the API's envelopes were designed around.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
