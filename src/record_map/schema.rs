//! Collection schemas: property key → display name and declared type.

use super::lenient;
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Declared type of a schema property.
///
/// Only the kinds with dedicated decoding get their own variant; every
/// other declared type is decoded as plain text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "Option<String>")]
pub enum PropertyKind {
    Date,
    Select,
    MultiSelect,
    Person,
    File,
    /// Any other declared type (`title`, `text`, `url`, `checkbox`, ...).
    Text(String),
    /// No type declared; the property is never decoded.
    #[default]
    Untyped,
}

impl From<Option<String>> for PropertyKind {
    fn from(declared: Option<String>) -> Self {
        match declared.as_deref() {
            None | Some("") => Self::Untyped,
            Some("date") => Self::Date,
            Some("select") => Self::Select,
            Some("multi_select") => Self::MultiSelect,
            Some("person") => Self::Person,
            Some("file") => Self::File,
            Some(other) => Self::Text(other.to_string()),
        }
    }
}

impl PropertyKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Date => "date",
            Self::Select => "select",
            Self::MultiSelect => "multi_select",
            Self::Person => "person",
            Self::File => "file",
            Self::Text(declared) => declared,
            Self::Untyped => "",
        }
    }
}

/// One schema entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PropertySchema {
    #[serde(default, deserialize_with = "lenient")]
    pub name: String,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub kind: PropertyKind,
}

/// A collection schema in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema(IndexMap<String, PropertySchema>);

/// Entries are read one by one; an entry that is not an object is skipped
/// without invalidating the rest of the schema.
impl<'de> Deserialize<'de> for Schema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(key, entry)| match serde_json::from_value(entry) {
                Ok(property) => Some((key, property)),
                Err(e) => {
                    log::debug!("Skipping schema entry {}: {}", key, e);
                    None
                }
            })
            .collect())
    }
}

impl Schema {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PropertySchema)> {
        self.0.iter()
    }

    pub fn get(&self, key: &str) -> Option<&PropertySchema> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, PropertySchema)> for Schema {
    fn from_iter<I: IntoIterator<Item = (String, PropertySchema)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
