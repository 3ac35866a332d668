//! Canonical property names.
//!
//! Blog databases name their columns in English or Korean and in any case.
//! After resolution, the first key matching a canonical name (or one of its
//! aliases) is copied onto the canonical key. The original key stays.

use crate::constants::CANONICAL_PROPERTY_ALIASES;
use crate::model::PropertyValue;
use indexmap::IndexMap;

/// Whether `key` names the canonical property `canonical`.
fn matches_canonical(key: &str, canonical: &str, aliases: &[&str]) -> bool {
    key.to_lowercase() == canonical || aliases.contains(&key)
}

/// Copies aliased values onto the canonical keys, first match wins.
pub fn normalize_property_names(properties: &mut IndexMap<String, PropertyValue>) {
    for (canonical, aliases) in CANONICAL_PROPERTY_ALIASES {
        let matched = properties
            .iter()
            .find(|(key, _)| matches_canonical(key, canonical, aliases))
            .map(|(key, value)| (key.clone(), value.clone()));

        if let Some((key, value)) = matched {
            if key != *canonical {
                log::trace!("Property '{}' normalized to '{}'", key, canonical);
            }
            properties.insert((*canonical).to_string(), value);
        }
    }
}
