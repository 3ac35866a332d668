//! Resolves one page's raw properties into typed values.

use super::decode::{date_value, first_file_url, person_references, select_list, text_content};
use super::image_url::ImageUrlMapper;
use crate::api::NotionRepository;
use crate::error::DecodeError;
use crate::model::{PageProperties, Person, PropertyValue};
use crate::record_map::{is_truthy, Block, NotionUser, PropertyKind, PropertySchema, Schema};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Value;

/// Decodes page properties against a collection schema.
///
/// Person properties need a lookup per referenced user; those go through
/// the repository one at a time.
pub struct PropertyResolver<'a> {
    users: &'a dyn NotionRepository,
    images: &'a dyn ImageUrlMapper,
}

impl<'a> PropertyResolver<'a> {
    pub fn new(users: &'a dyn NotionRepository, images: &'a dyn ImageUrlMapper) -> Self {
        Self { users, images }
    }

    /// Resolves the properties of `page_id`, keyed by display name.
    ///
    /// A missing block, a block without properties, or a missing schema
    /// yields empty properties. A property that fails to decode is left out.
    pub async fn resolve(
        &self,
        page_id: &str,
        blocks: &IndexMap<String, Block>,
        schema: Option<&Schema>,
    ) -> PageProperties {
        let Some(block) = blocks.get(page_id) else {
            log::debug!("Page {} is not in the record map", page_id);
            return PageProperties::default();
        };
        let (Some(raw_properties), Some(schema)) = (block.properties.as_ref(), schema) else {
            return PageProperties::default();
        };

        let mut values = IndexMap::with_capacity(schema.len() + 1);
        values.insert("id".to_string(), PropertyValue::Text(page_id.to_string()));

        for (key, property) in schema.iter() {
            let Some(raw) = raw_properties.get(key).filter(|v| is_truthy(v)) else {
                continue;
            };

            match self.decode(property, raw, block).await {
                Ok(Some(value)) => {
                    values.insert(property.name.clone(), value);
                }
                Ok(None) => {}
                Err(e) => {
                    log::debug!(
                        "Skipping property '{}' of page {}: {}",
                        property.name,
                        page_id,
                        e
                    );
                }
            }
        }

        PageProperties {
            values,
            created_time: block.created_time.and_then(millis_to_utc),
        }
    }

    async fn decode(
        &self,
        property: &PropertySchema,
        raw: &Value,
        block: &Block,
    ) -> Result<Option<PropertyValue>, DecodeError> {
        let value = match &property.kind {
            PropertyKind::Untyped => return Ok(None),
            PropertyKind::Text(_) => PropertyValue::Text(text_content(raw)),
            PropertyKind::File => PropertyValue::File(self.attachment_url(raw, block)),
            PropertyKind::Date => PropertyValue::Date(date_value(raw)?),
            PropertyKind::Select | PropertyKind::MultiSelect => {
                PropertyValue::List(select_list(raw))
            }
            PropertyKind::Person => PropertyValue::People(self.resolve_people(raw).await),
        };
        Ok(Some(value))
    }

    /// Attachment failures leave the field empty rather than dropping it.
    fn attachment_url(&self, raw: &Value, block: &Block) -> Option<String> {
        first_file_url(raw)
            .and_then(|url| self.images.map_image_url(url, block))
            .map_err(|e| log::debug!("Attachment of block {} unusable: {}", block.id, e))
            .ok()
    }

    /// Looks up every referenced user; a failed lookup drops only that user.
    async fn resolve_people(&self, raw: &Value) -> Vec<Person> {
        let mut people = Vec::new();

        for user_id in person_references(raw) {
            match self.users.get_users(std::slice::from_ref(&user_id)).await {
                Ok(users) => match users.get(&user_id) {
                    Some(user) => people.push(person_from_user(user)),
                    None => log::warn!("User {} not returned by Notion", user_id),
                },
                Err(e) => log::warn!("User lookup failed for {}: {}", user_id, e),
            }
        }

        people
    }
}

/// Display name falls back to family + given name.
pub fn person_from_user(user: &NotionUser) -> Person {
    let non_empty = |s: &Option<String>| s.as_deref().filter(|s| !s.is_empty()).map(str::to_string);

    let name = non_empty(&user.name).or_else(|| {
        let family = non_empty(&user.family_name);
        let given = non_empty(&user.given_name);
        match (family, given) {
            (None, None) => None,
            (family, given) => Some(format!(
                "{}{}",
                family.unwrap_or_default(),
                given.unwrap_or_default()
            )),
        }
    });

    Person {
        id: user.id.clone(),
        name,
        profile_photo: non_empty(&user.profile_photo),
    }
}

fn millis_to_utc(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis as i64)
}
