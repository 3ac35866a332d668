//! The record map: Notion's object graph for one page load, in canonical form.
//!
//! Raw responses are normalized here exactly once. Every entry of the
//! `block`, `collection`, `collection_view` and `notion_user` sections is
//! unwrapped through its [`Envelope`] and deserialized into a typed record.
//! A field holding null or an unexpected shape reads as its default, so a
//! record is only dropped when it is not an object at all. Section order is
//! the order of the JSON document.

mod envelope;
mod schema;

pub use envelope::{is_truthy, Envelope};
pub use schema::{PropertyKind, PropertySchema, Schema};

use crate::error::AppError;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// A block record. Database rows are blocks of type `page`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Block {
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub block_type: String,
    #[serde(default, deserialize_with = "lenient")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub parent_table: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub properties: Option<IndexMap<String, Value>>,
    /// Milliseconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient")]
    pub created_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub last_edited_time: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub collection_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub view_ids: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub format: Option<Value>,
}

impl Block {
    /// The collection a `collection_view(_page)` block hosts, if any.
    pub fn hosted_collection_id(&self) -> Option<&str> {
        self.collection_id.as_deref().or_else(|| {
            self.format
                .as_ref()?
                .get("collection_pointer")?
                .get("id")?
                .as_str()
        })
    }
}

/// A collection (database) record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Collection {
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub schema: Option<Schema>,
}

/// A collection view record. Only its position in the map matters to extraction.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CollectionView {
    #[serde(default, deserialize_with = "lenient")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub view_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
}

/// Grouped reducer output of a collection query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GroupResults {
    #[serde(rename = "type", default, deserialize_with = "lenient")]
    pub result_type: Option<String>,
    #[serde(rename = "blockIds", default, deserialize_with = "lenient")]
    pub block_ids: Option<Vec<String>>,
    #[serde(rename = "hasMore", default, deserialize_with = "lenient")]
    pub has_more: Option<bool>,
}

/// The precomputed result of querying one collection through one view.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CollectionQueryResult {
    #[serde(rename = "blockIds", default, deserialize_with = "lenient")]
    pub block_ids: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient")]
    pub collection_group_results: Option<GroupResults>,
}

/// A workspace member record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NotionUser {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub given_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub family_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub profile_photo: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub email: Option<String>,
}

/// Canonical record map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordMap {
    pub blocks: IndexMap<String, Block>,
    pub collections: IndexMap<String, Collection>,
    pub collection_views: IndexMap<String, CollectionView>,
    /// collection id → view id → query result
    pub collection_queries: IndexMap<String, IndexMap<String, CollectionQueryResult>>,
    pub users: IndexMap<String, NotionUser>,
}

impl RecordMap {
    /// Normalizes a raw `recordMap` object.
    pub fn from_value(raw: Value) -> Result<Self, AppError> {
        let Value::Object(mut sections) = raw else {
            return Err(AppError::MalformedResponse(
                "record map is not a JSON object".to_string(),
            ));
        };

        let blocks = ingest_section(sections.remove("block"), "block");
        let collections = ingest_section(sections.remove("collection"), "collection");
        let collection_views = ingest_views(sections.remove("collection_view"));
        let collection_queries = ingest_queries(sections.remove("collection_query"));
        let users = ingest_section(sections.remove("notion_user"), "notion_user");

        log::debug!(
            "Record map: {} blocks, {} collections, {} views, {} queried collections, {} users",
            blocks.len(),
            collections.len(),
            collection_views.len(),
            collection_queries.len(),
            users.len()
        );

        Ok(Self {
            blocks,
            collections,
            collection_views,
            collection_queries,
            users,
        })
    }

    /// Parses a raw `recordMap` JSON document.
    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Self::from_value(serde_json::from_str(json)?)
    }

    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.get(id)
    }

    /// The first key of the `collection_view` section.
    pub fn first_view_id(&self) -> Option<&str> {
        self.collection_views.keys().next().map(String::as_str)
    }

    pub fn query_result(&self, collection_id: &str, view_id: &str) -> Option<&CollectionQueryResult> {
        self.collection_queries.get(collection_id)?.get(view_id)
    }
}

/// Unwraps and deserializes every entry of a record section.
pub(crate) fn ingest_section<T: DeserializeOwned>(
    section: Option<Value>,
    kind: &str,
) -> IndexMap<String, T> {
    entries(section)
        .filter_map(|(id, raw)| {
            let envelope = Envelope::classify(raw);
            log::trace!("{} {} unwrapped at depth {}", kind, id, envelope.depth());
            match serde_json::from_value::<T>(envelope.into_record()) {
                Ok(parsed) => Some((id, parsed)),
                Err(e) => {
                    log::warn!("Dropping {} record {}: {}", kind, id, e);
                    None
                }
            }
        })
        .collect()
}

/// Views keep their slot even when the record is unreadable: the first
/// key of the section selects which query result is authoritative.
fn ingest_views(section: Option<Value>) -> IndexMap<String, CollectionView> {
    entries(section)
        .map(|(id, raw)| {
            let record = Envelope::classify(raw).into_record();
            let view = serde_json::from_value::<CollectionView>(record).unwrap_or_else(|e| {
                log::debug!("Unreadable collection_view record {}: {}", id, e);
                CollectionView {
                    id: id.clone(),
                    ..CollectionView::default()
                }
            });
            (id, view)
        })
        .collect()
}

/// Query results are keyed twice and carry no envelope.
fn ingest_queries(
    section: Option<Value>,
) -> IndexMap<String, IndexMap<String, CollectionQueryResult>> {
    entries(section)
        .map(|(collection_id, views)| {
            let results = entries(Some(views))
                .filter_map(|(view_id, raw)| {
                    match serde_json::from_value::<CollectionQueryResult>(raw) {
                        Ok(result) => Some((view_id, result)),
                        Err(e) => {
                            log::debug!(
                                "Dropping query result {}/{}: {}",
                                collection_id,
                                view_id,
                                e
                            );
                            None
                        }
                    }
                })
                .collect();
            (collection_id, results)
        })
        .collect()
}

/// Reads a record field, falling back to its default when the value is null
/// or of an unexpected shape.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(raw).unwrap_or_default())
}

fn entries(section: Option<Value>) -> impl Iterator<Item = (String, Value)> {
    let map = match section {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };
    map.into_iter()
}
