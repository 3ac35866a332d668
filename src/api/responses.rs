// src/api/responses.rs
//! Request and response bodies of the v3 endpoints this crate calls.
//!
//! Record maps are kept as raw JSON at this layer: they are merged and
//! cached as-is and only normalized by [`crate::record_map::RecordMap`].

use crate::constants::{
    COLLECTION_QUERY_LIMIT, COLLECTION_QUERY_TIME_ZONE, GROUP_RESULTS_TYPE, PAGE_CHUNK_LIMIT,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadPageChunkRequest {
    pub page_id: String,
    pub limit: u32,
    pub chunk_number: u32,
    pub cursor: ChunkCursor,
    pub vertical_columns: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ChunkCursor {
    pub stack: Vec<Value>,
}

impl LoadPageChunkRequest {
    /// The first chunk of a page.
    pub fn first_chunk(page_id: String) -> Self {
        Self {
            page_id,
            limit: PAGE_CHUNK_LIMIT,
            chunk_number: 0,
            cursor: ChunkCursor::default(),
            vertical_columns: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadPageChunkResponse {
    #[serde(default)]
    pub record_map: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Pointer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<&'static str>,
    pub id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCollectionRequest {
    pub collection: Pointer,
    pub collection_view: Pointer,
    pub loader: Value,
}

impl QueryCollectionRequest {
    /// Asks for the flat `results` reducer through a view.
    ///
    /// The view's `query2` settings (sort, aggregations) are spread into the
    /// loader, and its property filters are ANDed with its query filters, so
    /// rows come back as the view shows them. Without a view record every row
    /// is returned in the collection's default order.
    pub fn for_view(collection_id: &str, view_id: &str, view: Option<&Value>) -> Self {
        let mut loader = Map::new();
        loader.insert("type".into(), json!("reducer"));
        loader.insert(
            "reducers".into(),
            json!({
                "collection_group_results": {
                    "type": GROUP_RESULTS_TYPE,
                    "limit": COLLECTION_QUERY_LIMIT
                }
            }),
        );
        loader.insert("sort".into(), json!([]));
        if let Some(query) = view.and_then(|v| v.get("query2")).and_then(Value::as_object) {
            loader.extend(query.clone());
        }
        loader.insert(
            "filter".into(),
            json!({"filters": view_filters(view), "operator": "and"}),
        );
        loader.insert("searchQuery".into(), json!(""));
        loader.insert("userTimeZone".into(), json!(COLLECTION_QUERY_TIME_ZONE));

        Self {
            collection: Pointer {
                table: None,
                id: collection_id.to_string(),
            },
            collection_view: Pointer {
                table: None,
                id: view_id.to_string(),
            },
            loader: Value::Object(loader),
        }
    }
}

/// The view's property filters followed by the filters of its query.
fn view_filters(view: Option<&Value>) -> Vec<Value> {
    let Some(view) = view else {
        return Vec::new();
    };

    let property_filters = view
        .pointer("/format/property_filters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .map(|entry| {
            json!({
                "property": entry.pointer("/filter/property"),
                "filter": entry.pointer("/filter/filter"),
            })
        });
    let query_filters = view
        .pointer("/query2/filter/filters")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .cloned();

    property_filters.chain(query_filters).collect()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryCollectionResponse {
    #[serde(default)]
    pub result: Option<QueryResult>,
    #[serde(default)]
    pub record_map: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    #[serde(default)]
    pub reducer_results: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SyncRecordValuesRequest {
    pub requests: Vec<RecordRequest>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordRequest {
    pub pointer: Pointer,
    pub version: i64,
}

impl SyncRecordValuesRequest {
    pub fn users(user_ids: &[String]) -> Self {
        Self {
            requests: user_ids
                .iter()
                .map(|id| RecordRequest {
                    pointer: Pointer {
                        table: Some("notion_user"),
                        id: id.clone(),
                    },
                    version: -1,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRecordValuesResponse {
    #[serde(default)]
    pub record_map_with_roles: Option<Value>,
    #[serde(default)]
    pub record_map: Option<Value>,
}

impl SyncRecordValuesResponse {
    /// The `notion_user` section, wherever this API version put it.
    pub fn into_user_section(self) -> Option<Value> {
        [self.record_map_with_roles, self.record_map]
            .into_iter()
            .flatten()
            .find_map(|mut map| map.get_mut("notion_user").map(Value::take))
    }
}

/// Error body of a failed v3 call.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotionErrorBody {
    #[serde(default)]
    pub error_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub message: String,
}
