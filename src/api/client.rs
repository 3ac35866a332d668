// src/api/client.rs
//! HTTP client for Notion's v3 web API.
//!
//! A page load is one `loadPageChunk` call followed by one `queryCollection`
//! call per (collection, view) pair hosted on the page. Query results are
//! merged into the raw record map under `collection_query`, the same shape
//! the web client keeps, so a cached record map needs no further calls.

use super::parser::parse_api_response;
use super::responses::{
    LoadPageChunkRequest, QueryCollectionRequest, QueryCollectionResponse,
    SyncRecordValuesRequest, SyncRecordValuesResponse, LoadPageChunkResponse,
};
use crate::constants::{COLLECTION_HOST_BLOCK_TYPES, NOTION_API_BASE_URL};
use crate::error::AppError;
use crate::record_map::{ingest_section, Block, Envelope, NotionUser, RecordMap};
use crate::types::{AuthToken, NotionId};
use indexmap::IndexMap;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Sections a `queryCollection` response contributes to the page's record map.
const MERGED_SECTIONS: [&str; 4] = ["block", "collection", "collection_view", "notion_user"];

/// A thin wrapper around reqwest Client for v3 requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
    cache_scope: String,
}

impl NotionHttpClient {
    /// Creates a client against the public endpoint.
    ///
    /// Without a token only publicly shared pages are readable.
    pub fn new(token: Option<&AuthToken>, active_user: Option<&str>) -> Result<Self, AppError> {
        Self::with_base_url(NOTION_API_BASE_URL, token, active_user)
    }

    pub fn with_base_url(
        base_url: &str,
        token: Option<&AuthToken>,
        active_user: Option<&str>,
    ) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers(token, active_user)?)
            .build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let cache_scope = session_scope(&base_url, token, active_user);
        Ok(Self {
            client,
            base_url,
            cache_scope,
        })
    }

    /// Identifies the endpoint and session this client reads as.
    ///
    /// Responses fetched through different scopes must never be shared.
    pub fn cache_scope(&self) -> &str {
        &self.cache_scope
    }

    fn create_headers(
        token: Option<&AuthToken>,
        active_user: Option<&str>,
    ) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        if let Some(token) = token {
            let cookie = format!("token_v2={}", token.as_str());
            headers.insert(
                header::COOKIE,
                header::HeaderValue::from_str(&cookie).map_err(|e| {
                    AppError::MissingConfiguration(format!("Invalid token_v2 format: {}", e))
                })?,
            );
        }

        if let Some(user) = active_user {
            headers.insert(
                "x-notion-active-user-header",
                header::HeaderValue::from_str(user).map_err(|e| {
                    AppError::MissingConfiguration(format!("Invalid active user id: {}", e))
                })?,
            );
        }

        Ok(headers)
    }

    /// Makes a POST request with JSON body to the specified endpoint.
    pub async fn post<T: Serialize>(&self, endpoint: &str, body: &T) -> Result<Response, AppError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        log::debug!("POST {}", url);
        Ok(self.client.post(url).json(body).send().await?)
    }

    /// POSTs and parses the response, or the Notion error it carries.
    async fn call<B, T>(&self, endpoint: &str, body: &B) -> Result<T, AppError>
    where
        B: Serialize,
        T: DeserializeOwned,
    {
        let response = self.post(endpoint, body).await?;
        let result = extract_response_text(response).await?;
        let parsed = parse_api_response(result);

        if let Err(AppError::NotionService { code, .. }) = &parsed {
            if code.is_retryable() {
                log::warn!("{} failed with transient error {}; try again later", endpoint, code);
            }
        }
        parsed
    }

    /// Loads a page's raw record map with every hosted collection queried.
    ///
    /// A failed collection query is logged and leaves that collection
    /// without precomputed results; the page load itself still succeeds.
    pub async fn load_record_map_value(&self, page_id: &NotionId) -> Result<Value, AppError> {
        let request = LoadPageChunkRequest::first_chunk(page_id.to_hyphenated());
        let chunk: LoadPageChunkResponse = self.call("loadPageChunk", &request).await?;

        let Value::Object(mut sections) = chunk.record_map else {
            return Err(AppError::MalformedResponse(format!(
                "loadPageChunk for {} returned no record map",
                page_id
            )));
        };

        for (collection_id, view_id) in collection_instances(&sections) {
            let view = view_record(&sections, &view_id);
            let request = QueryCollectionRequest::for_view(&collection_id, &view_id, view.as_ref());
            match self
                .call::<_, QueryCollectionResponse>("queryCollection", &request)
                .await
            {
                Ok(response) => {
                    merge_query_response(&mut sections, &collection_id, &view_id, response)
                }
                Err(e) => log::warn!(
                    "Collection query failed for {} (view {}) on page {}: {}",
                    collection_id,
                    view_id,
                    page_id,
                    e
                ),
            }
        }

        Ok(Value::Object(sections))
    }

    /// Fetches the raw `notion_user` section for the given ids.
    pub async fn load_user_section(&self, user_ids: &[String]) -> Result<Value, AppError> {
        let request = SyncRecordValuesRequest::users(user_ids);
        let response: SyncRecordValuesResponse = self.call("syncRecordValues", &request).await?;
        Ok(response
            .into_user_section()
            .unwrap_or_else(|| Value::Object(Map::new())))
    }
}

#[async_trait::async_trait]
impl super::NotionRepository for NotionHttpClient {
    async fn get_page(&self, page_id: &NotionId) -> Result<RecordMap, AppError> {
        RecordMap::from_value(self.load_record_map_value(page_id).await?)
    }

    async fn get_users(
        &self,
        user_ids: &[String],
    ) -> Result<IndexMap<String, NotionUser>, AppError> {
        let section = self.load_user_section(user_ids).await?;
        Ok(ingest_section(Some(section), "notion_user"))
    }
}

/// Base url plus a hash of the session identity; the token itself is never
/// part of the scope.
fn session_scope(base_url: &str, token: Option<&AuthToken>, active_user: Option<&str>) -> String {
    let mut hasher = DefaultHasher::new();
    token.map(AuthToken::as_str).hash(&mut hasher);
    active_user.hash(&mut hasher);
    format!("{}#{:016x}", base_url, hasher.finish())
}

/// Every (collection id, view id) pair hosted by a collection view block,
/// in record map order, without duplicates.
pub(crate) fn collection_instances(sections: &Map<String, Value>) -> Vec<(String, String)> {
    let Some(Value::Object(blocks)) = sections.get("block") else {
        return Vec::new();
    };

    let mut instances = Vec::new();
    for (id, raw) in blocks {
        let record = Envelope::classify(raw.clone()).into_record();
        let Ok(block) = serde_json::from_value::<Block>(record) else {
            continue;
        };
        if !COLLECTION_HOST_BLOCK_TYPES.contains(&block.block_type.as_str()) {
            continue;
        }
        let Some(collection_id) = block.hosted_collection_id() else {
            log::debug!("Collection view block {} points at no collection", id);
            continue;
        };

        for view_id in &block.view_ids {
            let pair = (collection_id.to_string(), view_id.clone());
            if !instances.contains(&pair) {
                instances.push(pair);
            }
        }
    }
    instances
}

/// The unwrapped record of a view, when the page chunk carried it.
pub(crate) fn view_record(sections: &Map<String, Value>, view_id: &str) -> Option<Value> {
    let raw = sections.get("collection_view")?.get(view_id)?;
    Some(Envelope::classify(raw.clone()).into_record())
}

/// Folds a `queryCollection` response into the page's raw record map.
pub(crate) fn merge_query_response(
    sections: &mut Map<String, Value>,
    collection_id: &str,
    view_id: &str,
    response: QueryCollectionResponse,
) {
    if let Some(Value::Object(mut incoming)) = response.record_map {
        for section in MERGED_SECTIONS {
            let Some(Value::Object(entries)) = incoming.remove(section) else {
                continue;
            };
            if let Some(target) = object_entry(sections, section) {
                target.extend(entries);
            }
        }
    }

    let reducer_results = response
        .result
        .and_then(|r| r.reducer_results)
        .filter(|v| !v.is_null());

    if let Some(results) = reducer_results {
        if let Some(views) =
            object_entry(sections, "collection_query").and_then(|q| object_entry(q, collection_id))
        {
            views.insert(view_id.to_string(), results);
        }
    }
}

fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
    map.entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, AppError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sections(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn finds_hosted_collections_through_envelopes() {
        let map = sections(json!({
            "block": {
                "root": {"value": {"value": {
                    "id": "root", "type": "collection_view_page",
                    "collection_id": "c1", "view_ids": ["v1", "v2"]
                }}},
                "inline": {"value": {
                    "id": "inline", "type": "collection_view",
                    "format": {"collection_pointer": {"id": "c2"}},
                    "view_ids": ["v3"]
                }},
                "row": {"value": {"id": "row", "type": "page"}}
            }
        }));

        assert_eq!(
            collection_instances(&map),
            vec![
                ("c1".to_string(), "v1".to_string()),
                ("c1".to_string(), "v2".to_string()),
                ("c2".to_string(), "v3".to_string()),
            ]
        );
    }

    #[test]
    fn view_records_are_read_through_envelopes() {
        let map = sections(json!({
            "collection_view": {
                "v1": {"spaceId": "s", "value": {"value": {"id": "v1", "query2": {"sort": []}}}}
            }
        }));
        let view = view_record(&map, "v1").unwrap();
        assert_eq!(view["id"], json!("v1"));
        assert!(view.get("query2").is_some());
        assert_eq!(view_record(&map, "v2"), None);
    }

    #[test]
    fn merges_query_results_and_records() {
        let mut map = sections(json!({
            "block": {"root": {"value": {"id": "root"}}}
        }));
        let response: QueryCollectionResponse = serde_json::from_value(json!({
            "result": {"reducerResults": {
                "collection_group_results": {"type": "results", "blockIds": ["p1"]}
            }},
            "recordMap": {
                "block": {"p1": {"value": {"id": "p1", "type": "page"}}},
                "notion_user": {"u1": {"value": {"id": "u1"}}}
            }
        }))
        .unwrap();

        merge_query_response(&mut map, "c1", "v1", response);

        let record_map = RecordMap::from_value(Value::Object(map)).unwrap();
        assert_eq!(record_map.blocks.len(), 2);
        assert_eq!(record_map.users.len(), 1);
        let group = record_map
            .query_result("c1", "v1")
            .and_then(|q| q.collection_group_results.as_ref())
            .and_then(|g| g.block_ids.clone());
        assert_eq!(group, Some(vec!["p1".to_string()]));
    }

    #[test]
    fn missing_reducer_results_leave_no_query_entry() {
        let mut map = Map::new();
        let response: QueryCollectionResponse =
            serde_json::from_value(json!({"result": {}})).unwrap();
        merge_query_response(&mut map, "c1", "v1", response);
        assert!(map.get("collection_query").is_none());
    }
}
