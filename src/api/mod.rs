// src/api/mod.rs
//! Notion interaction: the ability to load a page's record map and look up users.
//!
//! Transport (HTTP, caching) lives behind [`NotionRepository`]; extraction
//! only ever sees canonical [`RecordMap`]s and [`NotionUser`]s.

pub mod cache;
pub mod client;
mod fetcher;
pub mod parser;
pub mod responses;

use crate::error::AppError;
use crate::record_map::{NotionUser, RecordMap};
use crate::types::NotionId;
use indexmap::IndexMap;

/// The ability to read from a Notion workspace.
///
/// Business logic depends on this trait, never on HTTP details.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    /// Loads the record map of a page, with every collection it hosts
    /// queried and merged in.
    async fn get_page(&self, page_id: &NotionId) -> Result<RecordMap, AppError>;

    /// Looks up user records, keyed by user id. Unknown ids are absent.
    async fn get_users(&self, user_ids: &[String])
        -> Result<IndexMap<String, NotionUser>, AppError>;
}

pub use cache::{CachedNotionClient, DiskCache};
pub use client::NotionHttpClient;
pub use fetcher::PostFetcher;
