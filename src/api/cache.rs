// src/api/cache.rs
//! Disk-based response cache for Notion calls.
//!
//! Caches raw JSON (merged record maps, user sections) keyed by page or
//! user ids within the client's endpoint and session scope, with TTL-based
//! expiry. Cache hits go through the same
//! normalization as live responses; the canonical model is never serialized.

use super::client::NotionHttpClient;
use crate::error::AppError;
use crate::record_map::{ingest_section, NotionUser, RecordMap};
use crate::types::NotionId;
use indexmap::IndexMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

// ---------------------------------------------------------------------------
// Disk cache
// ---------------------------------------------------------------------------

/// TTL-based file cache for raw response strings.
///
/// Cache operations are best-effort: read/write failures are ignored so a
/// broken cache never prevents fresh API calls.
pub struct DiskCache {
    cache_dir: PathBuf,
    ttl_secs: u64,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct CacheEntry {
    data: String,
    cached_at: u64,
}

impl DiskCache {
    /// Creates a cache in `$XDG_CACHE_HOME/notion2posts` (or `~/.cache/notion2posts`).
    pub async fn new(ttl_secs: u64) -> Result<Self, std::io::Error> {
        Self::in_dir(Self::default_cache_dir(), ttl_secs).await
    }

    /// Creates a cache in `cache_dir`. Expired entries are purged on creation.
    pub async fn in_dir(cache_dir: impl Into<PathBuf>, ttl_secs: u64) -> Result<Self, std::io::Error> {
        let cache_dir = cache_dir.into();
        tokio::fs::create_dir_all(&cache_dir).await?;
        let cache = Self {
            cache_dir,
            ttl_secs,
        };
        cache.purge_expired().await;
        Ok(cache)
    }

    fn default_cache_dir() -> PathBuf {
        std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
                PathBuf::from(home).join(".cache")
            })
            .join("notion2posts")
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns cached data if the entry exists and has not expired.
    pub async fn get(&self, key: &str) -> Option<String> {
        let path = self.key_to_path(key);
        let content = tokio::fs::read_to_string(&path).await.ok()?;
        let entry: CacheEntry = serde_json::from_str(&content).ok()?;
        if self.is_expired(entry.cached_at) {
            let _ = tokio::fs::remove_file(&path).await;
            return None;
        }
        Some(entry.data)
    }

    /// Stores data in the cache.
    pub async fn set(&self, key: &str, data: &str) {
        let entry = CacheEntry {
            data: data.to_string(),
            cached_at: now_secs(),
        };
        if let Ok(json) = serde_json::to_string(&entry) {
            if let Err(e) = tokio::fs::write(self.key_to_path(key), json).await {
                log::debug!("Cache write failed for {}: {}", key, e);
            }
        }
    }

    /// Removes all expired cache entries from disk.
    async fn purge_expired(&self) {
        let mut dir = match tokio::fs::read_dir(&self.cache_dir).await {
            Ok(d) => d,
            Err(_) => return,
        };

        let mut purged = 0usize;
        while let Ok(Some(entry)) = dir.next_entry().await {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Ok(content) = tokio::fs::read_to_string(&path).await else {
                continue;
            };
            if let Ok(cached) = serde_json::from_str::<CacheEntry>(&content) {
                if self.is_expired(cached.cached_at) && tokio::fs::remove_file(&path).await.is_ok() {
                    purged += 1;
                }
            }
        }
        if purged > 0 {
            log::debug!("Purged {} expired cache entries", purged);
        }
    }

    fn is_expired(&self, cached_at: u64) -> bool {
        now_secs().saturating_sub(cached_at) > self.ttl_secs
    }

    fn key_to_path(&self, key: &str) -> PathBuf {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        self.cache_dir.join(format!("{:016x}.json", hasher.finish()))
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

// ---------------------------------------------------------------------------
// Cached Notion client
// ---------------------------------------------------------------------------

/// A [`NotionRepository`](super::NotionRepository) that caches raw record
/// maps and user sections to disk.
pub struct CachedNotionClient {
    inner: NotionHttpClient,
    cache: DiskCache,
}

impl CachedNotionClient {
    /// Wraps an HTTP client with a disk cache in the default location.
    pub async fn new(inner: NotionHttpClient, ttl_secs: u64) -> Result<Self, AppError> {
        let cache = DiskCache::new(ttl_secs)
            .await
            .map_err(|e| AppError::InternalError {
                message: format!("Failed to initialize disk cache: {}", e),
                source: Some(Box::new(e)),
            })?;
        Ok(Self::with_cache(inner, cache))
    }

    pub fn with_cache(inner: NotionHttpClient, cache: DiskCache) -> Self {
        Self { inner, cache }
    }

    fn page_key(&self, page_id: &NotionId) -> String {
        format!("{}/record_map_{}", self.inner.cache_scope(), page_id.as_str())
    }

    fn users_key(&self, user_ids: &[String]) -> String {
        format!("{}/users_{}", self.inner.cache_scope(), user_ids.join(","))
    }
}

#[async_trait::async_trait]
impl super::NotionRepository for CachedNotionClient {
    async fn get_page(&self, page_id: &NotionId) -> Result<RecordMap, AppError> {
        let cache_key = self.page_key(page_id);
        if let Some(cached) = self.cache.get(&cache_key).await {
            log::debug!("Cache hit: {}", cache_key);
            return RecordMap::from_json(&cached);
        }

        log::debug!("Cache miss: {}", cache_key);
        let raw = self.inner.load_record_map_value(page_id).await?;
        self.cache.set(&cache_key, &serde_json::to_string(&raw)?).await;
        RecordMap::from_value(raw)
    }

    async fn get_users(
        &self,
        user_ids: &[String],
    ) -> Result<IndexMap<String, NotionUser>, AppError> {
        let cache_key = self.users_key(user_ids);
        let section = match self.cache.get(&cache_key).await {
            Some(cached) => {
                log::debug!("Cache hit: {}", cache_key);
                serde_json::from_str(&cached)?
            }
            None => {
                log::debug!("Cache miss: {}", cache_key);
                let section = self.inner.load_user_section(user_ids).await?;
                self.cache.set(&cache_key, &serde_json::to_string(&section)?).await;
                section
            }
        };
        Ok(ingest_section(Some(section), "notion_user"))
    }
}
