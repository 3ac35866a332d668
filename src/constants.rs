// src/constants.rs
//! Domain constants that define the operational boundaries of the system.
//!
//! Each constant is named for the domain concept it constrains, not its
//! technical role.

// ---------------------------------------------------------------------------
// Notion v3 API
// ---------------------------------------------------------------------------

/// Base URL of Notion's private web API.
pub const NOTION_API_BASE_URL: &str = "https://www.notion.so/api/v3";

/// How many blocks `loadPageChunk` returns for the root page.
pub const PAGE_CHUNK_LIMIT: u32 = 100;

/// Upper bound on rows requested per collection view query.
pub const COLLECTION_QUERY_LIMIT: u32 = 9999;

/// Time zone sent with collection queries; dates come back as plain strings.
pub const COLLECTION_QUERY_TIME_ZONE: &str = "UTC";

/// Maximum characters shown when previewing error response bodies.
pub const ERROR_BODY_PREVIEW_LENGTH: usize = 200;

// ---------------------------------------------------------------------------
// Record map vocabulary
// ---------------------------------------------------------------------------

/// Block type of a database row.
pub const PAGE_BLOCK_TYPE: &str = "page";

/// Block types that host a collection and its views.
pub const COLLECTION_HOST_BLOCK_TYPES: &[&str] = &["collection_view", "collection_view_page"];

/// Reducer result type whose `blockIds` are authoritative.
pub const GROUP_RESULTS_TYPE: &str = "results";

/// Inline token that introduces a mention (date, user, page) in rich text.
pub const MENTION_TOKEN: &str = "‣";

/// Inline token for equations in rich text.
pub const EQUATION_TOKEN: &str = "⁍";

// ---------------------------------------------------------------------------
// Post model
// ---------------------------------------------------------------------------

/// Canonical property names and the aliases that map onto them, besides
/// a case-insensitive match of the canonical name itself.
pub const CANONICAL_PROPERTY_ALIASES: &[(&str, &[&str])] = &[
    ("title", &["제목", "이름"]),
    ("date", &["날짜"]),
    ("slug", &["슬러그"]),
    ("status", &["상태"]),
    ("type", &["종류"]),
];

/// Statuses a post must carry to be published by default.
pub const DEFAULT_ACCEPT_STATUS: &[&str] = &["Public"];

/// Types a post must carry to be published by default.
pub const DEFAULT_ACCEPT_TYPE: &[&str] = &["Post"];

/// How far into the future a post may be dated and still be published.
pub const PUBLISH_LOOKAHEAD_HOURS: i64 = 24;

/// Category entry that counts every post.
pub const DEFAULT_CATEGORY: &str = "📂 All";

// ---------------------------------------------------------------------------
// Image proxy
// ---------------------------------------------------------------------------

/// Origin of Notion's image proxy.
pub const NOTION_ORIGIN: &str = "https://www.notion.so";

/// Cache-busting version sent to the image proxy.
pub const IMAGE_PROXY_CACHE_VERSION: &str = "v2";

// ---------------------------------------------------------------------------
// Caching
// ---------------------------------------------------------------------------

/// How long a fetched record map stays fresh on disk.
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
