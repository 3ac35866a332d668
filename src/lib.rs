// src/lib.rs
//! notion2posts library: extracts a blog's post list from a Notion workspace.
//!
//! # Public API
//!
//! - **Error handling**: `AppError`, `ValidationError`, `DecodeError`, `SkipReason`
//! - **Configuration**: `CommandLineInput`, `PipelineConfig`
//! - **Record map**: `RecordMap` and its typed records
//! - **Extraction**: `locate_collection`, `enumerate_page_ids`, `PropertyResolver`
//! - **Notion client**: `NotionRepository`, `NotionHttpClient`, `CachedNotionClient`, `PostFetcher`
//! - **Post list consumers**: `filter_posts`, taxonomy counts, `FeedDocument`

mod analytics;
mod api;
mod config;
mod constants;
mod error;
mod extract;
mod feed;
mod filter;
mod model;
mod output;
mod pipeline;
mod record_map;
mod types;

// --- Error Handling ---
pub use crate::error::{AppError, DecodeError, NotionErrorCode, SkipReason};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, PipelineConfig};

// --- Domain Types ---
pub use crate::types::{AuthToken, NotionId, RenderedFeed};

// --- Record Map ---
pub use crate::record_map::{
    Block, Collection, CollectionQueryResult, CollectionView, Envelope, GroupResults, NotionUser,
    PropertyKind, PropertySchema, RecordMap, Schema,
};

// --- Domain Model ---
pub use crate::model::{
    parse_post_date, sort_posts_desc, DateValue, PageProperties, Person, Post, PostCollection,
    PropertyValue, SkippedPage,
};

// --- Extraction ---
pub use crate::extract::decode;
pub use crate::extract::{
    enumerate_page_ids, locate_collection, normalize_property_names, person_from_user,
    ImageUrlMapper, LocatedCollection, NotionImageProxy, PropertyResolver,
};

// --- API Client ---
pub use crate::api::{
    client::ApiResponse, CachedNotionClient, DiskCache, NotionHttpClient, NotionRepository,
    PostFetcher,
};

// --- Post List Consumers ---
pub use crate::analytics::{category_counts, count_select_items, tag_counts};
pub use crate::feed::{FeedDocument, SkippedEntry};
pub use crate::filter::{filter_posts, FilterOptions};

// --- Output ---
pub use crate::output::{deliver, DeliveryTarget, OutputPlan, OutputReport};

// --- Pipeline Traits ---
pub use crate::pipeline::{FeedComposer, FeedDelivery, PostSource};
