// src/pipeline.rs
//! Pipeline capability traits for the three stages of a feed build:
//! fetch posts, compose the feed, deliver it.

use crate::error::AppError;
use crate::model::PostCollection;
use crate::output::OutputReport;
use crate::types::{NotionId, RenderedFeed};

/// Extracts the posts of a blog root page.
#[async_trait::async_trait]
pub trait PostSource {
    async fn fetch(&self, root: &NotionId) -> Result<PostCollection, AppError>;
}

/// Turns extracted posts into a rendered feed.
pub trait FeedComposer {
    fn compose(&self, posts: &PostCollection) -> Result<RenderedFeed, AppError>;
}

/// Delivers a rendered feed to its destinations.
pub trait FeedDelivery {
    fn deliver(&self, feed: RenderedFeed) -> Result<OutputReport, AppError>;
}
