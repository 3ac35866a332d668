// src/api/fetcher.rs
//! Turns a blog root page into its post list.

use crate::error::AppError;
use crate::extract::{
    enumerate_page_ids, locate_collection, normalize_property_names, ImageUrlMapper,
    NotionImageProxy, PropertyResolver,
};
use crate::model::{sort_posts_desc, Post, PostCollection, SkippedPage};
use crate::record_map::RecordMap;
use crate::types::NotionId;
use std::sync::Arc;

/// Fetches a root page and extracts every post of its blog database.
///
/// Pages are resolved one after another: person lookups are awaited before
/// the next page starts, so at most one request is in flight.
pub struct PostFetcher {
    client: Arc<dyn super::NotionRepository>,
    images: Arc<dyn ImageUrlMapper>,
}

impl PostFetcher {
    /// Creates a fetcher that routes attachments through Notion's image proxy.
    pub fn new(client: Arc<dyn super::NotionRepository>) -> Self {
        Self::with_image_mapper(client, Arc::new(NotionImageProxy))
    }

    pub fn with_image_mapper(
        client: Arc<dyn super::NotionRepository>,
        images: Arc<dyn ImageUrlMapper>,
    ) -> Self {
        Self { client, images }
    }

    /// Loads the root page and extracts its posts, newest first.
    pub async fn fetch_posts(&self, root: &NotionId) -> Result<PostCollection, AppError> {
        log::info!("Loading record map for {}", root.to_hyphenated());
        let record_map = self.client.get_page(root).await?;
        self.collect_posts(&record_map, &root.to_hyphenated()).await
    }

    /// Extracts the posts of an already loaded record map.
    ///
    /// Fails only when the record map holds no collection schema; every
    /// page-level problem is reported in [`PostCollection::skipped`].
    pub async fn collect_posts(
        &self,
        record_map: &RecordMap,
        root_page_id: &str,
    ) -> Result<PostCollection, AppError> {
        let located = locate_collection(record_map, root_page_id)?;
        let page_ids = enumerate_page_ids(record_map, located.collection_id);
        log::debug!(
            "Collection {} lists {} pages",
            located.collection_id,
            page_ids.len()
        );

        let resolver = PropertyResolver::new(self.client.as_ref(), self.images.as_ref());
        let mut collection = PostCollection::default();

        for page_id in page_ids {
            let mut page = resolver
                .resolve(&page_id, &record_map.blocks, Some(located.schema))
                .await;
            normalize_property_names(&mut page.values);

            match Post::assemble(page) {
                Ok(post) => collection.posts.push(post),
                Err(reason) => {
                    log::debug!("Skipping page {}: {}", page_id, reason);
                    collection.skipped.push(SkippedPage { page_id, reason });
                }
            }
        }

        sort_posts_desc(&mut collection.posts);

        log::info!(
            "Extracted {} posts ({} pages skipped)",
            collection.posts.len(),
            collection.skipped_count()
        );
        Ok(collection)
    }
}
