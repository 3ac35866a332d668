// src/feed.rs
//! The JSON feed document the CLI emits.

use crate::analytics::{category_counts, tag_counts};
use crate::error::AppError;
use crate::filter::{filter_posts, FilterOptions};
use crate::model::{Post, PostCollection};
use crate::types::RenderedFeed;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;

/// Published posts with their taxonomy counts and the pages left out.
#[derive(Debug, Clone, Serialize)]
pub struct FeedDocument {
    pub posts: Vec<Post>,
    pub tags: IndexMap<String, usize>,
    pub categories: IndexMap<String, usize>,
    pub skipped: Vec<SkippedEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedEntry {
    pub page_id: String,
    pub reason: String,
}

impl FeedDocument {
    /// Applies the publish filter (unless `filter` is `None`) and counts
    /// tags and categories over what remains.
    pub fn build(
        collection: &PostCollection,
        filter: Option<&FilterOptions>,
        now: DateTime<Utc>,
    ) -> Self {
        let posts = match filter {
            Some(options) => filter_posts(&collection.posts, options, now),
            None => collection.posts.clone(),
        };

        Self {
            tags: tag_counts(&posts),
            categories: category_counts(&posts),
            skipped: collection
                .skipped
                .iter()
                .map(|s| SkippedEntry {
                    page_id: s.page_id.clone(),
                    reason: s.reason.to_string(),
                })
                .collect(),
            posts,
        }
    }

    pub fn render(&self, pretty: bool) -> Result<RenderedFeed, AppError> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(RenderedFeed::new(json))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SkipReason;
    use crate::model::{DateValue, PageProperties, PropertyValue, SkippedPage};
    use chrono::TimeZone;
    use serde_json::json;

    fn post(slug: &str, status: &str) -> Post {
        let values = [
            ("id", PropertyValue::Text(slug.into())),
            ("title", PropertyValue::Text(slug.to_uppercase())),
            ("slug", PropertyValue::Text(slug.into())),
            ("date", PropertyValue::Date(DateValue::starting("2024-01-01"))),
            ("status", PropertyValue::List(vec![status.into()])),
            ("type", PropertyValue::List(vec!["Post".into()])),
            ("tags", PropertyValue::List(vec!["rust".into()])),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Post::assemble(PageProperties {
            values,
            created_time: None,
        })
        .unwrap()
    }

    fn collection() -> PostCollection {
        PostCollection {
            posts: vec![post("public", "Public"), post("draft", "Draft")],
            skipped: vec![SkippedPage {
                page_id: "p-untitled".into(),
                reason: SkipReason::MissingTitle,
            }],
        }
    }

    #[test]
    fn filtered_feed_counts_published_posts_only() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let feed = FeedDocument::build(&collection(), Some(&FilterOptions::default()), now);
        let value = serde_json::to_value(&feed).unwrap();

        assert_eq!(value["posts"].as_array().map(Vec::len), Some(1));
        assert_eq!(value["posts"][0]["slug"], json!("public"));
        assert_eq!(value["tags"], json!({"rust": 1}));
        assert_eq!(value["categories"], json!({"📂 All": 1}));
        assert_eq!(
            value["skipped"],
            json!([{"pageId": "p-untitled", "reason": "no title"}])
        );
    }

    #[test]
    fn unfiltered_feed_keeps_everything() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let feed = FeedDocument::build(&collection(), None, now);
        assert_eq!(feed.posts.len(), 2);
        assert!(feed.render(true).unwrap().as_str().contains('\n'));
    }
}
