// tests/publish_feed.rs
//! The post list as the site consumes it: publish filter, taxonomy counts,
//! image URL mapping, and the rendered JSON feed.

mod common;

use chrono::{TimeZone, Utc};
use common::{record_map, root_id, FakeNotion, BLOG_RECORD_MAP};
use notion2posts::{
    category_counts, filter_posts, tag_counts, Block, DecodeError, FeedDocument, FilterOptions,
    ImageUrlMapper, NotionImageProxy, PostCollection, PostFetcher, PropertyValue,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

async fn blog_posts() -> PostCollection {
    PostFetcher::new(Arc::new(FakeNotion::blog()))
        .fetch_posts(&root_id())
        .await
        .unwrap()
}

#[tokio::test]
async fn publish_filter_keeps_public_posts_only() {
    let collection = blog_posts().await;
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let published = filter_posts(&collection.posts, &FilterOptions::default(), now);

    let slugs: Vec<_> = published.iter().filter_map(|p| p.slug()).collect();
    assert_eq!(slugs, vec!["second", "first"]);
}

#[tokio::test]
async fn publish_filter_holds_back_future_posts() {
    let collection = blog_posts().await;
    let before_second = Utc.with_ymd_and_hms(2024, 1, 13, 23, 0, 0).unwrap();
    let day_before_second = Utc.with_ymd_and_hms(2024, 1, 14, 1, 0, 0).unwrap();

    let early = filter_posts(&collection.posts, &FilterOptions::default(), before_second);
    assert_eq!(early.iter().filter_map(|p| p.slug()).collect::<Vec<_>>(), vec!["first"]);

    let within_a_day = filter_posts(&collection.posts, &FilterOptions::default(), day_before_second);
    assert_eq!(within_a_day.len(), 2);
}

#[tokio::test]
async fn taxonomy_counts_over_published_posts() {
    let collection = blog_posts().await;
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let published = filter_posts(&collection.posts, &FilterOptions::default(), now);

    assert_eq!(
        tag_counts(&published).into_iter().collect::<Vec<_>>(),
        vec![("rust".to_string(), 2), ("web".to_string(), 1)]
    );
    assert_eq!(
        category_counts(&published).into_iter().collect::<Vec<_>>(),
        vec![("📂 All".to_string(), 2), ("Dev".to_string(), 1)]
    );
}

#[tokio::test]
async fn feed_document_shape() {
    let collection = blog_posts().await;
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let feed = FeedDocument::build(&collection, Some(&FilterOptions::default()), now);
    let value: serde_json::Value = serde_json::from_str(feed.render(false).unwrap().as_str()).unwrap();

    let second = &value["posts"][0];
    assert_eq!(second["id"], json!("10000000-0000-4000-8000-000000000002"));
    assert_eq!(second["title"], json!("Second"));
    assert_eq!(second["date"], json!({"start_date": "2024-01-15"}));
    assert_eq!(second["status"], json!(["Public"]));
    assert_eq!(second["thumbnail"], json!(null));
    assert_eq!(
        second["author"],
        json!([{"id": "user-2", "name": "김민지", "profile_photo": null}])
    );
    assert_eq!(second["createdTime"], json!("2024-01-15T10:00:00Z"));

    assert_eq!(value["categories"], json!({"📂 All": 2, "Dev": 1}));
    assert_eq!(value["skipped"].as_array().map(Vec::len), Some(2));
}

#[test]
fn image_proxy_passes_through_stable_urls() {
    let map = record_map(BLOG_RECORD_MAP);
    let block = map.block("10000000-0000-4000-8000-000000000001").unwrap();
    let proxy = NotionImageProxy;

    for url in [
        "data:image/png;base64,iVBORw0KGgo=",
        "https://images.unsplash.com/photo-1?w=800",
        "https://s3-us-west-2.amazonaws.com/secure.notion-static.com/abc/a.png?X-Amz-Algorithm=AWS4-HMAC-SHA256&X-Amz-Credential=c&X-Amz-Signature=s",
    ] {
        assert_eq!(proxy.map_image_url(url, block).unwrap(), url);
    }

    assert_eq!(
        proxy.map_image_url("", block),
        Err(DecodeError::EmptyImageUrl)
    );
    assert_eq!(
        proxy.map_image_url("/images/page-cover/gradients_1.png", block).unwrap(),
        "https://www.notion.so/image/https%3A%2F%2Fwww.notion.so%2Fimages%2Fpage-cover%2Fgradients_1.png?table=block&id=10000000-0000-4000-8000-000000000001&cache=v2"
    );
}

struct KeepOriginal;

impl ImageUrlMapper for KeepOriginal {
    fn map_image_url(&self, url: &str, _block: &Block) -> Result<String, DecodeError> {
        Ok(url.to_string())
    }
}

#[tokio::test]
async fn custom_image_mapper_is_used_for_attachments() {
    let fetcher = PostFetcher::with_image_mapper(Arc::new(FakeNotion::blog()), Arc::new(KeepOriginal));
    let collection = fetcher.fetch_posts(&root_id()).await.unwrap();

    let first = collection
        .posts
        .iter()
        .find(|p| p.slug() == Some("first"))
        .unwrap();
    assert_eq!(
        first.property("thumbnail"),
        Some(&PropertyValue::File(Some(
            "https://s3-us-west-2.amazonaws.com/secure.notion-static.com/abc/cover.png".into()
        )))
    );
}
