// src/filter.rs
//! Which posts get published.

use crate::constants::{DEFAULT_ACCEPT_STATUS, DEFAULT_ACCEPT_TYPE, PUBLISH_LOOKAHEAD_HOURS};
use crate::model::{PropertyValue, Post};
use chrono::{DateTime, Duration, Utc};

/// Accepted `status` and `type` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub accept_status: Vec<String>,
    pub accept_type: Vec<String>,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            accept_status: DEFAULT_ACCEPT_STATUS.iter().map(|s| s.to_string()).collect(),
            accept_type: DEFAULT_ACCEPT_TYPE.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Keeps titled, slugged posts dated no later than a day after `now`
/// whose first status and first type are accepted. Order is preserved.
pub fn filter_posts(posts: &[Post], options: &FilterOptions, now: DateTime<Utc>) -> Vec<Post> {
    let horizon = now + Duration::hours(PUBLISH_LOOKAHEAD_HOURS);

    posts
        .iter()
        .filter(|post| is_published(post, options, horizon))
        .cloned()
        .collect()
}

fn is_published(post: &Post, options: &FilterOptions, horizon: DateTime<Utc>) -> bool {
    let titled = post
        .property("title")
        .is_some_and(PropertyValue::is_truthy);
    if !titled || post.slug().is_none() {
        return false;
    }

    let in_window = post
        .effective_timestamp()
        .is_some_and(|published| published <= horizon);
    if !in_window {
        return false;
    }

    accepts(&options.accept_status, post.status()) && accepts(&options.accept_type, post.post_type())
}

fn accepts(accepted: &[String], value: Option<&str>) -> bool {
    value.is_some_and(|v| accepted.iter().any(|a| a == v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DateValue, PageProperties};
    use chrono::TimeZone;

    fn post(title: &str, slug: &str, date: &str, status: &str, kind: &str) -> Post {
        let values = [
            ("id", PropertyValue::Text(format!("id-{}", slug))),
            ("title", PropertyValue::Text(title.into())),
            ("slug", PropertyValue::Text(slug.into())),
            ("date", PropertyValue::Date(DateValue::starting(date))),
            ("status", PropertyValue::List(vec![status.into()])),
            ("type", PropertyValue::List(vec![kind.into()])),
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

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn keeps_public_posts() {
        let posts = vec![post("Hello", "hello", "2024-02-01", "Public", "Post")];
        assert_eq!(filter_posts(&posts, &FilterOptions::default(), now()).len(), 1);
    }

    #[test]
    fn drops_unpublishable_posts() {
        let posts = vec![
            post("Draft", "draft", "2024-02-01", "Draft", "Post"),
            post("About", "about", "2024-02-01", "Public", "Page"),
            post("No slug", "", "2024-02-01", "Public", "Post"),
            post("Future", "future", "2024-03-05", "Public", "Post"),
            post("Tomorrow", "tomorrow", "2024-03-02", "Public", "Post"),
        ];
        let kept = filter_posts(&posts, &FilterOptions::default(), now());
        let slugs: Vec<_> = kept.iter().filter_map(Post::slug).collect();
        assert_eq!(slugs, vec!["tomorrow"]);
    }

    #[test]
    fn custom_accept_lists() {
        let posts = vec![
            post("Draft", "draft", "2024-02-01", "Draft", "Post"),
            post("About", "about", "2024-02-01", "Public", "Page"),
        ];
        let options = FilterOptions {
            accept_status: vec!["Public".into(), "Draft".into()],
            accept_type: vec!["Post".into(), "Page".into()],
        };
        assert_eq!(filter_posts(&posts, &options, now()).len(), 2);
    }
}
