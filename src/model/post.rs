//! The post model and the result of one extraction run.

use super::property_value::{DateValue, PropertyValue};
use crate::error::SkipReason;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::Serialize;
use std::cmp::Ordering;

/// Properties resolved for one page, before they become a [`Post`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageProperties {
    pub values: IndexMap<String, PropertyValue>,
    pub created_time: Option<DateTime<Utc>>,
}

impl PageProperties {
    /// No block, no properties, or no schema: nothing was resolved.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }
}

/// A blog post: canonical fields (`id`, `title`, `date`, `slug`, `status`,
/// `type`) plus every other resolved property, keyed by display name.
///
/// Every post has a non-empty title and a `date.start_date`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    #[serde(flatten)]
    properties: IndexMap<String, PropertyValue>,
    #[serde(rename = "createdTime", skip_serializing_if = "Option::is_none")]
    created_time: Option<DateTime<Utc>>,
}

impl Post {
    /// Builds a post from name-normalized properties, defaulting the date
    /// to the page's creation day.
    pub fn assemble(page: PageProperties) -> Result<Self, SkipReason> {
        let PageProperties {
            mut values,
            created_time,
        } = page;

        if values.is_empty() {
            return Err(SkipReason::NoProperties);
        }

        if !values.get("title").is_some_and(PropertyValue::is_truthy) {
            return Err(SkipReason::MissingTitle);
        }

        let has_start_date = values
            .get("date")
            .and_then(PropertyValue::as_date)
            .and_then(|d| d.start_date.as_deref())
            .is_some_and(|s| !s.is_empty());

        if !has_start_date {
            let created = created_time.ok_or(SkipReason::MissingCreatedTime)?;
            values.insert(
                "date".to_string(),
                PropertyValue::Date(DateValue::starting(created.format("%Y-%m-%d").to_string())),
            );
        }

        Ok(Self {
            properties: values,
            created_time,
        })
    }

    pub fn id(&self) -> &str {
        self.text("id").unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.text("title").unwrap_or_default()
    }

    pub fn slug(&self) -> Option<&str> {
        self.text("slug").filter(|s| !s.is_empty())
    }

    pub fn date(&self) -> Option<&DateValue> {
        self.property("date").and_then(PropertyValue::as_date)
    }

    pub fn start_date(&self) -> &str {
        self.date()
            .and_then(|d| d.start_date.as_deref())
            .unwrap_or_default()
    }

    /// First status value; statuses are usually single selects.
    pub fn status(&self) -> Option<&str> {
        self.property("status").and_then(PropertyValue::first_text)
    }

    /// First type value.
    pub fn post_type(&self) -> Option<&str> {
        self.property("type").and_then(PropertyValue::first_text)
    }

    pub fn created_time(&self) -> Option<DateTime<Utc>> {
        self.created_time
    }

    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> &IndexMap<String, PropertyValue> {
        &self.properties
    }

    fn text(&self, name: &str) -> Option<&str> {
        self.property(name).and_then(PropertyValue::as_text)
    }

    /// The instant the post sorts and publishes by: its start date,
    /// or its creation time when the start date is empty.
    pub fn effective_timestamp(&self) -> Option<DateTime<Utc>> {
        match self.start_date() {
            "" => self.created_time,
            start => parse_post_date(start),
        }
    }
}

/// Parses the date formats Notion hands out: plain days and RFC 3339 instants.
pub fn parse_post_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(day) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return day.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Some(instant.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|dt| dt.and_utc())
}

/// Sorts posts newest first. Posts without a parseable date go last.
pub fn sort_posts_desc(posts: &mut [Post]) {
    posts.sort_by(|a, b| {
        match (a.effective_timestamp(), b.effective_timestamp()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
}

/// A page that didn't make it into the post list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPage {
    pub page_id: String,
    pub reason: SkipReason,
}

/// Posts in publication order, plus what was dropped on the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostCollection {
    pub posts: Vec<Post>,
    pub skipped: Vec<SkippedPage>,
}

impl PostCollection {
    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }

    /// Whether every enumerated page became a post.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn skipped_for(&self, reason: &SkipReason) -> usize {
        self.skipped.iter().filter(|s| &s.reason == reason).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn page(values: Vec<(&str, PropertyValue)>) -> PageProperties {
        PageProperties {
            values: values
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            created_time: Some(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()),
        }
    }

    fn text(s: &str) -> PropertyValue {
        PropertyValue::Text(s.to_string())
    }

    #[test]
    fn defaults_missing_date_to_creation_day() {
        let post = Post::assemble(page(vec![("id", text("p")), ("title", text("Hello"))])).unwrap();
        assert_eq!(post.start_date(), "2024-01-15");
    }

    #[test]
    fn date_without_start_is_replaced() {
        let mut empty = DateValue::default();
        empty
            .details
            .insert("end_date".into(), serde_json::json!("2024-02-01"));
        let post = Post::assemble(page(vec![
            ("title", text("Hello")),
            ("date", PropertyValue::Date(empty)),
        ]))
        .unwrap();
        assert_eq!(post.date(), Some(&DateValue::starting("2024-01-15")));
    }

    #[test]
    fn empty_title_is_skipped() {
        assert_eq!(
            Post::assemble(page(vec![("title", text(""))])),
            Err(SkipReason::MissingTitle)
        );
        assert_eq!(
            Post::assemble(PageProperties::default()),
            Err(SkipReason::NoProperties)
        );
    }

    #[test]
    fn no_date_and_no_creation_time_is_skipped() {
        let mut props = page(vec![("title", text("Hello"))]);
        props.created_time = None;
        assert_eq!(Post::assemble(props), Err(SkipReason::MissingCreatedTime));
    }

    #[test]
    fn sorts_newest_first_with_undated_last() {
        let dated = |title: &str, day: &str| {
            Post::assemble(page(vec![
                ("title", text(title)),
                ("date", PropertyValue::Date(DateValue::starting(day))),
            ]))
            .unwrap()
        };
        let mut posts = vec![
            dated("old", "2024-01-01"),
            dated("garbage", "not a date"),
            dated("new", "2024-03-01"),
            dated("instant", "2024-02-01T08:30:00Z"),
        ];
        sort_posts_desc(&mut posts);
        let titles: Vec<_> = posts.iter().map(Post::title).collect();
        assert_eq!(titles, vec!["new", "instant", "old", "garbage"]);
    }

    #[test]
    fn serializes_flat_with_created_time() {
        let post = Post::assemble(page(vec![("id", text("p")), ("title", text("Hello"))])).unwrap();
        assert_eq!(
            serde_json::to_value(&post).unwrap(),
            serde_json::json!({
                "id": "p",
                "title": "Hello",
                "date": {"start_date": "2024-01-15"},
                "createdTime": "2024-01-15T10:00:00Z"
            })
        );
    }
}
