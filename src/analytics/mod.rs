// src/analytics/mod.rs
//! Tag and category counts over a post list.

use crate::constants::DEFAULT_CATEGORY;
use crate::model::{Post, PropertyValue};
use indexmap::IndexMap;

/// Counts every item of the list property `key`, in first-seen order.
pub fn count_select_items(posts: &[Post], key: &str) -> IndexMap<String, usize> {
    let mut counts = IndexMap::new();
    for post in posts {
        let Some(items) = post.property(key).and_then(PropertyValue::as_list) else {
            continue;
        };
        for item in items {
            *counts.entry(item.clone()).or_insert(0) += 1;
        }
    }
    counts
}

pub fn tag_counts(posts: &[Post]) -> IndexMap<String, usize> {
    count_select_items(posts, "tags")
}

/// Category counts led by the catch-all category holding every post.
pub fn category_counts(posts: &[Post]) -> IndexMap<String, usize> {
    let mut counts = IndexMap::with_capacity(1);
    counts.insert(DEFAULT_CATEGORY.to_string(), posts.len());
    for (category, count) in count_select_items(posts, "category") {
        counts.insert(category, count);
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DateValue, PageProperties};
    use pretty_assertions::assert_eq;

    fn post(tags: &[&str], category: Option<&str>) -> Post {
        let mut values: IndexMap<String, PropertyValue> = IndexMap::new();
        values.insert("title".into(), PropertyValue::Text("t".into()));
        values.insert("date".into(), PropertyValue::Date(DateValue::starting("2024-01-01")));
        values.insert(
            "tags".into(),
            PropertyValue::List(tags.iter().map(|t| t.to_string()).collect()),
        );
        if let Some(category) = category {
            values.insert("category".into(), PropertyValue::List(vec![category.into()]));
        }
        Post::assemble(PageProperties {
            values,
            created_time: None,
        })
        .unwrap()
    }

    #[test]
    fn counts_tags_in_first_seen_order() {
        let posts = vec![post(&["rust", "web"], None), post(&["web"], None), post(&[], None)];
        let counts = tag_counts(&posts);
        assert_eq!(
            counts.into_iter().collect::<Vec<_>>(),
            vec![("rust".to_string(), 1), ("web".to_string(), 2)]
        );
    }

    #[test]
    fn categories_start_with_all() {
        let posts = vec![
            post(&[], Some("🧑‍💻 Dev")),
            post(&[], Some("🧑‍💻 Dev")),
            post(&[], None),
        ];
        let counts = category_counts(&posts);
        assert_eq!(
            counts.into_iter().collect::<Vec<_>>(),
            vec![("📂 All".to_string(), 3), ("🧑‍💻 Dev".to_string(), 2)]
        );
    }
}
