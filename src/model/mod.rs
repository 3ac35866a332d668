//! Domain model for extracted posts.

mod post;
mod property_value;

pub use post::{
    parse_post_date, sort_posts_desc, PageProperties, Post, PostCollection, SkippedPage,
};
pub use property_value::{DateValue, Person, PropertyValue};
