//! Extraction: from a record map to resolved page properties.
//!
//! 1. [`locate_collection`] picks the blog database and its schema
//! 2. [`enumerate_page_ids`] lists the database's rows
//! 3. [`PropertyResolver`] decodes each row's properties
//! 4. [`normalize_property_names`] maps bilingual column names onto canonical keys

pub mod decode;
mod image_url;
mod locate;
mod names;
mod resolve;

pub use image_url::{ImageUrlMapper, NotionImageProxy};
pub use locate::{enumerate_page_ids, locate_collection, LocatedCollection};
pub use names::normalize_property_names;
pub use resolve::{person_from_user, PropertyResolver};
