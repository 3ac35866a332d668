//! Finds the blog database in a record map and lists its pages.

use crate::constants::{GROUP_RESULTS_TYPE, PAGE_BLOCK_TYPE};
use crate::error::AppError;
use crate::record_map::{CollectionQueryResult, RecordMap, Schema};

/// The collection that holds the posts.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedCollection<'a> {
    pub collection_id: &'a str,
    pub schema: &'a Schema,
}

/// Selects the first collection, in map order, that exposes a schema.
///
/// `root_page_id` is only used to make the failure actionable.
pub fn locate_collection<'a>(
    record_map: &'a RecordMap,
    root_page_id: &str,
) -> Result<LocatedCollection<'a>, AppError> {
    record_map
        .collections
        .iter()
        .find_map(|(id, collection)| {
            collection.schema.as_ref().map(|schema| LocatedCollection {
                collection_id: id.as_str(),
                schema,
            })
        })
        .ok_or_else(|| AppError::SchemaNotFound {
            page_id: root_page_id.to_string(),
        })
}

/// Lists the page ids of a collection.
///
/// A query result for the first view of the record map is authoritative
/// and returned as-is. Without one, every `page` block parented by the
/// collection is returned in map order, with no further ordering guarantee.
pub fn enumerate_page_ids(record_map: &RecordMap, collection_id: &str) -> Vec<String> {
    let query = record_map
        .first_view_id()
        .and_then(|view_id| record_map.query_result(collection_id, view_id));

    match query {
        Some(result) => query_block_ids(result),
        None => {
            log::debug!(
                "No query result for collection {}, scanning blocks",
                collection_id
            );
            record_map
                .blocks
                .iter()
                .filter(|(_, block)| {
                    block.block_type == PAGE_BLOCK_TYPE
                        && block.parent_id.as_deref() == Some(collection_id)
                })
                .map(|(id, _)| id.clone())
                .collect()
        }
    }
}

fn query_block_ids(result: &CollectionQueryResult) -> Vec<String> {
    match &result.collection_group_results {
        Some(group) if group.result_type.as_deref() == Some(GROUP_RESULTS_TYPE) => {
            group.block_ids.clone().unwrap_or_default()
        }
        _ => result.block_ids.clone().unwrap_or_default(),
    }
}
