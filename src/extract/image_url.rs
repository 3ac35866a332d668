//! Rewrites attachment URLs into stable, cacheable image URLs.

use crate::constants::{IMAGE_PROXY_CACHE_VERSION, NOTION_ORIGIN};
use crate::error::DecodeError;
use crate::record_map::Block;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Maps a raw attachment URL to the URL a post should publish.
pub trait ImageUrlMapper: Send + Sync {
    fn map_image_url(&self, url: &str, block: &Block) -> Result<String, DecodeError>;
}

/// Routes attachments through Notion's image proxy, which serves them
/// without the expiring S3 signatures.
#[derive(Debug, Clone, Default)]
pub struct NotionImageProxy;

impl ImageUrlMapper for NotionImageProxy {
    fn map_image_url(&self, url: &str, block: &Block) -> Result<String, DecodeError> {
        if url.is_empty() {
            return Err(DecodeError::EmptyImageUrl);
        }

        if url.starts_with("data:") || url.starts_with("https://images.unsplash.com") {
            return Ok(url.to_string());
        }

        if is_signed_s3_url(url) {
            return Ok(url.to_string());
        }

        let absolute = if url.starts_with("/images") {
            format!("{}{}", NOTION_ORIGIN, url)
        } else {
            url.to_string()
        };

        let proxied = if absolute.starts_with("/image") {
            format!("{}{}", NOTION_ORIGIN, absolute)
        } else {
            format!(
                "{}/image/{}",
                NOTION_ORIGIN,
                utf8_percent_encode(&absolute, URI_COMPONENT)
            )
        };

        let mut proxy_url = Url::parse(&proxied).map_err(|e| DecodeError::InvalidUrl {
            url: proxied.clone(),
            reason: e.to_string(),
        })?;

        set_query_params(
            &mut proxy_url,
            &[
                ("table", proxy_table(block)),
                ("id", block.id.as_str()),
                ("cache", IMAGE_PROXY_CACHE_VERSION),
            ],
        );

        Ok(proxy_url.to_string())
    }
}

/// S3 uploads that already carry a signature are served as-is.
fn is_signed_s3_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };

    let on_s3 = parsed.path().starts_with("/secure.notion-static.com")
        && parsed
            .host_str()
            .is_some_and(|host| host.ends_with(".amazonaws.com"));
    if !on_s3 {
        return false;
    }

    let has = |key: &str| parsed.query_pairs().any(|(k, _)| k == key);
    has("X-Amz-Credential") && has("X-Amz-Signature") && has("X-Amz-Algorithm")
}

/// The proxy authorizes by the table owning the block.
fn proxy_table(block: &Block) -> &str {
    match block.parent_table.as_deref() {
        None | Some("space") | Some("collection") | Some("team") => "block",
        Some(table) => table,
    }
}

/// Sets each parameter, replacing any existing values for the same key.
fn set_query_params(url: &mut Url, params: &[(&str, &str)]) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !params.iter().any(|(key, _)| k == key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    let mut pairs = url.query_pairs_mut();
    pairs.clear();
    for (k, v) in &kept {
        pairs.append_pair(k, v);
    }
    for (k, v) in params {
        pairs.append_pair(k, v);
    }
}
