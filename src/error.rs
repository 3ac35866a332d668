// src/error.rs
//! Application error types with structured error handling.
//!
//! Fetch-level failures are `AppError`s and abort the post list. Page-level
//! drops are not errors at all: they are classified as [`SkipReason`]s and
//! reported next to the posts that did resolve.

use std::fmt;
use thiserror::Error;

/// Error names reported by Notion's v3 web API, as a typed vocabulary.
///
/// The v3 endpoints answer failures with `{"errorId", "name", "message"}`;
/// `name` is the discriminator parsed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// Missing or expired `token_v2`, or a private page without one
    Unauthorized,
    /// The requested record does not exist or is not shared
    NotFound,
    /// Request body failed Notion's validation
    ValidationFailed,
    /// Too many requests from this client
    RateLimited,
    /// Notion internal server error
    InternalError,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error name this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse the `name` field of a v3 error body.
    pub fn from_api_response(name: &str) -> Self {
        match name {
            "UnauthorizedError" => Self::Unauthorized,
            "NotFoundError" => Self::NotFound,
            "ValidationError" => Self::ValidationFailed,
            "RateLimitedError" => Self::RateLimited,
            "InternalServerError" => Self::InternalError,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        Self::HttpStatus(status)
    }

    /// Whether this error is transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited | Self::InternalError)
            || matches!(self, Self::HttpStatus(code) if *code == 429 || *code >= 500)
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "UnauthorizedError"),
            Self::NotFound => write!(f, "NotFoundError"),
            Self::ValidationFailed => write!(f, "ValidationError"),
            Self::RateLimited => write!(f, "RateLimitedError"),
            Self::InternalError => write!(f, "InternalServerError"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(name) => write!(f, "{}", name),
        }
    }
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Network failure: {0}")]
    NetworkFailure(#[from] reqwest::Error),

    #[error("Notion API returned an error ({code}): {message}")]
    NotionService {
        code: NotionErrorCode,
        message: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("No collection schema found in the record map of page {page_id} (check the page id)")]
    SchemaNotFound { page_id: String },

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Output delivery failed: {}", failures.join(", "))]
    DeliveryFailed { failures: Vec<String> },

    #[error("Internal error: {message}")]
    InternalError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error(transparent)]
    ValidationError(#[from] crate::types::ValidationError),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::MalformedResponse(err.to_string())
    }
}

/// Why a single property failed to decode. Never escapes the resolver:
/// the offending key is skipped and the page carries on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("unexpected {property} value shape: {detail}")]
    UnexpectedShape {
        property: &'static str,
        detail: String,
    },

    #[error("no date token in value")]
    NoDateToken,

    #[error("image url can't be empty")]
    EmptyImageUrl,

    #[error("invalid url {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Domain vocabulary for why a page was left out of the post list.
///
/// Not an error type: it classifies why a page was dropped,
/// so callers can count and report drops instead of only seeing a shorter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The block is missing from the record map, or has no properties.
    NoProperties,
    /// No title survived name normalization.
    MissingTitle,
    /// Neither a date property nor a creation timestamp to default from.
    MissingCreatedTime,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoProperties => write!(f, "block missing or has no properties"),
            Self::MissingTitle => write!(f, "no title"),
            Self::MissingCreatedTime => write!(f, "no date and no creation time"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_names_round_trip_through_display() {
        for name in [
            "UnauthorizedError",
            "NotFoundError",
            "ValidationError",
            "RateLimitedError",
            "InternalServerError",
            "SomethingNewError",
        ] {
            assert_eq!(NotionErrorCode::from_api_response(name).to_string(), name);
        }
    }

    #[test]
    fn retryable_codes() {
        assert!(NotionErrorCode::RateLimited.is_retryable());
        assert!(NotionErrorCode::from_http_status(503).is_retryable());
        assert!(!NotionErrorCode::NotFound.is_retryable());
        assert!(!NotionErrorCode::from_http_status(400).is_retryable());
    }

    #[test]
    fn schema_not_found_names_the_page() {
        let err = AppError::SchemaNotFound {
            page_id: "abc".to_string(),
        };
        assert!(err.to_string().contains("page abc"));
    }
}
