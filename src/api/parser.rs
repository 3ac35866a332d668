// src/api/parser.rs
//! Turns raw v3 responses into typed bodies or typed errors.

use super::client::ApiResponse;
use super::responses::NotionErrorBody;
use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::error::{AppError, NotionErrorCode};
use reqwest::StatusCode;

/// Parses a response body, or the error it carries.
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_success(&result.data, &result.url)
    } else {
        Err(parse_error(&result.data, result.status, &result.url))
    }
}

fn parse_success<T>(body: &str, url: &str) -> Result<T, AppError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        AppError::MalformedResponse(format!("{} (body: {})", e, preview(body)))
    })
}

fn parse_error(body: &str, status: StatusCode, url: &str) -> AppError {
    if let Ok(error) = serde_json::from_str::<NotionErrorBody>(body) {
        let code = NotionErrorCode::from_api_response(&error.name);
        log::debug!(
            "Notion error {} from {} (errorId: {})",
            code,
            url,
            error.error_id.as_deref().unwrap_or("-")
        );
        return AppError::NotionService {
            code,
            message: error.message,
            status,
        };
    }

    AppError::NotionService {
        code: NotionErrorCode::from_http_status(status.as_u16()),
        message: format!("HTTP {} from {}: {}", status, url, preview(body)),
        status,
    }
}

fn preview(body: &str) -> String {
    if body.chars().count() > ERROR_BODY_PREVIEW_LENGTH {
        let cut: String = body.chars().take(ERROR_BODY_PREVIEW_LENGTH).collect();
        format!("{}...", cut)
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn response(status: StatusCode, body: &str) -> ApiResponse<String> {
        ApiResponse {
            data: body.to_string(),
            status,
            url: "https://www.notion.so/api/v3/loadPageChunk".to_string(),
        }
    }

    #[test]
    fn parses_typed_error_body() {
        let body = r#"{"errorId":"e-1","name":"ValidationError","message":"Invalid input."}"#;
        let result = parse_api_response::<Value>(response(StatusCode::BAD_REQUEST, body));

        match result {
            Err(AppError::NotionService { code, message, status }) => {
                assert_eq!(code, NotionErrorCode::ValidationFailed);
                assert_eq!(message, "Invalid input.");
                assert_eq!(status, StatusCode::BAD_REQUEST);
            }
            other => panic!("Expected NotionService error, got {:?}", other),
        }
    }

    #[test]
    fn falls_back_to_http_status() {
        let result = parse_api_response::<Value>(response(StatusCode::BAD_GATEWAY, "<html>"));
        match result {
            Err(AppError::NotionService { code, .. }) => {
                assert_eq!(code, NotionErrorCode::HttpStatus(502));
            }
            other => panic!("Expected NotionService error, got {:?}", other),
        }
    }

    #[test]
    fn malformed_success_body() {
        let result = parse_api_response::<Value>(response(StatusCode::OK, "{not json"));
        assert!(matches!(result, Err(AppError::MalformedResponse(_))));
    }
}
