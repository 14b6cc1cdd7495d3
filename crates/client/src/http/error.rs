//! Error types for the Placify API client.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use serde_json::Value;
use thiserror::Error;

/// An error response received from the API.
///
/// Carries everything a caller needs to render a message: status, headers,
/// and the decoded body (`Value::String` when the body was not JSON,
/// `Value::Null` when it was empty).
#[derive(Debug, Clone)]
pub struct ErrorResponse {
    /// HTTP status.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub data: Value,
}

impl ErrorResponse {
    /// Read status, headers and body from a `reqwest` response.
    pub(crate) async fn read(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let data = match response.bytes().await {
            Ok(bytes) if bytes.is_empty() => Value::Null,
            Ok(bytes) => serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read error response body");
                Value::Null
            }
        };

        Self {
            status,
            headers,
            data,
        }
    }

    /// Server-provided message, from `message` or `error` in a JSON body.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match &self.data {
            Value::Object(map) => ["message", "error"]
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_str)),
            Value::String(text) if !text.is_empty() => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Errors that can occur when calling the Placify API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// 401: the session is no longer valid. The session has been cleared.
    #[error("unauthorized: session expired or invalid")]
    Unauthorized(ErrorResponse),

    /// 403: the signed-in role may not perform this action.
    #[error("access denied")]
    Forbidden(ErrorResponse),

    /// 404: the resource does not exist.
    #[error("resource not found")]
    NotFound(ErrorResponse),

    /// 429: too many requests.
    #[error("rate limited{}", retry_suffix(.retry_after))]
    RateLimited {
        /// Value of the `Retry-After` header in seconds, if present and numeric.
        retry_after: Option<u64>,
        /// The full response.
        response: ErrorResponse,
    },

    /// 5xx: the server failed.
    #[error("server error ({})", .0.status)]
    Server(ErrorResponse),

    /// Any other non-success status.
    #[error("request failed with status {}", .0.status)]
    Status(ErrorResponse),

    /// No response was received (connection failure, timeout).
    #[error("no response from server: {0}")]
    NoResponse(#[source] reqwest::Error),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    Request(String),

    /// The response body did not match the expected type.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Classify an error response by status.
    #[must_use]
    pub fn from_response(response: ErrorResponse) -> Self {
        match response.status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized(response),
            StatusCode::FORBIDDEN => Self::Forbidden(response),
            StatusCode::NOT_FOUND => Self::NotFound(response),
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited {
                retry_after: response
                    .headers
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.trim().parse().ok()),
                response,
            },
            status if status.is_server_error() => Self::Server(response),
            _ => Self::Status(response),
        }
    }

    /// The response that caused this error, if one was received.
    #[must_use]
    pub const fn response(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Unauthorized(r)
            | Self::Forbidden(r)
            | Self::NotFound(r)
            | Self::Server(r)
            | Self::Status(r)
            | Self::RateLimited { response: r, .. } => Some(r),
            Self::NoResponse(_) | Self::Request(_) | Self::Parse(_) => None,
        }
    }

    /// HTTP status of the response, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        self.response().map(|r| r.status)
    }

    /// Whether the request timed out before a response arrived.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::NoResponse(e) if e.is_timeout())
    }
}

#[allow(clippy::ref_option)]
fn retry_suffix(retry_after: &Option<u64>) -> String {
    retry_after.map_or_else(String::new, |secs| format!(", retry after {secs} seconds"))
}
