//! Request options and response wrapper.

use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::Form;
use serde_json::Value;

/// A successful API response.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// HTTP status (2xx).
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Decoded body.
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Discard status and headers.
    pub fn into_data(self) -> T {
        self.data
    }
}

/// Body of an outgoing request.
#[derive(Debug, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// JSON body, sent with `Content-Type: application/json`.
    Json(Value),
    /// `multipart/form-data` body for file uploads.
    Multipart(Form),
}

/// Per-call request configuration.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Headers added to this request only.
    pub headers: HeaderMap,
    /// Query string pairs appended to the URL.
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    /// Empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Add a query parameter.
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}
