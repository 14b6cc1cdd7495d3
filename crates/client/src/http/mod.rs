//! Authenticated HTTP client for the Placify API.
//!
//! # Architecture
//!
//! - One preconfigured `reqwest` client per [`ApiClient`]: base URL, 10 second
//!   default timeout, JSON content type
//! - Bearer token read from the session on every request
//! - A 401 response clears the session and fires the login redirect hook
//! - Every other failure is logged by kind and returned unchanged

mod client;
mod error;
pub mod interceptor;
mod response;

pub use client::ApiClient;
pub use error::{ApiError, ErrorResponse};
pub use interceptor::{Disposition, LogRedirect, LoginRedirect};
pub use reqwest::multipart;
pub use reqwest::{Method, StatusCode};
pub use response::{ApiResponse, RequestBody, RequestOptions};
