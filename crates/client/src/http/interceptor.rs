//! Request and response interception.
//!
//! Every request passes through [`inject_auth`] before it is sent, and every
//! failure passes through [`inspect_error`] before the caller sees it. The
//! inspector only logs and returns a [`Disposition`]; the client applies the
//! side effects (clearing the session, redirecting to login), which keeps the
//! policy testable without a network or a login page.

use reqwest::{Method, RequestBuilder};
use secrecy::ExposeSecret;
use tracing::{error, warn};

use super::error::ApiError;
use crate::session::SessionState;

/// What the client must do with an error before returning it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Return the error to the caller unchanged.
    Propagate,
    /// The session is invalid: clear it and send the user to login, then
    /// return the error.
    InvalidateSession,
}

/// Hook invoked when a 401 response invalidates the session.
///
/// In a browser this navigates to the login page; other front ends decide
/// what "go to login" means for them.
pub trait LoginRedirect: Send + Sync {
    /// Send the user to the login entry point.
    fn redirect_to_login(&self, login_url: &str);
}

/// Redirect hook that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self, login_url: &str) {
        warn!(login_url, "Session expired, sign in again");
    }
}

/// Attach `Authorization: Bearer <token>` when a token is stored.
///
/// Method, URL and body are left as they are.
#[must_use]
pub fn inject_auth(builder: RequestBuilder, session: &SessionState) -> RequestBuilder {
    match session.token() {
        Some(token) => builder.bearer_auth(token.expose_secret()),
        None => builder,
    }
}

/// Log a failed call and decide what the client must do about it.
#[must_use]
pub fn inspect_error(method: &Method, path: &str, err: &ApiError) -> Disposition {
    match err {
        ApiError::Unauthorized(_) => {
            warn!(%method, path, "Unauthorized, clearing session");
            Disposition::InvalidateSession
        }
        ApiError::Forbidden(_) => {
            warn!(%method, path, "Access denied");
            Disposition::Propagate
        }
        ApiError::NotFound(_) => {
            warn!(%method, path, "Resource not found");
            Disposition::Propagate
        }
        ApiError::RateLimited { retry_after, .. } => {
            warn!(%method, path, ?retry_after, "Rate limited");
            Disposition::Propagate
        }
        ApiError::Server(response) => {
            error!(%method, path, status = %response.status, "Server error");
            Disposition::Propagate
        }
        ApiError::Status(response) => {
            error!(%method, path, status = %response.status, "API error");
            Disposition::Propagate
        }
        ApiError::NoResponse(e) => {
            error!(%method, path, timeout = e.is_timeout(), error = %e, "No response received");
            Disposition::Propagate
        }
        ApiError::Request(message) => {
            error!(%method, path, error = %message, "Request setup failed");
            Disposition::Propagate
        }
        ApiError::Parse(message) => {
            error!(%method, path, error = %message, "Failed to decode response");
            Disposition::Propagate
        }
    }
}
