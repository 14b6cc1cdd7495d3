//! Consumer services built on [`ApiClient`](crate::http::ApiClient).
//!
//! These are the flows a front end drives: signing in, browsing and applying
//! to jobs, and reading notifications. Actions the backend rate-limits share
//! one cooldown policy: a 429 records a marker in the session, and until it
//! expires the action is refused locally with [`ServiceError::CoolingDown`].

pub mod auth;
pub mod jobs;
pub mod notifications;

use std::borrow::Cow;

use placify_core::EnvelopeError;
use thiserror::Error;
use tracing::debug;

use crate::http::ApiError;
use crate::session::{DEFAULT_RETRY_AFTER_SECS, SessionError, SessionState};

/// Rate-limit marker for sign-in attempts.
pub const LOGIN_ENDPOINT: &str = "login";

/// Rate-limit marker for job applications.
pub const APPLICATIONS_ENDPOINT: &str = "applications";

/// Errors returned by the consumer services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Envelope(#[from] EnvelopeError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The action was rate limited recently and its cooldown has not expired.
    #[error("{endpoint} is cooling down, try again in {remaining_secs} seconds")]
    CoolingDown {
        endpoint: String,
        remaining_secs: u64,
    },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Percent-encode an id for use as one path segment.
pub(crate) fn path_segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

/// Refuse the action while its cooldown marker is active.
pub(crate) fn ensure_not_cooling_down(
    session: &SessionState,
    endpoint: &str,
) -> Result<(), ServiceError> {
    match session.rate_limit_data(endpoint) {
        Some(status) => {
            debug!(endpoint, remaining = status.remaining_time, "Action still cooling down");
            Err(ServiceError::CoolingDown {
                endpoint: endpoint.to_owned(),
                remaining_secs: status.remaining_time,
            })
        }
        None => Ok(()),
    }
}

/// Update the cooldown marker from the outcome of a rate-limited action.
///
/// Success clears the marker; a 429 sets it from `Retry-After`, falling back
/// to [`DEFAULT_RETRY_AFTER_SECS`].
pub(crate) fn settle_cooldown<T>(
    session: &SessionState,
    endpoint: &str,
    result: Result<T, ApiError>,
) -> Result<T, ServiceError> {
    match result {
        Ok(value) => {
            session.clear_rate_limit_data(endpoint);
            Ok(value)
        }
        Err(err) => {
            if let ApiError::RateLimited { retry_after, .. } = &err {
                let secs = retry_after
                    .and_then(|secs| u32::try_from(secs).ok())
                    .map_or(DEFAULT_RETRY_AFTER_SECS, f64::from);
                session.set_rate_limit_data(endpoint, secs);
            }
            Err(err.into())
        }
    }
}
