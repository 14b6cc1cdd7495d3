//! Session state: who is signed in, as what role, plus rate-limit cooldowns.
//!
//! [`SessionState`] is the single source of truth for authentication state.
//! It is a cheap, clonable handle over a [`KeyValueStore`] and is injected into
//! the [`ApiClient`](crate::http::ApiClient) at construction.
//!
//! # Failure semantics
//!
//! Storage failures (unreadable file, poisoned lock, quota) are logged and
//! replaced by a safe default: `false`, `None`, or an empty string. The only
//! errors a caller sees are argument validation failures from
//! [`SessionState::set_auth_data`].
//!
//! # Persisted keys
//!
//! | Key | Value |
//! |-----|-------|
//! | `token` | bearer token |
//! | `role` | lowercase role |
//! | `name` | display name |
//! | `userId` | opaque user id |
//! | `rate_limit_<endpoint>` | cooldown expiry, ms since epoch |

mod file_store;
mod store;

pub use file_store::FileStore;
pub use store::{KeyValueStore, MemoryStore, StorageError};

use std::sync::Arc;

use placify_core::{RateLimitStatus, Role};
use secrecy::SecretString;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::clock::{Clock, SystemClock};

/// Cooldown applied when the server does not say how long to wait.
pub const DEFAULT_RETRY_AFTER_SECS: f64 = 30.0;

/// Storage keys for session data.
pub mod keys {
    /// Bearer token.
    pub const TOKEN: &str = "token";

    /// Lowercase role name.
    pub const ROLE: &str = "role";

    /// Display name.
    pub const NAME: &str = "name";

    /// Opaque user id.
    pub const USER_ID: &str = "userId";

    /// Prefix of rate-limit marker keys.
    pub const RATE_LIMIT_PREFIX: &str = "rate_limit_";

    /// Every key that belongs to the signed-in session.
    pub const SESSION: [&str; 4] = [TOKEN, ROLE, NAME, USER_ID];
}

/// Errors returned by session mutators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// A required argument was empty.
    #[error("invalid session data: {0}")]
    Validation(String),
}

/// Handle to the persisted session.
#[derive(Clone)]
pub struct SessionState {
    inner: Arc<SessionStateInner>,
}

struct SessionStateInner {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionState").finish_non_exhaustive()
    }
}

impl SessionState {
    /// Create a session over `store`, using wall-clock time.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Create a session over `store` with an explicit time source.
    #[must_use]
    pub fn with_clock(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(SessionStateInner { store, clock }),
        }
    }

    /// Create a session over a fresh [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    // =========================================================================
    // Storage helpers
    // =========================================================================

    fn read(&self, key: &str) -> Option<String> {
        match self.inner.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                error!(key, error = %e, "Failed to read session storage");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) -> bool {
        match self.inner.store.set(key, value) {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "Failed to write session storage");
                false
            }
        }
    }

    fn delete(&self, key: &str) {
        if let Err(e) = self.inner.store.remove(key) {
            error!(key, error = %e, "Failed to remove session storage key");
        }
    }

    fn rate_limit_key(endpoint: &str) -> String {
        format!("{}{endpoint}", keys::RATE_LIMIT_PREFIX)
    }

    // =========================================================================
    // Authentication data
    // =========================================================================

    /// Store a new session, replacing any existing one.
    ///
    /// The role is stored lowercase. Name and user id are optional; when absent
    /// any value left by a previous session is removed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Validation`] if `token` or `role` is blank.
    /// Storage failures are logged, not returned.
    pub fn set_auth_data(
        &self,
        token: &str,
        role: &str,
        name: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<(), SessionError> {
        if token.trim().is_empty() || role.trim().is_empty() {
            error!("Refusing to store session without token and role");
            return Err(SessionError::Validation(
                "token and role are required".to_owned(),
            ));
        }

        let role = role.to_lowercase();
        if !(self.write(keys::TOKEN, token) && self.write(keys::ROLE, &role)) {
            // A token without a role is not a session
            error!("Session write failed, discarding partial session");
            self.delete(keys::TOKEN);
            self.delete(keys::ROLE);
            return Ok(());
        }

        for (key, value) in [(keys::NAME, name), (keys::USER_ID, user_id)] {
            match value {
                Some(value) => {
                    self.write(key, value);
                }
                None => self.delete(key),
            }
        }

        debug!(role = %role, "Session stored");
        Ok(())
    }

    /// Whether both a token and a role are stored.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.read(keys::TOKEN).is_some() && self.read(keys::ROLE).is_some()
    }

    /// Current bearer token.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.read(keys::TOKEN).map(SecretString::from)
    }

    /// Stored role, lowercase.
    #[must_use]
    pub fn role(&self) -> Option<String> {
        self.read(keys::ROLE)
    }

    /// Stored role as a known [`Role`], if it is one.
    #[must_use]
    pub fn current_role(&self) -> Option<Role> {
        self.role().and_then(|role| role.parse().ok())
    }

    /// Display name, or an empty string when none is stored.
    #[must_use]
    pub fn name(&self) -> String {
        self.read(keys::NAME).unwrap_or_default()
    }

    /// Stored user id.
    #[must_use]
    pub fn user_id(&self) -> Option<String> {
        self.read(keys::USER_ID)
    }

    /// Case-insensitive comparison of the stored role with `required_role`.
    ///
    /// A blank `required_role` is a caller bug: it is logged and treated as
    /// no match.
    #[must_use]
    pub fn has_role(&self, required_role: &str) -> bool {
        if required_role.trim().is_empty() {
            error!("has_role called without a role");
            return false;
        }

        self.role()
            .is_some_and(|role| role == required_role.to_lowercase())
    }

    /// Signed in, and holding `required_role` if one is given.
    ///
    /// A blank `required_role` means no role is required.
    #[must_use]
    pub fn is_authenticated_with_role(&self, required_role: Option<&str>) -> bool {
        self.is_logged_in()
            && required_role
                .filter(|role| !role.trim().is_empty())
                .is_none_or(|role| self.has_role(role))
    }

    /// Remove every session key. Rate-limit markers are kept.
    pub fn logout(&self) {
        for key in keys::SESSION {
            self.delete(key);
        }
        debug!("Session cleared");
    }

    /// Replace the stored token, leaving role, name and user id untouched.
    ///
    /// Returns `false` if `new_token` is blank or the write failed.
    pub fn refresh_token(&self, new_token: &str) -> bool {
        if new_token.trim().is_empty() {
            error!("Refusing to store an empty token");
            return false;
        }

        self.write(keys::TOKEN, new_token)
    }

    /// Whether the session has no usable token.
    ///
    /// Only presence is checked; the token is never decoded, so a stale token
    /// is discovered when the server answers 401.
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        self.read(keys::TOKEN).is_none()
    }

    // =========================================================================
    // Rate-limit markers
    // =========================================================================

    /// Record that `endpoint` may not be retried for `retry_after_secs`.
    ///
    /// Non-finite or non-positive durations are logged and ignored. Returns
    /// whether a marker was written.
    pub fn set_rate_limit_data(&self, endpoint: &str, retry_after_secs: f64) -> bool {
        if !retry_after_secs.is_finite() || retry_after_secs <= 0.0 {
            error!(
                endpoint,
                retry_after_secs, "Invalid retry-after value, cooldown not recorded"
            );
            return false;
        }

        #[allow(clippy::cast_possible_truncation)]
        let expiry_time = self
            .inner
            .clock
            .now_millis()
            .saturating_add((retry_after_secs * 1000.0).round() as i64);

        let written = self.write(&Self::rate_limit_key(endpoint), &expiry_time.to_string());
        if written {
            warn!(endpoint, retry_after_secs, expiry_time, "Rate limit cooldown recorded");
        }
        written
    }

    /// Record a cooldown from a textual duration such as a `Retry-After` header.
    ///
    /// Input that is not a number is logged and ignored.
    pub fn set_rate_limit_from_str(&self, endpoint: &str, raw: &str) -> bool {
        match raw.trim().parse::<f64>() {
            Ok(secs) => self.set_rate_limit_data(endpoint, secs),
            Err(_) => {
                error!(endpoint, raw, "Non-numeric retry-after value, cooldown not recorded");
                false
            }
        }
    }

    /// Remaining cooldown for `endpoint`, if any.
    ///
    /// Corrupt and expired markers are deleted and reported as `None`.
    #[must_use]
    pub fn rate_limit_data(&self, endpoint: &str) -> Option<RateLimitStatus> {
        let key = Self::rate_limit_key(endpoint);
        let raw = self.read(&key)?;

        let Ok(expiry_time) = raw.trim().parse::<i64>() else {
            warn!(endpoint, raw = %raw, "Discarding corrupt rate limit marker");
            self.delete(&key);
            return None;
        };

        let status = RateLimitStatus::at(expiry_time, self.inner.clock.now_millis());
        if status.is_none() {
            debug!(endpoint, "Rate limit cooldown expired");
            self.delete(&key);
        }
        status
    }

    /// Lift the cooldown for `endpoint`.
    pub fn clear_rate_limit_data(&self, endpoint: &str) {
        self.delete(&Self::rate_limit_key(endpoint));
    }

    /// Remove every rate-limit marker.
    pub fn clear_all_rate_limit_data(&self) {
        let stored = match self.inner.store.keys() {
            Ok(stored) => stored,
            Err(e) => {
                error!(error = %e, "Failed to list session storage keys");
                return;
            }
        };

        let mut cleared = 0_usize;
        for key in stored
            .iter()
            .filter(|key| key.starts_with(keys::RATE_LIMIT_PREFIX))
        {
            self.delete(key);
            cleared += 1;
        }
        debug!(cleared, "Rate limit markers cleared");
    }
}
