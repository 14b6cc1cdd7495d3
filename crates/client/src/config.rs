//! Client configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PLACIFY_API_URL` - Base URL of the Placify API (e.g. `https://api.example.com/api`)
//!
//! ## Optional
//! - `PLACIFY_TIMEOUT_SECS` - Request timeout in seconds (default: 10)
//! - `PLACIFY_LOGIN_PATH` - Login entry point used when a session expires (default: `/login`)
//! - `PLACIFY_SESSION_FILE` - Session file (default: `$HOME/.placify/session.json`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default login entry point.
pub const DEFAULT_LOGIN_PATH: &str = "/login";

const SESSION_DIR: &str = ".placify";
const SESSION_FILE: &str = "session.json";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Placify client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every request path is appended to.
    pub base_url: Url,
    /// Upper bound for a whole request, connect to last byte.
    pub timeout: Duration,
    /// Where users are sent when their session is no longer valid.
    pub login_path: String,
    /// Persistent session file.
    pub session_file: PathBuf,
}

impl ClientConfig {
    /// Build a configuration for `base_url` with default settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an http(s) URL.
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            login_path: DEFAULT_LOGIN_PATH.to_owned(),
            session_file: default_session_file(None),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value is
    /// invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`ClientConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base_url = lookup("PLACIFY_API_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("PLACIFY_API_URL".to_owned()))?;
        let base_url = parse_base_url(&base_url)?;

        let timeout = match lookup("PLACIFY_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|e| {
                    ConfigError::InvalidEnvVar("PLACIFY_TIMEOUT_SECS".to_owned(), format!("{e}"))
                })?;
                if secs == 0 {
                    return Err(ConfigError::InvalidEnvVar(
                        "PLACIFY_TIMEOUT_SECS".to_owned(),
                        "must be greater than zero".to_owned(),
                    ));
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let login_path = lookup("PLACIFY_LOGIN_PATH")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOGIN_PATH.to_owned());

        let session_file = Self::session_file_from_lookup(&lookup);

        Ok(Self {
            base_url,
            timeout,
            login_path,
            session_file,
        })
    }

    /// Session file location from the environment.
    ///
    /// Needs neither `PLACIFY_API_URL` nor any other setting, so local
    /// session commands work without an API configured.
    #[must_use]
    pub fn session_file_from_env() -> PathBuf {
        Self::session_file_from_lookup(|key| std::env::var(key).ok())
    }

    /// Session file location through an arbitrary variable lookup.
    #[must_use]
    pub fn session_file_from_lookup(lookup: impl Fn(&str) -> Option<String>) -> PathBuf {
        lookup("PLACIFY_SESSION_FILE")
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| default_session_file(lookup("HOME")), PathBuf::from)
    }

    /// Absolute URL of the login entry point.
    #[must_use]
    pub fn login_url(&self) -> String {
        let origin = self.base_url.origin().ascii_serialization();
        if self.login_path.starts_with('/') {
            format!("{origin}{}", self.login_path)
        } else {
            format!("{origin}/{}", self.login_path)
        }
    }
}

fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidEnvVar("PLACIFY_API_URL".to_owned(), reason);

    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme {}", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_owned()));
    }
    Ok(url)
}

fn default_session_file(home: Option<String>) -> PathBuf {
    home.or_else(|| std::env::var("HOME").ok())
        .map_or_else(PathBuf::new, PathBuf::from)
        .join(SESSION_DIR)
        .join(SESSION_FILE)
}
