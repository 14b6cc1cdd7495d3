//! Command implementations.

pub mod jobs;
pub mod notifications;
pub mod request;
pub mod session;

use std::path::Path;
use std::sync::Arc;

use placify_client::http::{ApiError, LoginRedirect};
use placify_client::{ApiClient, ClientConfig, ConfigError, FileStore, ServiceError, SessionState};
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read password: {0}")]
    Password(#[source] std::io::Error),

    #[error("Not signed in. Run `placify login` first")]
    NotSignedIn,
}

/// Login redirect for a terminal: tell the user how to sign in again.
struct CliRedirect;

impl LoginRedirect for CliRedirect {
    fn redirect_to_login(&self, login_url: &str) {
        tracing::warn!(login_url, "Session expired. Run `placify login` to sign in again");
    }
}

/// Build a client backed by the session file.
pub fn client() -> Result<ApiClient, CommandError> {
    let config = ClientConfig::from_env()?;
    let session = file_session(&config.session_file);
    let client = ApiClient::with_redirect(&config, session, Arc::new(CliRedirect))?;
    Ok(client)
}

/// Open the session file alone, for commands that never touch the network.
pub fn session_state() -> SessionState {
    file_session(&ClientConfig::session_file_from_env())
}

fn file_session(path: &Path) -> SessionState {
    tracing::debug!(session_file = %path.display(), "Using session file");
    SessionState::new(Arc::new(FileStore::new(path)))
}

/// Parse a `key=value` argument.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {raw}"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

/// Write `value` to stdout as pretty JSON.
#[allow(clippy::print_stdout)]
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CommandError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
