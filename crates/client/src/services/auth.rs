//! Sign-in.

use placify_core::envelope::unwrap_data;
use placify_core::UserId;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, instrument};

use super::{LOGIN_ENDPOINT, ServiceError, ensure_not_cooling_down, settle_cooldown};
use crate::http::ApiClient;

/// Account details returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawAuthUser")]
pub struct AuthUser {
    pub id: Option<UserId>,
    pub role: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct RawAuthUser {
    #[serde(default, rename = "_id")]
    document_id: Option<UserId>,
    #[serde(default)]
    id: Option<UserId>,
    role: String,
    #[serde(default)]
    name: Option<String>,
}

impl From<RawAuthUser> for AuthUser {
    fn from(raw: RawAuthUser) -> Self {
        Self {
            id: raw.document_id.or(raw.id),
            role: raw.role,
            name: raw.name,
        }
    }
}

#[derive(Deserialize)]
struct LoginResponse {
    token: String,
    user: AuthUser,
}

/// Sign in with email and password and store the session.
///
/// The response may be flat (`{token, user}`) or wrapped in `data`.
///
/// # Errors
///
/// - `CoolingDown` if a previous attempt was rate limited and the cooldown
///   has not expired; nothing is sent.
/// - `Api` if the request fails. A 429 records the cooldown.
/// - `MalformedResponse` if the body lacks a token or user.
/// - `Session` if the token or role is empty.
#[instrument(skip(client, password))]
pub async fn login(
    client: &ApiClient,
    email: &str,
    password: &SecretString,
) -> Result<AuthUser, ServiceError> {
    let session = client.session();
    ensure_not_cooling_down(session, LOGIN_ENDPOINT)?;

    let body = json!({
        "email": email,
        "password": password.expose_secret(),
    });
    let result = client.post::<Value, _>("/auth/login", &body).await;
    let response = settle_cooldown(session, LOGIN_ENDPOINT, result)?;

    let LoginResponse { token, user } = serde_json::from_value(unwrap_data(response.data))
        .map_err(|e| ServiceError::MalformedResponse(format!("login response: {e}")))?;

    session.set_auth_data(
        &token,
        &user.role,
        user.name.as_deref(),
        user.id.as_ref().map(UserId::as_str),
    )?;

    info!(role = %user.role, "Signed in");
    Ok(user)
}
