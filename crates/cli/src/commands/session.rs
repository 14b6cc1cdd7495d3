//! Session commands: sign in, sign out, identity, cooldowns.

use std::io::BufRead;

use placify_client::{ApiClient, SessionState};
use placify_client::services::{APPLICATIONS_ENDPOINT, LOGIN_ENDPOINT, auth};
use secrecy::SecretString;
use serde_json::json;

use super::{CommandError, print_json};

/// Sign in, reading the password from stdin when not given.
pub async fn login(
    client: &ApiClient,
    email: &str,
    password: Option<String>,
) -> Result<(), CommandError> {
    let password = match password {
        Some(password) => SecretString::from(password),
        None => read_password()?,
    };

    let user = auth::login(client, email, &password).await?;
    tracing::info!(email, role = %user.role, "Signed in");
    Ok(())
}

#[allow(clippy::print_stderr)]
fn read_password() -> Result<SecretString, CommandError> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(CommandError::Password)?;
    Ok(SecretString::from(line.trim_end_matches(['\r', '\n']).to_owned()))
}

pub fn logout(session: &SessionState) {
    session.logout();
    tracing::info!("Signed out");
}

/// Print the signed-in account.
pub fn whoami(session: &SessionState) -> Result<(), CommandError> {
    if !session.is_logged_in() {
        return Err(CommandError::NotSignedIn);
    }

    print_json(&json!({
        "role": session.role(),
        "name": session.name(),
        "userId": session.user_id(),
    }))
}

/// Print active cooldowns for `endpoints` (login and applications if empty).
pub fn show_rate_limits(
    session: &SessionState,
    endpoints: &[String],
) -> Result<(), CommandError> {
    let defaults = [LOGIN_ENDPOINT.to_owned(), APPLICATIONS_ENDPOINT.to_owned()];
    let endpoints = if endpoints.is_empty() {
        defaults.as_slice()
    } else {
        endpoints
    };

    let active: serde_json::Map<String, serde_json::Value> = endpoints
        .iter()
        .filter_map(|endpoint| {
            let status = session.rate_limit_data(endpoint)?;
            Some((endpoint.clone(), json!(status)))
        })
        .collect();

    print_json(&active)
}
