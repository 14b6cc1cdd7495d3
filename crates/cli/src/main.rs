//! Placify CLI - drive the Placify API from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (password is read from stdin when omitted)
//! placify login -e ann@example.com
//!
//! # Who am I?
//! placify whoami
//!
//! # Browse and apply
//! placify jobs
//! placify bookmark 665f1a2b
//! placify apply 665f1a2b
//!
//! # Raw API access
//! placify get /jobs -q page=2
//! placify post /jobs -d '{"title": "Backend Intern"}'
//! placify upload /profile/resume ./cv.pdf --field resume
//!
//! # Cooldowns left by rate-limited actions
//! placify rate-limit show
//! placify rate-limit clear login
//! ```
//!
//! # Environment Variables
//!
//! - `PLACIFY_API_URL` - Base URL of the API (required)
//! - `PLACIFY_SESSION_FILE` - Where the session is kept
//! - `PLACIFY_LOG_JSON` - Emit JSON logs
//! - `RUST_LOG` - Log filter (default: `placify=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use placify_client::{ApiClient, SessionState};
use placify_client::http::Method;
use placify_core::NotificationFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "placify")]
#[command(author, version, about = "Placify command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (read from stdin if omitted)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Clear the stored session
    Logout,
    /// Show the signed-in account
    Whoami,
    /// GET an API path
    Get {
        path: String,

        /// Query parameter as key=value (repeatable)
        #[arg(short, long = "query", value_parser = commands::parse_pair)]
        query: Vec<(String, String)>,
    },
    /// POST a JSON body to an API path
    Post {
        path: String,

        /// JSON body
        #[arg(short, long)]
        data: Option<String>,
    },
    /// PATCH a JSON body to an API path
    Patch {
        path: String,

        /// JSON body
        #[arg(short, long)]
        data: Option<String>,
    },
    /// DELETE an API path
    Delete { path: String },
    /// Upload a file as multipart/form-data
    Upload {
        path: String,

        /// File to upload
        file: PathBuf,

        /// Form field name for the file
        #[arg(long, default_value = "file")]
        field: String,

        /// Extra text field as key=value (repeatable)
        #[arg(short = 'F', long = "form", value_parser = commands::parse_pair)]
        fields: Vec<(String, String)>,

        /// Send as PATCH instead of POST
        #[arg(long)]
        patch: bool,
    },
    /// List jobs with bookmark and application status
    Jobs,
    /// Apply to a job
    Apply { job_id: String },
    /// Bookmark a job
    Bookmark {
        job_id: String,

        /// Remove the bookmark instead
        #[arg(long)]
        remove: bool,
    },
    /// Show notifications
    Notifications {
        /// all, unread or read
        #[arg(short, long, default_value = "all")]
        filter: NotificationFilter,

        #[arg(short, long, default_value_t = 1)]
        page: usize,

        #[arg(long, default_value_t = 10)]
        per_page: usize,

        /// Mark this notification as read instead of listing
        #[arg(long)]
        mark_read: Option<String>,
    },
    /// Inspect or clear rate-limit cooldowns
    RateLimit {
        #[command(subcommand)]
        action: RateLimitAction,
    },
}

#[derive(Subcommand)]
enum RateLimitAction {
    /// Show active cooldowns
    Show {
        /// Endpoints to check (default: login, applications)
        endpoints: Vec<String>,
    },
    /// Clear the cooldown for one endpoint
    Clear { endpoint: String },
    /// Clear every cooldown
    ClearAll,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr so command output on stdout stays parseable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "placify=info".into());

    let json = std::env::var("PLACIFY_LOG_JSON").is_ok();
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    // Local session commands must work without an API configured
    match cli.command {
        Commands::Logout => commands::session::logout(&commands::session_state()),
        Commands::Whoami => commands::session::whoami(&commands::session_state())?,
        Commands::RateLimit { action } => rate_limit(&commands::session_state(), action)?,
        command => remote(&commands::client()?, command).await?,
    }
    Ok(())
}

async fn remote(client: &ApiClient, command: Commands) -> Result<(), commands::CommandError> {
    match command {
        Commands::Login { email, password } => {
            commands::session::login(client, &email, password).await?;
        }
        Commands::Get { path, query } => commands::request::get(client, &path, query).await?,
        Commands::Post { path, data } => {
            commands::request::send_json(client, Method::POST, &path, data).await?;
        }
        Commands::Patch { path, data } => {
            commands::request::send_json(client, Method::PATCH, &path, data).await?;
        }
        Commands::Delete { path } => commands::request::delete(client, &path).await?,
        Commands::Upload {
            path,
            file,
            field,
            fields,
            patch,
        } => {
            commands::request::upload(client, &path, &file, &field, fields, patch).await?;
        }
        Commands::Jobs => commands::jobs::list(client).await?,
        Commands::Apply { job_id } => commands::jobs::apply(client, &job_id).await?,
        Commands::Bookmark { job_id, remove } => {
            commands::jobs::bookmark(client, &job_id, remove).await?;
        }
        Commands::Notifications {
            filter,
            page,
            per_page,
            mark_read,
        } => match mark_read {
            Some(id) => commands::notifications::mark_read(client, &id).await?,
            None => commands::notifications::list(client, filter, page, per_page).await?,
        },
        Commands::Logout | Commands::Whoami | Commands::RateLimit { .. } => {
            unreachable!("handled without a client")
        }
    }
    Ok(())
}

fn rate_limit(
    session: &SessionState,
    action: RateLimitAction,
) -> Result<(), commands::CommandError> {
    match action {
        RateLimitAction::Show { endpoints } => {
            commands::session::show_rate_limits(session, &endpoints)?;
        }
        RateLimitAction::Clear { endpoint } => {
            session.clear_rate_limit_data(&endpoint);
            tracing::info!(endpoint = %endpoint, "Cooldown cleared");
        }
        RateLimitAction::ClearAll => {
            session.clear_all_rate_limit_data();
            tracing::info!("All cooldowns cleared");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_get_with_query() {
        let cli = Cli::try_parse_from(["placify", "get", "/jobs", "-q", "page=2", "-q", "q=rust"])
            .expect("parse");
        match cli.command {
            Commands::Get { path, query } => {
                assert_eq!(path, "/jobs");
                assert_eq!(
                    query,
                    vec![
                        ("page".to_owned(), "2".to_owned()),
                        ("q".to_owned(), "rust".to_owned())
                    ]
                );
            }
            _ => panic!("expected get"),
        }
    }

    #[test]
    fn test_parse_notifications_filter() {
        let cli = Cli::try_parse_from(["placify", "notifications", "-f", "unread", "-p", "3"])
            .expect("parse");
        match cli.command {
            Commands::Notifications {
                filter,
                page,
                per_page,
                mark_read,
            } => {
                assert_eq!(filter, NotificationFilter::Unread);
                assert_eq!(page, 3);
                assert_eq!(per_page, 10);
                assert!(mark_read.is_none());
            }
            _ => panic!("expected notifications"),
        }

        assert!(Cli::try_parse_from(["placify", "notifications", "-f", "archived"]).is_err());
    }

    #[test]
    fn test_parse_rate_limit_clear_all() {
        let cli = Cli::try_parse_from(["placify", "rate-limit", "clear-all"]).expect("parse");
        assert!(matches!(
            cli.command,
            Commands::RateLimit {
                action: RateLimitAction::ClearAll
            }
        ));
    }

    #[test]
    fn test_rate_limit_actions_use_session_only() {
        let session = SessionState::in_memory();
        assert!(session.set_rate_limit_data("login", 60.0));
        assert!(session.set_rate_limit_data("applications", 60.0));

        rate_limit(
            &session,
            RateLimitAction::Clear {
                endpoint: "login".to_owned(),
            },
        )
        .expect("clear");
        assert!(session.rate_limit_data("login").is_none());
        assert!(session.rate_limit_data("applications").is_some());

        rate_limit(&session, RateLimitAction::ClearAll).expect("clear all");
        assert!(session.rate_limit_data("applications").is_none());
    }

    #[test]
    fn test_whoami_without_session_is_not_signed_in() {
        let err = commands::session::whoami(&SessionState::in_memory()).expect_err("signed out");
        assert!(matches!(err, commands::CommandError::NotSignedIn));
    }
}
