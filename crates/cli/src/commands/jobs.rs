//! Job board commands.

use placify_client::ApiClient;
use placify_client::services::jobs::JobBoard;
use placify_core::JobId;

use super::{CommandError, print_json};

/// Print every job with bookmark and application flags.
pub async fn list(client: &ApiClient) -> Result<(), CommandError> {
    let listings = JobBoard::new(client.clone()).load().await?;
    tracing::info!(count = listings.len(), "Jobs loaded");
    print_json(&listings)
}

pub async fn apply(client: &ApiClient, job_id: &str) -> Result<(), CommandError> {
    let application = JobBoard::new(client.clone())
        .apply(&JobId::new(job_id))
        .await?;
    print_json(&application)
}

pub async fn bookmark(client: &ApiClient, job_id: &str, remove: bool) -> Result<(), CommandError> {
    let bookmarked = JobBoard::new(client.clone())
        .toggle_bookmark(&JobId::new(job_id), remove)
        .await?;
    tracing::info!(job_id, bookmarked, "Bookmark updated");
    Ok(())
}
