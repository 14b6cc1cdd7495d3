//! Notification commands.

use placify_client::ApiClient;
use placify_client::services::notifications::NotificationFeed;
use placify_core::{NotificationFilter, NotificationId};

use super::{CommandError, print_json};

/// Print one page of notifications.
pub async fn list(
    client: &ApiClient,
    filter: NotificationFilter,
    page: usize,
    per_page: usize,
) -> Result<(), CommandError> {
    let page = NotificationFeed::new(client.clone())
        .with_per_page(per_page)
        .page(filter, page)
        .await?;
    print_json(&page)
}

pub async fn mark_read(client: &ApiClient, id: &str) -> Result<(), CommandError> {
    NotificationFeed::new(client.clone())
        .mark_read(&NotificationId::new(id))
        .await?;
    tracing::info!(id, "Notification marked as read");
    Ok(())
}
