//! Notification feed with client-side filtering and pagination.

use placify_core::envelope::extract_list;
use placify_core::{Notification, NotificationFilter, NotificationId, Page};
use serde_json::{Value, json};
use tracing::instrument;

use super::{ServiceError, path_segment};
use crate::http::ApiClient;

/// Notifications shown per page unless configured otherwise.
pub const DEFAULT_PER_PAGE: usize = 10;

/// Notification feed for the signed-in user.
#[derive(Debug, Clone)]
pub struct NotificationFeed {
    client: ApiClient,
    per_page: usize,
}

impl NotificationFeed {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            per_page: DEFAULT_PER_PAGE,
        }
    }

    #[must_use]
    pub const fn with_per_page(mut self, per_page: usize) -> Self {
        self.per_page = per_page;
        self
    }

    /// Fetch every notification.
    ///
    /// # Errors
    ///
    /// Returns `Api` if the request fails, or `Envelope` if the list is missing.
    #[instrument(skip(self))]
    pub async fn fetch(&self) -> Result<Vec<Notification>, ServiceError> {
        let response = self.client.get::<Value>("/notifications").await?;
        Ok(extract_list(response.data, "notifications")?)
    }

    /// Fetch, filter, and return one page.
    ///
    /// # Errors
    ///
    /// Same as [`NotificationFeed::fetch`].
    pub async fn page(
        &self,
        filter: NotificationFilter,
        page: usize,
    ) -> Result<Page<Notification>, ServiceError> {
        let all = self.fetch().await?;
        Ok(select(all, filter, page, self.per_page))
    }

    /// Mark one notification as read.
    ///
    /// # Errors
    ///
    /// Returns `Api` if the request fails.
    #[instrument(skip(self, id), fields(id = %id))]
    pub async fn mark_read(&self, id: &NotificationId) -> Result<(), ServiceError> {
        let path = format!("/notifications/{}/read", path_segment(id.as_str()));
        self.client.patch::<Value, _>(&path, &json!({})).await?;
        Ok(())
    }
}

/// Filter then paginate.
#[must_use]
pub fn select(
    notifications: Vec<Notification>,
    filter: NotificationFilter,
    page: usize,
    per_page: usize,
) -> Page<Notification> {
    let matching = notifications
        .into_iter()
        .filter(|n| filter.matches(n))
        .collect();
    Page::paginate(matching, page, per_page)
}
