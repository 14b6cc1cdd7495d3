//! Job board: listings merged with the student's bookmarks and applications.

use std::collections::HashSet;

use placify_core::envelope::{extract_list, list_value, unwrap_data};
use placify_core::{Job, JobId, JobListing, Role};
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use super::{
    APPLICATIONS_ENDPOINT, ServiceError, ensure_not_cooling_down, path_segment, settle_cooldown,
};
use crate::http::ApiClient;

/// Job board for the signed-in user.
#[derive(Debug, Clone)]
pub struct JobBoard {
    client: ApiClient,
}

impl JobBoard {
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Load all jobs, marking the ones the student bookmarked or applied to.
    ///
    /// For students the three lists are fetched concurrently; any failure
    /// fails the whole load. Other roles get plain listings.
    ///
    /// # Errors
    ///
    /// Returns `Api` if a fetch fails, or `Envelope` if a list is missing.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<Vec<JobListing>, ServiceError> {
        let client = &self.client;

        if client.session().current_role() != Some(Role::Student) {
            let jobs = client.get::<Value>("/jobs").await?;
            let jobs = extract_list::<Job>(jobs.data, "jobs")?;
            return Ok(merge(jobs, &HashSet::new(), &HashSet::new()));
        }

        let (jobs, bookmarks, applications) = tokio::try_join!(
            client.get::<Value>("/jobs"),
            client.get::<Value>("/bookmarks"),
            client.get::<Value>("/applications"),
        )?;

        let jobs = extract_list::<Job>(jobs.data, "jobs")?;
        let bookmarked = job_refs(&list_value(bookmarks.data, "bookmarks")?);
        let applied = job_refs(&list_value(applications.data, "applications")?);
        debug!(
            jobs = jobs.len(),
            bookmarked = bookmarked.len(),
            applied = applied.len(),
            "Job board loaded"
        );

        Ok(merge(jobs, &bookmarked, &applied))
    }

    /// Add or remove a bookmark. Returns the new bookmark state.
    ///
    /// # Errors
    ///
    /// Returns `Api` if the request fails.
    #[instrument(skip(self, job_id), fields(job_id = %job_id))]
    pub async fn toggle_bookmark(
        &self,
        job_id: &JobId,
        currently_bookmarked: bool,
    ) -> Result<bool, ServiceError> {
        let path = format!("/bookmarks/{}", path_segment(job_id.as_str()));
        if currently_bookmarked {
            self.client.delete::<Value>(&path).await?;
        } else {
            self.client.post::<Value, _>(&path, &json!({})).await?;
        }
        Ok(!currently_bookmarked)
    }

    /// Apply to a job.
    ///
    /// Shares the `applications` cooldown: refused locally while a previous
    /// 429 is cooling down.
    ///
    /// # Errors
    ///
    /// Returns `CoolingDown` without sending, or `Api` if the request fails.
    #[instrument(skip(self, job_id), fields(job_id = %job_id))]
    pub async fn apply(&self, job_id: &JobId) -> Result<Value, ServiceError> {
        let session = self.client.session();
        ensure_not_cooling_down(session, APPLICATIONS_ENDPOINT)?;

        let path = format!("/applications/{}", path_segment(job_id.as_str()));
        let result = self.client.post::<Value, _>(&path, &json!({})).await;
        let response = settle_cooldown(session, APPLICATIONS_ENDPOINT, result)?;

        info!("Application submitted");
        Ok(unwrap_data(response.data))
    }
}

/// Mark each job as bookmarked or applied.
#[must_use]
pub fn merge(
    jobs: Vec<Job>,
    bookmarked: &HashSet<String>,
    applied: &HashSet<String>,
) -> Vec<JobListing> {
    jobs.into_iter()
        .map(|job| JobListing {
            bookmarked: bookmarked.contains(job.id.as_str()),
            applied: applied.contains(job.id.as_str()),
            job,
        })
        .collect()
}

fn job_refs(items: &[Value]) -> HashSet<String> {
    items.iter().filter_map(job_ref).collect()
}

/// Job id referenced by a bookmark or application record.
///
/// Records come as a bare id, `{jobId}`, `{job: id}`, `{job: {_id}}`, or the
/// job document itself.
fn job_ref(item: &Value) -> Option<String> {
    match item {
        Value::String(id) => Some(id.clone()),
        Value::Object(map) => {
            for key in ["jobId", "job"] {
                match map.get(key) {
                    Some(Value::String(id)) => return Some(id.clone()),
                    Some(nested @ Value::Object(_)) => return document_id(nested),
                    _ => {}
                }
            }
            document_id(item)
        }
        _ => None,
    }
}

fn document_id(value: &Value) -> Option<String> {
    ["_id", "id"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}
