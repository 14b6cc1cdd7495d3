//! Job postings as seen by the job board.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::JobId;
use super::id::resolve_id;

/// A job posting.
///
/// Only the fields the client acts on are typed; everything else the backend
/// sends is kept in `extra` so it can be shown or forwarded untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawJob")]
pub struct Job {
    /// Document id (`_id`, or `id` on older endpoints).
    #[serde(rename = "_id")]
    pub id: JobId,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Remaining fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawJob {
    #[serde(default, rename = "_id")]
    document_id: Option<JobId>,
    #[serde(default)]
    id: Option<JobId>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl TryFrom<RawJob> for Job {
    type Error = String;

    fn try_from(raw: RawJob) -> Result<Self, Self::Error> {
        Ok(Self {
            id: resolve_id(raw.document_id, raw.id)?,
            title: raw.title,
            company: raw.company,
            location: raw.location,
            extra: raw.extra,
        })
    }
}

/// A job together with the signed-in student's relationship to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobListing {
    pub job: Job,
    pub bookmarked: bool,
    pub applied: bool,
}
