use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::overlay::OverlayId;
use crate::params::ParamSnapshot;

/// Server-assigned token correlating a submitted job with its result.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Body of `POST job`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Base64 of the dropped file's bytes.
    pub image: String,
    #[serde(serialize_with = "crate::params::serialize_snapshot")]
    pub params: ParamSnapshot,
}

/// Response of `POST job`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCreated {
    pub id: JobId,
}

/// Response of `GET job`: job id -> base64 PNG, ordered by id.
pub type JobResults = BTreeMap<JobId, String>;

/// Path of the job endpoint under a page URL prefix, e.g. `/user/ana/` -> `/user/ana/job`.
pub fn job_path(url_prefix: &str) -> String {
    let trimmed = url_prefix.trim_matches('/');
    if trimmed.is_empty() {
        "/job".to_string()
    } else {
        format!("/{}/job", trimmed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingJob {
    pub name: String,
    pub overlay: OverlayId,
}

/// Submitted jobs that have no result yet.
#[derive(Debug, Clone, Default)]
pub struct PendingJobSet {
    jobs: HashMap<JobId, PendingJob>,
}

impl PendingJobSet {
    /// Returns false, leaving the set untouched, when `id` is already pending.
    pub fn insert(&mut self, id: JobId, job: PendingJob) -> bool {
        if self.jobs.contains_key(&id) {
            return false;
        }
        self.jobs.insert(id, job);
        true
    }

    pub fn remove(&mut self, id: &JobId) -> Option<PendingJob> {
        self.jobs.remove(id)
    }

    pub fn get(&self, id: &JobId) -> Option<&PendingJob> {
        self.jobs.get(id)
    }

    pub fn contains(&self, id: &JobId) -> bool {
        self.jobs.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&JobId, &PendingJob)> {
        self.jobs.iter()
    }
}
