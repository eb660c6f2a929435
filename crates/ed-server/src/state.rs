use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use ed_core::{JobId, JobResults};

pub struct JobState {
    completed: Mutex<JobResults>,
    pub annotate_delay: Duration,
}

impl JobState {
    pub fn new(annotate_delay: Duration) -> Self {
        Self {
            completed: Mutex::new(JobResults::new()),
            annotate_delay,
        }
    }

    pub fn complete(&self, id: JobId, encoded: String) {
        self.completed().insert(id, encoded);
    }

    /// Take every finished result; each is handed out exactly once.
    pub fn drain(&self) -> JobResults {
        std::mem::take(&mut *self.completed())
    }

    fn completed(&self) -> MutexGuard<'_, JobResults> {
        self.completed.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
