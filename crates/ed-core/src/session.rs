//! The annotation-job session: overlays on the canvas, the jobs they are waiting on,
//! the activity log and the detection parameters.
//!
//! Everything here is synchronous. Network calls happen elsewhere and report back
//! through [`Session::complete_submission`] and [`Session::reconcile`], which only
//! touch jobs still present in the pending set. That rule is what makes a deletion
//! racing an in-flight poll harmless.

use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

use base64::prelude::*;
use image::ImageReader;

use crate::activity::ActivityLog;
use crate::error::{Error, Result};
use crate::job::{JobId, JobRequest, JobResults, PendingJob, PendingJobSet};
use crate::overlay::{DEFAULT_MAX_DIMENSION, Overlay, OverlayId, OverlayState, Point, Size};
use crate::params::ParameterSet;

/// A job request ready to be sent for one overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub overlay: OverlayId,
    pub name: String,
    pub request: JobRequest,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The job is pending; polling has to be running.
    Scheduled(JobId),
    /// The overlay is back to unsubmitted.
    Failed,
    /// The overlay was deleted while the request was in flight.
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Deletion {
    /// The pending job dropped along with the overlay, if any.
    pub job: Option<JobId>,
    /// No jobs are pending any more.
    pub idle: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reconciliation {
    pub finished: Vec<OverlayId>,
    pub unreadable: Vec<OverlayId>,
    pub idle: bool,
}

pub struct Session {
    overlays: BTreeMap<OverlayId, Overlay>,
    next_overlay: u64,
    pending: PendingJobSet,
    log: ActivityLog,
    params: ParameterSet,
    max_dimension: f32,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(ParameterSet::detection_defaults())
    }
}

impl Session {
    pub fn new(params: ParameterSet) -> Self {
        Self {
            overlays: BTreeMap::new(),
            next_overlay: 1,
            pending: PendingJobSet::default(),
            log: ActivityLog::default(),
            params,
            max_dimension: DEFAULT_MAX_DIMENSION,
        }
    }

    pub fn with_max_dimension(mut self, max_dimension: f32) -> Self {
        self.max_dimension = max_dimension;
        self
    }

    pub fn overlays(&self) -> impl Iterator<Item = &Overlay> {
        self.overlays.values()
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.get(&id)
    }

    pub fn pending(&self) -> &PendingJobSet {
        &self.pending
    }

    pub fn log(&self) -> &ActivityLog {
        &self.log
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.params
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Append a free-form entry to the activity log.
    pub fn record(&mut self, message: impl Into<String>) {
        self.log.push(message);
    }

    /// Place a dropped image on the canvas, centred on `position`.
    pub fn drop_image(&mut self, name: impl Into<String>, bytes: Vec<u8>, position: Point) -> Result<OverlayId> {
        let name = name.into();

        let (width, height) = match image_dimensions(&bytes) {
            Ok(dims) => dims,
            Err(source) => {
                self.log.push(format!("Could not open {}", name));
                return Err(Error::ImageDecode { name, source });
            }
        };

        let id = OverlayId(self.next_overlay);
        self.next_overlay += 1;

        let size = Size::fit_within(width, height, self.max_dimension);
        log::debug!("Dropped {} ({}x{}) as overlay {}", name, width, height, id);

        self.overlays
            .insert(id, Overlay::new(id, name, position, size, Arc::from(bytes)));

        Ok(id)
    }

    /// Build the job request for an unsubmitted overlay and mark it as submitting.
    ///
    /// Parameters are copied here, so edits made while the request is in flight do
    /// not change what was sent.
    pub fn begin_submission(&mut self, id: OverlayId) -> Result<Submission> {
        let overlay = self.overlays.get_mut(&id).ok_or(Error::OverlayNotFound(id))?;

        if overlay.state != OverlayState::Unsubmitted {
            return Err(Error::InvalidState { id, state: overlay.state.label() });
        }

        overlay.state = OverlayState::Submitting;

        Ok(Submission {
            overlay: id,
            name: overlay.name.clone(),
            request: JobRequest {
                image: BASE64_STANDARD.encode(overlay.source()),
                params: self.params.snapshot(),
            },
        })
    }

    /// Apply the outcome of a submit call started by [`Session::begin_submission`].
    pub fn complete_submission(
        &mut self,
        id: OverlayId,
        outcome: std::result::Result<JobId, String>,
    ) -> SubmitOutcome {
        let Some(overlay) = self.overlays.get_mut(&id) else {
            match outcome {
                Ok(job) => log::debug!("Discarding job {} for removed overlay {}", job, id),
                Err(e) => log::debug!("Submit for removed overlay {} failed: {}", id, e),
            }
            return SubmitOutcome::Discarded;
        };

        if overlay.state != OverlayState::Submitting {
            log::warn!("Ignoring submit result for overlay {} in state {}", id, overlay.state.label());
            return SubmitOutcome::Discarded;
        }

        let job = match outcome {
            Ok(job) => job,
            Err(reason) => {
                overlay.reset();
                self.log
                    .push(format!("Failed to schedule task for {}: {}", overlay.name, reason));
                return SubmitOutcome::Failed;
            }
        };

        let pending = PendingJob { name: overlay.name.clone(), overlay: id };
        if !self.pending.insert(job.clone(), pending) {
            overlay.reset();
            self.log.push(format!(
                "Failed to schedule task for {}: job id {} is already in use",
                overlay.name, job
            ));
            return SubmitOutcome::Failed;
        }

        overlay.state = OverlayState::Pending(job.clone());
        self.log.push(format!("Scheduled task for {}", overlay.name));

        SubmitOutcome::Scheduled(job)
    }

    pub fn delete_overlay(&mut self, id: OverlayId) -> Result<Deletion> {
        let overlay = self.overlays.remove(&id).ok_or(Error::OverlayNotFound(id))?;

        let job = overlay.job_id().cloned();
        if let Some(job) = &job {
            if let Some(pending) = self.pending.remove(job) {
                self.log.push(format!("Removed task {}", pending.name));
            }
        }

        Ok(Deletion { job, idle: self.pending.is_empty() })
    }

    /// Apply a batch of completed results. Ids that are no longer pending are skipped.
    pub fn reconcile(&mut self, results: JobResults) -> Reconciliation {
        let mut outcome = Reconciliation::default();

        for (job, encoded) in results {
            let Some(pending) = self.pending.remove(&job) else {
                log::debug!("Skipping result for job {} that is not pending", job);
                continue;
            };

            let Some(overlay) = self.overlays.get_mut(&pending.overlay) else {
                // Deleting an overlay drops its pending entry, so this should not happen.
                log::warn!("Pending job {} points at missing overlay {}", job, pending.overlay);
                continue;
            };

            match BASE64_STANDARD.decode(encoded.as_bytes()) {
                Ok(bytes) => {
                    overlay.resolve(bytes);
                    self.log.push(format!("Task for {} finished", pending.name));
                    outcome.finished.push(pending.overlay);
                }
                Err(e) => {
                    log::warn!("Result for job {} is not valid base64: {}", job, e);
                    overlay.reset();
                    self.log
                        .push(format!("Task for {} returned an unreadable result", pending.name));
                    outcome.unreadable.push(pending.overlay);
                }
            }
        }

        outcome.idle = self.pending.is_empty();
        outcome
    }

    pub fn set_parameter(&mut self, key: &str, value: f64) -> Result<()> {
        self.params.set(key, value)
    }

    pub fn move_overlay(&mut self, id: OverlayId, dx: f32, dy: f32) -> Result<()> {
        let overlay = self.overlays.get_mut(&id).ok_or(Error::OverlayNotFound(id))?;
        overlay.position.x += dx;
        overlay.position.y += dy;
        Ok(())
    }
}

fn image_dimensions(bytes: &[u8]) -> image::ImageResult<(u32, u32)> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()
}
