pub mod client;
pub mod config;
pub mod poller;

use std::sync::Arc;
use std::time::Duration;

use ed_core::{JobId, JobResults, OverlayId, Point, Session, SubmitOutcome};
use tokio::sync::mpsc::UnboundedSender;

use crate::annotator::client::JobClient;
use crate::annotator::poller::Poller;

/// Completions of background network calls, applied with [`Annotator::handle_event`].
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Submitted {
        overlay: OverlayId,
        result: Result<JobId, String>,
    },
    Polled(JobResults),
}

#[derive(Debug, Clone)]
pub struct DroppedImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Drives a [`Session`] against a job server.
///
/// All session mutations happen through `&mut self`, on whichever loop owns the
/// annotator. Submit calls and the poller run as tokio tasks and report back through
/// `events`; the owner feeds those back into [`Annotator::handle_event`].
pub struct Annotator {
    session: Session,
    client: Arc<dyn JobClient>,
    poller: Poller,
    poll_interval: Duration,
    events: UnboundedSender<SessionEvent>,
}

impl Annotator {
    pub fn new(
        session: Session,
        client: Arc<dyn JobClient>,
        poll_interval: Duration,
        events: UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            session,
            client,
            poller: Poller::default(),
            poll_interval,
            events,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_polling(&self) -> bool {
        self.poller.is_running()
    }

    /// Place each file on the canvas at `position` and submit it.
    pub fn drop_files(&mut self, files: Vec<DroppedImage>, position: Point) -> Vec<OverlayId> {
        let mut dropped = Vec::with_capacity(files.len());

        for file in files {
            let id = match self.session.drop_image(file.name, file.bytes, position) {
                Ok(id) => id,
                Err(e) => {
                    log::warn!("{}", e);
                    continue;
                }
            };

            if let Err(e) = self.submit(id) {
                log::warn!("Could not submit overlay {}: {}", id, e);
            }
            dropped.push(id);
        }

        dropped
    }

    /// Send the job for an unsubmitted overlay. The outcome arrives as [`SessionEvent::Submitted`].
    pub fn submit(&mut self, id: OverlayId) -> ed_core::Result<()> {
        let submission = self.session.begin_submission(id)?;
        let client = self.client.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let result = client
                .submit(&submission.request)
                .await
                .map_err(|e| e.to_string());

            if let Err(e) = &result {
                log::warn!("Submitting {} failed: {}", submission.name, e);
            }

            let _ = events.send(SessionEvent::Submitted {
                overlay: submission.overlay,
                result,
            });
        });

        Ok(())
    }

    pub fn delete(&mut self, id: OverlayId) -> ed_core::Result<()> {
        let deletion = self.session.delete_overlay(id)?;
        if deletion.idle {
            self.poller.stop();
        }
        Ok(())
    }

    pub fn set_parameter(&mut self, key: &str, value: f64) -> ed_core::Result<()> {
        self.session.set_parameter(key, value)
    }

    pub fn move_overlay(&mut self, id: OverlayId, dx: f32, dy: f32) -> ed_core::Result<()> {
        self.session.move_overlay(id, dx, dy)
    }

    pub fn record(&mut self, message: impl Into<String>) {
        self.session.record(message);
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Submitted { overlay, result } => {
                if let SubmitOutcome::Scheduled(_) = self.session.complete_submission(overlay, result) {
                    self.poller
                        .start(self.client.clone(), self.poll_interval, self.events.clone());
                }
            }
            SessionEvent::Polled(results) => {
                if self.session.reconcile(results).idle {
                    self.poller.stop();
                }
            }
        }
    }
}
