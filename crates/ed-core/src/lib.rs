pub mod activity;
pub mod error;
pub mod job;
pub mod overlay;
pub mod params;
pub mod session;

pub use activity::{ActivityLog, LogEntry};
pub use error::{Error, Result};
pub use job::{JobCreated, JobId, JobRequest, JobResults, PendingJob, PendingJobSet, job_path};
pub use overlay::{Overlay, OverlayId, OverlayState, Point, Size};
pub use params::{ParamSnapshot, Parameter, ParameterSet};
pub use session::{Deletion, Reconciliation, Session, Submission, SubmitOutcome};
