//! Upload task lifecycle: job model, tracker, progress smoothing, and the
//! backend seam the tracker polls through.

pub mod backend;
pub mod job;
pub mod smoother;
pub mod tracker;

pub use backend::{ApiTaskBackend, TaskBackend};
pub use job::{FileRef, JobStatus, UploadJob, UploadLimits};
pub use smoother::ProgressSmoother;
pub use tracker::{JobEvent, TrackerTiming, UploadTracker};
