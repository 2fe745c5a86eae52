//! Upload task tracker.
//!
//! Owns the set of in-flight upload/processing jobs and drives their
//! transitions: validate → upload → poll → complete/error. Each job gets at
//! most one polling loop, held as a cancellable task in a map keyed by job
//! id. Jobs are independent; state updates are last-write-wins per id, and an
//! overlapping poll tick costs at most a stale render.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::backend::TaskBackend;
use super::job::{default_details, JobStatus, UploadJob, UploadLimits};
use crate::api::{ApiError, ProgressFn};

/// Notifications for whoever renders the job list.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// A job was created or changed; carries a full snapshot.
    Updated(UploadJob),
    /// The temporary client id was swapped for the server task id.
    Renamed { from: String, to: String },
    /// The job left the visible list (user removal or server-side cleanup).
    Removed { id: String },
    /// Processing finished; the meeting detail view should open.
    Navigate { meeting_id: i64 },
}

/// Fixed delays of the lifecycle.
#[derive(Debug, Clone)]
pub struct TrackerTiming {
    /// Interval between status polls.
    pub poll_interval: Duration,
    /// Pause between upload completion and the first poll.
    pub post_upload_delay: Duration,
    /// Pause between a completed status and the navigation event.
    pub navigate_delay: Duration,
}

impl Default for TrackerTiming {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2500),
            post_upload_delay: Duration::from_millis(1000),
            navigate_delay: Duration::from_millis(1500),
        }
    }
}

impl TrackerTiming {
    pub fn from_config(upload: &crate::config::UploadConfig) -> Self {
        Self {
            poll_interval: upload.poll_interval(),
            post_upload_delay: upload.post_upload_delay(),
            navigate_delay: upload.navigate_delay(),
        }
    }
}

struct PollHandle {
    cancel: CancellationToken,
}

struct Inner {
    backend: Arc<dyn TaskBackend>,
    limits: UploadLimits,
    timing: TrackerTiming,
    jobs: Mutex<Vec<UploadJob>>,
    polls: Mutex<HashMap<String, PollHandle>>,
    events: mpsc::UnboundedSender<JobEvent>,
}

pub struct UploadTracker {
    inner: Arc<Inner>,
}

impl UploadTracker {
    pub fn new(
        backend: Arc<dyn TaskBackend>,
        limits: UploadLimits,
        timing: TrackerTiming,
    ) -> (Self, mpsc::UnboundedReceiver<JobEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let tracker = Self {
            inner: Arc::new(Inner {
                backend,
                limits,
                timing,
                jobs: Mutex::new(Vec::new()),
                polls: Mutex::new(HashMap::new()),
                events,
            }),
        };
        (tracker, rx)
    }

    /// Discover tasks the server is still processing, typically left over
    /// from an earlier invocation, and start tracking any not already known.
    pub async fn sync_ongoing(&self) -> Result<(), ApiError> {
        let tasks = self.inner.backend.ongoing_tasks().await?;
        info!("Found {} ongoing task(s) on the server", tasks.len());

        for task in &tasks {
            let job = {
                let mut jobs = self.inner.jobs.lock().unwrap();
                if jobs.iter().any(|j| j.id == task.task_id) {
                    continue;
                }
                let job = UploadJob::from_ongoing(task);
                jobs.push(job.clone());
                job
            };
            self.inner.emit(JobEvent::Updated(job));
            self.inner
                .start_poll(task.task_id.clone(), self.inner.timing.poll_interval);
        }

        Ok(())
    }

    /// Accept a batch of dropped files. Files failing the size/type checks
    /// become error jobs immediately, without touching the network.
    pub fn handle_drop(&self, paths: &[PathBuf]) {
        for path in paths {
            match self.inner.limits.validate(path) {
                Ok(file) => {
                    let job = UploadJob::uploading(file);
                    let id = job.id.clone();
                    self.inner.jobs.lock().unwrap().push(job.clone());
                    self.inner.emit(JobEvent::Updated(job));
                    Inner::spawn_upload(self.inner.clone(), id, path.clone());
                }
                Err(reason) => {
                    debug!("Rejected {:?}: {}", path, reason);
                    let file = super::job::FileRef::local(
                        path,
                        std::fs::metadata(path).map(|m| m.len()).unwrap_or(0),
                    );
                    let job = UploadJob::rejected(file, reason);
                    self.inner.jobs.lock().unwrap().push(job.clone());
                    self.inner.emit(JobEvent::Updated(job));
                }
            }
        }
    }

    /// Remove a job locally at once. If the server still owns a task record
    /// for it, also ask the backend to cancel; that part is best effort,
    /// failures are logged and swallowed.
    pub fn remove_job(&self, id: &str) {
        let removed = {
            let mut jobs = self.inner.jobs.lock().unwrap();
            let position = jobs.iter().position(|j| j.id == id);
            position.map(|i| jobs.remove(i))
        };

        let Some(job) = removed else {
            return;
        };

        if let Some(handle) = self.inner.polls.lock().unwrap().remove(id) {
            handle.cancel.cancel();
        }
        self.inner.emit(JobEvent::Removed {
            id: id.to_string(),
        });

        if job.status.is_server_tracked() {
            let backend = self.inner.backend.clone();
            let task_id = id.to_string();
            tokio::spawn(async move {
                if let Err(e) = backend.cancel_task(&task_id).await {
                    warn!("Best-effort cancel of task {} failed: {}", task_id, e);
                }
            });
        }
    }

    /// Snapshot of the visible job list.
    pub fn jobs(&self) -> Vec<UploadJob> {
        self.inner.jobs.lock().unwrap().clone()
    }

    /// True when nothing is still uploading, polling, or waiting to navigate.
    pub fn is_settled(&self) -> bool {
        let active_jobs = self
            .inner
            .jobs
            .lock()
            .unwrap()
            .iter()
            .any(|j| !j.status.is_terminal());
        !active_jobs && self.inner.polls.lock().unwrap().is_empty()
    }

    /// Cancel every poll loop. The unmount path; in-flight requests are not
    /// aborted, their loops just stop at the next cancellation point.
    pub fn shutdown(&self) {
        let mut polls = self.inner.polls.lock().unwrap();
        for (_, handle) in polls.drain() {
            handle.cancel.cancel();
        }
    }
}

impl Inner {
    fn emit(&self, event: JobEvent) {
        // Receiver gone means the UI went away; nothing left to notify.
        let _ = self.events.send(event);
    }

    fn set_upload_progress(&self, id: &str, pct: u8) {
        let updated = {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.iter_mut()
                .find(|j| j.id == id && j.status == JobStatus::Uploading)
                .and_then(|job| {
                    let pct = pct.min(100);
                    if job.progress == pct {
                        return None;
                    }
                    job.progress = pct;
                    Some(job.clone())
                })
        };
        if let Some(job) = updated {
            self.emit(JobEvent::Updated(job));
        }
    }

    /// Swap the temporary client id for the server task id. Happens exactly
    /// once per job, at the uploading → pending transition.
    fn promote(&self, temp_id: &str, task_id: &str) {
        let promoted = {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.iter_mut().find(|j| j.id == temp_id).map(|job| {
                job.id = task_id.to_string();
                job.status = JobStatus::Pending;
                job.details = default_details(JobStatus::Pending);
                job.clone()
            })
        };
        if let Some(job) = promoted {
            self.emit(JobEvent::Renamed {
                from: temp_id.to_string(),
                to: task_id.to_string(),
            });
            self.emit(JobEvent::Updated(job));
        }
    }

    fn fail_job(&self, id: &str, detail: &str) {
        let failed = {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.iter_mut().find(|j| j.id == id).map(|job| {
                job.status = JobStatus::Error;
                job.details = detail.to_string();
                job.clone()
            })
        };
        if let Some(job) = failed {
            self.emit(JobEvent::Updated(job));
        }
    }

    fn apply_progress(
        &self,
        id: &str,
        status: JobStatus,
        progress: u8,
        details: Option<String>,
    ) {
        let updated = {
            let mut jobs = self.jobs.lock().unwrap();
            jobs.iter_mut().find(|j| j.id == id).map(|job| {
                job.status = status;
                job.progress = progress.min(100);
                job.details = details.unwrap_or_else(|| default_details(status));
                job.clone()
            })
        };
        if let Some(job) = updated {
            self.emit(JobEvent::Updated(job));
        }
    }

    /// Drop a job without an error state; used when the server reports 404
    /// for its task, the expected outcome of server-side cleanup.
    fn remove_silently(&self, id: &str) {
        let removed = {
            let mut jobs = self.jobs.lock().unwrap();
            let position = jobs.iter().position(|j| j.id == id);
            position.map(|i| jobs.remove(i))
        };
        if removed.is_some() {
            self.emit(JobEvent::Removed {
                id: id.to_string(),
            });
        }
    }

    fn spawn_upload(inner: Arc<Inner>, temp_id: String, path: PathBuf) {
        tokio::spawn(async move {
            Self::run_upload(inner, temp_id, &path).await;
        });
    }

    async fn run_upload(inner: Arc<Inner>, temp_id: String, path: &Path) {
        let progress: ProgressFn = {
            let inner = inner.clone();
            let id = temp_id.clone();
            Arc::new(move |pct| inner.set_upload_progress(&id, pct))
        };

        match inner.backend.upload(path, progress).await {
            Ok(task_id) => {
                info!("Upload of {:?} accepted as task {}", path, task_id);
                inner.promote(&temp_id, &task_id);
                inner.start_poll(task_id, inner.timing.post_upload_delay);
            }
            Err(err) => {
                warn!("Upload of {:?} failed: {}", path, err);
                inner.fail_job(&temp_id, &err.user_detail("Upload failed. Please try again."));
            }
        }
    }

    /// Start the poll loop for a task unless one is already running.
    fn start_poll(self: &Arc<Self>, task_id: String, initial_delay: Duration) {
        let cancel = {
            let mut polls = self.polls.lock().unwrap();
            if polls.contains_key(&task_id) {
                return;
            }
            let cancel = CancellationToken::new();
            polls.insert(
                task_id.clone(),
                PollHandle {
                    cancel: cancel.clone(),
                },
            );
            cancel
        };

        let inner = self.clone();
        tokio::spawn(async move {
            inner.poll_loop(&task_id, cancel, initial_delay).await;
            inner.polls.lock().unwrap().remove(&task_id);
        });
    }

    async fn poll_loop(&self, task_id: &str, cancel: CancellationToken, initial_delay: Duration) {
        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = sleep(initial_delay) => {}
        }

        loop {
            match self.backend.task_progress(task_id).await {
                Err(ApiError::NotFound) => {
                    // Task gone server-side: another poll or the server
                    // already finalized it. Not an error.
                    debug!("Task {} no longer exists, dropping job", task_id);
                    self.remove_silently(task_id);
                    return;
                }
                Err(err) => {
                    warn!("Progress poll for task {} failed: {}", task_id, err);
                    self.fail_job(task_id, "Could not retrieve processing status.");
                    return;
                }
                Ok(progress) => {
                    let status = JobStatus::from_wire(&progress.status);
                    self.apply_progress(
                        task_id,
                        status,
                        progress.progress_percent,
                        progress.details.clone(),
                    );

                    match status {
                        JobStatus::Completed => {
                            // Give the 100% state a moment before navigating.
                            tokio::select! {
                                _ = cancel.cancelled() => {}
                                _ = sleep(self.timing.navigate_delay) => {
                                    match progress.meeting_id {
                                        Some(meeting_id) => {
                                            self.emit(JobEvent::Navigate { meeting_id });
                                        }
                                        None => warn!(
                                            "Task {} completed without a meeting id",
                                            task_id
                                        ),
                                    }
                                }
                            }
                            return;
                        }
                        JobStatus::Error => {
                            // Server failure message stays visible until the
                            // user dismisses the job.
                            return;
                        }
                        _ => {}
                    }
                }
            }

            tokio::select! {
                _ = cancel.cancelled() => return,
                _ = sleep(self.timing.poll_interval) => {}
            }
        }
    }
}
