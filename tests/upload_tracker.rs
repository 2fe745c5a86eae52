//! Behavior tests for the upload tracker: poll lifecycle, terminal
//! transitions, and local validation, driven against a scripted backend
//! under paused time so delays are exact.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ttt::api::types::{OngoingTask, TaskProgress};
use ttt::api::{ApiError, ProgressFn};
use ttt::upload::{
    JobEvent, JobStatus, TaskBackend, TrackerTiming, UploadLimits, UploadTracker,
};

/// One scripted answer to a progress poll.
enum Scripted {
    Progress(TaskProgress),
    NotFound,
    ServerError,
}

#[derive(Default)]
struct MockBackend {
    ongoing: Vec<OngoingTask>,
    script: Mutex<VecDeque<Scripted>>,
    upload_task_id: Option<String>,
    /// When set, uploads never resolve (used to test removal mid-upload).
    upload_hangs: bool,
    upload_calls: AtomicUsize,
    progress_calls: AtomicUsize,
    cancel_calls: AtomicUsize,
}

impl MockBackend {
    fn scripted(ongoing: Vec<OngoingTask>, script: Vec<Scripted>) -> Arc<Self> {
        Arc::new(Self {
            ongoing,
            script: Mutex::new(script.into()),
            ..Default::default()
        })
    }
}

#[async_trait]
impl TaskBackend for MockBackend {
    async fn upload(&self, _path: &Path, progress: ProgressFn) -> Result<String, ApiError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        if self.upload_hangs {
            std::future::pending::<()>().await;
        }
        progress(50);
        progress(100);
        match &self.upload_task_id {
            Some(id) => Ok(id.clone()),
            None => Err(ApiError::Api {
                status: 500,
                detail: "upload rejected".to_string(),
            }),
        }
    }

    async fn ongoing_tasks(&self) -> Result<Vec<OngoingTask>, ApiError> {
        Ok(self.ongoing.clone())
    }

    async fn task_progress(&self, _task_id: &str) -> Result<TaskProgress, ApiError> {
        self.progress_calls.fetch_add(1, Ordering::SeqCst);
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Progress(p)) => Ok(p),
            Some(Scripted::NotFound) => Err(ApiError::NotFound),
            Some(Scripted::ServerError) => Err(ApiError::Api {
                status: 500,
                detail: "internal error".to_string(),
            }),
            // Script exhausted: keep reporting mid-flight processing.
            None => Ok(progress_payload("processing", 50, None)),
        }
    }

    async fn cancel_task(&self, _task_id: &str) -> Result<(), ApiError> {
        self.cancel_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn progress_payload(status: &str, pct: u8, meeting_id: Option<i64>) -> TaskProgress {
    serde_json::from_value(serde_json::json!({
        "status": status,
        "progress_percent": pct,
        "meeting_id": meeting_id,
    }))
    .unwrap()
}

fn ongoing(task_id: &str, pct: u8) -> OngoingTask {
    serde_json::from_value(serde_json::json!({
        "task_id": task_id,
        "filename": "standup.mp3",
        "file_size": 4096,
        "status": "processing",
        "progress_percent": pct,
    }))
    .unwrap()
}

fn tracker_with(
    backend: Arc<MockBackend>,
) -> (
    UploadTracker,
    tokio::sync::mpsc::UnboundedReceiver<JobEvent>,
) {
    let limits = UploadLimits {
        max_file_size: 1024 * 1024,
        allowed_extensions: vec!["mp3".to_string(), "wav".to_string()],
    };
    UploadTracker::new(backend, limits, TrackerTiming::default())
}

fn drain(rx: &mut tokio::sync::mpsc::UnboundedReceiver<JobEvent>) -> Vec<JobEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn poll_404_removes_job_without_error_state() {
    let backend = MockBackend::scripted(vec![ongoing("t-1", 30)], vec![Scripted::NotFound]);
    let (tracker, mut rx) = tracker_with(backend.clone());

    tracker.sync_ongoing().await.unwrap();
    assert_eq!(tracker.jobs().len(), 1);

    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(tracker.jobs().is_empty(), "job should be dropped silently");
    assert!(tracker.is_settled());
    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, JobEvent::Removed { id } if id == "t-1")),
        "expected a Removed event"
    );
    assert!(
        !events.iter().any(
            |e| matches!(e, JobEvent::Updated(job) if job.status == JobStatus::Error)
        ),
        "a 404 must not surface as an error"
    );
}

#[tokio::test(start_paused = true)]
async fn poll_server_error_marks_job_failed_and_stops() {
    let backend = MockBackend::scripted(
        vec![ongoing("t-2", 10)],
        vec![
            Scripted::Progress(progress_payload("processing", 40, None)),
            Scripted::ServerError,
        ],
    );
    let (tracker, _rx) = tracker_with(backend.clone());

    tracker.sync_ongoing().await.unwrap();
    tokio::time::sleep(Duration::from_secs(60)).await;

    let jobs = tracker.jobs();
    assert_eq!(jobs.len(), 1, "failed job stays visible");
    assert_eq!(jobs[0].status, JobStatus::Error);
    assert_eq!(jobs[0].details, "Could not retrieve processing status.");

    let calls = backend.progress_calls.load(Ordering::SeqCst);
    assert_eq!(calls, 2, "polling must stop after the failure");

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(
        backend.progress_calls.load(Ordering::SeqCst),
        calls,
        "no further polls after the job failed"
    );
}

#[tokio::test(start_paused = true)]
async fn completed_task_navigates_after_fixed_delay() {
    let backend = MockBackend::scripted(
        vec![ongoing("t-3", 80)],
        vec![Scripted::Progress(progress_payload(
            "completed",
            100,
            Some(42),
        ))],
    );
    let (tracker, mut rx) = tracker_with(backend.clone());

    tracker.sync_ongoing().await.unwrap();

    // First poll fires at 2.5s; navigation is due 1.5s later.
    tokio::time::sleep(Duration::from_secs(3)).await;
    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, JobEvent::Updated(job) if job.status == JobStatus::Completed)),
        "completion should be visible before navigation"
    );
    assert!(
        !events
            .iter()
            .any(|e| matches!(e, JobEvent::Navigate { .. })),
        "navigation must wait for the delay"
    );

    tokio::time::sleep(Duration::from_secs(2)).await;
    let events = drain(&mut rx);
    assert!(
        events
            .iter()
            .any(|e| matches!(e, JobEvent::Navigate { meeting_id: 42 })),
        "expected navigation to meeting 42"
    );
    assert!(tracker.is_settled());
}

#[tokio::test(start_paused = true)]
async fn oversized_file_becomes_error_job_without_network() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("huge.mp3");
    std::fs::write(&path, vec![0u8; 2 * 1024 * 1024]).unwrap();

    let backend = MockBackend::scripted(vec![], vec![]);
    let limits = UploadLimits {
        max_file_size: 1024 * 1024,
        allowed_extensions: vec!["mp3".to_string()],
    };
    let (tracker, mut rx) = UploadTracker::new(backend.clone(), limits, TrackerTiming::default());

    tracker.handle_drop(&[path]);
    tokio::time::sleep(Duration::from_secs(5)).await;

    let jobs = tracker.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Error);
    assert!(jobs[0].details.contains("too large"), "got: {}", jobs[0].details);

    assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.progress_calls.load(Ordering::SeqCst), 0);

    let events = drain(&mut rx);
    assert_eq!(events.len(), 1, "one Updated event for the rejected job");
}

#[tokio::test(start_paused = true)]
async fn upload_swaps_id_once_then_polls_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("retro.mp3");
    std::fs::write(&path, b"audio bytes").unwrap();

    let backend = Arc::new(MockBackend {
        upload_task_id: Some("task-9".to_string()),
        script: Mutex::new(
            vec![
                Scripted::Progress(progress_payload("processing", 60, None)),
                Scripted::Progress(progress_payload("completed", 100, Some(7))),
            ]
            .into(),
        ),
        ..Default::default()
    });
    let (tracker, mut rx) = tracker_with(backend.clone());

    tracker.handle_drop(&[path]);
    tokio::time::sleep(Duration::from_secs(15)).await;

    let events = drain(&mut rx);
    let renames: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, JobEvent::Renamed { .. }))
        .collect();
    assert_eq!(renames.len(), 1, "the id must be swapped exactly once");
    assert!(
        matches!(renames[0], JobEvent::Renamed { to, .. } if to == "task-9"),
        "job takes the server task id"
    );

    let jobs = tracker.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].id, "task-9");
    assert_eq!(jobs[0].status, JobStatus::Completed);
    assert_eq!(jobs[0].progress, 100);

    assert!(
        events
            .iter()
            .any(|e| matches!(e, JobEvent::Navigate { meeting_id: 7 })),
        "completion navigates to the new meeting"
    );
    assert_eq!(backend.progress_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn failed_upload_marks_job_with_server_detail() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("call.wav");
    std::fs::write(&path, b"RIFF").unwrap();

    // upload_task_id = None makes the mock reject uploads.
    let backend = MockBackend::scripted(vec![], vec![]);
    let (tracker, _rx) = tracker_with(backend.clone());

    tracker.handle_drop(&[path]);
    tokio::time::sleep(Duration::from_secs(5)).await;

    let jobs = tracker.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Error);
    assert_eq!(jobs[0].details, "upload rejected");
    assert_eq!(
        backend.progress_calls.load(Ordering::SeqCst),
        0,
        "no polling for a job that never got a task id"
    );
}

#[tokio::test(start_paused = true)]
async fn sync_ongoing_twice_keeps_one_job_and_one_poll_loop() {
    let backend = MockBackend::scripted(vec![ongoing("t-5", 20)], vec![]);
    let (tracker, _rx) = tracker_with(backend.clone());

    tracker.sync_ongoing().await.unwrap();
    tracker.sync_ongoing().await.unwrap();
    assert_eq!(tracker.jobs().len(), 1, "duplicate tasks are merged by id");

    // A single loop polls at 2.5s and 5.0s inside a 6s window; a duplicate
    // loop would double that.
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert_eq!(backend.progress_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn remove_server_tracked_job_cancels_poll_and_deletes_remotely() {
    let backend = MockBackend::scripted(vec![ongoing("t-6", 10)], vec![]);
    let (tracker, mut rx) = tracker_with(backend.clone());

    tracker.sync_ongoing().await.unwrap();
    tracker.remove_job("t-6");

    tokio::time::sleep(Duration::from_secs(10)).await;

    assert!(tracker.jobs().is_empty());
    assert_eq!(
        backend.cancel_calls.load(Ordering::SeqCst),
        1,
        "server-tracked jobs get a best-effort remote delete"
    );
    assert_eq!(
        backend.progress_calls.load(Ordering::SeqCst),
        0,
        "poll loop was cancelled before its first tick"
    );
    assert!(drain(&mut rx)
        .iter()
        .any(|e| matches!(e, JobEvent::Removed { id } if id == "t-6")));
}

#[tokio::test(start_paused = true)]
async fn remove_uploading_job_skips_remote_delete() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("long.mp3");
    std::fs::write(&path, b"audio").unwrap();

    let backend = Arc::new(MockBackend {
        upload_hangs: true,
        ..Default::default()
    });
    let (tracker, _rx) = tracker_with(backend.clone());

    tracker.handle_drop(&[path]);
    tokio::time::sleep(Duration::from_millis(100)).await;

    let jobs = tracker.jobs();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].status, JobStatus::Uploading);

    tracker.remove_job(&jobs[0].id);
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert!(tracker.jobs().is_empty());
    assert_eq!(
        backend.cancel_calls.load(Ordering::SeqCst),
        0,
        "the server never knew about this job"
    );
}
