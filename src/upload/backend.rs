//! Backend seam for the upload tracker.
//!
//! The tracker talks to the task endpoints through this trait so tests can
//! script responses and count calls without a server.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::api::types::{OngoingTask, TaskProgress};
use crate::api::{ApiClient, ApiError, ProgressFn};

#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Upload a recording, reporting byte progress, and return the server
    /// task id.
    async fn upload(&self, path: &Path, progress: ProgressFn) -> Result<String, ApiError>;

    /// Tasks the server is still processing for this user.
    async fn ongoing_tasks(&self) -> Result<Vec<OngoingTask>, ApiError>;

    /// Current processing status of one task.
    async fn task_progress(&self, task_id: &str) -> Result<TaskProgress, ApiError>;

    /// Cancel/clean up a task server-side.
    async fn cancel_task(&self, task_id: &str) -> Result<(), ApiError>;
}

/// Production backend: the REST API.
pub struct ApiTaskBackend {
    client: Arc<ApiClient>,
}

impl ApiTaskBackend {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TaskBackend for ApiTaskBackend {
    async fn upload(&self, path: &Path, progress: ProgressFn) -> Result<String, ApiError> {
        let response = self.client.upload_audio(path, Some(progress)).await?;
        Ok(response.task_id)
    }

    async fn ongoing_tasks(&self) -> Result<Vec<OngoingTask>, ApiError> {
        self.client.ongoing_tasks().await
    }

    async fn task_progress(&self, task_id: &str) -> Result<TaskProgress, ApiError> {
        self.client.task_progress(task_id).await
    }

    async fn cancel_task(&self, task_id: &str) -> Result<(), ApiError> {
        self.client.delete_task(task_id).await
    }
}
