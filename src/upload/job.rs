//! Client-side upload job model.
//!
//! Jobs are ephemeral: created when a file is dropped or when an already
//! running task is discovered on startup, mutated by upload callbacks and
//! poll responses, gone when the user removes them or navigates away.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a job reached in its upload-to-notes lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Uploading,
    Pending,
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uploading => "uploading",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Map a server status string. Unknown non-terminal strings are shown as
    /// `processing` rather than failing the job.
    pub fn from_wire(status: &str) -> Self {
        match status {
            "pending" => Self::Pending,
            "processing" => Self::Processing,
            "completed" => Self::Completed,
            "error" => Self::Error,
            _ => Self::Processing,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// True while the server still owns a task record for this job, meaning
    /// removal should also ask the backend to cancel it.
    pub fn is_server_tracked(&self) -> bool {
        matches!(self, Self::Pending | Self::Processing)
    }
}

/// The file behind a job: a real local file for fresh uploads, or just a
/// name/size descriptor for tasks discovered already in progress.
#[derive(Debug, Clone)]
pub struct FileRef {
    pub name: String,
    pub size: u64,
    pub path: Option<PathBuf>,
}

impl FileRef {
    pub fn local(path: &Path, size: u64) -> Self {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("recording")
            .to_string();
        Self {
            name,
            size,
            path: Some(path.to_path_buf()),
        }
    }

    pub fn remote(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            path: None,
        }
    }
}

/// One tracked upload/processing job.
#[derive(Debug, Clone)]
pub struct UploadJob {
    /// Temporary client id until the server assigns a task id; swapped
    /// exactly once at the uploading → pending transition.
    pub id: String,
    pub file: FileRef,
    pub status: JobStatus,
    pub progress: u8,
    pub details: String,
}

impl UploadJob {
    pub fn uploading(file: FileRef) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file,
            status: JobStatus::Uploading,
            progress: 0,
            details: "Uploading...".to_string(),
        }
    }

    /// Synthetic job for a file rejected before any network call.
    pub fn rejected(file: FileRef, reason: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            file,
            status: JobStatus::Error,
            progress: 0,
            details: reason.into(),
        }
    }

    /// Job seeded from a task the server reports as already in flight.
    pub fn from_ongoing(task: &crate::api::types::OngoingTask) -> Self {
        let status = JobStatus::from_wire(&task.status);
        Self {
            id: task.task_id.clone(),
            file: FileRef::remote(&task.filename, task.file_size.unwrap_or(0)),
            status,
            progress: task.progress_percent.min(100),
            details: task
                .details
                .clone()
                .unwrap_or_else(|| default_details(status)),
        }
    }
}

/// Client-side acceptance rules, checked before any network call.
#[derive(Debug, Clone)]
pub struct UploadLimits {
    pub max_file_size: u64,
    pub allowed_extensions: Vec<String>,
}

impl Default for UploadLimits {
    fn default() -> Self {
        let upload = crate::config::UploadConfig::default();
        Self {
            max_file_size: upload.max_file_size_bytes(),
            allowed_extensions: upload.allowed_extensions,
        }
    }
}

impl UploadLimits {
    pub fn from_config(upload: &crate::config::UploadConfig) -> Self {
        Self {
            max_file_size: upload.max_file_size_bytes(),
            allowed_extensions: upload.allowed_extensions.clone(),
        }
    }

    /// Validate a dropped file. `Err` carries the human-readable reason shown
    /// on the synthesized error job.
    pub fn validate(&self, path: &Path) -> Result<FileRef, String> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => return Err("Not a regular file.".to_string()),
            Err(_) => return Err("File not found.".to_string()),
        };

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if !self.allowed_extensions.iter().any(|e| *e == extension) {
            return Err(format!(
                "Unsupported file type \".{}\". Supported: {}.",
                extension,
                self.allowed_extensions.join(", ")
            ));
        }

        if metadata.len() > self.max_file_size {
            return Err(format!(
                "File is too large ({:.1} MB). Maximum size is {} MB.",
                metadata.len() as f64 / 1024.0 / 1024.0,
                self.max_file_size / 1024 / 1024
            ));
        }

        Ok(FileRef::local(path, metadata.len()))
    }
}

/// Status line used when the server sends none.
pub fn default_details(status: JobStatus) -> String {
    match status {
        JobStatus::Uploading => "Uploading...",
        JobStatus::Pending => "Waiting for processing...",
        JobStatus::Processing => "Processing recording...",
        JobStatus::Completed => "Complete!",
        JobStatus::Error => "Processing failed.",
    }
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn limits() -> UploadLimits {
        UploadLimits {
            max_file_size: 1024,
            allowed_extensions: vec!["mp3".to_string(), "wav".to_string()],
        }
    }

    #[test]
    fn test_status_from_wire() {
        assert_eq!(JobStatus::from_wire("pending"), JobStatus::Pending);
        assert_eq!(JobStatus::from_wire("completed"), JobStatus::Completed);
        assert_eq!(JobStatus::from_wire("error"), JobStatus::Error);
        // Unknown statuses stay visible as processing instead of crashing.
        assert_eq!(JobStatus::from_wire("transcribing"), JobStatus::Processing);
    }

    #[test]
    fn test_status_serialization_matches_wire_format() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Processing).unwrap(),
            "\"processing\""
        );
        let parsed: JobStatus = serde_json::from_str("\"uploading\"").unwrap();
        assert_eq!(parsed, JobStatus::Uploading);
    }

    #[test]
    fn test_validate_rejects_oversized_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.mp3");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(&vec![0u8; 2048]).unwrap();

        let err = limits().validate(&path).unwrap_err();
        assert!(err.contains("too large"), "got: {}", err);
    }

    #[test]
    fn test_validate_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").unwrap();

        let err = limits().validate(&path).unwrap_err();
        assert!(err.contains("Unsupported file type"), "got: {}", err);
    }

    #[test]
    fn test_validate_missing_file() {
        let err = limits().validate(Path::new("/nonexistent/call.mp3")).unwrap_err();
        assert_eq!(err, "File not found.");
    }

    #[test]
    fn test_validate_accepts_small_known_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("standup.WAV");
        std::fs::write(&path, b"RIFF").unwrap();

        let file = limits().validate(&path).unwrap();
        assert_eq!(file.name, "standup.WAV");
        assert_eq!(file.size, 4);
        assert!(file.path.is_some());
    }

    #[test]
    fn test_job_from_ongoing_seeds_progress() {
        let task = crate::api::types::OngoingTask {
            task_id: "t-9".to_string(),
            filename: "retro.mp3".to_string(),
            file_size: Some(5000),
            status: "processing".to_string(),
            progress_percent: 40,
            details: None,
        };
        let job = UploadJob::from_ongoing(&task);
        assert_eq!(job.id, "t-9");
        assert_eq!(job.status, JobStatus::Processing);
        assert_eq!(job.progress, 40);
        assert_eq!(job.details, "Processing recording...");
    }
}
