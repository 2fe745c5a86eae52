//! Wire types for the TalkToText REST API.

use serde::{Deserialize, Serialize};

/// A processed meeting with its transcript and generated notes.
#[derive(Debug, Clone, Deserialize)]
pub struct Meeting {
    pub id: i64,
    pub user_id: i64,
    pub task_id: String,
    pub title: String,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub notes: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub company: Option<String>,
    pub job_title: Option<String>,
    pub avatar_url: Option<String>,
}

/// Partial profile update; only set fields are sent.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardStats {
    pub total_meetings: i64,
    pub hours_processed: f64,
    pub team_members: i64,
    pub accuracy_rate: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeeklyActivity {
    pub day: String,
    pub meetings: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeetingType {
    pub name: String,
    pub value: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingSpeed {
    pub time: String,
    pub count: i64,
}

/// Response to the multipart recording upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub task_id: String,
}

/// Payload of `GET /progress/{id}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskProgress {
    pub status: String,
    #[serde(default)]
    pub progress_percent: u8,
    #[serde(default)]
    pub details: Option<String>,
    /// Present once processing has produced a meeting record.
    #[serde(default)]
    pub meeting_id: Option<i64>,
}

/// One entry of `GET /tasks/ongoing`: a task the server was still working on
/// when the client last went away.
#[derive(Debug, Clone, Deserialize)]
pub struct OngoingTask {
    pub task_id: String,
    pub filename: String,
    #[serde(default)]
    pub file_size: Option<u64>,
    pub status: String,
    #[serde(default)]
    pub progress_percent: u8,
    #[serde(default)]
    pub details: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyEmailRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct ShareEmailRequest {
    pub recipient_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
