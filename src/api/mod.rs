//! HTTP client for the TalkToText REST API.
//!
//! Every authenticated request goes through the same path: pull the bearer
//! token from the [`Session`], attach it, and map the response. 401 tears the
//! session down and surfaces [`ApiError::Unauthorized`]; other non-2xx
//! responses carry the server's `detail` message. Signup and the password
//! flows are the only unauthenticated calls.

pub mod error;
pub mod multipart;
pub mod types;

pub use error::ApiError;
pub use multipart::ProgressFn;

use reqwest::multipart::Form;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::session::Session;
use types::*;

const GENERIC_ERROR_DETAIL: &str = "An unknown error occurred";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Session,
}

impl ApiClient {
    pub fn new(base_url: &str, session: Session) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attach the bearer token and send. A missing token fails before any
    /// network call; a 401 response tears down the session. Both report
    /// `Unauthorized` to the caller instead of hanging.
    async fn send_authed(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let token = match self.session.token() {
            Some(token) => token,
            None => {
                self.session.handle_unauthorized();
                return Err(ApiError::Unauthorized);
            }
        };

        let response = request.bearer_auth(token).send().await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            self.session.handle_unauthorized();
            return Err(ApiError::Unauthorized);
        }

        Ok(response)
    }

    /// Map a non-2xx response to an error carrying the server's `detail`.
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }

        let detail = match response.text().await {
            Ok(body) => serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.detail)
                .unwrap_or_else(|_| GENERIC_ERROR_DETAIL.to_string()),
            Err(_) => GENERIC_ERROR_DETAIL.to_string(),
        };

        debug!("API request failed with {}: {}", status, detail);
        Err(ApiError::Api {
            status: status.as_u16(),
            detail,
        })
    }

    async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        Ok(response.json().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send_authed(self.http.get(self.url(path))).await?;
        Self::json_body(Self::check(response).await?).await
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send_authed(self.http.post(self.url(path)).json(body))
            .await?;
        Self::json_body(Self::check(response).await?).await
    }

    async fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .send_authed(self.http.patch(self.url(path)).json(body))
            .await?;
        Self::json_body(Self::check(response).await?).await
    }

    /// DELETE expecting 2xx with no meaningful body (usually 204).
    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self.send_authed(self.http.delete(self.url(path))).await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: Form,
    ) -> Result<T, ApiError> {
        // reqwest sets the multipart content-type with its boundary itself;
        // nothing else may be forced here.
        let response = self
            .send_authed(self.http.post(self.url(path)).multipart(form))
            .await?;
        Self::json_body(Self::check(response).await?).await
    }

    /// POST without a token, for the account/password endpoints.
    async fn post_public<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self.http.post(self.url(path)).json(body).send().await?;
        Self::json_body(Self::check(response).await?).await
    }

    // === Meetings ===

    pub async fn meetings(&self) -> Result<Vec<Meeting>, ApiError> {
        self.get("/meetings").await
    }

    pub async fn meeting(&self, meeting_id: i64) -> Result<Meeting, ApiError> {
        self.get(&format!("/meetings/{}", meeting_id)).await
    }

    pub async fn delete_meeting(&self, meeting_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/meetings/{}", meeting_id)).await
    }

    pub async fn share_meeting_by_email(
        &self,
        meeting_id: i64,
        request: &ShareEmailRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.post(&format!("/share/{}/email", meeting_id), request)
            .await
    }

    // === Tasks ===

    pub async fn ongoing_tasks(&self) -> Result<Vec<OngoingTask>, ApiError> {
        self.get("/tasks/ongoing").await
    }

    pub async fn task_progress(&self, task_id: &str) -> Result<TaskProgress, ApiError> {
        self.get(&format!("/progress/{}", task_id)).await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/tasks/{}", task_id)).await
    }

    /// Upload a recording for processing. The progress callback is fed the
    /// percentage of body bytes sent so far.
    pub async fn upload_audio(
        &self,
        path: &Path,
        progress: Option<ProgressFn>,
    ) -> Result<UploadResponse, ApiError> {
        let part = multipart::streamed_file_part(path, progress).await?;
        let form = Form::new().part("file", part);
        self.post_multipart("/upload-audio", form).await
    }

    // === Dashboard ===

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ApiError> {
        self.get("/dashboard/stats").await
    }

    pub async fn weekly_activity(&self) -> Result<Vec<WeeklyActivity>, ApiError> {
        self.get("/dashboard/weekly-activity").await
    }

    pub async fn meeting_types(&self) -> Result<Vec<MeetingType>, ApiError> {
        self.get("/dashboard/meeting-types").await
    }

    pub async fn processing_speed(&self) -> Result<Vec<ProcessingSpeed>, ApiError> {
        self.get("/dashboard/processing-speed").await
    }

    // === Profile ===

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        self.get("/profile").await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        self.patch("/profile", update).await
    }

    pub async fn upload_avatar(&self, path: &Path) -> Result<UserProfile, ApiError> {
        let part = multipart::streamed_file_part(path, None).await?;
        let form = Form::new().part("file", part);
        self.post_multipart("/profile/avatar", form).await
    }

    pub async fn delete_account(&self) -> Result<(), ApiError> {
        self.delete("/profile").await
    }

    // === Account (unauthenticated) ===

    /// Browser URL that starts the OAuth flow for the given provider.
    pub fn login_url(&self, provider: &str) -> String {
        self.url(&format!("/login/{}", provider))
    }

    pub async fn signup(&self, request: &SignupRequest) -> Result<MessageResponse, ApiError> {
        self.post_public("/users/", request).await
    }

    pub async fn verify_email(
        &self,
        request: &VerifyEmailRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.post_public("/verify-email", request).await
    }

    pub async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.post_public("/forgot-password", request).await
    }

    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> Result<MessageResponse, ApiError> {
        self.post_public("/reset-password", request).await
    }
}
