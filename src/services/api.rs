//! HTTP contract with the StudyVerse backend.
//!
//! [`StudyBackend`] is the seam the rest of the crate talks to; [`HttpBackend`]
//! is the reqwest implementation. Every response body is decoded into an
//! explicit schema here, so a shape mismatch surfaces as
//! [`ApiError::Malformed`] instead of leaking half-filled values.

use crate::models::{
    AgeGroup, AppSettings, FallbackReason, Flashcard, PreferenceRecord, ProgressEntry,
    QuizQuestion, ReportCardAnalysis, StylePreference, SyllabusData, TextAnalysis,
};
use crate::services::documents::UploadFile;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const SAVE_PREFERENCES_PATH: &str = "/api/save-preferences";
pub const ANALYZE_PATHS: [&str; 2] = ["/api/ai/analyze-text", "/api/analyze-text"];
pub const FLASHCARD_PATHS: [&str; 2] = ["/api/ai/generate-flashcards", "/api/generate-flashcards"];
pub const QUIZ_PATH: &str = "/api/ai/generate-quiz";
pub const PROGRESS_PATH: &str = "/api/auth/progress";
pub const REPORT_CARD_PATH: &str = "/api/report-card/analyze";
pub const SYLLABUS_PATH: &str = "/api/syllabus/upload";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const MAX_ERROR_MESSAGE_CHARS: usize = 200;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Not signed in: no auth token configured")]
    MissingToken,
}

impl ApiError {
    /// Short message suitable for showing next to the failed tool.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Http(err) if err.is_timeout() => {
                "The StudyVerse server took too long to answer. Please try again.".to_string()
            }
            ApiError::Http(_) => {
                "Unable to reach the StudyVerse server. Please try again.".to_string()
            }
            ApiError::Status { message, .. } if !message.is_empty() => message.clone(),
            ApiError::Status { status, .. } => {
                format!("The server could not complete the request (status {status}).")
            }
            ApiError::Malformed(_) => "The server sent a response we could not read.".to_string(),
            ApiError::MissingToken => "Please sign in to use this feature.".to_string(),
        }
    }

    pub fn fallback_reason(&self) -> FallbackReason {
        match self {
            ApiError::Http(_) | ApiError::MissingToken => FallbackReason::Unreachable,
            ApiError::Status { status, .. } => FallbackReason::ServerStatus(*status),
            ApiError::Malformed(_) => FallbackReason::MalformedResponse,
        }
    }
}

/// Operations the client needs from the backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudyBackend: Send + Sync {
    /// Best-effort copy of the confirmed preferences. The body is ignored.
    async fn save_preferences(&self, record: &PreferenceRecord) -> Result<(), ApiError>;

    async fn analyze_text(&self, text: &str, age_group: AgeGroup)
    -> Result<TextAnalysis, ApiError>;

    async fn generate_flashcards(
        &self,
        text: &str,
        age_group: AgeGroup,
        count: u32,
    ) -> Result<Vec<Flashcard>, ApiError>;

    async fn generate_quiz(
        &self,
        text: &str,
        age_group: AgeGroup,
        count: u32,
    ) -> Result<Vec<QuizQuestion>, ApiError>;

    async fn fetch_progress(&self) -> Result<Vec<ProgressEntry>, ApiError>;

    async fn upload_report_card(&self, file: &UploadFile)
    -> Result<ReportCardAnalysis, ApiError>;

    async fn upload_syllabus(&self, file: &UploadFile) -> Result<SyllabusData, ApiError>;
}

// Wire formats

#[derive(Serialize)]
struct SavePreferencesRequest<'a> {
    age: AgeGroup,
    gender: Option<StylePreference>,
    theme: &'a str,
    timestamp: DateTime<Utc>,
}

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
    age_group: AgeGroup,
    #[serde(skip_serializing_if = "Option::is_none")]
    count: Option<u32>,
}

#[derive(Deserialize)]
struct FlashcardsResponse {
    flashcards: Vec<Flashcard>,
}

#[derive(Deserialize)]
struct QuizResponse {
    questions: Vec<QuizQuestion>,
}

#[derive(Deserialize)]
struct ProgressResponse {
    #[serde(default)]
    progress: Vec<ProgressEntry>,
}

#[derive(Deserialize)]
struct ReportCardResponse {
    analysis: ReportCardAnalysis,
}

#[derive(Deserialize)]
struct SyllabusResponse {
    syllabus_data: SyllabusData,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// reqwest-backed [`StudyBackend`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpBackend {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        auth_token: Option<String>,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url,
            auth_token,
        })
    }

    pub fn from_settings(settings: &AppSettings) -> Result<Self, ApiError> {
        Self::new(
            settings.api_base_url(),
            settings.request_timeout(),
            settings.auth_token().map(str::to_string),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn token(&self) -> Result<&str, ApiError> {
        self.auth_token.as_deref().ok_or(ApiError::MissingToken)
    }

    /// POST to the first path that exists. A 404 moves on to the next
    /// candidate; any other answer is final.
    async fn post_json<B, T>(&self, paths: &[&str], body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let mut last_not_found = None;

        for path in paths {
            let response = self.client.post(self.url(path)).json(body).send().await?;
            if response.status() == StatusCode::NOT_FOUND {
                tracing::debug!("{} not found, trying next endpoint", path);
                last_not_found = Some(response);
                continue;
            }
            return decode(response).await;
        }

        match last_not_found {
            Some(response) => decode(response).await,
            None => Err(ApiError::Malformed("no endpoint to call".to_string())),
        }
    }

    async fn upload<T: DeserializeOwned>(
        &self,
        path: &str,
        field: &'static str,
        file: &UploadFile,
    ) -> Result<T, ApiError> {
        let token = self.token()?;
        let part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        let form = Form::new().part(field, part);

        tracing::info!(
            "Uploading {} ({} bytes) to {}",
            file.file_name,
            file.bytes.len(),
            path
        );

        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        decode(response).await
    }
}

/// Check the status and decode the body. Non-2xx answers become
/// [`ApiError::Status`] carrying the server's `{"error": ...}` text if any.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_slice(&body).map_err(|e| ApiError::Malformed(e.to_string()))
}

fn error_message(body: &[u8]) -> String {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(parsed) => parsed.error,
        Err(_) => String::from_utf8_lossy(body)
            .trim()
            .chars()
            .take(MAX_ERROR_MESSAGE_CHARS)
            .collect(),
    }
}

fn validate_questions(questions: &[QuizQuestion]) -> Result<(), ApiError> {
    for (i, question) in questions.iter().enumerate() {
        question
            .validate()
            .map_err(|reason| ApiError::Malformed(format!("quiz question {}: {reason}", i + 1)))?;
    }
    Ok(())
}

#[async_trait]
impl StudyBackend for HttpBackend {
    async fn save_preferences(&self, record: &PreferenceRecord) -> Result<(), ApiError> {
        let body = SavePreferencesRequest {
            age: record.age_group(),
            gender: record.style(),
            theme: record.theme(),
            timestamp: record.confirmed_at(),
        };

        let response = self
            .client
            .post(self.url(SAVE_PREFERENCES_PATH))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.bytes().await.unwrap_or_default();
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(())
    }

    async fn analyze_text(
        &self,
        text: &str,
        age_group: AgeGroup,
    ) -> Result<TextAnalysis, ApiError> {
        let body = TextRequest {
            text,
            age_group,
            count: None,
        };
        self.post_json(&ANALYZE_PATHS, &body).await
    }

    async fn generate_flashcards(
        &self,
        text: &str,
        age_group: AgeGroup,
        count: u32,
    ) -> Result<Vec<Flashcard>, ApiError> {
        let body = TextRequest {
            text,
            age_group,
            count: Some(count),
        };
        let response: FlashcardsResponse = self.post_json(&FLASHCARD_PATHS, &body).await?;
        Ok(response.flashcards)
    }

    async fn generate_quiz(
        &self,
        text: &str,
        age_group: AgeGroup,
        count: u32,
    ) -> Result<Vec<QuizQuestion>, ApiError> {
        let body = TextRequest {
            text,
            age_group,
            count: Some(count),
        };
        let response: QuizResponse = self.post_json(&[QUIZ_PATH], &body).await?;
        validate_questions(&response.questions)?;
        Ok(response.questions)
    }

    async fn fetch_progress(&self) -> Result<Vec<ProgressEntry>, ApiError> {
        let token = self.token()?;
        let response = self
            .client
            .get(self.url(PROGRESS_PATH))
            .bearer_auth(token)
            .send()
            .await?;
        let progress: ProgressResponse = decode(response).await?;
        Ok(progress.progress)
    }

    async fn upload_report_card(
        &self,
        file: &UploadFile,
    ) -> Result<ReportCardAnalysis, ApiError> {
        let response: ReportCardResponse =
            self.upload(REPORT_CARD_PATH, "report_card", file).await?;
        Ok(response.analysis)
    }

    async fn upload_syllabus(&self, file: &UploadFile) -> Result<SyllabusData, ApiError> {
        let response: SyllabusResponse = self.upload(SYLLABUS_PATH, "syllabus", file).await?;
        Ok(response.syllabus_data)
    }
}
