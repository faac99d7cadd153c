use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backend used when no URL is configured (local development server).
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// User settings from `StudyVerse Config.yaml`, overridable through
/// `STUDYVERSE_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Backend base URL. A bare host gets `https://` prepended.
    pub api_url: Option<String>,

    pub request_timeout_secs: u64,

    pub flashcard_count: u32,

    pub quiz_question_count: u32,

    /// Bearer token for the signed-in endpoints (progress, uploads).
    pub auth_token: Option<String>,

    pub debug_mode: bool,

    pub log_to_console: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_secs: 30,
            flashcard_count: 5,
            quiz_question_count: 5,
            auth_token: None,
            debug_mode: false,
            log_to_console: false,
        }
    }
}

impl AppSettings {
    pub fn api_base_url(&self) -> String {
        normalize_base_url(self.api_url.as_deref())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// The auth token, ignoring blank values.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}

/// Resolve the backend base URL.
///
/// Unset or blank falls back to [`DEFAULT_API_URL`]; a value without an
/// `http` scheme is treated as a host and gets `https://`. Trailing slashes
/// are dropped so paths can be appended directly.
pub fn normalize_base_url(raw: Option<&str>) -> String {
    let raw = match raw.map(str::trim) {
        Some(value) if !value.is_empty() => value,
        _ => return DEFAULT_API_URL.to_string(),
    };

    let with_scheme = if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    with_scheme.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.api_base_url(), DEFAULT_API_URL);
        assert_eq!(settings.request_timeout(), Duration::from_secs(30));
        assert_eq!(settings.flashcard_count, 5);
        assert_eq!(settings.quiz_question_count, 5);
        assert!(settings.auth_token().is_none());
    }

    #[test]
    fn test_normalize_base_url() {
        assert_eq!(normalize_base_url(None), DEFAULT_API_URL);
        assert_eq!(normalize_base_url(Some("   ")), DEFAULT_API_URL);
        assert_eq!(
            normalize_base_url(Some("studyverse-api.onrender.com")),
            "https://studyverse-api.onrender.com"
        );
        assert_eq!(
            normalize_base_url(Some("http://127.0.0.1:8080/")),
            "http://127.0.0.1:8080"
        );
    }

    #[test]
    fn test_blank_auth_token_is_ignored() {
        let settings = AppSettings {
            auth_token: Some("  ".to_string()),
            ..AppSettings::default()
        };
        assert!(settings.auth_token().is_none());
    }
}
