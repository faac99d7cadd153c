//! Data models for StudyVerse.
//!
//! - [`AppState`]: the central state container (preferences, wizard, router, request slots)
//! - [`PreferenceRecord`]: the confirmed age group, style and theme
//! - [`AppSettings`]: user settings loaded from `StudyVerse Config.yaml`
//! - content types returned by the backend: [`TextAnalysis`], [`Flashcard`], [`QuizQuestion`], [`ProgressEntry`]
//!
//! Wire types derive `Serialize`/`Deserialize` and are validated at the
//! boundary, so the rest of the crate only sees well-formed values.

pub mod app_state;
pub mod config;
pub mod content;
pub mod preferences;

pub use app_state::AppState;
pub use self::config::{AppSettings, DEFAULT_API_URL, normalize_base_url};
pub use content::{
    AnalysisResult, FallbackReason, Flashcard, LocalAnalysis, ProgressEntry, QuizQuestion,
    ReportCardAnalysis, SyllabusData, TextAnalysis,
};
pub use preferences::{AgeGroup, PreferenceError, PreferenceRecord, StylePreference, ThemeOption};
