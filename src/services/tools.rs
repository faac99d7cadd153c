//! AI study tools: text analysis, flashcards and quizzes.
//!
//! Each call validates its input synchronously, takes a ticket for its slot,
//! performs one backend request and hands the answer to the
//! [`StateManager`], which drops it if the slot has moved on in the
//! meantime. Analysis degrades to a local estimate when the backend cannot
//! answer; flashcards and quizzes surface the error instead.

use crate::metrics::Metrics;
use crate::models::{AgeGroup, AnalysisResult, FallbackReason};
use crate::services::analysis::local_analysis;
use crate::services::api::{ApiError, StudyBackend};
use crate::state::{Completion, RequestKind, RequestOutput, RequestTicket, StateManager};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

/// Upper bound for generated flashcards and quiz questions.
pub const MAX_GENERATED_ITEMS: u32 = 20;

/// Errors raised before any request is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Please enter some text first")]
    EmptyText,

    #[error("Count must be between 1 and {max}, got {count}")]
    InvalidCount { count: u32, max: u32 },

    #[error("Finish choosing your preferences first")]
    PreferencesRequired,

    #[error("Cannot upload {path}: {reason}")]
    InvalidFile { path: String, reason: String },
}

/// What happened to a tool invocation that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolOutcome {
    /// The backend answered and the slot holds the result.
    Succeeded,
    /// The slot holds a local analysis instead of the backend's.
    Fallback(FallbackReason),
    /// The slot is in the error state with this message.
    Failed(String),
    /// A request of this kind was already in flight; nothing was sent.
    AlreadyPending,
    /// The answer arrived after its slot was reset and was dropped.
    Discarded,
}

pub(crate) fn validate_text(text: &str) -> Result<(), ToolError> {
    if text.trim().is_empty() {
        return Err(ToolError::EmptyText);
    }
    Ok(())
}

pub(crate) fn validate_count(count: u32) -> Result<(), ToolError> {
    if count == 0 || count > MAX_GENERATED_ITEMS {
        return Err(ToolError::InvalidCount {
            count,
            max: MAX_GENERATED_ITEMS,
        });
    }
    Ok(())
}

#[derive(Clone)]
pub struct ToolService {
    backend: Arc<dyn StudyBackend>,
    state: StateManager,
    metrics: Arc<Metrics>,
}

impl ToolService {
    pub fn new(backend: Arc<dyn StudyBackend>, state: StateManager, metrics: Arc<Metrics>) -> Self {
        Self {
            backend,
            state,
            metrics,
        }
    }

    pub(crate) fn backend(&self) -> &dyn StudyBackend {
        self.backend.as_ref()
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    fn age_group(&self) -> Result<AgeGroup, ToolError> {
        self.state
            .read(|state| state.preferences.as_ref().map(|p| p.age_group()))
            .ok_or(ToolError::PreferencesRequired)
    }

    pub async fn analyze(&self, text: &str) -> Result<ToolOutcome, ToolError> {
        validate_text(text)?;
        let age_group = self.age_group()?;

        let Some(ticket) = self.begin(RequestKind::Analysis, Some(text)) else {
            return Ok(ToolOutcome::AlreadyPending);
        };
        let started = Instant::now();

        let result = match self.backend.analyze_text(text, age_group).await {
            Ok(analysis) => AnalysisResult::Remote(analysis),
            Err(err) => {
                tracing::warn!("Text analysis unavailable ({}), using local estimate", err);
                self.metrics.record_local_fallback();
                AnalysisResult::Local(local_analysis(text, err.fallback_reason()))
            }
        };

        let fallback = result.local().map(|local| local.reason);
        let outcome = self.finish(ticket, started, Ok(RequestOutput::Analysis(result)));
        Ok(match (outcome, fallback) {
            (ToolOutcome::Succeeded, Some(reason)) => ToolOutcome::Fallback(reason),
            (outcome, _) => outcome,
        })
    }

    pub async fn make_flashcards(&self, text: &str, count: u32) -> Result<ToolOutcome, ToolError> {
        validate_text(text)?;
        validate_count(count)?;
        let age_group = self.age_group()?;

        let Some(ticket) = self.begin(RequestKind::Flashcards, Some(text)) else {
            return Ok(ToolOutcome::AlreadyPending);
        };
        let started = Instant::now();

        let result = self
            .backend
            .generate_flashcards(text, age_group, count)
            .await
            .map(RequestOutput::Flashcards);
        Ok(self.finish(ticket, started, result))
    }

    pub async fn make_quiz(&self, text: &str, count: u32) -> Result<ToolOutcome, ToolError> {
        validate_text(text)?;
        validate_count(count)?;
        let age_group = self.age_group()?;

        let Some(ticket) = self.begin(RequestKind::Quiz, Some(text)) else {
            return Ok(ToolOutcome::AlreadyPending);
        };
        let started = Instant::now();

        let result = self
            .backend
            .generate_quiz(text, age_group, count)
            .await
            .map(RequestOutput::Quiz);
        Ok(self.finish(ticket, started, result))
    }

    /// Take the slot for `kind`. Tool requests also record their text.
    pub(crate) fn begin(&self, kind: RequestKind, text: Option<&str>) -> Option<RequestTicket> {
        let ticket = match text {
            Some(text) => self.state.begin_text_request(kind, text),
            None => self.state.begin_request(kind),
        };
        match ticket {
            Some(ticket) => {
                tracing::info!("Starting {} request (seq {})", kind, ticket.seq);
                self.metrics.record_request_started(kind);
                Some(ticket)
            }
            None => {
                tracing::debug!("{} request already pending, ignoring repeat", kind);
                self.metrics.record_pending_repeat();
                None
            }
        }
    }

    pub(crate) fn finish(
        &self,
        ticket: RequestTicket,
        started: Instant,
        result: Result<RequestOutput, ApiError>,
    ) -> ToolOutcome {
        self.metrics.record_request_time(started.elapsed());

        let (completion, outcome) = match result {
            Ok(output) => {
                let completion = self.state.complete_request(ticket, output);
                (completion, ToolOutcome::Succeeded)
            }
            Err(err) => {
                tracing::warn!("{} request failed: {}", ticket.kind, err);
                let message = err.user_message();
                let completion = self.state.fail_request(ticket, &message);
                (completion, ToolOutcome::Failed(message))
            }
        };

        match completion {
            Completion::Stale => {
                self.metrics.record_stale_discard();
                ToolOutcome::Discarded
            }
            Completion::Applied => {
                match outcome {
                    ToolOutcome::Succeeded => self.metrics.record_request_succeeded(),
                    _ => self.metrics.record_request_failed(),
                }
                tracing::info!(
                    "{} request finished in {}ms",
                    ticket.kind,
                    started.elapsed().as_millis()
                );
                outcome
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Flashcard, PreferenceRecord, StylePreference, TextAnalysis};
    use crate::services::api::MockStudyBackend;
    use crate::state::{SlotStatus, View};
    use chrono::Utc;

    fn sample_analysis() -> TextAnalysis {
        TextAnalysis {
            reading_level: "Advanced".to_string(),
            complexity_score: 6.0,
            key_topics: vec!["topic1".to_string()],
            estimated_reading_time: 1,
            recommendations: vec!["Read more".to_string()],
        }
    }

    fn confirmed_state() -> StateManager {
        let state = StateManager::new();
        let record = PreferenceRecord::new(
            AgeGroup::Middle,
            Some(StylePreference::Neutral),
            "gaming",
            Utc::now(),
        )
        .unwrap();
        state.set_preferences(record).unwrap();
        state.navigate(View::Tools).unwrap();
        state
    }

    fn service(mock: MockStudyBackend, state: StateManager) -> (ToolService, Arc<Metrics>) {
        let metrics = Arc::new(Metrics::new());
        (ToolService::new(Arc::new(mock), state, metrics.clone()), metrics)
    }

    #[tokio::test]
    async fn test_empty_text_makes_no_request() {
        let mut mock = MockStudyBackend::new();
        mock.expect_analyze_text().times(0);
        let state = confirmed_state();
        let (service, _) = service(mock, state.clone());

        assert_eq!(service.analyze("").await, Err(ToolError::EmptyText));
        assert_eq!(service.analyze("   \n").await, Err(ToolError::EmptyText));
        assert_eq!(
            state.read(|s| s.slot_status(RequestKind::Analysis)),
            SlotStatus::Idle
        );
    }

    #[tokio::test]
    async fn test_analysis_passes_age_group() {
        let mut mock = MockStudyBackend::new();
        mock.expect_analyze_text()
            .withf(|text, age| text == "A short passage." && *age == AgeGroup::Middle)
            .times(1)
            .returning(|_, _| Ok(sample_analysis()));
        let state = confirmed_state();
        let (service, metrics) = service(mock, state.clone());

        let outcome = service.analyze("A short passage.").await.unwrap();
        assert_eq!(outcome, ToolOutcome::Succeeded);

        let slot = state.read(|s| s.tools.analysis.clone());
        assert_eq!(slot.result(), Some(&AnalysisResult::Remote(sample_analysis())));
        assert!(slot.error().is_none());
        assert_eq!(metrics.requests_started(RequestKind::Analysis), 1);
    }

    #[tokio::test]
    async fn test_analysis_falls_back_on_server_error() {
        let mut mock = MockStudyBackend::new();
        mock.expect_analyze_text().returning(|_, _| {
            Err(ApiError::Status {
                status: 500,
                message: "Internal server error".to_string(),
            })
        });
        let state = confirmed_state();
        let (service, metrics) = service(mock, state.clone());

        let outcome = service.analyze("The cat sat").await.unwrap();
        assert_eq!(outcome, ToolOutcome::Fallback(FallbackReason::ServerStatus(500)));

        let result = state
            .read(|s| s.tools.analysis.result().cloned())
            .unwrap();
        assert_eq!(result.local().unwrap().word_count, 3);
        assert_eq!(
            state.read(|s| s.slot_status(RequestKind::Analysis)),
            SlotStatus::Success
        );
        assert_eq!(
            metrics
                .local_fallbacks
                .load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_flashcard_failure_keeps_previous_deck() {
        let mut mock = MockStudyBackend::new();
        let mut calls = 0;
        mock.expect_generate_flashcards().times(2).returning(move |_, _, _| {
            calls += 1;
            if calls == 1 {
                Ok(vec![Flashcard {
                    question: "Q".to_string(),
                    answer: "A".to_string(),
                    hint: None,
                }])
            } else {
                Err(ApiError::Malformed("missing field `flashcards`".to_string()))
            }
        });
        let state = confirmed_state();
        let (service, _) = service(mock, state.clone());

        assert_eq!(
            service.make_flashcards("Cells divide.", 3).await.unwrap(),
            ToolOutcome::Succeeded
        );
        let outcome = service.make_flashcards("Cells divide.", 3).await.unwrap();
        assert!(matches!(outcome, ToolOutcome::Failed(_)));

        let slot = state.read(|s| s.tools.flashcards.clone());
        assert_eq!(slot.status(), SlotStatus::Error);
        assert_eq!(slot.result().map(|deck| deck.len()), Some(1));
    }

    #[tokio::test]
    async fn test_count_is_validated() {
        let mut mock = MockStudyBackend::new();
        mock.expect_generate_quiz().times(0);
        let (service, _) = service(mock, confirmed_state());

        assert_eq!(
            service.make_quiz("Some text", 0).await,
            Err(ToolError::InvalidCount { count: 0, max: 20 })
        );
        assert_eq!(
            service.make_quiz("Some text", 21).await,
            Err(ToolError::InvalidCount { count: 21, max: 20 })
        );
    }

    #[tokio::test]
    async fn test_repeat_while_pending_is_noop() {
        let mut mock = MockStudyBackend::new();
        mock.expect_generate_quiz().times(0);
        let state = confirmed_state();
        state.begin_request(RequestKind::Quiz).unwrap();
        let (service, metrics) = service(mock, state.clone());

        assert_eq!(
            service.make_quiz("Some text", 5).await.unwrap(),
            ToolOutcome::AlreadyPending
        );
        assert_eq!(
            metrics
                .pending_repeats
                .load(std::sync::atomic::Ordering::Relaxed),
            1
        );
        assert!(state.read(|s| s.is_pending(RequestKind::Quiz)));
    }

    #[tokio::test]
    async fn test_repeat_while_pending_keeps_text() {
        let mut mock = MockStudyBackend::new();
        mock.expect_analyze_text().times(0);
        let state = confirmed_state();
        state.set_text("first");
        state.begin_request(RequestKind::Analysis).unwrap();
        let (service, _) = service(mock, state.clone());

        let mut rx = state.subscribe();
        assert_eq!(
            service.analyze("second").await.unwrap(),
            ToolOutcome::AlreadyPending
        );
        assert_eq!(state.read(|s| s.tools.text.clone()), "first");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_response_after_view_switch_is_discarded() {
        let state = confirmed_state();
        let navigator = state.clone();

        let mut mock = MockStudyBackend::new();
        mock.expect_analyze_text().returning(move |_, _| {
            // learner leaves the tools view while the request is in flight
            navigator.navigate(View::Home).unwrap();
            Ok(sample_analysis())
        });
        let (service, metrics) = service(mock, state.clone());

        let outcome = service.analyze("Some notes").await.unwrap();
        assert_eq!(outcome, ToolOutcome::Discarded);
        assert_eq!(
            state.read(|s| s.slot_status(RequestKind::Analysis)),
            SlotStatus::Idle
        );
        assert_eq!(
            metrics
                .stale_discards
                .load(std::sync::atomic::Ordering::Relaxed),
            1
        );
    }

    #[tokio::test]
    async fn test_requires_preferences() {
        let mut mock = MockStudyBackend::new();
        mock.expect_analyze_text().times(0);
        let (service, _) = service(mock, StateManager::new());

        assert_eq!(
            service.analyze("Some text").await,
            Err(ToolError::PreferencesRequired)
        );
    }
}
