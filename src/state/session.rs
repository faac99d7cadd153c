//! Request slots for the AI tools and document uploads.
//!
//! Every slot moves `idle -> pending -> success | error`. A request is
//! identified by a ticket carrying a sequence number; a completion is only
//! written while the slot is still pending on that same number, so a response
//! that arrives after the slot was reset or re-issued is dropped.

use crate::models::{AnalysisResult, Flashcard, QuizQuestion, ReportCardAnalysis, SyllabusData};
use crate::state::flashcards::FlashcardDeck;
use crate::state::quiz::QuizRun;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Analysis,
    Flashcards,
    Quiz,
    ReportCard,
    Syllabus,
}

impl RequestKind {
    pub const ALL: [RequestKind; 5] = [
        RequestKind::Analysis,
        RequestKind::Flashcards,
        RequestKind::Quiz,
        RequestKind::ReportCard,
        RequestKind::Syllabus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RequestKind::Analysis => "text analysis",
            RequestKind::Flashcards => "flashcards",
            RequestKind::Quiz => "quiz",
            RequestKind::ReportCard => "report card",
            RequestKind::Syllabus => "syllabus",
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Handle for one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket {
    pub kind: RequestKind,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotStatus {
    #[default]
    Idle,
    Pending,
    Success,
    Error,
}

/// Whether a completion was written to its slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestSlot<T> {
    status: SlotStatus,
    result: Option<T>,
    error: Option<String>,
    seq: Option<u64>,
}

impl<T> Default for RequestSlot<T> {
    fn default() -> Self {
        Self {
            status: SlotStatus::Idle,
            result: None,
            error: None,
            seq: None,
        }
    }
}

impl<T> RequestSlot<T> {
    pub fn status(&self) -> SlotStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == SlotStatus::Pending
    }

    pub fn result(&self) -> Option<&T> {
        self.result.as_ref()
    }

    pub fn result_mut(&mut self) -> Option<&mut T> {
        self.result.as_mut()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Mark the slot pending for `seq`. Refused while another request owns it.
    pub fn begin(&mut self, seq: u64) -> bool {
        if self.is_pending() {
            return false;
        }
        self.status = SlotStatus::Pending;
        self.error = None;
        self.seq = Some(seq);
        true
    }

    /// Replace the result wholesale.
    pub fn complete(&mut self, seq: u64, value: T) -> Completion {
        if !self.owns(seq) {
            return Completion::Stale;
        }
        self.status = SlotStatus::Success;
        self.result = Some(value);
        Completion::Applied
    }

    /// Record a failure. The previous result stays visible.
    pub fn fail(&mut self, seq: u64, message: impl Into<String>) -> Completion {
        if !self.owns(seq) {
            return Completion::Stale;
        }
        self.status = SlotStatus::Error;
        self.error = Some(message.into());
        Completion::Applied
    }

    /// Back to idle. Any in-flight request becomes stale.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn owns(&self, seq: u64) -> bool {
        self.is_pending() && self.seq == Some(seq)
    }
}

/// Payload delivered to a slot when its request succeeds.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutput {
    Analysis(AnalysisResult),
    Flashcards(Vec<Flashcard>),
    Quiz(Vec<QuizQuestion>),
    ReportCard(ReportCardAnalysis),
    Syllabus(SyllabusData),
}

impl RequestOutput {
    pub fn kind(&self) -> RequestKind {
        match self {
            RequestOutput::Analysis(_) => RequestKind::Analysis,
            RequestOutput::Flashcards(_) => RequestKind::Flashcards,
            RequestOutput::Quiz(_) => RequestKind::Quiz,
            RequestOutput::ReportCard(_) => RequestKind::ReportCard,
            RequestOutput::Syllabus(_) => RequestKind::Syllabus,
        }
    }
}

/// The tools view: one text buffer and three independent slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSession {
    pub text: String,
    pub analysis: RequestSlot<AnalysisResult>,
    pub flashcards: RequestSlot<FlashcardDeck>,
    pub quiz: RequestSlot<QuizRun>,
}

impl ToolSession {
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Discard all three slots but keep the text.
    pub fn reset_results(&mut self) {
        self.analysis.reset();
        self.flashcards.reset();
        self.quiz.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_lifecycle() {
        let mut slot: RequestSlot<u32> = RequestSlot::default();
        assert_eq!(slot.status(), SlotStatus::Idle);

        assert!(slot.begin(1));
        assert!(slot.is_pending());
        assert_eq!(slot.complete(1, 42), Completion::Applied);
        assert_eq!(slot.status(), SlotStatus::Success);
        assert_eq!(slot.result(), Some(&42));
    }

    #[test]
    fn test_begin_refused_while_pending() {
        let mut slot: RequestSlot<u32> = RequestSlot::default();
        assert!(slot.begin(1));
        assert!(!slot.begin(2));
        assert_eq!(slot.complete(2, 7), Completion::Stale);
        assert_eq!(slot.complete(1, 7), Completion::Applied);
    }

    #[test]
    fn test_failure_keeps_previous_result() {
        let mut slot: RequestSlot<u32> = RequestSlot::default();
        slot.begin(1);
        slot.complete(1, 10);

        slot.begin(2);
        assert_eq!(slot.fail(2, "Server unavailable"), Completion::Applied);
        assert_eq!(slot.status(), SlotStatus::Error);
        assert_eq!(slot.error(), Some("Server unavailable"));
        assert_eq!(slot.result(), Some(&10));

        // next attempt clears the message
        slot.begin(3);
        assert!(slot.error().is_none());
    }

    #[test]
    fn test_completion_after_reset_is_stale() {
        let mut slot: RequestSlot<u32> = RequestSlot::default();
        slot.begin(5);
        slot.reset();

        assert_eq!(slot.complete(5, 1), Completion::Stale);
        assert_eq!(slot.fail(5, "late"), Completion::Stale);
        assert_eq!(slot, RequestSlot::default());
    }

    #[test]
    fn test_reset_results_keeps_text() {
        let mut session = ToolSession::default();
        session.set_text("Photosynthesis turns light into sugar.");
        session.analysis.begin(1);
        session.quiz.begin(2);

        session.reset_results();
        assert_eq!(session.text, "Photosynthesis turns light into sugar.");
        assert!(!session.analysis.is_pending());
        assert!(!session.quiz.is_pending());
    }
}
