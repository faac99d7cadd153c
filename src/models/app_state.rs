use crate::models::{PreferenceRecord, ReportCardAnalysis, SyllabusData};
use crate::state::flashcards::FlashcardDeck;
use crate::state::quiz::QuizRun;
use crate::state::router::{RouterError, Screen, View, ViewRouter};
use crate::state::session::{
    Completion, RequestKind, RequestOutput, RequestSlot, RequestTicket, SlotStatus, ToolSession,
};
use crate::state::wizard::PreferenceWizard;
use crate::theme::PaletteName;

/// Single source of truth for the running client.
///
/// Wrapped in `Arc<RwLock<AppState>>` by [`crate::state::StateManager`]; go
/// through its methods so that change events are emitted:
/// - [`read()`](crate::state::StateManager::read) for read-only access
/// - [`update()`](crate::state::StateManager::update) for mutations
///
/// Request slots live here rather than in the services so that starting a
/// request, completing it and switching views all serialize on one lock.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Confirmed preferences. Written once per session.
    pub preferences: Option<PreferenceRecord>,
    pub wizard: PreferenceWizard,
    pub router: ViewRouter,

    // Per-view request slots
    pub tools: ToolSession,
    pub report_card: RequestSlot<ReportCardAnalysis>,
    pub syllabus: RequestSlot<SyllabusData>,

    pub palette: PaletteName,

    next_seq: u64,
}

impl AppState {
    pub fn has_preferences(&self) -> bool {
        self.preferences.is_some()
    }

    pub fn screen(&self) -> Screen {
        self.router.screen(self.has_preferences())
    }

    pub fn slot_status(&self, kind: RequestKind) -> SlotStatus {
        match kind {
            RequestKind::Analysis => self.tools.analysis.status(),
            RequestKind::Flashcards => self.tools.flashcards.status(),
            RequestKind::Quiz => self.tools.quiz.status(),
            RequestKind::ReportCard => self.report_card.status(),
            RequestKind::Syllabus => self.syllabus.status(),
        }
    }

    pub fn slot_error(&self, kind: RequestKind) -> Option<&str> {
        match kind {
            RequestKind::Analysis => self.tools.analysis.error(),
            RequestKind::Flashcards => self.tools.flashcards.error(),
            RequestKind::Quiz => self.tools.quiz.error(),
            RequestKind::ReportCard => self.report_card.error(),
            RequestKind::Syllabus => self.syllabus.error(),
        }
    }

    pub fn is_pending(&self, kind: RequestKind) -> bool {
        self.slot_status(kind) == SlotStatus::Pending
    }

    /// Put the slot for `kind` into pending and hand out a ticket for it.
    /// `None` when a request of that kind is already in flight.
    pub fn begin_request(&mut self, kind: RequestKind) -> Option<RequestTicket> {
        let seq = self.next_seq + 1;
        let started = match kind {
            RequestKind::Analysis => self.tools.analysis.begin(seq),
            RequestKind::Flashcards => self.tools.flashcards.begin(seq),
            RequestKind::Quiz => self.tools.quiz.begin(seq),
            RequestKind::ReportCard => self.report_card.begin(seq),
            RequestKind::Syllabus => self.syllabus.begin(seq),
        };
        if !started {
            return None;
        }
        self.next_seq = seq;
        Some(RequestTicket { kind, seq })
    }

    pub fn complete_request(&mut self, ticket: RequestTicket, output: RequestOutput) -> Completion {
        if ticket.kind != output.kind() {
            tracing::warn!(
                "Dropping {} response delivered to a {} ticket",
                output.kind(),
                ticket.kind
            );
            return Completion::Stale;
        }

        match output {
            RequestOutput::Analysis(result) => self.tools.analysis.complete(ticket.seq, result),
            RequestOutput::Flashcards(cards) => self
                .tools
                .flashcards
                .complete(ticket.seq, FlashcardDeck::new(cards)),
            RequestOutput::Quiz(questions) => {
                self.tools.quiz.complete(ticket.seq, QuizRun::new(questions))
            }
            RequestOutput::ReportCard(analysis) => self.report_card.complete(ticket.seq, analysis),
            RequestOutput::Syllabus(data) => self.syllabus.complete(ticket.seq, data),
        }
    }

    pub fn fail_request(&mut self, ticket: RequestTicket, message: &str) -> Completion {
        match ticket.kind {
            RequestKind::Analysis => self.tools.analysis.fail(ticket.seq, message),
            RequestKind::Flashcards => self.tools.flashcards.fail(ticket.seq, message),
            RequestKind::Quiz => self.tools.quiz.fail(ticket.seq, message),
            RequestKind::ReportCard => self.report_card.fail(ticket.seq, message),
            RequestKind::Syllabus => self.syllabus.fail(ticket.seq, message),
        }
    }

    /// Switch views. Leaving a view discards its slots, which turns any of its
    /// in-flight requests stale. Staying on the same view changes nothing.
    pub fn navigate(&mut self, to: View) -> Result<View, RouterError> {
        let from = self.router.current();
        if !self.has_preferences() {
            return Err(RouterError::PreferencesRequired);
        }
        if from == to {
            return Ok(from);
        }

        self.router.navigate(to, true)?;
        self.discard_view_slots(from);
        Ok(from)
    }

    fn discard_view_slots(&mut self, view: View) {
        match view {
            View::Home => {}
            View::Tools => self.tools.reset_results(),
            View::Subjects => self.report_card.reset(),
            View::Syllabus => self.syllabus.reset(),
        }
    }

    /// Forget the confirmed record and everything that depended on it.
    pub fn clear_preferences(&mut self) {
        self.preferences = None;
        self.wizard = PreferenceWizard::default();
        self.router.reset();
        self.tools = ToolSession::default();
        self.report_card.reset();
        self.syllabus.reset();
    }
}
