// State management module
//
// The pure state machines live in the submodules. StateManager wraps
// AppState in Arc<RwLock<T>> and emits change events so the front end can
// redraw without polling.

pub mod flashcards;
pub mod gate;
pub mod quiz;
pub mod router;
pub mod session;
pub mod wizard;

pub use flashcards::FlashcardDeck;
pub use quiz::{AnswerOutcome, QuizError, QuizRun, QuizScore};
pub use router::{RouterError, Screen, View, ViewRouter};
pub use session::{
    Completion, RequestKind, RequestOutput, RequestSlot, RequestTicket, SlotStatus, ToolSession,
};
pub use wizard::{PreferenceWizard, WizardError, WizardStep};

use crate::models::{AgeGroup, AppState, PreferenceError, PreferenceRecord, StylePreference};
use crate::theme::PaletteName;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

/// Change events emitted when state is modified.
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    WizardStepChanged {
        step: WizardStep,
    },

    PreferencesConfirmed {
        age_group: AgeGroup,
        theme: String,
    },

    PreferencesCleared,

    ViewChanged {
        from: View,
        to: View,
    },

    TextChanged,

    RequestStarted {
        kind: RequestKind,
    },

    RequestSucceeded {
        kind: RequestKind,
    },

    RequestFailed {
        kind: RequestKind,
        message: String,
    },

    /// A slot went back to idle (view switch or reset).
    SlotReset {
        kind: RequestKind,
    },

    /// A completion arrived for a request that no longer owns its slot.
    StaleResponseDiscarded {
        kind: RequestKind,
    },

    FlashcardMoved {
        index: usize,
        total: usize,
    },

    PaletteChanged {
        palette: PaletteName,
    },
}

/// Thread-safe state manager with event emission.
///
/// - [`read()`](Self::read) for reading state
/// - [`update()`](Self::update) / [`try_update()`](Self::try_update) for mutations with automatic events
/// - [`subscribe()`](Self::subscribe) for listening to state changes
pub struct StateManager {
    state: Arc<RwLock<AppState>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state and a 100-event channel.
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, AppState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, AppState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone of the current state, safe to hold without a lock.
    pub fn snapshot(&self) -> AppState {
        self.read_lock().clone()
    }

    /// Run a closure with read access to the state.
    ///
    /// # Example
    /// ```ignore
    /// let confirmed = state_manager.read(|state| state.has_preferences());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.read_lock();
        f(&state)
    }

    /// Update the state and emit change events.
    ///
    /// Captures the old state, applies `update_fn`, diffs the two and sends
    /// one event per detected change. Returns the events that were sent.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.write_lock();
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = self.detect_changes(&old_state, &state);
        self.emit_all(&changes);
        changes
    }

    /// Like [`update`](Self::update) for fallible mutations. On `Err` the
    /// state is restored and no events are sent.
    pub fn try_update<F, T, E>(&self, update_fn: F) -> Result<(T, Vec<StateChange>), E>
    where
        F: FnOnce(&mut AppState) -> Result<T, E>,
    {
        let mut state = self.write_lock();
        let old_state = state.clone();

        match update_fn(&mut state) {
            Ok(value) => {
                let changes = self.detect_changes(&old_state, &state);
                self.emit_all(&changes);
                Ok((value, changes))
            }
            Err(err) => {
                *state = old_state;
                Err(err)
            }
        }
    }

    /// Subscribe to state change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn emit(&self, change: StateChange) {
        // No subscribers is fine
        let _ = self.state_tx.send(change);
    }

    fn emit_all(&self, changes: &[StateChange]) {
        for change in changes {
            self.emit(change.clone());
        }
    }

    fn detect_changes(&self, old: &AppState, new: &AppState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        if old.wizard.step() != new.wizard.step() {
            changes.push(StateChange::WizardStepChanged {
                step: new.wizard.step(),
            });
        }

        match (&old.preferences, &new.preferences) {
            (None, Some(record)) => changes.push(StateChange::PreferencesConfirmed {
                age_group: record.age_group(),
                theme: record.theme().to_string(),
            }),
            (Some(_), None) => changes.push(StateChange::PreferencesCleared),
            _ => {}
        }

        if old.router.current() != new.router.current() {
            changes.push(StateChange::ViewChanged {
                from: old.router.current(),
                to: new.router.current(),
            });
        }

        if old.tools.text != new.tools.text {
            changes.push(StateChange::TextChanged);
        }

        for kind in RequestKind::ALL {
            let before = old.slot_status(kind);
            let after = new.slot_status(kind);
            if before == after {
                continue;
            }
            changes.push(match after {
                SlotStatus::Pending => StateChange::RequestStarted { kind },
                SlotStatus::Success => StateChange::RequestSucceeded { kind },
                SlotStatus::Error => StateChange::RequestFailed {
                    kind,
                    message: new.slot_error(kind).unwrap_or_default().to_string(),
                },
                SlotStatus::Idle => StateChange::SlotReset { kind },
            });
        }

        if let (Some(before), Some(after)) =
            (old.tools.flashcards.result(), new.tools.flashcards.result())
        {
            if before.len() == after.len() && before.index() != after.index() {
                changes.push(StateChange::FlashcardMoved {
                    index: after.index(),
                    total: after.len(),
                });
            }
        }

        if old.palette != new.palette {
            changes.push(StateChange::PaletteChanged {
                palette: new.palette,
            });
        }

        changes
    }

    // Wizard

    pub fn select_age(&self, age: AgeGroup) -> Result<Vec<StateChange>, WizardError> {
        self.try_update(|state| state.wizard.select_age(age))
            .map(|(_, changes)| changes)
    }

    pub fn select_style(&self, style: StylePreference) -> Result<Vec<StateChange>, WizardError> {
        self.try_update(|state| state.wizard.select_style(style))
            .map(|(_, changes)| changes)
    }

    pub fn select_theme(&self, theme: &str) -> Result<Vec<StateChange>, WizardError> {
        self.try_update(|state| state.wizard.select_theme(theme))
            .map(|(_, changes)| changes)
    }

    pub fn wizard_back(&self) -> Vec<StateChange> {
        self.update(|state| {
            state.wizard.back();
        })
    }

    pub fn cancel_confirmation(&self) -> Result<Vec<StateChange>, WizardError> {
        self.try_update(|state| gate::cancel(&mut state.wizard))
            .map(|(_, changes)| changes)
    }

    /// Store the confirmed record. A session holds at most one.
    pub fn set_preferences(
        &self,
        record: PreferenceRecord,
    ) -> Result<Vec<StateChange>, PreferenceError> {
        self.try_update(|state| {
            if state.preferences.is_some() {
                return Err(PreferenceError::AlreadyConfirmed);
            }
            tracing::info!(
                "Preferences confirmed: age={}, theme={}",
                record.age_group(),
                record.theme()
            );
            state.preferences = Some(record);
            Ok(())
        })
        .map(|(_, changes)| changes)
    }

    pub fn clear_preferences(&self) -> Vec<StateChange> {
        self.update(AppState::clear_preferences)
    }

    /// Populate state from what was persisted by an earlier run.
    pub fn load_persisted(
        &self,
        record: Option<PreferenceRecord>,
        palette: Option<PaletteName>,
    ) -> Vec<StateChange> {
        self.update(|state| {
            if let Some(record) = record {
                tracing::info!(
                    "Loaded saved preferences: age={}, theme={}",
                    record.age_group(),
                    record.theme()
                );
                state.preferences = Some(record);
            }
            if let Some(palette) = palette {
                state.palette = palette;
            }
        })
    }

    // Views and requests

    pub fn navigate(&self, to: View) -> Result<Vec<StateChange>, RouterError> {
        self.try_update(|state| state.navigate(to))
            .map(|(_, changes)| changes)
    }

    pub fn set_text(&self, text: impl Into<String>) -> Vec<StateChange> {
        let text = text.into();
        self.update(|state| state.tools.set_text(text))
    }

    /// `None` while a request of this kind is still pending.
    pub fn begin_request(&self, kind: RequestKind) -> Option<RequestTicket> {
        let mut ticket = None;
        self.update(|state| ticket = state.begin_request(kind));
        ticket
    }

    /// Start a tool request and record the text it sends. Neither happens
    /// while a request of this kind is pending.
    pub fn begin_text_request(&self, kind: RequestKind, text: &str) -> Option<RequestTicket> {
        let mut ticket = None;
        self.update(|state| {
            ticket = state.begin_request(kind);
            if ticket.is_some() {
                state.tools.set_text(text);
            }
        });
        ticket
    }

    pub fn complete_request(&self, ticket: RequestTicket, output: RequestOutput) -> Completion {
        let mut completion = Completion::Stale;
        self.update(|state| completion = state.complete_request(ticket, output));
        self.note_stale(ticket, completion);
        completion
    }

    pub fn fail_request(&self, ticket: RequestTicket, message: &str) -> Completion {
        let mut completion = Completion::Stale;
        self.update(|state| completion = state.fail_request(ticket, message));
        self.note_stale(ticket, completion);
        completion
    }

    fn note_stale(&self, ticket: RequestTicket, completion: Completion) {
        if completion == Completion::Stale {
            tracing::debug!("Discarded stale {} response (seq {})", ticket.kind, ticket.seq);
            self.emit(StateChange::StaleResponseDiscarded { kind: ticket.kind });
        }
    }

    // Flashcards and quiz

    pub fn next_card(&self) -> Vec<StateChange> {
        self.update(|state| {
            if let Some(deck) = state.tools.flashcards.result_mut() {
                deck.next();
            }
        })
    }

    pub fn previous_card(&self) -> Vec<StateChange> {
        self.update(|state| {
            if let Some(deck) = state.tools.flashcards.result_mut() {
                deck.previous();
            }
        })
    }

    pub fn toggle_answer(&self) -> Vec<StateChange> {
        self.update(|state| {
            if let Some(deck) = state.tools.flashcards.result_mut() {
                deck.toggle_answer();
            }
        })
    }

    pub fn toggle_hint(&self) -> Vec<StateChange> {
        self.update(|state| {
            if let Some(deck) = state.tools.flashcards.result_mut() {
                deck.toggle_hint();
            }
        })
    }

    pub fn answer_quiz(&self, choice: usize) -> Result<AnswerOutcome, QuizError> {
        self.try_update(|state| {
            state
                .tools
                .quiz
                .result_mut()
                .ok_or(QuizError::NoQuestion)
                .and_then(|quiz| quiz.answer(choice))
        })
        .map(|(outcome, _)| outcome)
    }

    /// Move to the next quiz question; `false` at the end or with no quiz.
    pub fn advance_quiz(&self) -> bool {
        let mut moved = false;
        self.update(|state| {
            if let Some(quiz) = state.tools.quiz.result_mut() {
                moved = quiz.advance();
            }
        });
        moved
    }

    pub fn set_palette(&self, palette: PaletteName) -> Vec<StateChange> {
        self.update(|state| state.palette = palette)
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for StateManager {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            state_tx: self.state_tx.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Flashcard, QuizQuestion};
    use chrono::Utc;

    fn confirmed_manager() -> StateManager {
        let manager = StateManager::new();
        let record = PreferenceRecord::new(
            AgeGroup::Middle,
            Some(StylePreference::Neutral),
            "gaming",
            Utc::now(),
        )
        .unwrap();
        manager.set_preferences(record).unwrap();
        manager
    }

    fn cards(n: usize) -> Vec<Flashcard> {
        (0..n)
            .map(|i| Flashcard {
                question: format!("Q{i}"),
                answer: format!("A{i}"),
                hint: Some(format!("H{i}")),
            })
            .collect()
    }

    #[test]
    fn test_new_state_manager() {
        let manager = StateManager::new();
        let state = manager.snapshot();

        assert!(!state.has_preferences());
        assert_eq!(state.wizard.step(), WizardStep::Age);
        assert_eq!(state.screen(), Screen::Wizard);
    }

    #[test]
    fn test_wizard_events() {
        let manager = StateManager::new();

        let changes = manager.select_age(AgeGroup::Adult).unwrap();
        assert_eq!(
            changes,
            vec![StateChange::WizardStepChanged {
                step: WizardStep::Style
            }]
        );

        let changes = manager.wizard_back();
        assert_eq!(
            changes,
            vec![StateChange::WizardStepChanged {
                step: WizardStep::Age
            }]
        );
    }

    #[test]
    fn test_failed_update_restores_state() {
        let manager = StateManager::new();
        manager.select_age(AgeGroup::Preschool).unwrap();
        manager.select_style(StylePreference::Girl).unwrap();

        let before = manager.read(|state| state.wizard.clone());
        assert!(manager.select_theme("dark").is_err());
        assert_eq!(manager.read(|state| state.wizard.clone()), before);
    }

    #[test]
    fn test_preferences_are_write_once() {
        let manager = confirmed_manager();
        let again = PreferenceRecord::new(AgeGroup::Adult, None, "focus", Utc::now()).unwrap();

        assert_eq!(
            manager.set_preferences(again),
            Err(PreferenceError::AlreadyConfirmed)
        );
        assert_eq!(
            manager.read(|state| state.preferences.as_ref().map(|p| p.theme().to_string())),
            Some("gaming".to_string())
        );
    }

    #[test]
    fn test_request_events() {
        let manager = confirmed_manager();
        let ticket = manager.begin_request(RequestKind::Flashcards).unwrap();
        assert!(manager.begin_request(RequestKind::Flashcards).is_none());

        let mut rx = manager.subscribe();
        manager.fail_request(ticket, "Flashcard service unavailable");
        assert_eq!(
            rx.try_recv().unwrap(),
            StateChange::RequestFailed {
                kind: RequestKind::Flashcards,
                message: "Flashcard service unavailable".to_string()
            }
        );
    }

    #[test]
    fn test_text_request_keeps_text_while_pending() {
        let manager = confirmed_manager();
        assert!(manager.begin_text_request(RequestKind::Analysis, "first").is_some());

        let mut rx = manager.subscribe();
        assert!(manager.begin_text_request(RequestKind::Analysis, "second").is_none());
        assert_eq!(manager.read(|state| state.tools.text.clone()), "first");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_stale_response_emits_event() {
        let manager = confirmed_manager();
        manager.navigate(View::Tools).unwrap();
        let ticket = manager.begin_request(RequestKind::Quiz).unwrap();

        let changes = manager.navigate(View::Subjects).unwrap();
        assert!(changes.contains(&StateChange::SlotReset {
            kind: RequestKind::Quiz
        }));

        let mut rx = manager.subscribe();
        let completion = manager.complete_request(ticket, RequestOutput::Quiz(Vec::new()));
        assert_eq!(completion, Completion::Stale);
        assert_eq!(
            rx.try_recv().unwrap(),
            StateChange::StaleResponseDiscarded {
                kind: RequestKind::Quiz
            }
        );
    }

    #[test]
    fn test_flashcard_navigation_events() {
        let manager = confirmed_manager();
        let ticket = manager.begin_request(RequestKind::Flashcards).unwrap();
        manager.complete_request(ticket, RequestOutput::Flashcards(cards(2)));

        assert!(manager.previous_card().is_empty());
        assert_eq!(
            manager.next_card(),
            vec![StateChange::FlashcardMoved { index: 1, total: 2 }]
        );
        assert!(manager.next_card().is_empty());

        manager.toggle_answer();
        manager.toggle_hint();
        let deck = manager.read(|state| state.tools.flashcards.result().cloned()).unwrap();
        assert_eq!(deck.index(), 1);
        assert!(deck.is_answer_shown());
        assert!(deck.is_hint_shown());
    }

    #[test]
    fn test_quiz_flow() {
        let manager = confirmed_manager();
        assert_eq!(manager.answer_quiz(0), Err(QuizError::NoQuestion));

        let ticket = manager.begin_request(RequestKind::Quiz).unwrap();
        let question = QuizQuestion {
            question: "2 + 2?".to_string(),
            options: vec!["3".to_string(), "4".to_string()],
            correct_index: 1,
            explanation: "Two pairs make four.".to_string(),
        };
        manager.complete_request(ticket, RequestOutput::Quiz(vec![question]));

        assert!(manager.answer_quiz(1).unwrap().is_correct());
        assert_eq!(manager.answer_quiz(0), Err(QuizError::AlreadyAnswered));
        assert!(!manager.advance_quiz());
    }

    #[test]
    fn test_clear_preferences() {
        let manager = confirmed_manager();
        manager.navigate(View::Tools).unwrap();

        let changes = manager.clear_preferences();
        assert!(changes.contains(&StateChange::PreferencesCleared));
        assert!(changes.contains(&StateChange::ViewChanged {
            from: View::Tools,
            to: View::Home
        }));
    }

    #[test]
    fn test_palette_change() {
        let manager = StateManager::new();
        assert_eq!(
            manager.set_palette(PaletteName::Ocean),
            vec![StateChange::PaletteChanged {
                palette: PaletteName::Ocean
            }]
        );
        assert!(manager.set_palette(PaletteName::Ocean).is_empty());
    }
}
