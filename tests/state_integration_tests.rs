//! Integration tests for StateManager with state change events
//!
//! These tests verify that the StateManager correctly:
//! - Emits state change events for wizard, navigation and request slots
//! - Supports multiple subscribers
//! - Keeps slots consistent under concurrent completions
//! - Produces a record that matches the last wizard selections

use chrono::Utc;
use proptest::prelude::*;
use std::sync::Arc;
use studyverse::models::{Flashcard, PreferenceError, TextAnalysis};
use studyverse::state::{
    Completion, PreferenceWizard, RequestKind, RequestOutput, RouterError, Screen, SlotStatus,
    View, WizardError, WizardStep, gate,
};
use studyverse::theme::{self, ColorRole, Paint, Rgb};
use studyverse::{AgeGroup, PreferenceRecord, StateChange, StateManager, StylePreference};
use tokio::time::{Duration, timeout};

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
    state
}

fn sample_analysis() -> TextAnalysis {
    TextAnalysis {
        reading_level: "Advanced".to_string(),
        complexity_score: 6.0,
        key_topics: vec!["topic1".to_string()],
        estimated_reading_time: 1,
        recommendations: vec!["Read more".to_string()],
    }
}

#[tokio::test]
async fn test_wizard_events_emitted() {
    let state = StateManager::new();
    let mut rx = state.subscribe();

    state.select_age(AgeGroup::Elementary).unwrap();

    let event = timeout(Duration::from_millis(100), rx.recv())
        .await
        .expect("Timeout waiting for event")
        .expect("Channel closed");

    assert_eq!(
        event,
        StateChange::WizardStepChanged {
            step: WizardStep::Style
        }
    );
}

#[tokio::test]
async fn test_multiple_subscribers_receive_events() {
    let state = confirmed_state();
    let mut rx1 = state.subscribe();
    let mut rx2 = state.subscribe();

    state.navigate(View::Syllabus).unwrap();

    for rx in [&mut rx1, &mut rx2] {
        let event = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("Timeout waiting for event")
            .expect("Channel closed");
        assert_eq!(
            event,
            StateChange::ViewChanged {
                from: View::Home,
                to: View::Syllabus
            }
        );
    }
}

#[test]
fn test_wizard_gates_main_views() {
    let state = StateManager::new();
    assert_eq!(state.read(|s| s.screen()), Screen::Wizard);
    assert_eq!(
        state.navigate(View::Tools),
        Err(RouterError::PreferencesRequired)
    );

    state.select_age(AgeGroup::High).unwrap();
    state.select_style(StylePreference::Girl).unwrap();
    state.select_theme("minimal").unwrap();
    assert_eq!(state.read(|s| s.wizard.step()), WizardStep::Confirmation);

    let record = gate::accept(&state.read(|s| s.wizard.clone()), Utc::now()).unwrap();
    let changes = state.set_preferences(record).unwrap();
    assert!(changes.contains(&StateChange::PreferencesConfirmed {
        age_group: AgeGroup::High,
        theme: "minimal".to_string()
    }));
    assert_eq!(state.read(|s| s.screen()), Screen::Main(View::Home));
}

#[test]
fn test_record_is_write_once() {
    let state = confirmed_state();
    let other = PreferenceRecord::new(AgeGroup::Adult, None, "focus", Utc::now()).unwrap();

    assert_eq!(
        state.set_preferences(other),
        Err(PreferenceError::AlreadyConfirmed)
    );
    assert_eq!(
        state.read(|s| s.preferences.as_ref().map(|p| p.theme().to_string())),
        Some("gaming".to_string())
    );
}

#[test]
fn test_wrong_theme_is_rejected_without_events() {
    let state = StateManager::new();
    state.select_age(AgeGroup::Preschool).unwrap();
    state.select_style(StylePreference::Boy).unwrap();

    let mut rx = state.subscribe();
    let err = state.select_theme("gaming").unwrap_err();
    assert!(matches!(
        err,
        WizardError::Preference(PreferenceError::ThemeNotInAgeGroup { .. })
    ));
    assert_eq!(state.read(|s| s.wizard.step()), WizardStep::Theme);
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_cancel_returns_to_theme_keeping_selections() {
    let state = StateManager::new();
    state.select_age(AgeGroup::Elementary).unwrap();
    state.select_style(StylePreference::Neutral).unwrap();
    state.select_theme("space").unwrap();

    state.cancel_confirmation().unwrap();

    let wizard = state.read(|s| s.wizard.clone());
    assert_eq!(wizard.step(), WizardStep::Theme);
    assert_eq!(wizard.age(), Some(AgeGroup::Elementary));
    assert_eq!(wizard.style(), Some(StylePreference::Neutral));
    assert_eq!(wizard.theme(), Some("space"));
    assert!(gate::summary(&wizard).is_none());
}

#[test]
fn test_request_lifecycle_events() {
    let state = confirmed_state();
    state.navigate(View::Tools).unwrap();

    let ticket = state.begin_request(RequestKind::Analysis).unwrap();
    assert!(state.begin_request(RequestKind::Analysis).is_none());

    let mut rx = state.subscribe();
    let completion = state.complete_request(
        ticket,
        RequestOutput::Analysis(studyverse::models::AnalysisResult::Remote(
            sample_analysis(),
        )),
    );

    assert_eq!(completion, Completion::Applied);
    assert_eq!(
        rx.try_recv().unwrap(),
        StateChange::RequestSucceeded {
            kind: RequestKind::Analysis
        }
    );
    assert_eq!(
        state.read(|s| s.slot_status(RequestKind::Analysis)),
        SlotStatus::Success
    );
}

#[test]
fn test_view_switch_discards_late_response() {
    let state = confirmed_state();
    state.navigate(View::Tools).unwrap();
    let ticket = state.begin_request(RequestKind::Flashcards).unwrap();

    let changes = state.navigate(View::Subjects).unwrap();
    assert!(changes.contains(&StateChange::SlotReset {
        kind: RequestKind::Flashcards
    }));

    let mut rx = state.subscribe();
    let completion = state.complete_request(
        ticket,
        RequestOutput::Flashcards(vec![Flashcard {
            question: "Q".to_string(),
            answer: "A".to_string(),
            hint: None,
        }]),
    );

    assert_eq!(completion, Completion::Stale);
    assert_eq!(
        rx.try_recv().unwrap(),
        StateChange::StaleResponseDiscarded {
            kind: RequestKind::Flashcards
        }
    );
    assert!(state.read(|s| s.tools.flashcards.result().is_none()));
}

#[test]
fn test_concurrent_slots_do_not_interfere() {
    let state = Arc::new(confirmed_state());
    state.navigate(View::Tools).unwrap();

    let handles: Vec<_> = [RequestKind::Analysis, RequestKind::Flashcards, RequestKind::Quiz]
        .into_iter()
        .map(|kind| {
            let state = Arc::clone(&state);
            std::thread::spawn(move || {
                let ticket = state.begin_request(kind).unwrap();
                state.fail_request(ticket, &format!("{kind} failed"))
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Completion::Applied);
    }

    for kind in [RequestKind::Analysis, RequestKind::Flashcards, RequestKind::Quiz] {
        assert_eq!(state.read(|s| s.slot_status(kind)), SlotStatus::Error);
        let expected = format!("{kind} failed");
        assert_eq!(
            state.read(|s| s.slot_error(kind).map(str::to_string)),
            Some(expected)
        );
    }
}

#[test]
fn test_flashcard_navigation_events() {
    let state = confirmed_state();
    state.navigate(View::Tools).unwrap();
    let ticket = state.begin_request(RequestKind::Flashcards).unwrap();
    let cards = (1..=3)
        .map(|i| Flashcard {
            question: format!("Q{i}"),
            answer: format!("A{i}"),
            hint: None,
        })
        .collect();
    state.complete_request(ticket, RequestOutput::Flashcards(cards));

    assert!(state.previous_card().is_empty());
    state.toggle_answer();
    assert_eq!(
        state.next_card(),
        vec![StateChange::FlashcardMoved { index: 1, total: 3 }]
    );
    assert!(!state.read(|s| s.tools.flashcards.result().unwrap().is_answer_shown()));

    state.next_card();
    assert!(state.next_card().is_empty());
    assert_eq!(
        state.read(|s| s.tools.flashcards.result().unwrap().position_label()),
        "3 / 3"
    );
}

#[test]
fn test_theme_resolution() {
    let gaming = theme::resolve(AgeGroup::Middle, "gaming");
    assert!(gaming.display_name.contains("Power Learning Hub"));
    assert_eq!(gaming.card.border, Some(Rgb(0x06b6d4)));

    let sports = theme::resolve(AgeGroup::Middle, "sports");
    assert_eq!(sports, theme::age_default(AgeGroup::Middle));

    assert_eq!(theme::resolve_str("toddler", "animals"), theme::global_default());
    assert_eq!(
        theme::resolve(AgeGroup::Adult, "professional"),
        theme::resolve(AgeGroup::High, "academic")
    );

    for age in AgeGroup::ALL {
        let config = theme::age_default(age);
        for role in ColorRole::ALL {
            assert!(
                matches!(config.color(role), Some(Paint::Solid(_) | Paint::Gradient(..))),
                "{age} lacks {role:?}"
            );
        }
    }
}

proptest! {
    #[test]
    fn prop_confirmed_record_matches_last_selections(
        rounds in prop::collection::vec((0usize..5, 0usize..3, 0usize..3), 1..4),
    ) {
        let mut wizard = PreferenceWizard::new();
        let mut expected = None;

        for (round, (age_idx, style_idx, theme_idx)) in rounds.into_iter().enumerate() {
            if round > 0 {
                // Confirmation -> Theme -> Style -> Age
                wizard.back();
                wizard.back();
                wizard.back();
                prop_assert_eq!(wizard.step(), WizardStep::Age);
                prop_assert!(wizard.style().is_none());
                prop_assert!(wizard.theme().is_none());
            }

            let age = AgeGroup::ALL[age_idx];
            let style = StylePreference::ALL[style_idx];
            let theme = age.themes()[theme_idx].id;

            wizard.select_age(age).unwrap();
            wizard.select_style(style).unwrap();
            wizard.select_theme(theme).unwrap();
            expected = Some((age, style, theme));
        }

        let (age, style, theme) = expected.unwrap();
        let record = gate::accept(&wizard, Utc::now()).unwrap();
        prop_assert_eq!(record.age_group(), age);
        prop_assert_eq!(record.style(), Some(style));
        prop_assert_eq!(record.theme(), theme);
    }

    #[test]
    fn prop_gate_needs_every_selection(age_idx in 0usize..5, steps in 0usize..3) {
        let mut wizard = PreferenceWizard::new();
        let age = AgeGroup::ALL[age_idx];
        if steps > 0 {
            wizard.select_age(age).unwrap();
        }
        if steps > 1 {
            wizard.select_style(StylePreference::Neutral).unwrap();
        }

        prop_assert!(gate::summary(&wizard).is_none());
        prop_assert!(gate::accept(&wizard, Utc::now()).is_err());
    }
}
