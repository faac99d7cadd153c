// Preference wizard
//
// Ordered selection steps: age -> style -> theme -> confirmation. Forward
// moves need a selection for the current step, steps are never skipped, and
// "back" clears the selection of the step being left.

use crate::models::{AgeGroup, PreferenceError, PreferenceRecord, StylePreference};
use chrono::{DateTime, Utc};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardStep {
    #[default]
    Age,
    Style,
    Theme,
    Confirmation,
}

impl WizardStep {
    /// 1-based position shown in the progress indicator.
    pub fn number(self) -> u8 {
        match self {
            WizardStep::Age => 1,
            WizardStep::Style => 2,
            WizardStep::Theme => 3,
            WizardStep::Confirmation => 4,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            WizardStep::Age => "How old are you?",
            WizardStep::Style => "Choose your style preference",
            WizardStep::Theme => "Pick your favorite theme",
            WizardStep::Confirmation => "Confirm your choices",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WizardStep::Age => "age",
            WizardStep::Style => "style",
            WizardStep::Theme => "theme",
            WizardStep::Confirmation => "confirmation",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Cannot {action} during the {step} step")]
    WrongStep {
        step: WizardStep,
        action: &'static str,
    },

    #[error("Please make a selection for the {0} step")]
    MissingSelection(WizardStep),

    #[error(transparent)]
    Preference(#[from] PreferenceError),
}

/// Selections collected so far and the step the learner is on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceWizard {
    step: WizardStep,
    age: Option<AgeGroup>,
    style: Option<StylePreference>,
    theme: Option<String>,
}

impl PreferenceWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn age(&self) -> Option<AgeGroup> {
        self.age
    }

    pub fn style(&self) -> Option<StylePreference> {
        self.style
    }

    pub fn theme(&self) -> Option<&str> {
        self.theme.as_deref()
    }

    pub fn select_age(&mut self, age: AgeGroup) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Age, "select an age group")?;
        self.age = Some(age);
        self.step = WizardStep::Style;
        Ok(())
    }

    /// Select an age group by id. An empty id is a missing selection.
    pub fn select_age_str(&mut self, id: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Age, "select an age group")?;
        if id.trim().is_empty() {
            return Err(WizardError::MissingSelection(WizardStep::Age));
        }
        let age = id.parse::<AgeGroup>()?;
        self.select_age(age)
    }

    pub fn select_style(&mut self, style: StylePreference) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Style, "select a style")?;
        self.style = Some(style);
        self.step = WizardStep::Theme;
        Ok(())
    }

    pub fn select_style_str(&mut self, id: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Style, "select a style")?;
        if id.trim().is_empty() {
            return Err(WizardError::MissingSelection(WizardStep::Style));
        }
        let style = id.parse::<StylePreference>()?;
        self.select_style(style)
    }

    /// Select a theme from the chosen age group's set and move on to the
    /// confirmation gate.
    pub fn select_theme(&mut self, id: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::Theme, "select a theme")?;
        let id = id.trim();
        if id.is_empty() {
            return Err(WizardError::MissingSelection(WizardStep::Theme));
        }

        let age = self
            .age
            .ok_or(WizardError::MissingSelection(WizardStep::Age))?;
        if !age.has_theme(id) {
            return Err(PreferenceError::ThemeNotInAgeGroup {
                age_group: age,
                theme: id.to_string(),
            }
            .into());
        }

        self.theme = Some(id.to_string());
        self.step = WizardStep::Confirmation;
        Ok(())
    }

    /// Step back once. Returns `false` when already at the first step.
    pub fn back(&mut self) -> bool {
        match self.step {
            WizardStep::Age => return false,
            WizardStep::Style => {
                self.style = None;
                self.step = WizardStep::Age;
            }
            WizardStep::Theme => {
                self.theme = None;
                self.step = WizardStep::Style;
            }
            // Leaving the gate keeps the selections; the learner just sees the
            // theme list again.
            WizardStep::Confirmation => self.step = WizardStep::Theme,
        }
        tracing::debug!("Wizard moved back to {} step", self.step);
        true
    }

    /// True when every selection is present and the gate is showing.
    pub fn is_complete(&self) -> bool {
        self.step == WizardStep::Confirmation
            && self.age.is_some()
            && self.style.is_some()
            && self.theme.is_some()
    }

    /// Build the record from the current selections. Does not mutate the
    /// wizard; persisting the record is the caller's job.
    pub fn confirm(&self, now: DateTime<Utc>) -> Result<PreferenceRecord, WizardError> {
        self.expect_step(WizardStep::Confirmation, "confirm preferences")?;

        let age = self
            .age
            .ok_or(WizardError::MissingSelection(WizardStep::Age))?;
        let style = self
            .style
            .ok_or(WizardError::MissingSelection(WizardStep::Style))?;
        let theme = self
            .theme
            .clone()
            .ok_or(WizardError::MissingSelection(WizardStep::Theme))?;

        Ok(PreferenceRecord::new(age, Some(style), theme, now)?)
    }

    fn expect_step(&self, expected: WizardStep, action: &'static str) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                step: self.step,
                action,
            })
        }
    }
}
