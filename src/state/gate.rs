//! Confirmation gate shown before preferences are locked in.
//!
//! The gate is read-only: it summarizes the pending selections and either
//! produces the [`PreferenceRecord`] or hands control back to the wizard.
//! "Cannot be changed" is a promise made by the UI copy; the persisted record
//! can still be cleared from the data directory.

use crate::models::PreferenceRecord;
use crate::state::wizard::{PreferenceWizard, WizardError, WizardStep};
use chrono::{DateTime, Utc};

pub const IRREVOCABLE_WARNING: &str =
    "These preferences cannot be changed after confirmation. Choose carefully!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationSummary {
    pub age: &'static str,
    pub style: &'static str,
    pub theme: &'static str,
    pub warning: &'static str,
}

/// Summary of the pending selections, or `None` if the wizard is not waiting
/// at the gate.
pub fn summary(wizard: &PreferenceWizard) -> Option<ConfirmationSummary> {
    if !wizard.is_complete() {
        return None;
    }

    let age = wizard.age()?;
    let style = wizard.style()?;
    let theme = age.theme(wizard.theme()?)?;

    Some(ConfirmationSummary {
        age: age.label(),
        style: style.label(),
        theme: theme.label,
        warning: IRREVOCABLE_WARNING,
    })
}

/// Explicit affirmative action: build the record.
pub fn accept(wizard: &PreferenceWizard, now: DateTime<Utc>) -> Result<PreferenceRecord, WizardError> {
    wizard.confirm(now)
}

/// Leave the gate without touching any selection.
pub fn cancel(wizard: &mut PreferenceWizard) -> Result<(), WizardError> {
    if wizard.step() != WizardStep::Confirmation {
        return Err(WizardError::WrongStep {
            step: wizard.step(),
            action: "cancel confirmation",
        });
    }
    wizard.back();
    Ok(())
}
