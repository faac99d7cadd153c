// Preference setup
//
// Confirming writes the record to the local store and into session state,
// then sends a best-effort copy to the backend in the background. The remote
// copy never blocks or fails the confirmation.

use crate::config::LocalStore;
use crate::metrics::Metrics;
use crate::models::{PreferenceError, PreferenceRecord};
use crate::services::api::StudyBackend;
use crate::state::{StateManager, WizardError, gate};
use crate::theme::PaletteName;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Preference(#[from] PreferenceError),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// A confirmed record plus the handle of its background remote save.
/// The handle resolves to whether the backend accepted the copy.
#[derive(Debug)]
pub struct Confirmed {
    pub record: PreferenceRecord,
    pub remote_sync: JoinHandle<bool>,
}

#[derive(Clone)]
pub struct PreferenceService {
    backend: Arc<dyn StudyBackend>,
    state: StateManager,
    store: LocalStore,
    metrics: Arc<Metrics>,
}

impl PreferenceService {
    pub fn new(
        backend: Arc<dyn StudyBackend>,
        state: StateManager,
        store: LocalStore,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            backend,
            state,
            store,
            metrics,
        }
    }

    /// Load persisted preferences and palette into state. A corrupt
    /// preference file is logged and treated as absent.
    pub fn load_saved(&self) -> Option<PreferenceRecord> {
        let record = match self.store.load_preferences() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Ignoring saved preferences: {:#}", e);
                None
            }
        };
        let palette = self.store.load_palette().unwrap_or_else(|e| {
            tracing::warn!("Ignoring saved palette: {:#}", e);
            None
        });

        self.state.load_persisted(record.clone(), palette);
        record
    }

    /// Accept the pending selections at the confirmation gate.
    pub async fn confirm(&self, now: DateTime<Utc>) -> Result<Confirmed, SetupError> {
        // One write lock covers the check, the file write and the state change.
        let (record, _) = self.state.try_update(|state| {
            if state.preferences.is_some() {
                return Err(SetupError::from(PreferenceError::AlreadyConfirmed));
            }
            let record = gate::accept(&state.wizard, now)?;
            self.store.save_preferences(&record)?;
            tracing::info!(
                "Preferences confirmed: age={}, theme={}",
                record.age_group(),
                record.theme()
            );
            state.preferences = Some(record.clone());
            Ok(record)
        })?;

        let backend = Arc::clone(&self.backend);
        let metrics = Arc::clone(&self.metrics);
        let remote_copy = record.clone();
        let remote_sync = tokio::spawn(async move {
            match backend.save_preferences(&remote_copy).await {
                Ok(()) => {
                    tracing::debug!("Preferences copied to backend");
                    true
                }
                Err(e) => {
                    tracing::warn!("Failed to save preferences to backend: {}", e);
                    metrics.record_remote_save_failure();
                    false
                }
            }
        });

        Ok(Confirmed {
            record,
            remote_sync,
        })
    }

    /// Forget the confirmed record, locally and in state.
    pub fn reset(&self) -> Result<bool, SetupError> {
        let removed = self.store.clear_preferences()?;
        self.state.clear_preferences();
        Ok(removed)
    }

    pub fn set_palette(&self, palette: PaletteName) -> Result<(), SetupError> {
        self.store.save_palette(palette)?;
        self.state.set_palette(palette);
        tracing::info!("Palette set to {}", palette);
        Ok(())
    }
}
