// StudyVerse - personalized AI study companion
//
// This is the library crate containing the state machines, theme resolution,
// backend client and services. The binary crate (main.rs) provides the
// terminal front end.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod theme;
pub mod ui;

// Re-export commonly used types for convenience
pub use self::config::{ConfigManager, LocalStore};
pub use metrics::Metrics;
pub use models::{AgeGroup, AppSettings, AppState, PreferenceRecord, StylePreference};
pub use services::{HttpBackend, PreferenceService, StudyBackend, ToolService};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
