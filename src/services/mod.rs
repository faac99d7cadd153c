//! Services module - backend calls and the workflows built on them.
//!
//! The services own every network round trip and hand their results to the
//! [`StateManager`](crate::state::StateManager). They have no dependencies on
//! the front end, so the same calls drive the CLI and the tests.
//!
//! # Components
//!
//! - [`StudyBackend`]: the backend contract, with [`HttpBackend`] as the
//!   reqwest implementation.
//! - [`ToolService`]: text analysis, flashcards, quizzes, uploads and progress.
//!   Each call validates its input, takes a ticket for its result slot and
//!   completes it through the stale-response guard.
//! - [`PreferenceService`]: confirmation, local persistence and the
//!   background remote save of the preference record.
//! - [`local_analysis`]: the offline estimate used when the analyzer is
//!   unavailable.
//! - [`ProgressStats`]: dashboard numbers derived from the activity history.
//!
//! # Usage Example
//!
//! ```ignore
//! use studyverse::services::{HttpBackend, ToolService};
//!
//! let backend = Arc::new(HttpBackend::from_settings(&settings)?);
//! let tools = ToolService::new(backend, state.clone(), metrics.clone());
//!
//! match tools.analyze("Photosynthesis turns light into sugar.").await? {
//!     ToolOutcome::Fallback(reason) => println!("offline estimate ({reason:?})"),
//!     outcome => println!("{outcome:?}"),
//! }
//! ```

pub mod analysis;
pub mod api;
pub mod documents;
pub mod preferences;
pub mod progress;
pub mod tools;

pub use analysis::{local_analysis, sentence_count, word_count};
pub use api::{ApiError, HttpBackend, StudyBackend};
pub use documents::{REPORT_CARD_EXTENSIONS, SYLLABUS_EXTENSIONS, UploadFile, format_file_size};
pub use preferences::{Confirmed, PreferenceService, SetupError};
pub use progress::{Achievement, ProgressStats, activity_display_name};
pub use tools::{MAX_GENERATED_ITEMS, ToolError, ToolOutcome, ToolService};
