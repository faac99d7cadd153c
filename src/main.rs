//! StudyVerse - personalized AI study companion
//!
//! Main entry point for the terminal application.
//!
//! # Overview
//!
//! This binary wires the library together and hands control to the
//! [`CliController`]. It initializes:
//! - Logging infrastructure (daily file rotation, optional console output)
//! - Tokio async runtime (backend requests, background preference saves)
//! - State management ([`StateManager`])
//! - Configuration loading ([`ConfigManager`])
//!
//! The main thread reads learner input and blocks on service calls through
//! the runtime handle; tokio workers carry the HTTP traffic and the
//! fire-and-forget preference save.
//!
//! # Execution Flow
//!
//! 1. Parse the command line
//! 2. Load settings from `<data dir>/StudyVerse Config.yaml` and `STUDYVERSE_*`
//! 3. Initialize logging → logs/studyverse.<date>
//! 4. Create tokio runtime with 4 worker threads
//! 5. Create StateManager and restore saved preferences and palette
//! 6. Run the subcommand, or the interactive shell
//! 7. Wait for pending preference saves, log metrics, shut the runtime down

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use studyverse::ui::{Cli, CliController};
use studyverse::{
    APP_NAME, ConfigManager, HttpBackend, Metrics, PreferenceService, StateManager, ToolService,
    VERSION,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.data_dir)?;
    let settings = config_manager.load_settings()?;

    let debug_mode = cli.debug || settings.debug_mode;
    let _log_guard = studyverse::logging::setup_logging_with_console(
        "logs",
        "studyverse",
        debug_mode,
        cli.debug || settings.log_to_console,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(4)
        .thread_name("studyverse-worker")
        .build()?;

    tracing::info!("Tokio runtime initialized with {} worker threads", 4);

    let state_manager = StateManager::new();
    let metrics = Arc::new(Metrics::new());
    let backend = Arc::new(HttpBackend::from_settings(&settings)?);
    tracing::info!("Using backend at {}", backend.base_url());

    let tools = ToolService::new(backend.clone(), state_manager.clone(), metrics.clone());
    let preferences = PreferenceService::new(
        backend,
        state_manager.clone(),
        config_manager.local_store(),
        metrics.clone(),
    );

    if preferences.load_saved().is_some() {
        tracing::info!("Saved preferences restored");
    }

    let stdin = std::io::stdin();
    let mut controller = CliController::new(
        stdin.lock(),
        std::io::stdout(),
        tools,
        preferences,
        settings,
        runtime.handle().clone(),
    );

    let result = controller.run(cli.command);
    controller.finish();

    metrics.log_summary();
    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result.inspect_err(|e| tracing::error!("{:#}", e))
}
