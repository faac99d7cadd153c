pub mod local_store;

pub use local_store::LocalStore;

use crate::models::AppSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

pub const DEFAULT_DATA_DIR: &str = "StudyVerse Data";
pub const SETTINGS_FILE: &str = "StudyVerse Config.yaml";
pub const ENV_PREFIX: &str = "STUDYVERSE";

/// Loads and saves settings, and hands out the local store for the same
/// data directory.
///
/// Settings are layered: serde defaults, then `StudyVerse Config.yaml`, then
/// `STUDYVERSE_*` environment variables.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    data_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager for `data_dir`, creating the directory if needed.
    pub fn new<P: AsRef<Utf8Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();

        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)
                .with_context(|| format!("Failed to create data directory: {}", data_dir))?;
        }

        Ok(Self {
            settings_path: data_dir.join(SETTINGS_FILE),
            data_dir,
        })
    }

    pub fn data_dir(&self) -> &Utf8Path {
        &self.data_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    pub fn local_store(&self) -> LocalStore {
        LocalStore::new(&self.data_dir)
    }

    /// Load settings from the file and the process environment.
    pub fn load_settings(&self) -> Result<AppSettings> {
        self.load_settings_with_env(None)
    }

    /// Load settings with an explicit environment map in place of the
    /// process environment (`None` reads the real one).
    pub fn load_settings_with_env(
        &self,
        env: Option<config::Map<String, String>>,
    ) -> Result<AppSettings> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
        }

        let layered = config::Config::builder()
            .add_source(
                config::File::new(self.settings_path.as_str(), config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let settings: AppSettings = layered
            .try_deserialize()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        tracing::info!(
            "Loaded settings: api={}, timeout={}s, debug={}",
            settings.api_base_url(),
            settings.request_timeout_secs,
            settings.debug_mode
        );
        Ok(settings)
    }

    pub fn save_settings(&self, settings: &AppSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }
}
