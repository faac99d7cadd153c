// Local persisted state
//
// Two unversioned JSON files in the data directory: the confirmed preference
// record and the selected palette name. A schema change means clearing them.

use crate::models::PreferenceRecord;
use crate::theme::PaletteName;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

pub const PREFERENCES_FILE: &str = "studyverse-preferences.json";
pub const PALETTE_FILE: &str = "studyverse-theme.json";

#[derive(Debug, Clone)]
pub struct LocalStore {
    preferences_path: Utf8PathBuf,
    palette_path: Utf8PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Utf8Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            preferences_path: dir.join(PREFERENCES_FILE),
            palette_path: dir.join(PALETTE_FILE),
        }
    }

    pub fn preferences_path(&self) -> &Utf8Path {
        &self.preferences_path
    }

    /// The saved record, `None` if nothing was saved. A file that does not
    /// parse (or names a theme outside its age group) is an error.
    pub fn load_preferences(&self) -> Result<Option<PreferenceRecord>> {
        if !self.preferences_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.preferences_path).with_context(|| {
            format!("Failed to read preferences: {}", self.preferences_path)
        })?;
        let record: PreferenceRecord = serde_json::from_str(&contents).with_context(|| {
            format!("Failed to parse preferences: {}", self.preferences_path)
        })?;

        Ok(Some(record))
    }

    pub fn save_preferences(&self, record: &PreferenceRecord) -> Result<()> {
        let json =
            serde_json::to_string_pretty(record).context("Failed to serialize preferences")?;
        write_replacing(&self.preferences_path, &json)?;
        tracing::info!("Saved preferences to {}", self.preferences_path);
        Ok(())
    }

    /// Remove the saved record. Returns whether there was one.
    pub fn clear_preferences(&self) -> Result<bool> {
        if !self.preferences_path.exists() {
            return Ok(false);
        }
        fs::remove_file(&self.preferences_path).with_context(|| {
            format!("Failed to remove preferences: {}", self.preferences_path)
        })?;
        tracing::info!("Cleared saved preferences");
        Ok(true)
    }

    /// The saved palette. Unknown names are ignored.
    pub fn load_palette(&self) -> Result<Option<PaletteName>> {
        if !self.palette_path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.palette_path)
            .with_context(|| format!("Failed to read palette: {}", self.palette_path))?;

        match serde_json::from_str::<PaletteName>(&contents) {
            Ok(palette) => Ok(Some(palette)),
            Err(e) => {
                tracing::warn!("Ignoring saved palette in {}: {}", self.palette_path, e);
                Ok(None)
            }
        }
    }

    pub fn save_palette(&self, palette: PaletteName) -> Result<()> {
        let json = serde_json::to_string(&palette).context("Failed to serialize palette")?;
        write_replacing(&self.palette_path, &json)
    }
}

/// Write to a sibling temp file and rename over the target, so a crash never
/// leaves a half-written file behind.
fn write_replacing(path: &Utf8Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, contents).with_context(|| format!("Failed to write {}", tmp))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path))?;
    Ok(())
}
