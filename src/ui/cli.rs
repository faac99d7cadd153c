// Command-line surface
//
// No subcommand opens the interactive shell; every subcommand is a single
// action against the same data directory.

use crate::config::DEFAULT_DATA_DIR;
use crate::theme::PaletteName;
use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "studyverse", version, about = "Personalized AI study companion")]
pub struct Cli {
    /// Directory holding settings and saved preferences
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: Utf8PathBuf,

    /// Log at debug level and echo logs to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Choose age group, style and theme (only once)
    Setup,

    /// Show saved preferences, theme and palette
    Status,

    /// Analyze a text's reading level and topics
    Analyze(TextInput),

    /// Generate flashcards and review them
    Flashcards {
        #[command(flatten)]
        input: TextInput,

        /// Number of cards (1-20)
        #[arg(long)]
        count: Option<u32>,
    },

    /// Generate a multiple-choice quiz and take it
    Quiz {
        #[command(flatten)]
        input: TextInput,

        /// Number of questions (1-20)
        #[arg(long)]
        count: Option<u32>,
    },

    /// Show learning progress and achievements
    Progress,

    /// Upload a report card (pdf, jpg, jpeg, png)
    ReportCard { file: Utf8PathBuf },

    /// Upload a course syllabus (pdf, doc, docx, txt)
    Syllabus { file: Utf8PathBuf },

    /// Show palettes, or switch to one
    Palette { name: Option<PaletteName> },

    /// Forget saved preferences
    Reset,
}

/// Study text given inline or read from a file.
#[derive(Args, Debug, Clone, PartialEq, Eq, Default)]
pub struct TextInput {
    /// The text itself; words are joined with spaces
    #[arg(conflicts_with = "file")]
    pub text: Vec<String>,

    /// Read the text from this file instead
    #[arg(long)]
    pub file: Option<Utf8PathBuf>,
}

impl TextInput {
    pub fn resolve(&self) -> Result<String> {
        if let Some(path) = &self.file {
            return std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read text from {}", path));
        }
        if self.text.is_empty() {
            bail!("Provide the text as arguments or with --file");
        }
        Ok(self.text.join(" "))
    }
}
