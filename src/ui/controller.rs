// CLI Controller - drives the wizard, the shell and the study tools
//
// Reads one command per line from any BufRead and writes plain text to any
// Write, so the whole front end can be scripted in tests. Async service calls
// run on the shared tokio runtime through `Handle::block_on`.

use crate::models::{AgeGroup, AppSettings, FallbackReason, StylePreference};
use crate::services::progress::ProgressStats;
use crate::services::{PreferenceService, ToolOutcome, ToolService};
use crate::state::{RequestKind, StateManager, View, WizardStep, gate};
use crate::theme::{self, PaletteName};
use crate::ui::cli::Command;
use crate::ui::render;
use anyhow::{Context, Result, anyhow};
use camino::Utf8Path;
use chrono::{Local, Utc};
use std::fmt::Display;
use std::io::{BufRead, Write};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// How long shutdown waits for background preference saves.
const REMOTE_SYNC_GRACE: Duration = Duration::from_secs(5);

const SHELL_HELP: &str = "\
Commands:
  go <home|tools|subjects|syllabus>  switch views
  text <words...>                    set the study text
  analyze [text]                     analyze the study text
  cards [count]                      make flashcards from the study text
  quiz [count]                       make a quiz from the study text
  upload <file>                      upload a report card (subjects) or syllabus (syllabus)
  progress                           show your progress
  palette [name]                     show or switch palettes
  status                             show your preferences and theme
  help                               show this list
  quit                               leave StudyVerse";

/// Terminal front end over the StudyVerse services.
///
/// # Example
/// ```ignore
/// let stdin = std::io::stdin();
/// let mut controller = CliController::new(
///     stdin.lock(),
///     std::io::stdout(),
///     tools,
///     preferences,
///     settings,
///     runtime.handle().clone(),
/// );
/// controller.run(cli.command)?;
/// controller.finish();
/// ```
pub struct CliController<R, W> {
    input: R,
    output: W,
    state: StateManager,
    tools: ToolService,
    preferences: PreferenceService,
    settings: AppSettings,
    runtime: Handle,
    pending_sync: Vec<JoinHandle<bool>>,
}

impl<R: BufRead, W: Write> CliController<R, W> {
    pub fn new(
        input: R,
        output: W,
        tools: ToolService,
        preferences: PreferenceService,
        settings: AppSettings,
        runtime: Handle,
    ) -> Self {
        Self {
            input,
            output,
            state: tools.state().clone(),
            tools,
            preferences,
            settings,
            runtime,
            pending_sync: Vec::new(),
        }
    }

    /// Run one subcommand, or the interactive shell when there is none.
    pub fn run(&mut self, command: Option<Command>) -> Result<()> {
        let Some(command) = command else {
            return self.shell();
        };

        match command {
            Command::Setup => {
                self.setup()?;
            }
            Command::Status => self.status()?,
            Command::Analyze(input) => {
                let text = input.resolve()?;
                self.analyze(&text)?;
            }
            Command::Flashcards { input, count } => {
                let text = input.resolve()?;
                self.flashcards(&text, count.unwrap_or(self.settings.flashcard_count))?;
            }
            Command::Quiz { input, count } => {
                let text = input.resolve()?;
                self.quiz(&text, count.unwrap_or(self.settings.quiz_question_count))?;
            }
            Command::Progress => self.progress()?,
            Command::ReportCard { file } => self.upload(View::Subjects, &file)?,
            Command::Syllabus { file } => self.upload(View::Syllabus, &file)?,
            Command::Palette { name } => self.palette(name)?,
            Command::Reset => self.reset()?,
        }
        Ok(())
    }

    /// Wait briefly for background preference saves still in flight.
    pub fn finish(self) {
        if self.pending_sync.is_empty() {
            return;
        }
        let pending = self.pending_sync;
        self.runtime.block_on(async move {
            for handle in pending {
                if tokio::time::timeout(REMOTE_SYNC_GRACE, handle).await.is_err() {
                    tracing::warn!("Gave up waiting for preference save to finish");
                }
            }
        });
    }

    // Input and output

    fn say(&mut self, text: impl Display) -> Result<()> {
        writeln!(self.output, "{text}").context("Failed to write output")
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}").context("Failed to write output")?;
        self.output.flush().context("Failed to flush output")?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    // Preferences

    /// Walk the learner through the wizard and the confirmation gate.
    /// Returns whether preferences exist afterwards.
    pub fn setup(&mut self) -> Result<bool> {
        if self.state.read(|s| s.has_preferences()) {
            self.say("Your preferences are already set and cannot be changed.")?;
            return Ok(true);
        }

        self.say(render::banner("Welcome to StudyVerse! Let's personalize your experience."))?;

        loop {
            let wizard = self.state.read(|s| s.wizard.clone());
            let step = wizard.step();

            if step == WizardStep::Confirmation {
                let summary = gate::summary(&wizard)
                    .ok_or_else(|| anyhow!("Confirmation reached with incomplete selections"))?;
                self.say(render::confirmation(&summary))?;

                let Some(answer) = self.prompt("Confirm these choices? [y/n] ")? else {
                    return Ok(false);
                };
                match answer.to_ascii_lowercase().as_str() {
                    "y" | "yes" => return self.confirm(),
                    "n" | "no" | "b" => {
                        self.state.cancel_confirmation()?;
                    }
                    _ => self.say("Please answer y or n.")?,
                }
                continue;
            }

            let options: Vec<(&'static str, &'static str, &'static str)> = match step {
                WizardStep::Age => AgeGroup::ALL
                    .iter()
                    .map(|age| (age.id(), age.label(), age.description()))
                    .collect(),
                WizardStep::Style => StylePreference::ALL
                    .iter()
                    .map(|style| (style.id(), style.label(), style.description()))
                    .collect(),
                WizardStep::Theme => wizard
                    .age()
                    .map(|age| {
                        age.themes()
                            .iter()
                            .map(|option| (option.id, option.label, option.description))
                            .collect()
                    })
                    .unwrap_or_default(),
                WizardStep::Confirmation => Vec::new(),
            };

            self.say(format!("\nStep {} of 4: {}", step.number(), step.prompt()))?;
            for (i, (_, label, description)) in options.iter().enumerate() {
                self.say(format!("  {}. {}  {}", i + 1, label, description))?;
            }

            let Some(choice) = self.prompt("Choose a number ('b' back, 'q' quit): ")? else {
                return Ok(false);
            };
            match choice.as_str() {
                "q" => return Ok(false),
                "b" => {
                    self.state.wizard_back();
                    continue;
                }
                _ => {}
            }

            let id = match choice.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => options[n - 1].0.to_string(),
                _ => choice,
            };
            let selected = self.state.try_update(|s| match step {
                WizardStep::Age => s.wizard.select_age_str(&id),
                WizardStep::Style => s.wizard.select_style_str(&id),
                _ => s.wizard.select_theme(&id),
            });
            if let Err(e) = selected {
                self.say(e)?;
            }
        }
    }

    fn confirm(&mut self) -> Result<bool> {
        let confirmed = self.runtime.block_on(self.preferences.confirm(Utc::now()))?;
        self.pending_sync.push(confirmed.remote_sync);

        let record = confirmed.record;
        self.say("Preferences saved. Your learning space is ready!")?;
        self.say(render::theme_config(&theme::resolve(
            record.age_group(),
            record.theme(),
        )))?;
        Ok(true)
    }

    fn require_preferences(&mut self) -> Result<bool> {
        if self.state.read(|s| s.has_preferences()) {
            return Ok(true);
        }
        self.say("No preferences saved yet. Run `studyverse setup` first.")?;
        Ok(false)
    }

    pub fn status(&mut self) -> Result<()> {
        let text = self.state.read(|s| {
            render::status(s.preferences.as_ref(), s.palette, s.router.current())
        });
        self.say(text)
    }

    pub fn palette(&mut self, name: Option<PaletteName>) -> Result<()> {
        match name {
            None => {
                let current = self.state.read(|s| s.palette);
                self.say(render::palettes(current))
            }
            Some(name) => {
                self.preferences.set_palette(name)?;
                self.say(format!("Palette set to {}.", name.palette().title))
            }
        }
    }

    pub fn reset(&mut self) -> Result<()> {
        if self.preferences.reset()? {
            self.say("Saved preferences cleared. Run `studyverse setup` to choose again.")
        } else {
            self.say("There were no saved preferences to clear.")
        }
    }

    // Tools

    fn open(&mut self, view: View) -> Result<bool> {
        if !self.require_preferences()? {
            return Ok(false);
        }
        self.state.navigate(view)?;
        Ok(true)
    }

    /// Explain a non-success outcome. Returns whether a result is available.
    fn report(&mut self, kind: RequestKind, outcome: &ToolOutcome) -> Result<bool> {
        match outcome {
            ToolOutcome::Succeeded => Ok(true),
            ToolOutcome::Fallback(reason) => {
                let why = match reason {
                    FallbackReason::Unreachable => "the server could not be reached".to_string(),
                    FallbackReason::ServerStatus(status) => {
                        format!("the server answered with status {status}")
                    }
                    FallbackReason::MalformedResponse => {
                        "the server's answer could not be read".to_string()
                    }
                };
                self.say(format!("Showing an offline estimate because {why}."))?;
                Ok(true)
            }
            ToolOutcome::Failed(message) => {
                self.say(format!("Could not finish the {kind}: {message}"))?;
                Ok(false)
            }
            ToolOutcome::AlreadyPending => {
                self.say(format!("A {kind} request is already running."))?;
                Ok(false)
            }
            ToolOutcome::Discarded => {
                self.say(format!("The {kind} result arrived after you moved on."))?;
                Ok(false)
            }
        }
    }

    pub fn analyze(&mut self, text: &str) -> Result<()> {
        if !self.open(View::Tools)? {
            return Ok(());
        }
        self.say("Analyzing...")?;

        let outcome = match self.runtime.block_on(self.tools.analyze(text)) {
            Ok(outcome) => outcome,
            Err(e) => return self.say(e),
        };
        if !self.report(RequestKind::Analysis, &outcome)? {
            return Ok(());
        }

        if let Some(result) = self.state.read(|s| s.tools.analysis.result().cloned()) {
            self.say(render::analysis(&result))?;
        }
        Ok(())
    }

    pub fn flashcards(&mut self, text: &str, count: u32) -> Result<()> {
        if !self.open(View::Tools)? {
            return Ok(());
        }
        self.say("Generating flashcards...")?;

        let outcome = match self.runtime.block_on(self.tools.make_flashcards(text, count)) {
            Ok(outcome) => outcome,
            Err(e) => return self.say(e),
        };
        if !self.report(RequestKind::Flashcards, &outcome)? {
            return Ok(());
        }
        self.review_flashcards()
    }

    fn review_flashcards(&mut self) -> Result<()> {
        loop {
            let Some(card) = self
                .state
                .read(|s| s.tools.flashcards.result().map(render::flashcard))
            else {
                return self.say("No flashcards to review.");
            };
            self.say(format!("\n{card}"))?;

            let Some(action) = self.prompt("[f]lip  [h]int  [n]ext  [p]revious  [q]uit: ")? else {
                return Ok(());
            };
            match action.as_str() {
                "f" => {
                    self.state.toggle_answer();
                }
                "h" => {
                    self.state.toggle_hint();
                }
                "n" => {
                    if self.state.next_card().is_empty() {
                        self.say("That was the last card.")?;
                    }
                }
                "p" => {
                    if self.state.previous_card().is_empty() {
                        self.say("This is the first card.")?;
                    }
                }
                "q" => return Ok(()),
                _ => self.say("Unknown action.")?,
            }
        }
    }

    pub fn quiz(&mut self, text: &str, count: u32) -> Result<()> {
        if !self.open(View::Tools)? {
            return Ok(());
        }
        self.say("Generating quiz...")?;

        let outcome = match self.runtime.block_on(self.tools.make_quiz(text, count)) {
            Ok(outcome) => outcome,
            Err(e) => return self.say(e),
        };
        if !self.report(RequestKind::Quiz, &outcome)? {
            return Ok(());
        }
        self.take_quiz()
    }

    fn take_quiz(&mut self) -> Result<()> {
        loop {
            let Some(question) = self
                .state
                .read(|s| s.tools.quiz.result().map(render::quiz_question))
            else {
                return self.say("No quiz to take.");
            };
            self.say(format!("\n{question}"))?;

            let Some(answer) = self.prompt("Your answer (number, 'q' to stop): ")? else {
                break;
            };
            if answer == "q" {
                break;
            }
            let Some(choice) = answer.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
                self.say("Please enter the number of an option.")?;
                continue;
            };

            match self.state.answer_quiz(choice) {
                Ok(result) => {
                    let line = match &result {
                        crate::state::AnswerOutcome::Correct { explanation } => {
                            format!("Correct! {explanation}")
                        }
                        crate::state::AnswerOutcome::Incorrect {
                            correct_index,
                            explanation,
                        } => format!("Not quite. The answer was {}. {explanation}", correct_index + 1),
                    };
                    self.say(line)?;
                    if !self.state.advance_quiz() {
                        break;
                    }
                }
                Err(e) => self.say(e)?,
            }
        }

        if let Some(score) = self.state.read(|s| s.tools.quiz.result().map(|q| q.score())) {
            self.say(render::quiz_score(score))?;
        }
        Ok(())
    }

    pub fn upload(&mut self, view: View, path: &Utf8Path) -> Result<()> {
        if !self.require_preferences()? {
            return Ok(());
        }
        let (kind, title) = match view {
            View::Subjects => (RequestKind::ReportCard, "Report Card Analysis"),
            View::Syllabus => (RequestKind::Syllabus, "Syllabus"),
            _ => return self.say("Open the subjects or syllabus view to upload a file."),
        };
        self.say(format!("Uploading {path}..."))?;

        let result = match kind {
            RequestKind::ReportCard => self.runtime.block_on(self.tools.upload_report_card(path)),
            _ => self.runtime.block_on(self.tools.upload_syllabus(path)),
        };
        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => return self.say(e),
        };
        if !self.report(kind, &outcome)? {
            return Ok(());
        }

        let object = self.state.read(|s| match kind {
            RequestKind::ReportCard => s.report_card.result().cloned(),
            _ => s.syllabus.result().cloned(),
        });
        if let Some(object) = object {
            self.say(render::json_object(title, &object))?;
        }
        Ok(())
    }

    pub fn progress(&mut self) -> Result<()> {
        if !self.require_preferences()? {
            return Ok(());
        }
        match self.runtime.block_on(self.tools.fetch_progress()) {
            Ok(entries) => {
                let stats = ProgressStats::from_entries(&entries, &Local::now());
                self.say(render::progress(&stats, &entries))
            }
            Err(e) => {
                tracing::warn!("Failed to fetch progress: {}", e);
                self.say(e.user_message())
            }
        }
    }

    // Shell

    pub fn shell(&mut self) -> Result<()> {
        if !self.setup()? {
            return Ok(());
        }
        self.say(SHELL_HELP)?;

        loop {
            let view = self.state.read(|s| s.router.current());
            let Some(line) = self.prompt(&format!("\n[{view}]> "))? else {
                break;
            };
            let (command, rest) = line.split_once(' ').unwrap_or((line.as_str(), ""));
            let rest = rest.trim();

            match command {
                "" => {}
                "quit" | "exit" | "q" => break,
                "help" => self.say(SHELL_HELP)?,
                "status" => self.status()?,
                "go" => match rest.parse::<View>() {
                    Ok(to) => {
                        self.state.navigate(to)?;
                        self.say(render::banner(to.title()))?;
                    }
                    Err(e) => self.say(e)?,
                },
                "text" => {
                    if rest.is_empty() {
                        let text = self.state.read(|s| s.tools.text.clone());
                        self.say(format!("Current text: {text}"))?;
                    } else {
                        self.state.set_text(rest);
                        self.say(format!(
                            "Text set ({} words).",
                            crate::services::word_count(rest)
                        ))?;
                    }
                }
                "analyze" => {
                    let text = self.shell_text(rest);
                    self.analyze(&text)?;
                }
                "cards" => {
                    let count = self.shell_count(rest, self.settings.flashcard_count);
                    let text = self.shell_text("");
                    self.flashcards(&text, count)?;
                }
                "quiz" => {
                    let count = self.shell_count(rest, self.settings.quiz_question_count);
                    let text = self.shell_text("");
                    self.quiz(&text, count)?;
                }
                "upload" => {
                    if rest.is_empty() {
                        self.say("Usage: upload <file>")?;
                    } else {
                        self.upload(view, Utf8Path::new(rest))?;
                    }
                }
                "progress" => self.progress()?,
                "palette" => {
                    if rest.is_empty() {
                        self.palette(None)?;
                    } else {
                        match rest.parse::<PaletteName>() {
                            Ok(name) => self.palette(Some(name))?,
                            Err(e) => self.say(e)?,
                        }
                    }
                }
                other => self.say(format!("Unknown command '{other}'. Type 'help'."))?,
            }
        }

        self.say("Goodbye!")
    }

    fn shell_text(&self, inline: &str) -> String {
        if inline.is_empty() {
            self.state.read(|s| s.tools.text.clone())
        } else {
            inline.to_string()
        }
    }

    fn shell_count(&self, arg: &str, default: u32) -> u32 {
        arg.parse().unwrap_or(default)
    }
}
