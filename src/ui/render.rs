// Plain-text rendering for the terminal front end.

use crate::models::{AnalysisResult, PreferenceRecord, ProgressEntry};
use crate::services::progress::{ProgressStats, activity_display_name};
use crate::state::gate::ConfirmationSummary;
use crate::state::{FlashcardDeck, QuizRun, QuizScore, View};
use crate::theme::{self, ColorRole, PaletteName, PaletteRole, ThemeConfig};
use serde_json::{Map, Value};

pub fn banner(title: &str) -> String {
    let rule = "=".repeat(title.chars().count().max(8));
    format!("{rule}\n{title}\n{rule}")
}

pub fn confirmation(summary: &ConfirmationSummary) -> String {
    [
        banner("Confirm your choices"),
        format!("  Age group: {}", summary.age),
        format!("  Style:     {}", summary.style),
        format!("  Theme:     {}", summary.theme),
        String::new(),
        format!("! {}", summary.warning),
    ]
    .join("\n")
}

pub fn preferences(record: &PreferenceRecord) -> String {
    let theme_label = record
        .theme_option()
        .map(|option| option.label)
        .unwrap_or_else(|| record.theme());
    let style = record
        .style()
        .map(|style| style.label())
        .unwrap_or("(not set)");

    [
        format!("Age group: {}", record.age_group().label()),
        format!("Style:     {}", style),
        format!("Theme:     {}", theme_label),
        format!(
            "Confirmed: {}",
            record.confirmed_at().format("%Y-%m-%d %H:%M UTC")
        ),
    ]
    .join("\n")
}

pub fn theme_config(config: &ThemeConfig) -> String {
    let mut lines = vec![
        format!("{} ({})", config.display_name, config.font.name()),
        format!(
            "  buttons: {}px text, {}x{}px padding",
            config.button.font_px, config.button.padding_y, config.button.padding_x
        ),
        format!(
            "  cards:   {}px radius, {}px padding, {:?} shadow",
            config.card.radius_px, config.card.padding_px, config.card.shadow
        ),
    ];
    if let Some(border) = config.card.border {
        lines.push(format!("  border:  {border}"));
    }
    for role in ColorRole::ALL {
        if let Some(paint) = config.color(role) {
            lines.push(format!("  {:<9}  {}", role.name(), paint));
        }
    }
    lines.join("\n")
}

pub fn status(record: Option<&PreferenceRecord>, palette: PaletteName, view: View) -> String {
    let Some(record) = record else {
        return format!(
            "No preferences saved yet. Run `studyverse setup` first.\nPalette: {}",
            palette
        );
    };

    [
        preferences(record),
        String::new(),
        theme_config(&theme::resolve(record.age_group(), record.theme())),
        String::new(),
        format!("Palette: {} ({})", palette.palette().title, palette),
        format!("View:    {}", view.title()),
    ]
    .join("\n")
}

pub fn palettes(current: PaletteName) -> String {
    PaletteName::ALL
        .into_iter()
        .map(|name| {
            let palette = name.palette();
            let marker = if name == current { '*' } else { ' ' };
            format!(
                "{marker} {:<8} {:<8} {}  {}",
                name.id(),
                palette.color(PaletteRole::Primary),
                palette.title,
                palette.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn analysis(result: &AnalysisResult) -> String {
    match result {
        AnalysisResult::Remote(analysis) => {
            let mut lines = vec![
                banner("Text Analysis"),
                format!("Reading level:  {}", analysis.reading_level),
                format!("Complexity:     {:.1}/10", analysis.complexity_score),
                format!("Reading time:   {} min", analysis.estimated_reading_time),
            ];
            if !analysis.key_topics.is_empty() {
                lines.push(format!("Key topics:     {}", analysis.key_topics.join(", ")));
            }
            if !analysis.recommendations.is_empty() {
                lines.push("Recommendations:".to_string());
                lines.extend(
                    analysis
                        .recommendations
                        .iter()
                        .map(|tip| format!("  - {tip}")),
                );
            }
            lines.join("\n")
        }
        AnalysisResult::Local(local) => {
            let mut lines = vec![
                banner("Text Analysis (offline estimate)"),
                format!("Words:          {}", local.word_count),
                format!("Sentences:      {}", local.sentence_count),
                format!("Reading time:   {} min", local.reading_time_minutes),
                format!("Reading level:  {}", local.reading_level),
                format!("Difficulty:     {}", local.difficulty),
                "Tips:".to_string(),
            ];
            lines.extend(local.tips.iter().map(|tip| format!("  - {tip}")));
            lines.join("\n")
        }
    }
}

pub fn flashcard(deck: &FlashcardDeck) -> String {
    let Some(card) = deck.current() else {
        return "No flashcards yet.".to_string();
    };

    let mut lines = vec![
        format!("Card {}", deck.position_label()),
        format!("Q: {}", card.question),
    ];
    if deck.is_hint_shown() {
        if let Some(hint) = &card.hint {
            lines.push(format!("Hint: {hint}"));
        }
    }
    if deck.is_answer_shown() {
        lines.push(format!("A: {}", card.answer));
    }
    lines.join("\n")
}

pub fn quiz_question(run: &QuizRun) -> String {
    let Some(question) = run.current() else {
        return "No quiz questions yet.".to_string();
    };

    let mut lines = vec![
        format!("Question {} of {}", run.index() + 1, run.len()),
        question.question.clone(),
    ];
    lines.extend(
        question
            .options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("  {}. {}", i + 1, option)),
    );
    lines.join("\n")
}

pub fn quiz_score(score: QuizScore) -> String {
    let percent = if score.total == 0 {
        0
    } else {
        score.correct * 100 / score.total
    };
    format!(
        "Score: {}/{} ({}%), {} answered",
        score.correct, score.total, percent, score.answered
    )
}

pub fn progress(stats: &ProgressStats, entries: &[ProgressEntry]) -> String {
    let mut lines = vec![
        banner("Your Progress"),
        format!("Sessions:      {}", stats.total_sessions),
        format!("Study time:    {} min", stats.total_minutes),
        format!("Average score: {}%", stats.average_score),
        format!("Study streak:  {} days", stats.streak),
    ];

    let achievements = stats.achievements();
    if achievements.is_empty() {
        lines.push("Start learning to unlock achievements!".to_string());
    } else {
        lines.push("Achievements:".to_string());
        lines.extend(achievements.iter().map(|a| format!("  * {a}")));
    }

    if !entries.is_empty() {
        lines.push("Recent activity:".to_string());
        for entry in entries.iter().take(5) {
            let mut line = format!(
                "  {}  {}",
                entry.completed_at,
                activity_display_name(&entry.activity_type)
            );
            if let Some(subject) = &entry.subject {
                line.push_str(&format!(" ({subject})"));
            }
            if let Some(score) = entry.score {
                line.push_str(&format!(" - {score:.0}%"));
            }
            lines.push(line);
        }
    }
    lines.join("\n")
}

/// Backend-defined payloads (report card, syllabus) as indented key/values.
pub fn json_object(title: &str, object: &Map<String, Value>) -> String {
    let mut lines = vec![banner(title)];
    for (key, value) in object {
        push_value(&mut lines, key, value, 0);
    }
    lines.join("\n")
}

fn push_value(lines: &mut Vec<String>, key: &str, value: &Value, depth: usize) {
    let indent = "  ".repeat(depth);
    let label = key.replace('_', " ");
    match value {
        Value::Object(map) => {
            lines.push(format!("{indent}{label}:"));
            for (k, v) in map {
                push_value(lines, k, v, depth + 1);
            }
        }
        Value::Array(items) => {
            lines.push(format!("{indent}{label}:"));
            for item in items {
                match item {
                    Value::String(s) => lines.push(format!("{indent}  - {s}")),
                    Value::Object(_) | Value::Array(_) => push_value(lines, "-", item, depth + 1),
                    other => lines.push(format!("{indent}  - {other}")),
                }
            }
        }
        Value::String(s) => lines.push(format!("{indent}{label}: {s}")),
        other => lines.push(format!("{indent}{label}: {other}")),
    }
}
