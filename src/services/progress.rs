// Learning progress summary
//
// Aggregates the backend's activity history into the dashboard numbers and
// the small set of achievements unlocked by them.

use crate::models::ProgressEntry;
use crate::services::api::ApiError;
use crate::services::tools::ToolService;
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, TimeZone};
use std::collections::BTreeSet;
use std::fmt;

/// Minutes counted for an entry without a recorded duration.
pub const DEFAULT_SESSION_MINUTES: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressStats {
    pub total_sessions: usize,
    pub total_minutes: u64,
    /// Rounded mean of the scored entries, 0 when nothing was scored.
    pub average_score: u32,
    /// Consecutive days with activity, ending today.
    pub streak: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Achievement {
    FirstSteps,
    ConsistentLearner,
    HighAchiever,
}

impl Achievement {
    pub fn title(self) -> &'static str {
        match self {
            Achievement::FirstSteps => "First Steps",
            Achievement::ConsistentLearner => "Consistent Learner",
            Achievement::HighAchiever => "High Achiever",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Achievement::FirstSteps => "Completed your first session",
            Achievement::ConsistentLearner => "3-day study streak",
            Achievement::HighAchiever => "80%+ average score",
        }
    }
}

impl fmt::Display for Achievement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title(), self.description())
    }
}

impl ProgressStats {
    /// Days are counted in `now`'s time zone.
    pub fn from_entries<Tz: TimeZone>(entries: &[ProgressEntry], now: &DateTime<Tz>) -> Self {
        if entries.is_empty() {
            return Self::default();
        }

        let total_minutes = entries
            .iter()
            .map(|entry| match entry.duration {
                Some(minutes) if minutes > 0 => u64::from(minutes),
                _ => u64::from(DEFAULT_SESSION_MINUTES),
            })
            .sum();

        let scores: Vec<f64> = entries.iter().filter_map(|entry| entry.score).collect();
        let average_score = if scores.is_empty() {
            0
        } else {
            (scores.iter().sum::<f64>() / scores.len() as f64)
                .round()
                .max(0.0) as u32
        };

        let days: BTreeSet<NaiveDate> = entries
            .iter()
            .filter_map(|entry| entry_date(&entry.completed_at, &now.timezone()))
            .collect();

        Self {
            total_sessions: entries.len(),
            total_minutes,
            average_score,
            streak: streak_ending(&days, now.date_naive()),
        }
    }

    pub fn achievements(&self) -> Vec<Achievement> {
        let mut unlocked = Vec::new();
        if self.total_sessions > 0 {
            unlocked.push(Achievement::FirstSteps);
        }
        if self.streak >= 3 {
            unlocked.push(Achievement::ConsistentLearner);
        }
        if self.average_score >= 80 {
            unlocked.push(Achievement::HighAchiever);
        }
        unlocked
    }
}

fn streak_ending(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;
    while days.contains(&day) {
        streak += 1;
        match day.checked_sub_days(Days::new(1)) {
            Some(previous) => day = previous,
            None => break,
        }
    }
    streak
}

/// Calendar day of a `completed_at` timestamp in `tz`. RFC 3339 values are
/// converted; naive ISO values are taken as already local. Unparseable
/// values are skipped.
fn entry_date<Tz: TimeZone>(completed_at: &str, tz: &Tz) -> Option<NaiveDate> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(completed_at) {
        return Some(timestamp.with_timezone(tz).date_naive());
    }
    if let Ok(timestamp) = NaiveDateTime::parse_from_str(completed_at, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(timestamp.date());
    }
    NaiveDate::parse_from_str(completed_at, "%Y-%m-%d").ok()
}

pub fn activity_display_name(activity_type: &str) -> &str {
    match activity_type {
        "text_analysis" => "Text Analysis",
        "flashcards" => "Flashcards",
        "quiz" => "Quiz",
        other => other,
    }
}

impl ToolService {
    /// The learner's activity history. Needs an auth token.
    pub async fn fetch_progress(&self) -> Result<Vec<ProgressEntry>, ApiError> {
        let entries = self.backend().fetch_progress().await?;
        tracing::info!("Fetched {} progress entries", entries.len());
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn entry(kind: &str, score: Option<f64>, duration: Option<u32>, at: &str) -> ProgressEntry {
        ProgressEntry {
            activity_type: kind.to_string(),
            subject: None,
            score,
            duration,
            completed_at: at.to_string(),
        }
    }

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_history() {
        let stats = ProgressStats::from_entries(&[], &noon(2024, 5, 10));
        assert_eq!(stats, ProgressStats::default());
        assert!(stats.achievements().is_empty());
    }

    #[test]
    fn test_totals_and_average() {
        let entries = vec![
            entry("quiz", Some(90.0), Some(12), "2024-05-10T09:00:00Z"),
            entry("flashcards", None, None, "2024-05-10T10:00:00Z"),
            entry("quiz", Some(75.0), Some(0), "2024-05-09T18:30:00+02:00"),
        ];
        let stats = ProgressStats::from_entries(&entries, &noon(2024, 5, 10));

        assert_eq!(stats.total_sessions, 3);
        assert_eq!(stats.total_minutes, 12 + 5 + 5);
        assert_eq!(stats.average_score, 83);
        assert_eq!(stats.streak, 2);
        assert_eq!(
            stats.achievements(),
            vec![Achievement::FirstSteps, Achievement::HighAchiever]
        );
    }

    #[test]
    fn test_streak_needs_today() {
        let entries = vec![
            entry("quiz", None, None, "2024-05-08T09:00:00"),
            entry("quiz", None, None, "2024-05-09T09:00:00"),
        ];
        assert_eq!(ProgressStats::from_entries(&entries, &noon(2024, 5, 10)).streak, 0);
        assert_eq!(ProgressStats::from_entries(&entries, &noon(2024, 5, 9)).streak, 2);
    }

    #[test]
    fn test_streak_stops_at_gap() {
        let entries = vec![
            entry("quiz", None, None, "2024-05-10"),
            entry("quiz", None, None, "2024-05-09"),
            entry("quiz", None, None, "2024-05-07"),
            entry("quiz", None, None, "not a date"),
        ];
        let stats = ProgressStats::from_entries(&entries, &noon(2024, 5, 10));
        assert_eq!(stats.streak, 2);
        assert_eq!(stats.total_sessions, 4);
    }

    #[test]
    fn test_days_follow_the_learner_time_zone() {
        let entries = vec![
            entry("quiz", None, None, "2024-05-09T23:30:00Z"),
            entry("quiz", None, None, "2024-05-09T08:00:00"),
        ];
        let east = FixedOffset::east_opt(2 * 3600).unwrap();
        let morning = east.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();
        assert_eq!(ProgressStats::from_entries(&entries, &morning).streak, 2);

        let late_utc = Utc.with_ymd_and_hms(2024, 5, 9, 23, 45, 0).unwrap();
        assert_eq!(ProgressStats::from_entries(&entries, &late_utc).streak, 1);
    }

    #[test]
    fn test_activity_display_name() {
        assert_eq!(activity_display_name("text_analysis"), "Text Analysis");
        assert_eq!(activity_display_name("quiz"), "Quiz");
        assert_eq!(activity_display_name("reading"), "reading");
    }
}
