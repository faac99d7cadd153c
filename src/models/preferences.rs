use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building or parsing preference values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PreferenceError {
    #[error("Unknown age group: {0}")]
    UnknownAgeGroup(String),

    #[error("Unknown style preference: {0}")]
    UnknownStyle(String),

    #[error("Theme must not be empty")]
    EmptyTheme,

    #[error("Theme '{theme}' is not available for the {age_group} age group")]
    ThemeNotInAgeGroup { age_group: AgeGroup, theme: String },

    #[error("Preferences have already been confirmed for this session")]
    AlreadyConfirmed,
}

/// A selectable theme within an age group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeOption {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
}

const fn option(id: &'static str, label: &'static str, description: &'static str) -> ThemeOption {
    ThemeOption {
        id,
        label,
        description,
    }
}

const PRESCHOOL_THEMES: [ThemeOption; 3] = [
    option("animals", "🐻 Animals", "Cute animal friends"),
    option("colors", "🌈 Rainbow", "Bright and colorful"),
    option("toys", "🧸 Toys", "Fun toy theme"),
];

const ELEMENTARY_THEMES: [ThemeOption; 3] = [
    option("adventure", "🗺️ Adventure", "Explore and discover"),
    option("space", "🚀 Space", "Rockets and stars"),
    option("nature", "🌳 Nature", "Plants and outdoors"),
];

const MIDDLE_THEMES: [ThemeOption; 3] = [
    option("gaming", "🎮 Gaming", "Dark theme with neon accents"),
    option("sports", "⚽ Sports", "Athletic and energetic"),
    option("tech", "💻 Tech", "Modern and digital"),
];

const HIGH_THEMES: [ThemeOption; 3] = [
    option("academic", "📚 Academic", "Clean and professional"),
    option("minimal", "⚪ Minimal", "Simple and focused"),
    option("dark", "🌙 Dark Mode", "Easy on the eyes"),
];

const ADULT_THEMES: [ThemeOption; 3] = [
    option("professional", "💼 Professional", "Polished and businesslike"),
    option("focus", "🎯 Focus", "Nothing but the material"),
    option("dark", "🌙 Dark Mode", "Easy on the eyes"),
];

/// Learner age bracket. Drives theme choices, sizing and the `age_group`
/// sent with every AI request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    Preschool,
    Elementary,
    Middle,
    High,
    Adult,
}

impl AgeGroup {
    pub const ALL: [AgeGroup; 5] = [
        AgeGroup::Preschool,
        AgeGroup::Elementary,
        AgeGroup::Middle,
        AgeGroup::High,
        AgeGroup::Adult,
    ];

    pub fn id(self) -> &'static str {
        match self {
            AgeGroup::Preschool => "preschool",
            AgeGroup::Elementary => "elementary",
            AgeGroup::Middle => "middle",
            AgeGroup::High => "high",
            AgeGroup::Adult => "adult",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeGroup::Preschool => "🧸 Preschool (2-5)",
            AgeGroup::Elementary => "🎨 Elementary (6-10)",
            AgeGroup::Middle => "🎮 Middle School (11-14)",
            AgeGroup::High => "🎓 High School (15-18)",
            AgeGroup::Adult => "🧑 Adult (19+)",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AgeGroup::Preschool => "Big buttons, bright colors, simple words",
            AgeGroup::Elementary => "Colorful, fun, with achievements",
            AgeGroup::Middle => "Cool themes, gaming style",
            AgeGroup::High => "Professional, clean, academic",
            AgeGroup::Adult => "Focused tools without the extras",
        }
    }

    /// Ordered theme set offered for this age group.
    pub fn themes(self) -> &'static [ThemeOption] {
        match self {
            AgeGroup::Preschool => &PRESCHOOL_THEMES,
            AgeGroup::Elementary => &ELEMENTARY_THEMES,
            AgeGroup::Middle => &MIDDLE_THEMES,
            AgeGroup::High => &HIGH_THEMES,
            AgeGroup::Adult => &ADULT_THEMES,
        }
    }

    pub fn theme(self, id: &str) -> Option<&'static ThemeOption> {
        self.themes().iter().find(|t| t.id == id)
    }

    pub fn has_theme(self, id: &str) -> bool {
        self.theme(id).is_some()
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for AgeGroup {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        AgeGroup::ALL
            .into_iter()
            .find(|age| age.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| PreferenceError::UnknownAgeGroup(s.to_string()))
    }
}

/// Visual style preference. The backend still calls this field `gender`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StylePreference {
    Boy,
    Girl,
    Neutral,
}

impl StylePreference {
    pub const ALL: [StylePreference; 3] = [
        StylePreference::Boy,
        StylePreference::Girl,
        StylePreference::Neutral,
    ];

    pub fn id(self) -> &'static str {
        match self {
            StylePreference::Boy => "boy",
            StylePreference::Girl => "girl",
            StylePreference::Neutral => "neutral",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StylePreference::Boy => "💙 Boy Style",
            StylePreference::Girl => "💖 Girl Style",
            StylePreference::Neutral => "💚 Neutral Style",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            StylePreference::Boy => "Blues, cool colors, tech themes",
            StylePreference::Girl => "Pinks, warm colors, friendly themes",
            StylePreference::Neutral => "Balanced colors, universal themes",
        }
    }
}

impl fmt::Display for StylePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StylePreference {
    type Err = PreferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        StylePreference::ALL
            .into_iter()
            .find(|style| style.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| PreferenceError::UnknownStyle(s.to_string()))
    }
}

/// The learner's confirmed preferences.
///
/// Created once by the confirmation gate and never mutated afterwards; the
/// only way to get a different record is to clear the persisted one and run
/// the wizard again. The theme is always a member of the age group's theme
/// set, which is checked both on construction and on deserialization.
///
/// The canonical JSON form uses `age_group`, `style`, `theme` and
/// `confirmed_at`. Records written by older clients (`age`/`ageGroup`,
/// `gender`, `timestamp`) still load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPreferenceRecord")]
pub struct PreferenceRecord {
    age_group: AgeGroup,
    style: Option<StylePreference>,
    theme: String,
    confirmed_at: DateTime<Utc>,
}

impl PreferenceRecord {
    pub fn new(
        age_group: AgeGroup,
        style: Option<StylePreference>,
        theme: impl Into<String>,
        confirmed_at: DateTime<Utc>,
    ) -> Result<Self, PreferenceError> {
        let theme = theme.into();
        if theme.trim().is_empty() {
            return Err(PreferenceError::EmptyTheme);
        }
        if !age_group.has_theme(&theme) {
            return Err(PreferenceError::ThemeNotInAgeGroup { age_group, theme });
        }

        Ok(Self {
            age_group,
            style,
            theme,
            confirmed_at,
        })
    }

    pub fn age_group(&self) -> AgeGroup {
        self.age_group
    }

    pub fn style(&self) -> Option<StylePreference> {
        self.style
    }

    pub fn theme(&self) -> &str {
        &self.theme
    }

    pub fn theme_option(&self) -> Option<&'static ThemeOption> {
        self.age_group.theme(&self.theme)
    }

    pub fn confirmed_at(&self) -> DateTime<Utc> {
        self.confirmed_at
    }
}

#[derive(Deserialize)]
struct RawPreferenceRecord {
    #[serde(alias = "age", alias = "ageGroup")]
    age_group: AgeGroup,

    #[serde(default, alias = "gender", alias = "styleOrGender")]
    style: Option<StylePreference>,

    theme: String,

    #[serde(alias = "timestamp", alias = "confirmedAt")]
    confirmed_at: DateTime<Utc>,
}

impl TryFrom<RawPreferenceRecord> for PreferenceRecord {
    type Error = PreferenceError;

    fn try_from(raw: RawPreferenceRecord) -> Result<Self, Self::Error> {
        PreferenceRecord::new(raw.age_group, raw.style, raw.theme, raw.confirmed_at)
    }
}
