// View router
//
// One enumerated selector, no history. The only guard is that preferences
// must exist before any main view can be shown.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum View {
    #[default]
    Home,
    Tools,
    Subjects,
    Syllabus,
}

impl View {
    pub const ALL: [View; 4] = [View::Home, View::Tools, View::Subjects, View::Syllabus];

    pub fn id(self) -> &'static str {
        match self {
            View::Home => "home",
            View::Tools => "tools",
            View::Subjects => "subjects",
            View::Syllabus => "syllabus",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Tools => "Study Tools",
            View::Subjects => "Subjects & Report Card",
            View::Syllabus => "Syllabus",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for View {
    type Err = RouterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        View::ALL
            .into_iter()
            .find(|view| view.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| RouterError::UnknownView(s.to_string()))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    #[error("Finish choosing your preferences before opening other screens")]
    PreferencesRequired,

    #[error("Unknown view: {0}")]
    UnknownView(String),
}

/// What the front end should draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Wizard,
    Main(View),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewRouter {
    current: View,
}

impl ViewRouter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn screen(&self, has_preferences: bool) -> Screen {
        if has_preferences {
            Screen::Main(self.current)
        } else {
            Screen::Wizard
        }
    }

    /// Switch views and return the one that was active before.
    pub fn navigate(&mut self, to: View, has_preferences: bool) -> Result<View, RouterError> {
        if !has_preferences {
            return Err(RouterError::PreferencesRequired);
        }
        let from = self.current;
        self.current = to;
        Ok(from)
    }

    pub fn reset(&mut self) {
        self.current = View::Home;
    }
}
