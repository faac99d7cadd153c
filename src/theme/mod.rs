//! Visual configuration per age group and theme.
//!
//! [`resolve`] is a pure lookup: the same inputs always produce an equal
//! [`ThemeConfig`]. Colors are concrete values keyed by [`ColorRole`], so a
//! front end never has to assemble style identifiers from strings.

pub mod palette;

pub use palette::{PaletteName, PaletteRole};

use crate::models::AgeGroup;
use indexmap::IndexMap;
use std::fmt;

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    pub const WHITE: Rgb = Rgb(0xffffff);

    pub fn components(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xff) as u8,
            ((self.0 >> 8) & 0xff) as u8,
            (self.0 & 0xff) as u8,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0xffffff)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    Solid(Rgb),
    /// Linear gradient, start to end.
    Gradient(Rgb, Rgb),
}

impl fmt::Display for Paint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Paint::Solid(color) => write!(f, "{color}"),
            Paint::Gradient(from, to) => write!(f, "{from} -> {to}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Primary,
    Secondary,
    Accent,
    Text,
}

impl ColorRole {
    pub const ALL: [ColorRole; 4] = [
        ColorRole::Primary,
        ColorRole::Secondary,
        ColorRole::Accent,
        ColorRole::Text,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColorRole::Primary => "primary",
            ColorRole::Secondary => "secondary",
            ColorRole::Accent => "accent",
            ColorRole::Text => "text",
        }
    }
}

pub type ColorScheme = IndexMap<ColorRole, Paint>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontFamily {
    ComicNeue,
    Lexend,
}

impl FontFamily {
    pub fn name(self) -> &'static str {
        match self {
            FontFamily::ComicNeue => "Comic Neue",
            FontFamily::Lexend => "Lexend",
        }
    }
}

/// Button sizing in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonSize {
    pub font_px: u16,
    pub padding_y: u16,
    pub padding_x: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Shadow {
    Medium,
    Large,
    ExtraLarge,
    Huge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardStyle {
    pub radius_px: u16,
    pub padding_px: u16,
    pub shadow: Shadow,
    pub border: Option<Rgb>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeConfig {
    pub display_name: &'static str,
    pub font: FontFamily,
    pub colors: ColorScheme,
    pub button: ButtonSize,
    pub card: CardStyle,
}

impl ThemeConfig {
    pub fn color(&self, role: ColorRole) -> Option<Paint> {
        self.colors.get(&role).copied()
    }
}

fn scheme(primary: Paint, secondary: Paint, accent: Rgb, text: Rgb) -> ColorScheme {
    let mut colors = IndexMap::with_capacity(ColorRole::ALL.len());
    colors.insert(ColorRole::Primary, primary);
    colors.insert(ColorRole::Secondary, secondary);
    colors.insert(ColorRole::Accent, Paint::Solid(accent));
    colors.insert(ColorRole::Text, Paint::Solid(text));
    colors
}

fn playground() -> ThemeConfig {
    ThemeConfig {
        display_name: "🧸 Learning Playground",
        font: FontFamily::ComicNeue,
        colors: scheme(
            Paint::Gradient(Rgb(0xf472b6), Rgb(0xa855f7)),
            Paint::Gradient(Rgb(0xfacc15), Rgb(0xf97316)),
            Rgb(0x4ade80),
            Rgb(0x6b21a8),
        ),
        button: ButtonSize {
            font_px: 20,
            padding_y: 16,
            padding_x: 32,
        },
        card: CardStyle {
            radius_px: 24,
            padding_px: 32,
            shadow: Shadow::Huge,
            border: None,
        },
    }
}

fn adventure_academy() -> ThemeConfig {
    ThemeConfig {
        display_name: "🎨 Adventure Academy",
        font: FontFamily::ComicNeue,
        colors: scheme(
            Paint::Gradient(Rgb(0x60a5fa), Rgb(0xa855f7)),
            Paint::Gradient(Rgb(0x4ade80), Rgb(0x3b82f6)),
            Rgb(0xfacc15),
            Rgb(0x1e40af),
        ),
        button: ButtonSize {
            font_px: 18,
            padding_y: 12,
            padding_x: 24,
        },
        card: CardStyle {
            radius_px: 16,
            padding_px: 24,
            shadow: Shadow::ExtraLarge,
            border: None,
        },
    }
}

fn learning_zone() -> ThemeConfig {
    ThemeConfig {
        display_name: "🎮 Learning Zone",
        font: FontFamily::Lexend,
        colors: scheme(
            Paint::Gradient(Rgb(0x4f46e5), Rgb(0x9333ea)),
            Paint::Gradient(Rgb(0x3b82f6), Rgb(0x4f46e5)),
            Rgb(0xa855f7),
            Rgb(0x3730a3),
        ),
        button: ButtonSize {
            font_px: 16,
            padding_y: 12,
            padding_x: 24,
        },
        card: CardStyle {
            radius_px: 12,
            padding_px: 24,
            shadow: Shadow::Large,
            border: None,
        },
    }
}

fn power_learning_hub() -> ThemeConfig {
    ThemeConfig {
        display_name: "⚡ Power Learning Hub ⚡",
        colors: scheme(
            Paint::Gradient(Rgb(0x111827), Rgb(0x1e3a8a)),
            Paint::Gradient(Rgb(0x06b6d4), Rgb(0x9333ea)),
            Rgb(0x22d3ee),
            Rgb(0x67e8f9),
        ),
        card: CardStyle {
            border: Some(Rgb(0x06b6d4)),
            ..learning_zone().card
        },
        ..learning_zone()
    }
}

fn academic_hub() -> ThemeConfig {
    ThemeConfig {
        display_name: "📚 Academic Hub",
        font: FontFamily::Lexend,
        colors: scheme(
            Paint::Gradient(Rgb(0x374151), Rgb(0x111827)),
            Paint::Gradient(Rgb(0x2563eb), Rgb(0x4338ca)),
            Rgb(0x2563eb),
            Rgb(0x1f2937),
        ),
        button: ButtonSize {
            font_px: 14,
            padding_y: 8,
            padding_x: 16,
        },
        card: CardStyle {
            radius_px: 8,
            padding_px: 16,
            shadow: Shadow::Medium,
            border: None,
        },
    }
}

/// Configuration used when an age group has no specific override for the
/// chosen theme.
pub fn age_default(age: AgeGroup) -> ThemeConfig {
    match age {
        AgeGroup::Preschool => playground(),
        AgeGroup::Elementary => adventure_academy(),
        AgeGroup::Middle => learning_zone(),
        AgeGroup::High | AgeGroup::Adult => academic_hub(),
    }
}

/// Configuration for an unrecognized age group.
pub fn global_default() -> ThemeConfig {
    academic_hub()
}

pub fn resolve(age: AgeGroup, theme: &str) -> ThemeConfig {
    match (age, theme) {
        (AgeGroup::Middle, "gaming") => power_learning_hub(),
        _ => age_default(age),
    }
}

/// Resolve from raw ids, as read from storage or user input.
pub fn resolve_str(age: &str, theme: &str) -> ThemeConfig {
    match age.parse::<AgeGroup>() {
        Ok(age) => resolve(age, theme.trim()),
        Err(_) => {
            tracing::debug!("Unknown age group '{}', using default theme", age);
            global_default()
        }
    }
}
