// App-wide color palettes
//
// Independent of the age-based theme: a learner can switch palettes at any
// time and the choice is persisted on its own.

use super::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteName {
    #[default]
    Default,
    Dark,
    Gaming,
    Sports,
    Nature,
    Ocean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaletteRole {
    Primary,
    PrimaryHover,
    Secondary,
    Accent,
    Background,
    Surface,
    Text,
    TextSecondary,
    Border,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub name: PaletteName,
    pub title: &'static str,
    pub description: &'static str,
    colors: [Rgb; 9],
    pub gradient: (Rgb, Rgb),
}

impl Palette {
    pub fn color(&self, role: PaletteRole) -> Rgb {
        self.colors[role as usize]
    }
}

impl PaletteRole {
    pub const ALL: [PaletteRole; 9] = [
        PaletteRole::Primary,
        PaletteRole::PrimaryHover,
        PaletteRole::Secondary,
        PaletteRole::Accent,
        PaletteRole::Background,
        PaletteRole::Surface,
        PaletteRole::Text,
        PaletteRole::TextSecondary,
        PaletteRole::Border,
    ];
}

const PALETTES: [Palette; 6] = [
    Palette {
        name: PaletteName::Default,
        title: "Default",
        description: "Clean and professional",
        colors: [
            Rgb(0x2563eb),
            Rgb(0x1d4ed8),
            Rgb(0xf3f4f6),
            Rgb(0x14b8a6),
            Rgb(0xffffff),
            Rgb(0xf9fafb),
            Rgb(0x111827),
            Rgb(0x4b5563),
            Rgb(0xe5e7eb),
        ],
        gradient: (Rgb(0x0d9488), Rgb(0x2563eb)),
    },
    Palette {
        name: PaletteName::Dark,
        title: "Dark Mode",
        description: "Easy on the eyes",
        colors: [
            Rgb(0x3b82f6),
            Rgb(0x2563eb),
            Rgb(0x1f2937),
            Rgb(0xa855f7),
            Rgb(0x111827),
            Rgb(0x1f2937),
            Rgb(0xffffff),
            Rgb(0xd1d5db),
            Rgb(0x374151),
        ],
        gradient: (Rgb(0x9333ea), Rgb(0x2563eb)),
    },
    Palette {
        name: PaletteName::Gaming,
        title: "Gaming",
        description: "For the tech-savvy learner",
        colors: [
            Rgb(0x22c55e),
            Rgb(0x16a34a),
            Rgb(0x1f2937),
            Rgb(0x22d3ee),
            Rgb(0x111827),
            Rgb(0x1f2937),
            Rgb(0x4ade80),
            Rgb(0xd1d5db),
            Rgb(0x22c55e),
        ],
        gradient: (Rgb(0x22c55e), Rgb(0x22d3ee)),
    },
    Palette {
        name: PaletteName::Sports,
        title: "Sports",
        description: "Athletic and energetic",
        colors: [
            Rgb(0xf97316),
            Rgb(0xea580c),
            Rgb(0xffedd5),
            Rgb(0xef4444),
            Rgb(0xffffff),
            Rgb(0xfff7ed),
            Rgb(0x111827),
            Rgb(0x374151),
            Rgb(0xfed7aa),
        ],
        gradient: (Rgb(0xf97316), Rgb(0xef4444)),
    },
    Palette {
        name: PaletteName::Nature,
        title: "Nature",
        description: "Calm and natural",
        colors: [
            Rgb(0x16a34a),
            Rgb(0x15803d),
            Rgb(0xdcfce7),
            Rgb(0xeab308),
            Rgb(0xffffff),
            Rgb(0xf0fdf4),
            Rgb(0x111827),
            Rgb(0x374151),
            Rgb(0xbbf7d0),
        ],
        gradient: (Rgb(0x16a34a), Rgb(0xeab308)),
    },
    Palette {
        name: PaletteName::Ocean,
        title: "Ocean",
        description: "Deep and calming",
        colors: [
            Rgb(0x1d4ed8),
            Rgb(0x1e40af),
            Rgb(0xdbeafe),
            Rgb(0x06b6d4),
            Rgb(0xffffff),
            Rgb(0xeff6ff),
            Rgb(0x111827),
            Rgb(0x374151),
            Rgb(0xbfdbfe),
        ],
        gradient: (Rgb(0x1d4ed8), Rgb(0x06b6d4)),
    },
];

impl PaletteName {
    pub const ALL: [PaletteName; 6] = [
        PaletteName::Default,
        PaletteName::Dark,
        PaletteName::Gaming,
        PaletteName::Sports,
        PaletteName::Nature,
        PaletteName::Ocean,
    ];

    pub fn id(self) -> &'static str {
        match self {
            PaletteName::Default => "default",
            PaletteName::Dark => "dark",
            PaletteName::Gaming => "gaming",
            PaletteName::Sports => "sports",
            PaletteName::Nature => "nature",
            PaletteName::Ocean => "ocean",
        }
    }

    pub fn palette(self) -> &'static Palette {
        &PALETTES[self as usize]
    }
}

impl fmt::Display for PaletteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Error for a palette name that does not exist.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown palette: {0}")]
pub struct UnknownPalette(pub String);

impl FromStr for PaletteName {
    type Err = UnknownPalette;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        PaletteName::ALL
            .into_iter()
            .find(|name| name.id().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownPalette(s.to_string()))
    }
}
