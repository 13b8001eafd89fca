//! Themed color palettes particles draw their color from.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};
use sparkfield_platform::Color;

/// Named themes, each a list of colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Palette {
    themes: BTreeMap<String, Vec<Color>>,
}

impl Palette {
    pub fn new() -> Self {
        Self {
            themes: BTreeMap::new(),
        }
    }

    pub fn with_theme(mut self, name: impl Into<String>, colors: &[Color]) -> Self {
        self.themes.insert(name.into(), colors.to_vec());
        self
    }

    pub fn theme(&self, name: &str) -> Option<&[Color]> {
        self.themes.get(name).map(Vec::as_slice)
    }

    pub fn theme_names(&self) -> impl Iterator<Item = &str> {
        self.themes.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.themes.values().all(Vec::is_empty)
    }

    /// Picks a color from `theme`, or from a random non-empty theme when `None`.
    /// Falls back to white when nothing matches.
    pub fn pick<R: Rng + ?Sized>(&self, theme: Option<&str>, rng: &mut R) -> Color {
        let colors: &[Color] = match theme {
            Some(name) => self.theme(name).unwrap_or(&[]),
            None => {
                let filled: Vec<&Vec<Color>> =
                    self.themes.values().filter(|c| !c.is_empty()).collect();
                if filled.is_empty() {
                    &[]
                } else {
                    filled[rng.random_range(0..filled.len())].as_slice()
                }
            }
        };
        if colors.is_empty() {
            return Color::WHITE;
        }
        colors[rng.random_range(0..colors.len())]
    }
}

impl Default for Palette {
    /// The house colors: gold, fire, magic, ice, nature and dark.
    fn default() -> Self {
        let hex = |v: u32| Color::rgb((v >> 16) as u8, (v >> 8) as u8, v as u8);
        Palette::new()
            .with_theme("gold", &[hex(0xFFD700), hex(0xFFA500), hex(0xFFFF00), hex(0xDAA520)])
            .with_theme("fire", &[hex(0xFF4500), hex(0xFF6347), hex(0xFF8C00), hex(0xDC143C)])
            .with_theme("magic", &[hex(0x9333EA), hex(0xA855F7), hex(0xC084FC), hex(0x8B5CF6)])
            .with_theme("ice", &[hex(0x06B6D4), hex(0x0891B2), hex(0x67E8F9), hex(0x22D3EE)])
            .with_theme("nature", &[hex(0x10B981), hex(0x059669), hex(0x34D399), hex(0x6EE7B7)])
            .with_theme("dark", &[hex(0x7C3AED), hex(0x5B21B6), hex(0x8B5CF6), hex(0xA78BFA)])
    }
}
