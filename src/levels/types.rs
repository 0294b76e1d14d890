// Difficulty Level Type Definitions
// A level is a pitch lane range plus the colour of each lane

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::roll::PitchRange;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LevelError {
    #[error("Unknown difficulty level: {0}")]
    UnknownLevel(String),

    #[error("Invalid colour: {0}")]
    InvalidColour(String),
}

/// RGB colour with channels in [0.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    /// Parse `#rrggbb` (leading '#' optional)
    pub fn from_hex(hex: &str) -> Result<Self, LevelError> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(LevelError::InvalidColour(hex.to_string()));
        }

        let channel = |i: usize| -> Result<f32, LevelError> {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| v as f32 / 255.0)
                .map_err(|_| LevelError::InvalidColour(hex.to_string()))
        };

        Ok(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Format as lowercase `#rrggbb`
    pub fn to_hex(&self) -> String {
        let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }
}

/// Named chart difficulty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyLevel {
    pub name: String,
    pub pitch_range: PitchRange,
    /// Lane colours as hex strings, lowest pitch first
    pub colours: Vec<String>,
}

impl DifficultyLevel {
    pub fn lane_count(&self) -> usize {
        self.pitch_range.len()
    }
}

/// Pitch to colour lookup handed to the per-frame graph builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColourMap {
    colours: BTreeMap<u8, Rgb>,
}

impl ColourMap {
    pub fn new() -> Self {
        ColourMap::default()
    }

    /// Pair each pitch of the level's range with its colour
    ///
    /// A colour list shorter than the range leaves the highest pitches
    /// unmapped.
    pub fn from_level(level: &DifficultyLevel) -> Result<Self, LevelError> {
        if level.colours.len() < level.lane_count() {
            log::warn!(
                "Level '{}' has {} colours for {} pitches; top pitches stay unmapped",
                level.name,
                level.colours.len(),
                level.lane_count()
            );
        }

        let mut map = ColourMap::new();
        for (pitch, hex) in level.pitch_range.pitches().zip(level.colours.iter()) {
            map.insert(pitch, Rgb::from_hex(hex)?);
        }
        Ok(map)
    }

    /// Build from an explicit pitch -> hex mapping
    pub fn from_hex(mapping: &BTreeMap<u8, String>) -> Result<Self, LevelError> {
        let mut map = ColourMap::new();
        for (&pitch, hex) in mapping {
            map.insert(pitch, Rgb::from_hex(hex)?);
        }
        Ok(map)
    }

    pub fn insert(&mut self, pitch: u8, colour: Rgb) {
        self.colours.insert(pitch, colour);
    }

    pub fn get(&self, pitch: u8) -> Option<Rgb> {
        self.colours.get(&pitch).copied()
    }

    pub fn contains(&self, pitch: u8) -> bool {
        self.colours.contains_key(&pitch)
    }

    pub fn len(&self) -> usize {
        self.colours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colours.is_empty()
    }
}
