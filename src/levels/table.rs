// Built-in Difficulty Table
// Five-lane guitar charts: each difficulty owns six MIDI pitches

use super::types::DifficultyLevel;
use crate::roll::PitchRange;

const LANE_COLOURS: [&str; 6] = [
    "#000000", // open
    "#1ae81a", // green
    "#d40f15", // red
    "#f7d616", // yellow
    "#171ee3", // blue
    "#ed652b", // orange
];

fn level(name: &str, start: u8, end: u8, colour_count: usize) -> DifficultyLevel {
    DifficultyLevel {
        name: name.to_string(),
        pitch_range: PitchRange { start, end },
        colours: LANE_COLOURS[..colour_count]
            .iter()
            .map(|c| c.to_string())
            .collect(),
    }
}

pub fn expert() -> DifficultyLevel {
    level("expert", 95, 100, 6)
}

pub fn hard() -> DifficultyLevel {
    level("hard", 83, 88, 6)
}

/// Medium has no orange lane
pub fn medium() -> DifficultyLevel {
    level("medium", 71, 76, 5)
}

/// Easy has neither blue nor orange
pub fn easy() -> DifficultyLevel {
    level("easy", 59, 64, 4)
}
