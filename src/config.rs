// Graph Configuration
// Frame timing, difficulty level, and builder options, loaded from JSON

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

use crate::graph::{MissingNodePolicy, MAX_FRAME_RATE};
use crate::levels::{self, ColourMap, LevelError};
use crate::roll::{PitchRange, RollError, RunConsolidator};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Roll(#[from] RollError),
}

/// Which graph to build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphMode {
    /// One node per active pitch per frame
    Frame,

    /// One node per consolidated activation run
    #[default]
    Run,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Audio sample rate the frames are derived from
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Samples per frame
    #[serde(default = "default_hop_length")]
    pub hop_length: u32,

    /// Difficulty level supplying the pitch range and lane colours
    #[serde(default = "default_level")]
    pub level: String,

    /// Overrides the level's pitch range
    #[serde(default)]
    pub pitch_range: Option<PitchRange>,

    /// Overrides the level's colours (pitch -> "#rrggbb")
    #[serde(default)]
    pub colours: Option<BTreeMap<u8, String>>,

    /// Largest gap (in inactive frames) bridged by consolidation
    #[serde(default = "default_gap_threshold")]
    pub gap_threshold: i64,

    /// Shortest run that still gets a node
    #[serde(default = "default_min_run_frames")]
    pub min_run_frames: usize,

    #[serde(default)]
    pub missing_node_policy: MissingNodePolicy,

    #[serde(default)]
    pub mode: GraphMode,
}

fn default_sample_rate() -> u32 {
    22050
}

fn default_hop_length() -> u32 {
    512
}

fn default_level() -> String {
    "expert".to_string()
}

fn default_gap_threshold() -> i64 {
    2
}

fn default_min_run_frames() -> usize {
    1
}

impl Default for GraphConfig {
    fn default() -> Self {
        GraphConfig {
            sample_rate: default_sample_rate(),
            hop_length: default_hop_length(),
            level: default_level(),
            pitch_range: None,
            colours: None,
            gap_threshold: default_gap_threshold(),
            min_run_frames: default_min_run_frames(),
            missing_node_policy: MissingNodePolicy::default(),
            mode: GraphMode::default(),
        }
    }
}

impl GraphConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: GraphConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_rate == 0 {
            return Err(ConfigError::Invalid("sample_rate must be positive".to_string()));
        }
        if self.hop_length == 0 {
            return Err(ConfigError::Invalid("hop_length must be positive".to_string()));
        }
        if self.frame_rate() > MAX_FRAME_RATE {
            return Err(ConfigError::Invalid(format!(
                "frame rate {} exceeds {} fps",
                self.frame_rate(),
                MAX_FRAME_RATE
            )));
        }
        if self.gap_threshold < 0 {
            return Err(RollError::InvalidThreshold(self.gap_threshold).into());
        }
        if let Some(range) = &self.pitch_range {
            range.validate()?;
        }
        Ok(())
    }

    /// Frames per second, rounded up as `ceil(sample_rate / hop_length)`
    pub fn frame_rate(&self) -> f64 {
        (self.sample_rate as f64 / self.hop_length as f64).ceil()
    }

    pub fn pitch_range(&self) -> Result<PitchRange, ConfigError> {
        let range = match self.pitch_range {
            Some(range) => range,
            None => levels::get_level(&self.level)?.pitch_range,
        };
        range.validate()?;
        Ok(range)
    }

    pub fn colour_map(&self) -> Result<ColourMap, ConfigError> {
        match &self.colours {
            Some(mapping) => Ok(ColourMap::from_hex(mapping)?),
            None => Ok(ColourMap::from_level(&levels::get_level(&self.level)?)?),
        }
    }

    pub fn consolidator(&self) -> Result<RunConsolidator, ConfigError> {
        Ok(RunConsolidator::new(self.gap_threshold)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();

        assert_eq!(config.frame_rate(), 44.0); // ceil(22050 / 512)
        assert_eq!(config.pitch_range().unwrap(), PitchRange { start: 95, end: 100 });
        assert_eq!(config.colour_map().unwrap().len(), 6);
        assert_eq!(config.consolidator().unwrap().gap_threshold(), 2);
        assert_eq!(config.mode, GraphMode::Run);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GraphConfig =
            serde_json::from_str(r#"{"level": "easy", "mode": "frame"}"#).unwrap();

        assert_eq!(config.sample_rate, 22050);
        assert_eq!(config.mode, GraphMode::Frame);
        assert_eq!(config.pitch_range().unwrap().start, 59);
        assert_eq!(config.colour_map().unwrap().len(), 4);
    }

    #[test]
    fn test_explicit_overrides() {
        let config: GraphConfig = serde_json::from_str(
            r##"{
                "pitch_range": {"start": 60, "end": 61},
                "colours": {"60": "#ff0000", "61": "#00ff00"},
                "missing_node_policy": "report"
            }"##,
        )
        .unwrap();

        assert_eq!(config.pitch_range().unwrap(), PitchRange { start: 60, end: 61 });
        assert!(config.colour_map().unwrap().contains(61));
        assert_eq!(config.missing_node_policy, MissingNodePolicy::Report);
    }

    #[test]
    fn test_validation() {
        let negative = GraphConfig {
            gap_threshold: -3,
            ..Default::default()
        };
        assert!(matches!(
            negative.validate(),
            Err(ConfigError::Roll(RollError::InvalidThreshold(-3)))
        ));

        let zero_hop = GraphConfig {
            hop_length: 0,
            ..Default::default()
        };
        assert!(zero_hop.validate().is_err());

        let too_fast = GraphConfig {
            sample_rate: 4_000_000,
            hop_length: 1,
            ..Default::default()
        };
        assert!(matches!(too_fast.validate(), Err(ConfigError::Invalid(_))));

        let inverted = GraphConfig {
            pitch_range: Some(PitchRange { start: 70, end: 60 }),
            ..Default::default()
        };
        assert!(inverted.validate().is_err());
    }

    #[test]
    fn test_unknown_level() {
        let config = GraphConfig {
            level: "legendary".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.pitch_range(),
            Err(ConfigError::Level(LevelError::UnknownLevel(_)))
        ));
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("graph.json");
        fs::write(&path, r#"{"hop_length": 256, "gap_threshold": 0}"#).unwrap();

        let config = GraphConfig::load(&path).unwrap();
        assert_eq!(config.frame_rate(), 87.0); // ceil(22050 / 256)
        assert_eq!(config.gap_threshold, 0);

        fs::write(&path, r#"{"gap_threshold": -1}"#).unwrap();
        assert!(GraphConfig::load(&path).is_err());
    }
}
