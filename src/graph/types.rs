// Note Graph Types
// Node identity, node attributes, and typed edges

use serde::{Deserialize, Serialize};
use std::fmt;

/// Time component of a node's identity
///
/// Integer-valued so that "same pitch, same time" lookups are exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeTime {
    /// Frame index (per-frame graphs)
    Frame(usize),

    /// Start time in whole microseconds (run graphs)
    Micros(u64),
}

impl NodeTime {
    /// Quantize seconds to microseconds
    pub fn from_secs(secs: f64) -> Self {
        NodeTime::Micros((secs.max(0.0) * 1_000_000.0).round() as u64)
    }
}

impl fmt::Display for NodeTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeTime::Frame(frame) => write!(f, "{}", frame),
            NodeTime::Micros(us) => write!(f, "{}.{:06}", us / 1_000_000, us % 1_000_000),
        }
    }
}

/// Node identity: `(pitch, time)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeKey {
    pub pitch: u8,
    pub time: NodeTime,
}

impl NodeKey {
    pub fn frame(pitch: u8, frame: usize) -> Self {
        NodeKey {
            pitch,
            time: NodeTime::Frame(frame),
        }
    }

    pub fn at_secs(pitch: u8, secs: f64) -> Self {
        NodeKey {
            pitch,
            time: NodeTime::from_secs(secs),
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.pitch, self.time)
    }
}

/// Layout position consumed by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Seconds from the start of the track
    pub time: f64,
    pub pitch: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub key: NodeKey,
    pub position: Position,

    /// Run length in seconds; only run graph nodes have one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

impl GraphNode {
    pub fn new(key: NodeKey, time: f64, duration: Option<f64>) -> Self {
        GraphNode {
            key,
            position: Position {
                time,
                pitch: key.pitch,
            },
            duration,
        }
    }
}

/// Relationship carried by an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Same pitch continuing in time
    Sustain,

    /// Different pitches sounding together
    Chord,
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Sustain => write!(f, "sustain"),
            EdgeKind::Chord => write!(f, "chord"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: NodeKey,
    pub to: NodeKey,
    pub kind: EdgeKind,
}
