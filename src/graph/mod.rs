// Note Graph Synthesis
// Per-frame and run-consolidated graphs built from labeled piano rolls

pub mod types;
pub mod note_graph;
pub mod frame;
pub mod run;
pub mod export;

use thiserror::Error;

use crate::roll::RollError;

/// Errors raised by the graph builders
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    #[error("Pitch {0} is active but has no colour")]
    UnmappedPitch(u8),

    #[error("Frame rate must be in (0, 1000000] fps, got {0}")]
    InvalidFrameRate(f64),

    #[error("Cannot add {kind} edge {from} -> {to}: endpoint node missing")]
    MissingNode {
        from: types::NodeKey,
        to: types::NodeKey,
        kind: types::EdgeKind,
    },

    #[error(transparent)]
    Roll(#[from] RollError),
}

/// Highest frame rate whose frames still get distinct microsecond run keys
pub const MAX_FRAME_RATE: f64 = 1_000_000.0;

pub(crate) fn check_frame_rate(frame_rate: f64) -> Result<f64, GraphError> {
    if frame_rate > 0.0 && frame_rate <= MAX_FRAME_RATE {
        Ok(frame_rate)
    } else {
        Err(GraphError::InvalidFrameRate(frame_rate))
    }
}

// Re-export main types
pub use types::{EdgeKind, GraphEdge, GraphNode, NodeKey, NodeTime, Position};
pub use note_graph::NoteGraph;
pub use frame::{FrameGraph, FrameGraphBuilder};
pub use run::{MissingNodePolicy, RunGraphBuilder};
pub use export::{ExportEdge, ExportNode, GraphExport};
