// Graph Build Pipeline - Raw activation matrix to note graph in one call
// Consolidate (run mode only), annotate, then build the selected graph

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::trace::{PipelineStage, TraceEntry, TraceError, TraceWriter};
use crate::config::{ConfigError, GraphConfig, GraphMode};
use crate::graph::{EdgeKind, FrameGraphBuilder, GraphError, NoteGraph, RunGraphBuilder};
use crate::levels::Rgb;
use crate::roll::{ActivationMatrix, NoteAnnotator, NoteLabel, RollError, MIDI_PITCH_COUNT};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Roll(#[from] RollError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),
}

/// Summary counts of a finished build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphStats {
    pub mode: GraphMode,
    pub frames: usize,

    /// Active cells fed to the graph builder (after consolidation)
    pub active_cells: usize,
    pub nodes: usize,
    pub sustain_edges: usize,
    pub chord_edges: usize,
}

impl GraphStats {
    fn collect(mode: GraphMode, matrix: &ActivationMatrix, graph: &NoteGraph) -> Self {
        GraphStats {
            mode,
            frames: matrix.frame_count(),
            active_cells: matrix.active_count(),
            nodes: graph.node_count(),
            sustain_edges: graph.count_edges(EdgeKind::Sustain),
            chord_edges: graph.count_edges(EdgeKind::Chord),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub graph: NoteGraph,

    /// Per-node colours in node order (frame mode only)
    pub colours: Option<Vec<Rgb>>,

    /// Labeled matrix the graph was built from (consolidated in run mode)
    pub label: NoteLabel,
    pub stats: GraphStats,
}

/// Build a note graph from a raw activation matrix
///
/// `matrix` either covers exactly the configured pitch range or is a full
/// 128-row piano roll, in which case the range is sliced out first.
pub fn build_graph(
    matrix: &ActivationMatrix,
    config: &GraphConfig,
    trace: Option<&TraceWriter>,
) -> Result<PipelineOutput, PipelineError> {
    config.validate()?;
    let range = config.pitch_range()?;
    let frame_rate = config.frame_rate();

    let sliced;
    let matrix = if matrix.pitch_count() == MIDI_PITCH_COUNT {
        sliced = matrix.slice_pitches(&range)?;
        &sliced
    } else {
        matrix.check_shape(&range)?;
        matrix
    };

    log::info!(
        "Building {:?} graph: pitches {}-{}, {} frames at {} fps",
        config.mode,
        range.start,
        range.end,
        matrix.frame_count(),
        frame_rate
    );

    let consolidated;
    let matrix = match config.mode {
        GraphMode::Run => {
            record(trace, TraceEntry::started(PipelineStage::Consolidate))?;
            consolidated = config.consolidator()?.consolidate(matrix);
            record(
                trace,
                TraceEntry::finished(
                    PipelineStage::Consolidate,
                    serde_json::json!({
                        "gap_threshold": config.gap_threshold,
                        "active_cells": consolidated.active_count(),
                    }),
                ),
            )?;
            &consolidated
        }
        GraphMode::Frame => matrix,
    };

    record(trace, TraceEntry::started(PipelineStage::Annotate))?;
    let label = NoteAnnotator::new(range)?.annotate(matrix)?;
    record(
        trace,
        TraceEntry::finished(
            PipelineStage::Annotate,
            serde_json::json!({ "active_cells": matrix.active_count() }),
        ),
    )?;

    let (graph, colours, stage) = match config.mode {
        GraphMode::Frame => {
            record(trace, TraceEntry::started(PipelineStage::FrameGraph))?;
            let built = FrameGraphBuilder::new(frame_rate, config.colour_map()?)?.build(&label)?;
            (built.graph, Some(built.colours), PipelineStage::FrameGraph)
        }
        GraphMode::Run => {
            record(trace, TraceEntry::started(PipelineStage::RunGraph))?;
            let graph = RunGraphBuilder::new(frame_rate)?
                .with_min_run_frames(config.min_run_frames)
                .with_missing_node_policy(config.missing_node_policy)
                .build(&label)?;
            (graph, None, PipelineStage::RunGraph)
        }
    };

    let stats = GraphStats::collect(config.mode, matrix, &graph);
    record(
        trace,
        TraceEntry::finished(
            stage,
            serde_json::to_value(stats).map_err(TraceError::from)?,
        ),
    )?;

    log::info!(
        "Graph built: {} nodes, {} sustain edges, {} chord edges",
        stats.nodes,
        stats.sustain_edges,
        stats.chord_edges
    );

    Ok(PipelineOutput {
        graph,
        colours,
        label,
        stats,
    })
}

fn record(trace: Option<&TraceWriter>, entry: TraceEntry) -> Result<(), TraceError> {
    match trace {
        Some(writer) => writer.write(&entry),
        None => Ok(()),
    }
}
