// Run Graph Builder - One node per contiguous activation run
// Sustain edges chain runs of a pitch, chord edges meet at run starts

use serde::{Deserialize, Serialize};

use super::note_graph::NoteGraph;
use super::types::{EdgeKind, GraphNode, NodeKey};
use super::{check_frame_rate, GraphError};
use crate::roll::{detect_pitch_runs, ActivationRun, NoteLabel};

/// What to do with an edge whose endpoint has no node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingNodePolicy {
    /// Drop the edge and keep building
    #[default]
    Skip,

    /// Fail the build with `GraphError::MissingNode`
    Report,
}

#[derive(Debug, Clone)]
pub struct RunGraphBuilder {
    frame_rate: f64,
    min_run_frames: usize,
    missing_node_policy: MissingNodePolicy,
}

impl RunGraphBuilder {
    pub fn new(frame_rate: f64) -> Result<Self, GraphError> {
        Ok(RunGraphBuilder {
            frame_rate: check_frame_rate(frame_rate)?,
            min_run_frames: 1,
            missing_node_policy: MissingNodePolicy::Skip,
        })
    }

    /// Runs shorter than `frames` get no node
    pub fn with_min_run_frames(mut self, frames: usize) -> Self {
        self.min_run_frames = frames.max(1);
        self
    }

    pub fn with_missing_node_policy(mut self, policy: MissingNodePolicy) -> Self {
        self.missing_node_policy = policy;
        self
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Node identity of a run: pitch plus start time in microseconds
    pub fn node_key(&self, run: &ActivationRun) -> NodeKey {
        NodeKey::at_secs(run.pitch, run.start_secs(self.frame_rate))
    }

    /// Build the run graph from a (usually consolidated) labeled matrix
    ///
    /// All runs are detected and their nodes created before any edge is
    /// added, so an edge can only miss an endpoint when a run was filtered
    /// out by `min_run_frames`.
    pub fn build(&self, label: &NoteLabel) -> Result<NoteGraph, GraphError> {
        let runs: Vec<Vec<ActivationRun>> = (0..label.pitch_count())
            .map(|row| detect_pitch_runs(label, row))
            .collect();

        let mut graph = NoteGraph::new();
        for run in runs.iter().flatten().filter(|run| self.keeps(run)) {
            graph.add_node(GraphNode::new(
                self.node_key(run),
                run.start_secs(self.frame_rate),
                Some(run.duration_secs(self.frame_rate)),
            ));
        }

        let mut skipped = 0usize;
        for (row, pitch_runs) in runs.iter().enumerate() {
            for (i, run) in pitch_runs.iter().enumerate() {
                let key = self.node_key(run);

                if i > 0 {
                    let prev = self.node_key(&pitch_runs[i - 1]);
                    skipped += self.link(&mut graph, prev, key, EdgeKind::Sustain)?;
                }

                for (other_row, other_runs) in runs.iter().enumerate() {
                    if other_row == row {
                        continue;
                    }
                    if let Some(partner) = covering_run(other_runs, run.start_frame) {
                        let partner_key = self.node_key(partner);
                        skipped += self.link(&mut graph, key, partner_key, EdgeKind::Chord)?;
                    }
                }
            }
        }

        log::debug!(
            "Run graph: {} runs, {} nodes, {} sustain / {} chord edges, {} edges skipped",
            runs.iter().map(|r| r.len()).sum::<usize>(),
            graph.node_count(),
            graph.count_edges(EdgeKind::Sustain),
            graph.count_edges(EdgeKind::Chord),
            skipped
        );

        Ok(graph)
    }

    fn keeps(&self, run: &ActivationRun) -> bool {
        run.len() >= self.min_run_frames
    }

    /// Add an edge; returns 1 if it was skipped under `MissingNodePolicy::Skip`
    fn link(
        &self,
        graph: &mut NoteGraph,
        from: NodeKey,
        to: NodeKey,
        kind: EdgeKind,
    ) -> Result<usize, GraphError> {
        if graph.add_edge(&from, &to, kind) {
            return Ok(0);
        }

        match self.missing_node_policy {
            MissingNodePolicy::Skip => {
                log::debug!("Skipping {} edge {} -> {}: endpoint missing", kind, from, to);
                Ok(1)
            }
            MissingNodePolicy::Report => Err(GraphError::MissingNode { from, to, kind }),
        }
    }
}

/// The run of a single pitch that covers `frame`; runs must be in time order
fn covering_run(runs: &[ActivationRun], frame: usize) -> Option<&ActivationRun> {
    let idx = runs.partition_point(|run| run.end_frame <= frame);
    runs.get(idx).filter(|run| run.covers(frame))
}
