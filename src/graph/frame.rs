// Per-Frame Graph Builder
// One node per active pitch per frame, sustain chains and per-frame chord cliques

use super::note_graph::NoteGraph;
use super::types::{EdgeKind, GraphNode, NodeKey};
use super::{check_frame_rate, GraphError};
use crate::levels::{ColourMap, Rgb};
use crate::roll::NoteLabel;

/// Graph plus one colour per node, in node insertion order
#[derive(Debug, Clone)]
pub struct FrameGraph {
    pub graph: NoteGraph,
    pub colours: Vec<Rgb>,
}

#[derive(Debug, Clone)]
pub struct FrameGraphBuilder {
    frame_rate: f64,
    colours: ColourMap,
}

impl FrameGraphBuilder {
    pub fn new(frame_rate: f64, colours: ColourMap) -> Result<Self, GraphError> {
        Ok(FrameGraphBuilder {
            frame_rate: check_frame_rate(frame_rate)?,
            colours,
        })
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    /// Build the per-frame graph
    ///
    /// Algorithm, for each frame `t` in order:
    /// 1. Collect the active pitches of `t`
    /// 2. Add node `(p, t)` for each, positioned at `(t / frame_rate, p)`
    /// 3. Link `(p, t-1) -> (p, t)` as sustain when `p` was active at `t-1`
    /// 4. Link every ordered pair of distinct active pitches as chord
    ///    (k active pitches give k*(k-1) chord edges)
    pub fn build(&self, label: &NoteLabel) -> Result<FrameGraph, GraphError> {
        self.check_colours(label)?;

        let mut graph = NoteGraph::new();
        let mut colours = Vec::new();
        let mut previous: Vec<u8> = Vec::new();

        for frame in 0..label.frame_count() {
            let active = label.active_pitches(frame);
            let time = frame as f64 / self.frame_rate;

            for &pitch in &active {
                let colour = self
                    .colours
                    .get(pitch)
                    .ok_or(GraphError::UnmappedPitch(pitch))?;
                graph.add_node(GraphNode::new(NodeKey::frame(pitch, frame), time, None));
                colours.push(colour);
            }

            for &pitch in &active {
                let key = NodeKey::frame(pitch, frame);

                if frame > 0 && previous.binary_search(&pitch).is_ok() {
                    graph.add_edge(&NodeKey::frame(pitch, frame - 1), &key, EdgeKind::Sustain);
                }

                for &other in active.iter().filter(|&&other| other != pitch) {
                    graph.add_edge(&key, &NodeKey::frame(other, frame), EdgeKind::Chord);
                }
            }

            previous = active;
        }

        log::debug!(
            "Frame graph: {} frames, {} nodes, {} sustain / {} chord edges",
            label.frame_count(),
            graph.node_count(),
            graph.count_edges(EdgeKind::Sustain),
            graph.count_edges(EdgeKind::Chord)
        );

        Ok(FrameGraph { graph, colours })
    }

    /// Every pitch that is active anywhere must have a colour
    fn check_colours(&self, label: &NoteLabel) -> Result<(), GraphError> {
        for row in 0..label.pitch_count() {
            let pitch = label.range().pitch_at(row);
            let active = label.row(row).iter().any(|&cell| cell > 0);
            if active && !self.colours.contains(pitch) {
                return Err(GraphError::UnmappedPitch(pitch));
            }
        }
        Ok(())
    }
}
