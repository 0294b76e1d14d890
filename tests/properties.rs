// Graph synthesis properties over generated piano rolls
// Uses a fixed-seed LCG so every run checks the same matrices

use chartgraph::graph::{EdgeKind, FrameGraphBuilder, NodeKey, RunGraphBuilder};
use chartgraph::levels::{ColourMap, Rgb};
use chartgraph::roll::{
    detect_pitch_runs, detect_runs, ActivationMatrix, NoteAnnotator, NoteLabel, PitchRange,
    RunConsolidator,
};
use chartgraph::{build_graph, GraphConfig};

/// Deterministic matrix with roughly `density` of cells active
struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 40) as f32 / (1u64 << 24) as f32
    }

    fn matrix(&mut self, pitches: usize, frames: usize, density: f32) -> ActivationMatrix {
        let mut matrix = ActivationMatrix::zeros(pitches, frames);
        for row in 0..pitches {
            for frame in 0..frames {
                if self.next_f32() < density {
                    matrix.set(row, frame, 0.5 + self.next_f32());
                }
            }
        }
        matrix
    }
}

fn range() -> PitchRange {
    PitchRange::new(60, 67).unwrap()
}

fn annotate(matrix: &ActivationMatrix) -> NoteLabel {
    NoteAnnotator::new(range()).unwrap().annotate(matrix).unwrap()
}

fn grey_palette() -> ColourMap {
    let mut colours = ColourMap::new();
    for pitch in range().pitches() {
        colours.insert(pitch, Rgb { r: 0.5, g: 0.5, b: 0.5 });
    }
    colours
}

fn samples() -> Vec<ActivationMatrix> {
    let mut lcg = Lcg(0x5eed);
    [0.1, 0.3, 0.6, 0.9]
        .iter()
        .map(|&density| lcg.matrix(range().len(), 40, density))
        .collect()
}

#[test]
fn test_annotation_keeps_shape_and_range() {
    for matrix in samples() {
        let label = annotate(&matrix);
        assert_eq!(label.pitch_count(), matrix.pitch_count());
        assert_eq!(label.frame_count(), matrix.frame_count());

        for row in 0..label.pitch_count() {
            for frame in 0..label.frame_count() {
                let value = label.label(row, frame);
                if matrix.is_active(row, frame) {
                    assert_eq!(value, 60 + row as u8);
                } else {
                    assert_eq!(value, 0);
                }
            }
        }
    }
}

#[test]
fn test_consolidation_is_idempotent() {
    for threshold in 0..4 {
        let consolidator = RunConsolidator::new(threshold).unwrap();
        for matrix in samples() {
            let once = consolidator.consolidate(&matrix);
            let twice = consolidator.consolidate(&once);
            assert_eq!(once, twice, "threshold {}", threshold);
        }
    }
}

#[test]
fn test_consolidation_is_monotonic() {
    for matrix in samples() {
        let mut previous: Option<(usize, Vec<usize>)> = None;

        for threshold in 0..6 {
            let merged = RunConsolidator::new(threshold).unwrap().consolidate(&matrix);
            let label = annotate(&merged);
            let run_counts: Vec<usize> = (0..label.pitch_count())
                .map(|row| detect_pitch_runs(&label, row).len())
                .collect();

            if let Some((active, counts)) = &previous {
                assert!(merged.active_count() >= *active);
                for (now, before) in run_counts.iter().zip(counts) {
                    assert!(now <= before);
                }
            }
            previous = Some((merged.active_count(), run_counts));
        }
    }
}

#[test]
fn test_frame_graph_edge_counts() {
    let builder = FrameGraphBuilder::new(44.0, grey_palette()).unwrap();

    for matrix in samples() {
        let label = annotate(&matrix);
        let built = builder.build(&label).unwrap();

        let mut chords = 0;
        let mut sustains = 0;
        for frame in 0..label.frame_count() {
            let k = label.active_pitches(frame).len();
            chords += k * k.saturating_sub(1);

            if frame > 0 {
                sustains += (0..label.pitch_count())
                    .filter(|&row| label.is_active(row, frame) && label.is_active(row, frame - 1))
                    .count();
            }
        }

        assert_eq!(built.graph.node_count(), matrix.active_count());
        assert_eq!(built.graph.count_edges(EdgeKind::Chord), chords);
        assert_eq!(built.graph.count_edges(EdgeKind::Sustain), sustains);
        assert_eq!(built.colours.len(), built.graph.node_count());
    }
}

#[test]
fn test_frame_graph_isolated_chord() {
    let mut matrix = ActivationMatrix::zeros(range().len(), 6);
    for row in [0, 4, 7] {
        matrix.set(row, 3, 1.0);
    }

    let built = FrameGraphBuilder::new(44.0, grey_palette())
        .unwrap()
        .build(&annotate(&matrix))
        .unwrap();

    assert_eq!(built.graph.node_count(), 3);
    assert_eq!(built.graph.count_edges(EdgeKind::Chord), 6);
    assert_eq!(built.graph.count_edges(EdgeKind::Sustain), 0);

    let root = NodeKey::frame(60, 3);
    assert_eq!(
        built.graph.successors(&root, EdgeKind::Chord),
        vec![NodeKey::frame(64, 3), NodeKey::frame(67, 3)]
    );
}

#[test]
fn test_gap_threshold_scenario() {
    let mut matrix = ActivationMatrix::zeros(range().len(), 6);
    for frame in [0, 1, 2, 4, 5] {
        matrix.set(0, frame, 1.0);
    }

    let merged = RunConsolidator::new(1).unwrap().consolidate(&matrix);
    let runs = detect_runs(&annotate(&merged));
    assert_eq!(runs.len(), 1);
    assert_eq!((runs[0].start_frame, runs[0].end_frame), (0, 6));

    let kept = RunConsolidator::new(0).unwrap().consolidate(&matrix);
    let runs = detect_runs(&annotate(&kept));
    let spans: Vec<(usize, usize)> = runs.iter().map(|r| (r.start_frame, r.end_frame)).collect();
    assert_eq!(spans, vec![(0, 3), (4, 6)]);
}

#[test]
fn test_run_graph_node_per_run() {
    let builder = RunGraphBuilder::new(44.0).unwrap();

    for matrix in samples() {
        let merged = RunConsolidator::new(2).unwrap().consolidate(&matrix);
        let label = annotate(&merged);
        let runs = detect_runs(&label);
        let graph = builder.build(&label).unwrap();

        assert_eq!(graph.node_count(), runs.len());

        let expected_sustain: usize = (0..label.pitch_count())
            .map(|row| detect_pitch_runs(&label, row).len().saturating_sub(1))
            .sum();
        assert_eq!(graph.count_edges(EdgeKind::Sustain), expected_sustain);

        for edge in graph.edges() {
            assert!(graph.contains_node(&edge.from));
            assert!(graph.contains_node(&edge.to));
            if edge.kind == EdgeKind::Chord {
                assert_ne!(edge.from.pitch, edge.to.pitch);
            }
        }
    }
}

#[test]
fn test_empty_matrix_builds_empty_graphs() {
    let matrix = ActivationMatrix::zeros(range().len(), 16);
    let label = annotate(&matrix);

    let frame = FrameGraphBuilder::new(44.0, ColourMap::new()).unwrap().build(&label).unwrap();
    assert!(frame.graph.is_empty());
    assert_eq!(frame.graph.edge_count(), 0);

    let run = RunGraphBuilder::new(44.0).unwrap().build(&label).unwrap();
    assert!(run.is_empty());
    assert_eq!(run.edge_count(), 0);

    let output = build_graph(&ActivationMatrix::zeros(128, 16), &GraphConfig::default(), None).unwrap();
    assert_eq!(output.stats.nodes, 0);
    assert_eq!(output.stats.sustain_edges + output.stats.chord_edges, 0);
}
