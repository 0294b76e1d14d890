// Run Detection - Maximal spans of consecutive active frames per pitch
// Boundaries are synthesized at frame 0 and at frame_count for open runs

use serde::{Deserialize, Serialize};

use super::annotate::NoteLabel;

/// One contiguous activation of a pitch, half-open `[start_frame, end_frame)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivationRun {
    /// Absolute MIDI pitch
    pub pitch: u8,

    /// First active frame
    pub start_frame: usize,

    /// One past the last active frame
    pub end_frame: usize,
}

impl ActivationRun {
    /// Length in frames
    pub fn len(&self) -> usize {
        self.end_frame.saturating_sub(self.start_frame)
    }

    pub fn is_empty(&self) -> bool {
        self.end_frame <= self.start_frame
    }

    /// Whether `frame` falls inside the run
    pub fn covers(&self, frame: usize) -> bool {
        frame >= self.start_frame && frame < self.end_frame
    }

    pub fn start_secs(&self, frame_rate: f64) -> f64 {
        self.start_frame as f64 / frame_rate
    }

    pub fn end_secs(&self, frame_rate: f64) -> f64 {
        self.end_frame as f64 / frame_rate
    }

    pub fn duration_secs(&self, frame_rate: f64) -> f64 {
        self.len() as f64 / frame_rate
    }
}

/// Turn a sequence of on/off states into `(start, end)` pairs
///
/// State changes mark run edges. A sequence that is already on at frame 0
/// gets a synthetic rising edge there, and one still on at the end gets a
/// closing edge at `states.len()`.
pub fn run_boundaries(states: &[bool]) -> Vec<(usize, usize)> {
    let mut changes: Vec<usize> = states
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| pair[0] != pair[1])
        .map(|(i, _)| i + 1)
        .collect();

    if states.first() == Some(&true) {
        changes.insert(0, 0);
    }
    if states.last() == Some(&true) {
        changes.push(states.len());
    }

    changes
        .chunks_exact(2)
        .map(|edge| (edge[0], edge[1]))
        .collect()
}

/// Runs of one row of a labeled matrix, in time order
pub fn detect_pitch_runs(label: &NoteLabel, row: usize) -> Vec<ActivationRun> {
    let pitch = label.range().pitch_at(row);
    let states: Vec<bool> = label.row(row).iter().map(|&cell| cell > 0).collect();

    run_boundaries(&states)
        .into_iter()
        .map(|(start_frame, end_frame)| ActivationRun {
            pitch,
            start_frame,
            end_frame,
        })
        .collect()
}

/// Runs of every pitch, grouped by pitch (lowest first) then time
pub fn detect_runs(label: &NoteLabel) -> Vec<ActivationRun> {
    (0..label.pitch_count())
        .flat_map(|row| detect_pitch_runs(label, row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roll::{ActivationMatrix, NoteAnnotator, PitchRange};

    #[test]
    fn test_boundaries_interior() {
        let states = [false, true, true, false, false, true, false];
        assert_eq!(run_boundaries(&states), vec![(1, 3), (5, 6)]);
    }

    #[test]
    fn test_boundaries_active_from_first_frame() {
        let states = [true, true, false, true, false];
        assert_eq!(run_boundaries(&states), vec![(0, 2), (3, 4)]);
    }

    #[test]
    fn test_boundaries_active_at_last_frame() {
        let states = [false, true, false, true, true];
        assert_eq!(run_boundaries(&states), vec![(1, 2), (3, 5)]);
    }

    #[test]
    fn test_boundaries_always_active() {
        assert_eq!(run_boundaries(&[true, true, true]), vec![(0, 3)]);
        assert_eq!(run_boundaries(&[true]), vec![(0, 1)]);
    }

    #[test]
    fn test_boundaries_silent() {
        assert!(run_boundaries(&[false, false, false]).is_empty());
        assert!(run_boundaries(&[]).is_empty());
    }

    #[test]
    fn test_detect_runs_per_pitch() {
        let matrix = ActivationMatrix::from_rows(&[
            vec![1.0, 1.0, 0.0, 0.0, 1.0],
            vec![0.0, 0.0, 0.0, 0.0, 0.0],
            vec![0.0, 1.0, 1.0, 1.0, 0.0],
        ])
        .unwrap();
        let range = PitchRange::new(60, 62).unwrap();
        let label = NoteAnnotator::new(range).unwrap().annotate(&matrix).unwrap();

        let runs = detect_runs(&label);
        assert_eq!(
            runs,
            vec![
                ActivationRun { pitch: 60, start_frame: 0, end_frame: 2 },
                ActivationRun { pitch: 60, start_frame: 4, end_frame: 5 },
                ActivationRun { pitch: 62, start_frame: 1, end_frame: 4 },
            ]
        );
        assert!(detect_pitch_runs(&label, 1).is_empty());
    }

    #[test]
    fn test_run_timing() {
        let run = ActivationRun { pitch: 96, start_frame: 44, end_frame: 66 };

        assert_eq!(run.len(), 22);
        assert!(run.covers(44));
        assert!(run.covers(65));
        assert!(!run.covers(66));
        assert!((run.start_secs(44.0) - 1.0).abs() < 1e-9);
        assert!((run.duration_secs(44.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_run_is_empty() {
        let run = ActivationRun { pitch: 60, start_frame: 8, end_frame: 3 };

        assert!(run.is_empty());
        assert_eq!(run.len(), 0);
        assert_eq!(run.duration_secs(44.0), 0.0);
    }
}
