// Pitch Labeling - Replace activation intensities with absolute pitch numbers
// Graph builders read pitches straight from labeled cells

use ndarray::{Array2, ArrayView1};

use super::matrix::{is_active_value, ActivationMatrix, PitchRange, RollError};

/// A labeled piano roll
///
/// Invariant: every cell is either 0 (inactive) or the absolute pitch of
/// its row, which always lies inside `range`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteLabel {
    labels: Array2<u8>,
    range: PitchRange,
}

impl NoteLabel {
    /// Pitch range the rows belong to
    pub fn range(&self) -> PitchRange {
        self.range
    }

    /// Number of pitch rows
    pub fn pitch_count(&self) -> usize {
        self.labels.nrows()
    }

    /// Number of time frames
    pub fn frame_count(&self) -> usize {
        self.labels.ncols()
    }

    /// Label of a cell: its pitch if active, otherwise 0
    pub fn label(&self, row: usize, frame: usize) -> u8 {
        self.labels[[row, frame]]
    }

    pub fn is_active(&self, row: usize, frame: usize) -> bool {
        self.labels[[row, frame]] > 0
    }

    pub fn row(&self, row: usize) -> ArrayView1<'_, u8> {
        self.labels.row(row)
    }

    /// Pitches sounding in one frame, lowest first
    pub fn active_pitches(&self, frame: usize) -> Vec<u8> {
        self.labels
            .column(frame)
            .iter()
            .copied()
            .filter(|&pitch| pitch > 0)
            .collect()
    }

    pub fn labels(&self) -> &Array2<u8> {
        &self.labels
    }
}

/// Turns an activation matrix into a `NoteLabel` for a fixed pitch range
#[derive(Debug, Clone, Copy)]
pub struct NoteAnnotator {
    range: PitchRange,
}

impl NoteAnnotator {
    /// Fails with `InvalidRange` when `range.end < range.start`
    pub fn new(range: PitchRange) -> Result<Self, RollError> {
        range.validate()?;
        Ok(NoteAnnotator { range })
    }

    pub fn range(&self) -> PitchRange {
        self.range
    }

    /// Label a matrix without touching the caller's copy
    ///
    /// Active cells are replaced (not offset) by their pitch so intensities
    /// can never alias a pitch number.
    pub fn annotate(&self, matrix: &ActivationMatrix) -> Result<NoteLabel, RollError> {
        matrix.check_shape(&self.range)?;

        let mut labels = Array2::zeros((matrix.pitch_count(), matrix.frame_count()));
        for ((row, frame), &value) in matrix.values().indexed_iter() {
            if is_active_value(value) {
                labels[[row, frame]] = self.range.pitch_at(row);
            }
        }

        Ok(NoteLabel {
            labels,
            range: self.range,
        })
    }
}
