// Activation Matrix - Pitch x frame grid of note activations
// Rows are pitches inside a PitchRange, columns are time frames

use ndarray::{s, Array2, ArrayView1, ArrayViewMut1};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of rows in a full MIDI piano roll (pitches 0-127)
pub const MIDI_PITCH_COUNT: usize = 128;

/// Errors raised while validating or transforming a piano roll
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RollError {
    #[error("Invalid pitch range: {start}..={end}")]
    InvalidRange { start: u8, end: u8 },

    #[error("Matrix has {actual} pitch rows, expected {expected}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Gap threshold must be non-negative, got {0}")]
    InvalidThreshold(i64),
}

/// Inclusive range of absolute MIDI pitches covered by a matrix
///
/// Pitch 0 is excluded: a labeled cell holding 0 means "inactive", so a
/// range starting at 0 could not be labeled unambiguously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PitchRange {
    /// Lowest pitch (row 0)
    pub start: u8,

    /// Highest pitch (last row)
    pub end: u8,
}

impl PitchRange {
    /// Create a validated pitch range
    pub fn new(start: u8, end: u8) -> Result<Self, RollError> {
        let range = PitchRange { start, end };
        range.validate()?;
        Ok(range)
    }

    /// Check bounds; ranges built from struct literals or config go through here
    pub fn validate(&self) -> Result<(), RollError> {
        if self.end < self.start || self.start == 0 || self.end as usize >= MIDI_PITCH_COUNT {
            return Err(RollError::InvalidRange {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Number of pitches (matrix rows) in the range
    pub fn len(&self) -> usize {
        (self.end as usize).saturating_sub(self.start as usize) + 1
    }

    pub fn contains(&self, pitch: u8) -> bool {
        pitch >= self.start && pitch <= self.end
    }

    /// Absolute pitch for a row index
    pub fn pitch_at(&self, row: usize) -> u8 {
        self.start + row as u8
    }

    /// Row index for an absolute pitch
    pub fn row_of(&self, pitch: u8) -> Option<usize> {
        if self.contains(pitch) {
            Some((pitch - self.start) as usize)
        } else {
            None
        }
    }

    pub fn pitches(&self) -> impl Iterator<Item = u8> {
        self.start..=self.end
    }
}

/// Activity test shared by every stage; NaN and non-positive cells are inactive
pub(crate) fn is_active_value(value: f32) -> bool {
    value > 0.0
}

/// Piano roll: `values[[row, frame]] > 0` means the row's pitch sounds in that frame
#[derive(Debug, Clone, PartialEq)]
pub struct ActivationMatrix {
    values: Array2<f32>,
}

impl ActivationMatrix {
    /// Wrap an existing (pitches x frames) array
    pub fn new(values: Array2<f32>) -> Self {
        ActivationMatrix { values }
    }

    /// All-inactive matrix
    pub fn zeros(pitch_count: usize, frame_count: usize) -> Self {
        ActivationMatrix {
            values: Array2::zeros((pitch_count, frame_count)),
        }
    }

    /// Build from one Vec per pitch row; rows must have equal length
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, RollError> {
        let frame_count = rows.first().map(|r| r.len()).unwrap_or(0);

        if let Some(bad) = rows.iter().find(|r| r.len() != frame_count) {
            return Err(RollError::ShapeMismatch {
                expected: frame_count,
                actual: bad.len(),
            });
        }

        let mut values = Array2::zeros((rows.len(), frame_count));
        for (row, data) in rows.iter().enumerate() {
            for (frame, &value) in data.iter().enumerate() {
                values[[row, frame]] = value;
            }
        }

        Ok(ActivationMatrix { values })
    }

    /// Number of pitch rows
    pub fn pitch_count(&self) -> usize {
        self.values.nrows()
    }

    /// Number of time frames
    pub fn frame_count(&self) -> usize {
        self.values.ncols()
    }

    /// Raw activation of a cell
    pub fn get(&self, row: usize, frame: usize) -> f32 {
        self.values[[row, frame]]
    }

    /// Overwrite the activation of a cell
    pub fn set(&mut self, row: usize, frame: usize, value: f32) {
        self.values[[row, frame]] = value;
    }

    /// Whether the cell's pitch sounds in that frame
    pub fn is_active(&self, row: usize, frame: usize) -> bool {
        is_active_value(self.values[[row, frame]])
    }

    /// Activations of one pitch across all frames
    pub fn row(&self, row: usize) -> ArrayView1<'_, f32> {
        self.values.row(row)
    }

    pub(crate) fn row_mut(&mut self, row: usize) -> ArrayViewMut1<'_, f32> {
        self.values.row_mut(row)
    }

    /// Number of active cells across all pitches
    pub fn active_count(&self) -> usize {
        self.values.iter().filter(|&&v| is_active_value(v)).count()
    }

    /// Active frame count for a single row
    pub fn active_count_in_row(&self, row: usize) -> usize {
        self.values.row(row).iter().filter(|&&v| is_active_value(v)).count()
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    pub fn into_values(self) -> Array2<f32> {
        self.values
    }

    /// Fail unless the matrix has exactly one row per pitch of `range`
    pub fn check_shape(&self, range: &PitchRange) -> Result<(), RollError> {
        if self.pitch_count() != range.len() {
            return Err(RollError::ShapeMismatch {
                expected: range.len(),
                actual: self.pitch_count(),
            });
        }
        Ok(())
    }

    /// Cut the rows of `range` out of a full 128-row MIDI piano roll
    pub fn slice_pitches(&self, range: &PitchRange) -> Result<Self, RollError> {
        range.validate()?;

        if self.pitch_count() != MIDI_PITCH_COUNT {
            return Err(RollError::ShapeMismatch {
                expected: MIDI_PITCH_COUNT,
                actual: self.pitch_count(),
            });
        }

        let start = range.start as usize;
        let end = range.end as usize;
        Ok(ActivationMatrix {
            values: self.values.slice(s![start..=end, ..]).to_owned(),
        })
    }
}
