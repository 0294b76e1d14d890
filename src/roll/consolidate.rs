// Run Consolidation - Bridge short gaps between activations of one pitch
// Greedy left-to-right merge, each pitch handled on its own

use ndarray::ArrayViewMut1;

use super::matrix::{is_active_value, ActivationMatrix, RollError};

/// Merges activation intervals separated by at most `gap_threshold` inactive frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConsolidator {
    gap_threshold: usize,
}

impl RunConsolidator {
    /// Fails with `InvalidThreshold` for negative thresholds
    pub fn new(gap_threshold: i64) -> Result<Self, RollError> {
        if gap_threshold < 0 {
            return Err(RollError::InvalidThreshold(gap_threshold));
        }

        Ok(RunConsolidator {
            gap_threshold: gap_threshold as usize,
        })
    }

    pub fn gap_threshold(&self) -> usize {
        self.gap_threshold
    }

    /// Return a consolidated copy of `matrix`
    pub fn consolidate(&self, matrix: &ActivationMatrix) -> ActivationMatrix {
        let mut merged = matrix.clone();
        self.consolidate_in_place(&mut merged);
        merged
    }

    /// Consolidate a matrix the caller already owns
    pub fn consolidate_in_place(&self, matrix: &mut ActivationMatrix) {
        let mut bridged = 0usize;
        for row in 0..matrix.pitch_count() {
            bridged += bridge_gaps(matrix.row_mut(row), self.gap_threshold);
        }

        log::debug!(
            "Consolidated {} pitches (gap threshold {}): {} frames bridged",
            matrix.pitch_count(),
            self.gap_threshold,
            bridged
        );
    }
}

/// Fill every gap of 1..=threshold inactive frames with the value of the
/// active frame just before it. Returns the number of frames filled.
fn bridge_gaps(mut row: ArrayViewMut1<'_, f32>, threshold: usize) -> usize {
    if threshold == 0 {
        return 0;
    }

    let mut filled = 0;
    let mut last_active: Option<usize> = None;

    for frame in 0..row.len() {
        if !is_active_value(row[frame]) {
            continue;
        }

        if let Some(prev) = last_active {
            let gap = frame - prev - 1;
            if gap > 0 && gap <= threshold {
                let value = row[prev];
                for bridged in prev + 1..frame {
                    row[bridged] = value;
                }
                filled += gap;
            }
        }

        last_active = Some(frame);
    }

    filled
}
