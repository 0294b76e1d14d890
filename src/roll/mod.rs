// Piano roll - Activation matrices, pitch labeling, and run detection
// Everything the graph builders read is produced here

pub mod matrix;
pub mod annotate;
pub mod consolidate;
pub mod runs;

// Re-export main types
pub use matrix::{ActivationMatrix, PitchRange, RollError, MIDI_PITCH_COUNT};
pub use annotate::{NoteAnnotator, NoteLabel};
pub use consolidate::RunConsolidator;
pub use runs::{ActivationRun, detect_pitch_runs, detect_runs, run_boundaries};
