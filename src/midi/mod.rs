// MIDI - Chart track ingestion and run export using midly
// Turns chart MIDI into piano rolls and consolidated runs back into MIDI

pub mod ingest;
pub mod export;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MidiError {
    #[error("Failed to parse MIDI: {0}")]
    Parse(#[from] midly::Error),

    #[error("Unknown track name: {0}")]
    UnknownTrack(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to export MIDI: {0}")]
    Write(String),
}

/// Read a MIDI file from disk and load one named track
pub fn load_track_file(path: &std::path::Path, name: &str) -> Result<MidiTrack, MidiError> {
    let bytes = std::fs::read(path)?;
    load_track(&bytes, name)
}

// Re-export main types
pub use ingest::{load_track, song_info, MidiTrack, SongInfo, TimedNote};
pub use export::{export_runs, RunExportOptions};
