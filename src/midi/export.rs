// MIDI Export - Write consolidated activation runs back to a MIDI file
// Lets a consolidated chart be auditioned or reopened in a chart editor

use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};

use super::MidiError;
use crate::roll::ActivationRun;

/// MIDI export options
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunExportOptions {
    /// Pulses per quarter note (PPQ) - typically 480 or 960
    pub ppq: u16,

    /// Tempo written to the file; frame times are converted at this tempo
    pub bpm: f64,

    /// Name of the note track
    pub track_name: String,

    /// Channel for all notes (0-15)
    pub channel: u8,

    /// Velocity for all notes (1-127)
    pub velocity: u8,
}

impl Default for RunExportOptions {
    fn default() -> Self {
        RunExportOptions {
            ppq: 480,
            bpm: 120.0,
            track_name: "PART GUITAR".to_string(),
            channel: 0,
            velocity: 100,
        }
    }
}

/// Export runs to MIDI file bytes
///
/// Produces a two-track file: tempo metadata, then one note per run.
pub fn export_runs(
    runs: &[ActivationRun],
    frame_rate: f64,
    options: &RunExportOptions,
) -> Result<Vec<u8>, MidiError> {
    if !(frame_rate.is_finite() && frame_rate > 0.0) {
        return Err(MidiError::Write(format!("invalid frame rate {}", frame_rate)));
    }
    if !(options.bpm.is_finite() && options.bpm > 0.0) {
        return Err(MidiError::Write(format!("invalid tempo {}", options.bpm)));
    }

    let header = Header {
        format: Format::Parallel,
        timing: Timing::Metrical(options.ppq.into()),
    };

    let ticks_per_frame = calculate_ticks_per_sec(options.bpm, options.ppq) / frame_rate;

    let mut meta_track = Track::new();
    add_tempo(&mut meta_track, options.bpm);
    meta_track.push(TrackEvent {
        delta: 0u32.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let note_track = create_note_track(runs, ticks_per_frame, options);

    let smf = Smf {
        header,
        tracks: vec![meta_track, note_track],
    };

    let mut bytes = Vec::new();
    smf.write(&mut bytes)
        .map_err(|e| MidiError::Write(format!("Failed to write MIDI: {}", e)))?;

    log::info!("Exported {} runs as MIDI ({} bytes)", runs.len(), bytes.len());
    Ok(bytes)
}

fn create_note_track<'a>(
    runs: &[ActivationRun],
    ticks_per_frame: f64,
    options: &'a RunExportOptions,
) -> Track<'a> {
    let channel = options.channel.min(15);
    let velocity = options.velocity.clamp(1, 127);
    let mut events: Vec<(u32, TrackEventKind<'a>)> = Vec::new();

    for run in runs {
        let tick_on = (run.start_frame as f64 * ticks_per_frame).round() as u32;
        let tick_off = (run.end_frame as f64 * ticks_per_frame).round() as u32;
        let key = run.pitch.min(127);

        events.push((
            tick_on,
            TrackEventKind::Midi {
                channel: channel.into(),
                message: MidiMessage::NoteOn {
                    key: key.into(),
                    vel: velocity.into(),
                },
            },
        ));
        events.push((
            tick_off,
            TrackEventKind::Midi {
                channel: channel.into(),
                message: MidiMessage::NoteOff {
                    key: key.into(),
                    vel: 0u8.into(),
                },
            },
        ));
    }

    // Note-offs go first on a shared tick so back-to-back runs stay separate
    events.sort_by_key(|(tick, kind)| {
        let is_off = matches!(
            kind,
            TrackEventKind::Midi {
                message: MidiMessage::NoteOff { .. },
                ..
            }
        );
        (*tick, !is_off)
    });

    let mut track = Track::new();
    track.push(TrackEvent {
        delta: 0u32.into(),
        kind: TrackEventKind::Meta(MetaMessage::TrackName(options.track_name.as_bytes())),
    });

    let mut last_tick = 0;
    for (tick, kind) in events {
        track.push(TrackEvent {
            delta: tick.saturating_sub(last_tick).into(),
            kind,
        });
        last_tick = tick;
    }

    track.push(TrackEvent {
        delta: 0u32.into(),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    track
}

fn calculate_ticks_per_sec(bpm: f64, ppq: u16) -> f64 {
    ppq as f64 * bpm / 60.0
}

fn add_tempo(track: &mut Track<'_>, bpm: f64) {
    let us_per_quarter = (60_000_000.0 / bpm).round() as u32;
    track.push(TrackEvent {
        delta: 0u32.into(),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(us_per_quarter.min(0xFF_FFFF).into())),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::load_track;

    fn run(pitch: u8, start_frame: usize, end_frame: usize) -> ActivationRun {
        ActivationRun { pitch, start_frame, end_frame }
    }

    #[test]
    fn test_calculate_ticks_per_sec() {
        // 120 BPM = 2 quarters per second
        assert!((calculate_ticks_per_sec(120.0, 480) - 960.0).abs() < 1e-9);
    }

    #[test]
    fn test_export_empty() {
        let bytes = export_runs(&[], 44.0, &RunExportOptions::default()).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        assert_eq!(smf.header.format, Format::Parallel);
        assert_eq!(smf.tracks.len(), 2);
    }

    #[test]
    fn test_export_tempo() {
        let bytes = export_runs(&[], 44.0, &RunExportOptions::default()).unwrap();
        let smf = Smf::parse(&bytes).unwrap();

        if let TrackEventKind::Meta(MetaMessage::Tempo(tempo)) = &smf.tracks[0][0].kind {
            assert_eq!(tempo.as_int(), 500_000);
        } else {
            panic!("Expected Tempo event");
        }
    }

    #[test]
    fn test_export_round_trip_timing() {
        let runs = vec![run(96, 0, 10), run(97, 10, 20), run(96, 20, 30)];
        let bytes = export_runs(&runs, 10.0, &RunExportOptions::default()).unwrap();

        let track = load_track(&bytes, "PART GUITAR").unwrap();
        assert_eq!(track.notes.len(), 3);

        let starts: Vec<f64> = track.notes.iter().map(|n| n.start_secs).collect();
        assert!((starts[0] - 0.0).abs() < 1e-6);
        assert!((starts[1] - 1.0).abs() < 1e-6);
        assert!((starts[2] - 2.0).abs() < 1e-6);
        assert!((track.notes[2].end_secs - 3.0).abs() < 1e-6);
        assert_eq!(track.notes[0].velocity, 100);
    }

    #[test]
    fn test_adjacent_runs_stay_separate() {
        // Same pitch: off at frame 5 and the next on at frame 5
        let runs = vec![run(60, 0, 5), run(60, 5, 8)];
        let bytes = export_runs(&runs, 10.0, &RunExportOptions::default()).unwrap();

        let track = load_track(&bytes, "PART GUITAR").unwrap();
        assert_eq!(track.notes.len(), 2);
        assert!((track.notes[0].end_secs - 0.5).abs() < 1e-6);
        assert!((track.notes[1].start_secs - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_invalid_rates() {
        assert!(export_runs(&[], 0.0, &RunExportOptions::default()).is_err());

        let options = RunExportOptions {
            bpm: -1.0,
            ..Default::default()
        };
        assert!(export_runs(&[], 44.0, &options).is_err());
    }
}
