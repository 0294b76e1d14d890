// MIDI Ingestion - Load a named track from a Standard MIDI File
// Notes are timed in seconds through the file's tempo map

use midly::{MetaMessage, MidiMessage, Smf, Timing, TrackEventKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::MidiError;
use crate::roll::{ActivationMatrix, MIDI_PITCH_COUNT};

/// Microseconds per quarter note when a file has no tempo event (120 BPM)
const DEFAULT_TEMPO_US: u32 = 500_000;

/// A note with absolute timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedNote {
    pub pitch: u8,
    pub velocity: u8,
    pub start_secs: f64,
    pub end_secs: f64,
}

/// All notes of one named track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MidiTrack {
    pub name: String,
    pub notes: Vec<TimedNote>,
}

impl MidiTrack {
    /// End of the last note in seconds
    pub fn end_secs(&self) -> f64 {
        self.notes.iter().map(|n| n.end_secs).fold(0.0, f64::max)
    }

    /// Sample the track into a 128-row activation matrix at `fs` frames per second
    ///
    /// Each note writes its velocity into frames
    /// `[round(start * fs), round(end * fs))`.
    pub fn piano_roll(&self, fs: f64) -> ActivationMatrix {
        let frame_count = (self.end_secs() * fs).ceil() as usize;
        let mut roll = ActivationMatrix::zeros(MIDI_PITCH_COUNT, frame_count);

        for note in &self.notes {
            let start = ((note.start_secs * fs).round() as usize).min(frame_count);
            let end = ((note.end_secs * fs).round() as usize).min(frame_count);
            let row = note.pitch as usize;
            for frame in start..end {
                let value = roll.get(row, frame).max(note.velocity as f32);
                roll.set(row, frame, value);
            }
        }

        roll
    }
}

/// Header-level facts about a song
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongInfo {
    pub track_names: Vec<String>,
    pub bpm: f64,
    pub time_signature: (u8, u8),
}

#[derive(Debug, Clone, Copy)]
struct TempoChange {
    tick: u64,
    us_per_quarter: u32,
}

/// Tick to seconds conversion for one file
struct TempoMap {
    timing: Timing,
    changes: Vec<TempoChange>,
}

impl TempoMap {
    fn from_smf(smf: &Smf) -> Self {
        let mut changes = Vec::new();
        for track in &smf.tracks {
            let mut tick = 0u64;
            for event in track {
                tick += event.delta.as_int() as u64;
                if let TrackEventKind::Meta(MetaMessage::Tempo(t)) = event.kind {
                    changes.push(TempoChange {
                        tick,
                        us_per_quarter: t.as_int(),
                    });
                }
            }
        }

        changes.sort_by_key(|c| c.tick);
        changes.dedup_by_key(|c| c.tick);

        TempoMap {
            timing: smf.header.timing,
            changes,
        }
    }

    fn seconds_at(&self, tick: u64) -> f64 {
        let ppq = match self.timing {
            Timing::Metrical(ppq) => ppq.as_int().max(1) as f64,
            Timing::Timecode(fps, subframes) => {
                return tick as f64 / (fps.as_f32() as f64 * subframes.max(1) as f64);
            }
        };

        let mut seconds = 0.0;
        let mut last_tick = 0u64;
        let mut us_per_quarter = DEFAULT_TEMPO_US as f64;

        for change in &self.changes {
            if change.tick >= tick {
                break;
            }
            seconds += (change.tick - last_tick) as f64 / ppq * us_per_quarter / 1_000_000.0;
            last_tick = change.tick;
            us_per_quarter = change.us_per_quarter as f64;
        }

        seconds + (tick - last_tick) as f64 / ppq * us_per_quarter / 1_000_000.0
    }
}

fn track_name(track: &[midly::TrackEvent]) -> Option<String> {
    track.iter().find_map(|event| match event.kind {
        TrackEventKind::Meta(MetaMessage::TrackName(name)) => {
            Some(String::from_utf8_lossy(name).trim().to_string())
        }
        _ => None,
    })
}

/// Load the notes of the track named `name`
pub fn load_track(bytes: &[u8], name: &str) -> Result<MidiTrack, MidiError> {
    let smf = Smf::parse(bytes)?;
    let tempo = TempoMap::from_smf(&smf);

    let track = smf
        .tracks
        .iter()
        .find(|track| track_name(track).as_deref() == Some(name))
        .ok_or_else(|| MidiError::UnknownTrack(name.to_string()))?;

    // (channel, pitch) -> (start tick, velocity)
    let mut sounding: HashMap<(u8, u8), (u64, u8)> = HashMap::new();
    let mut spans: Vec<(u8, u8, u64, u64)> = Vec::new();
    let mut tick = 0u64;

    for event in track {
        tick += event.delta.as_int() as u64;

        let TrackEventKind::Midi { channel, message } = event.kind else {
            continue;
        };
        let channel = channel.as_int();

        match message {
            MidiMessage::NoteOn { key, vel } if vel.as_int() > 0 => {
                let pitch = key.as_int();
                // Re-strike closes the sounding note first
                if let Some((start, velocity)) = sounding.remove(&(channel, pitch)) {
                    spans.push((pitch, velocity, start, tick));
                }
                sounding.insert((channel, pitch), (tick, vel.as_int()));
            }
            MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. } => {
                let pitch = key.as_int();
                if let Some((start, velocity)) = sounding.remove(&(channel, pitch)) {
                    spans.push((pitch, velocity, start, tick));
                }
            }
            _ => {}
        }
    }

    for ((_, pitch), (start, velocity)) in sounding.drain() {
        spans.push((pitch, velocity, start, tick));
    }

    let mut notes: Vec<TimedNote> = spans
        .into_iter()
        .filter(|&(_, _, start, end)| end > start)
        .map(|(pitch, velocity, start, end)| TimedNote {
            pitch,
            velocity,
            start_secs: tempo.seconds_at(start),
            end_secs: tempo.seconds_at(end),
        })
        .collect();
    notes.sort_by(|a, b| {
        a.start_secs
            .total_cmp(&b.start_secs)
            .then(a.pitch.cmp(&b.pitch))
    });

    log::info!("Loaded track '{}': {} notes", name, notes.len());

    Ok(MidiTrack {
        name: name.to_string(),
        notes,
    })
}

/// Track names, first tempo and first time signature of a file
pub fn song_info(bytes: &[u8]) -> Result<SongInfo, MidiError> {
    let smf = Smf::parse(bytes)?;

    let mut bpm = 60_000_000.0 / DEFAULT_TEMPO_US as f64;
    let mut time_signature = (4, 4);
    let mut tempo_found = false;
    let mut signature_found = false;

    for event in smf.tracks.iter().flatten() {
        match event.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(t)) if !tempo_found => {
                bpm = 60_000_000.0 / t.as_int().max(1) as f64;
                tempo_found = true;
            }
            TrackEventKind::Meta(MetaMessage::TimeSignature(num, denom_pow, _, _))
                if !signature_found =>
            {
                time_signature = (num, 1u8 << denom_pow.min(7));
                signature_found = true;
            }
            _ => {}
        }
    }

    let track_names = smf
        .tracks
        .iter()
        .filter_map(|track| track_name(track))
        .collect();

    Ok(SongInfo {
        track_names,
        bpm,
        time_signature,
    })
}
