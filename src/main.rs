//! Chartgraph command line
//!
//! Builds a note graph from one track of a MIDI chart and writes it as JSON.
//!
//! Usage:
//!   chartgraph <file.mid> <track-name> [OPTIONS]
//!   chartgraph --list-tracks <file.mid>
//!
//! Options:
//!   --config <cfg.json>     Graph config (defaults: expert, run mode)
//!   --mode <frame|run>      Override the configured graph mode
//!   --out <graph.json>      Write the graph here instead of stdout
//!   --trace <trace.jsonl>   Append one trace line per pipeline stage
//!   --midi-out <runs.mid>   Also write the graph's activation runs as MIDI
//!   --verbose               Extra debug output

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chartgraph::graph::GraphExport;
use chartgraph::midi::{self, RunExportOptions};
use chartgraph::pipeline::{build_graph, TraceWriter};
use chartgraph::roll::detect_runs;
use chartgraph::{GraphConfig, GraphMode};

const USAGE: &str = "usage: chartgraph <file.mid> <track-name> [--config cfg.json] \
[--mode frame|run] [--out graph.json] [--trace trace.jsonl] [--midi-out runs.mid] [--verbose]\n       \
chartgraph --list-tracks <file.mid>";

struct Args {
    midi_path: PathBuf,
    track_name: String,
    config: Option<PathBuf>,
    mode: Option<GraphMode>,
    out: Option<PathBuf>,
    trace: Option<PathBuf>,
    midi_out: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();

    let verbose = args.iter().any(|a| a == "--verbose");
    let log_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let result = if args.iter().any(|a| a == "--list-tracks") {
        option(&args, "--list-tracks")
            .ok_or_else(|| USAGE.to_string())
            .and_then(|path| list_tracks(Path::new(&path)))
    } else {
        parse_args(&args).and_then(|parsed| run(&parsed))
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Value following `flag`, if both are present
fn option(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    const VALUE_FLAGS: [&str; 5] = ["--config", "--mode", "--out", "--trace", "--midi-out"];

    let mut positional = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if VALUE_FLAGS.contains(&arg.as_str()) {
            iter.next();
        } else if arg.starts_with("--") {
            if arg != "--verbose" {
                return Err(format!("unknown option {}\n{}", arg, USAGE));
            }
        } else {
            positional.push(arg.clone());
        }
    }

    let [midi_path, track_name] = <[String; 2]>::try_from(positional).map_err(|_| USAGE.to_string())?;

    let mode = match option(args, "--mode").as_deref() {
        None => None,
        Some("frame") => Some(GraphMode::Frame),
        Some("run") => Some(GraphMode::Run),
        Some(other) => return Err(format!("unknown mode {}, expected frame or run", other)),
    };

    Ok(Args {
        midi_path: PathBuf::from(midi_path),
        track_name,
        config: option(args, "--config").map(PathBuf::from),
        mode,
        out: option(args, "--out").map(PathBuf::from),
        trace: option(args, "--trace").map(PathBuf::from),
        midi_out: option(args, "--midi-out").map(PathBuf::from),
    })
}

fn run(args: &Args) -> Result<(), String> {
    let mut config = match &args.config {
        Some(path) => GraphConfig::load(path).map_err(|e| format!("{}: {}", path.display(), e))?,
        None => GraphConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode;
    }

    let track = midi::load_track_file(&args.midi_path, &args.track_name)
        .map_err(|e| format!("{}: {}", args.midi_path.display(), e))?;
    let roll = track.piano_roll(config.frame_rate());

    let trace = args.trace.as_ref().map(TraceWriter::new);
    let output = build_graph(&roll, &config, trace.as_ref()).map_err(|e| e.to_string())?;

    let export = GraphExport::from_graph(&output.graph, output.colours.as_deref());
    match &args.out {
        Some(path) => {
            export
                .write_to(path)
                .map_err(|e| format!("{}: {}", path.display(), e))?;
            log::info!("Wrote graph to {}", path.display());
        }
        None => println!("{}", export.to_json().map_err(|e| e.to_string())?),
    }

    if let Some(path) = &args.midi_out {
        let runs = detect_runs(&output.label);
        let options = RunExportOptions {
            track_name: args.track_name.clone(),
            ..Default::default()
        };
        let bytes = midi::export_runs(&runs, config.frame_rate(), &options).map_err(|e| e.to_string())?;
        std::fs::write(path, bytes).map_err(|e| format!("{}: {}", path.display(), e))?;
        log::info!("Wrote {} runs to {}", runs.len(), path.display());
    }

    Ok(())
}

fn list_tracks(path: &Path) -> Result<(), String> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let info = midi::song_info(&bytes).map_err(|e| e.to_string())?;

    println!("{} BPM, {}/{}", info.bpm, info.time_signature.0, info.time_signature.1);
    for name in &info.track_names {
        println!("  {}", name);
    }
    Ok(())
}
