// Contact analyzer — CLI entry point.
//
// Reads a bits file (one "00".."11" pair per line, optionally gzipped),
// writes the context-free and Markov-keyed MIDI tracks, prints the
// per-context divergence report, and optionally hands the distribution
// snapshot to visualization sinks.
//
// Usage:
//   contact [--bits data.bits] [--out-dir DIR] [--rules table.json]
//     [--no-midi] [--snapshot snapshot.json] [--histograms] [--json]
//
// Logging goes to stderr through `tracing`; set RUST_LOG=debug to see
// skipped lines.

use clap::Parser;
use contact_bits::divergence::{ReportFormat, report, write_report};
use contact_bits::error::{Error, Result};
use contact_bits::event::{DiscardSink, EventSink};
use contact_bits::input::load_stream;
use contact_bits::markov::{EmissionRule, EmissionTable};
use contact_bits::midi::MidiTrackSink;
use contact_bits::pipeline::{analyze, encode_direct, visualize};
use contact_bits::visual::{JsonSnapshotWriter, TextHistogram};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(name = "contact")]
#[command(version, about = "Encode 2-bit symbol streams as MIDI and report context divergence")]
struct Cli {
    /// Input bits file; a `.gz` suffix enables gzip decompression
    #[arg(long, default_value = "data.bits")]
    bits: PathBuf,

    /// Directory for notes.mid and markov.mid
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Emission table JSON replacing the built-in mapping
    #[arg(long)]
    rules: Option<PathBuf>,

    /// Skip writing MIDI files
    #[arg(long)]
    no_midi: bool,

    /// Write the distribution snapshot as JSON to this path
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Print text histograms for every context
    #[arg(long)]
    histograms: bool,

    /// Print the divergence report as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let stream = load_stream(&cli.bits)?;

    let table = match &cli.rules {
        Some(path) => EmissionTable::load(path)?,
        None => EmissionTable::default(),
    };

    let distributions = if cli.no_midi {
        analyze(&stream, &table, &mut DiscardSink)?
    } else {
        let mut notes = MidiTrackSink::new("notes");
        encode_direct(&stream, &EmissionRule::direct(), &mut notes)?;
        save_track(&notes, &cli.out_dir.join("notes.mid"))?;

        let mut markov = MidiTrackSink::new("markov");
        let distributions = analyze(&stream, &table, &mut markov)?;
        save_track(&markov, &cli.out_dir.join("markov.mid"))?;
        distributions
    };

    let format = if cli.json {
        ReportFormat::Json
    } else {
        ReportFormat::Text
    };
    write_report(&report(&distributions), format, &mut io::stdout().lock())?;

    let snapshot = distributions.snapshot();
    if let Some(path) = &cli.snapshot {
        visualize(&snapshot, &mut JsonSnapshotWriter::new(path))?;
        tracing::info!(path = %path.display(), "wrote distribution snapshot");
    }
    if cli.histograms {
        visualize(&snapshot, &mut TextHistogram::new(io::stdout().lock()))?;
    }
    Ok(())
}

fn save_track(sink: &MidiTrackSink, path: &Path) -> Result<()> {
    sink.save(path).map_err(|source| Error::EventSink {
        sink: sink.name().to_string(),
        source,
    })?;
    tracing::info!(path = %path.display(), "wrote MIDI track");
    Ok(())
}
