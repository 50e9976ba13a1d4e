// Visualization sinks for distribution snapshots.
//
// A `VisualizationSink` receives the frozen `DistributionSnapshot` once per
// run. Two implementations:
// - `JsonSnapshotWriter`: the snapshot as pretty JSON, for external plotting.
// - `TextHistogram`: a 4-bin bar chart per bucket and for the global
//   aggregate, written to any `io::Write` (stdout in the CLI).

use crate::distribution::{DistributionSnapshot, SnapshotEntry};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Consumer of the final distributions.
pub trait VisualizationSink {
    /// Short name used in error messages when rendering fails.
    fn name(&self) -> &str;

    fn render(&mut self, snapshot: &DistributionSnapshot) -> io::Result<()>;
}

/// Writes the snapshot as JSON to a file.
#[derive(Clone, Debug)]
pub struct JsonSnapshotWriter {
    path: PathBuf,
}

impl JsonSnapshotWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonSnapshotWriter { path: path.into() }
    }
}

impl VisualizationSink for JsonSnapshotWriter {
    fn name(&self) -> &str {
        "json-snapshot"
    }

    fn render(&mut self, snapshot: &DistributionSnapshot) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(&self.path)?);
        serde_json::to_writer_pretty(&mut out, snapshot)?;
        out.write_all(b"\n")?;
        out.flush()
    }
}

/// Width in characters of a full (probability 1.0) bar.
const BAR_WIDTH: usize = 40;

/// Renders each histogram as four text bars.
pub struct TextHistogram<W: Write> {
    out: W,
}

impl<W: Write> TextHistogram<W> {
    pub fn new(out: W) -> Self {
        TextHistogram { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn entry(&mut self, entry: &SnapshotEntry) -> io::Result<()> {
        writeln!(self.out, "{} (n={})", entry.label(), entry.samples)?;
        for (symbol, count) in entry.counts.iter().enumerate() {
            let p = entry.probabilities.map_or(0.0, |p| p[symbol]);
            let bar = "#".repeat((p * BAR_WIDTH as f64).round() as usize);
            writeln!(self.out, "  {symbol} |{bar:<width$}| {count}", width = BAR_WIDTH)?;
        }
        Ok(())
    }
}

impl<W: Write> VisualizationSink for TextHistogram<W> {
    fn name(&self) -> &str {
        "text-histogram"
    }

    fn render(&mut self, snapshot: &DistributionSnapshot) -> io::Result<()> {
        for entry in &snapshot.buckets {
            self.entry(entry)?;
        }
        self.entry(&snapshot.global)?;
        self.out.flush()
    }
}
