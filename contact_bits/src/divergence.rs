// Divergence of per-context distributions from the global distribution.
//
// For each non-empty bucket c:
//   divergence(c) = (1/4) * sum_i |P_c[i] - P_global[i]|
// i.e. the mean absolute per-symbol deviation. This is deliberately not a
// normalized statistical distance. Empty buckets are left out of the report
// rather than given a score.
//
// `DivergenceReport`'s `Display` impl is the console format:
//   <key> <divergence> <samples>
//   0 <p0>
//   ...
//   3 <p3>
// repeated per bucket in ascending key order, then "total" and the four
// global probabilities. `write_report` emits either that form or JSON.

use crate::context::BucketKey;
use crate::distribution::DistributionTable;
use crate::error::{Error, Result};
use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Divergence of one bucket.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DivergenceEntry {
    pub key: BucketKey,
    pub divergence: f64,
    pub samples: u64,
    pub probabilities: [f64; Symbol::COUNT],
}

/// Report over every non-empty bucket, sorted by key.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DivergenceReport {
    pub entries: Vec<DivergenceEntry>,
    /// Global probabilities; `None` when no symbol was observed.
    pub global: Option<[f64; Symbol::COUNT]>,
    pub total_samples: u64,
}

/// Mean absolute difference between two probability vectors.
pub fn mean_absolute_deviation(p: &[f64; Symbol::COUNT], q: &[f64; Symbol::COUNT]) -> f64 {
    let sum: f64 = p.iter().zip(q).map(|(a, b)| (a - b).abs()).sum();
    sum / Symbol::COUNT as f64
}

/// Build the report from a finished table.
pub fn report(table: &DistributionTable) -> DivergenceReport {
    let global = table.global().probabilities();
    let total_samples = table.global().samples();

    let Some(global_p) = global else {
        return DivergenceReport {
            entries: Vec::new(),
            global: None,
            total_samples,
        };
    };

    let entries = table
        .buckets()
        .filter_map(|(key, hist)| {
            let probabilities = hist.probabilities()?;
            Some(DivergenceEntry {
                key,
                divergence: mean_absolute_deviation(&probabilities, &global_p),
                samples: hist.samples(),
                probabilities,
            })
        })
        .collect();

    DivergenceReport {
        entries,
        global,
        total_samples,
    }
}

impl DivergenceReport {
    pub fn entry(&self, key: BucketKey) -> Option<&DivergenceEntry> {
        self.entries.iter().find(|e| e.key == key)
    }
}

/// Output form of a report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReportFormat {
    /// The console format of the `Display` impl.
    #[default]
    Text,
    /// Pretty-printed JSON followed by a newline.
    Json,
}

/// Write `report` to `out` in the chosen format.
pub fn write_report<W: Write>(
    report: &DivergenceReport,
    format: ReportFormat,
    out: &mut W,
) -> Result<()> {
    match format {
        ReportFormat::Text => write!(out, "{report}").map_err(Error::Report)?,
        ReportFormat::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out).map_err(Error::Report)?;
        }
    }
    out.flush().map_err(Error::Report)
}

impl fmt::Display for DivergenceReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{} {} {}", entry.key, entry.divergence, entry.samples)?;
            for (symbol, p) in entry.probabilities.iter().enumerate() {
                writeln!(f, "{symbol} {p:.6}")?;
            }
        }
        writeln!(f, "total")?;
        if let Some(global) = &self.global {
            for (symbol, p) in global.iter().enumerate() {
                writeln!(f, "{symbol} {p:.6}")?;
            }
        }
        Ok(())
    }
}
