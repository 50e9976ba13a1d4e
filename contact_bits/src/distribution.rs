// Per-context symbol distributions.
//
// `DistributionTable` counts every accepted symbol twice: once in the global
// histogram and once in the bucket for the context the symbol was seen in.
// Buckets are keyed by `BucketKey`, so only symbols seen with a full
// two-entry window land in a bucket; the first one or two symbols of a stream
// only count globally.
//
// A table is built fresh for each analysis pass and frozen afterwards. The
// `DistributionSnapshot` it produces is what reporting and visualization
// read.

use crate::context::{BucketKey, Context};
use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Frequency counter over the four symbol values.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    pub counts: [u64; Symbol::COUNT],
}

impl Histogram {
    pub fn record(&mut self, symbol: Symbol) {
        self.counts[symbol.index()] += 1;
    }

    /// Number of observations.
    pub fn samples(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.samples() == 0
    }

    /// Empirical probability of each symbol, or `None` with no samples.
    pub fn probabilities(&self) -> Option<[f64; Symbol::COUNT]> {
        let total = self.samples();
        if total == 0 {
            return None;
        }
        Some(self.counts.map(|c| c as f64 / total as f64))
    }
}

/// Bucketed and global symbol counts for one pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DistributionTable {
    buckets: BTreeMap<BucketKey, Histogram>,
    global: Histogram,
}

impl DistributionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count `symbol` globally and, when the context window is full, in its
    /// bucket.
    pub fn observe(&mut self, context: &Context, symbol: Symbol) {
        self.global.record(symbol);
        if let Some(key) = context.bucket_key() {
            self.buckets.entry(key).or_default().record(symbol);
        }
    }

    pub fn global(&self) -> &Histogram {
        &self.global
    }

    pub fn bucket(&self, key: BucketKey) -> Option<&Histogram> {
        self.buckets.get(&key)
    }

    /// Buckets in ascending key order.
    pub fn buckets(&self) -> impl Iterator<Item = (BucketKey, &Histogram)> + '_ {
        self.buckets.iter().map(|(k, h)| (*k, h))
    }

    /// Number of buckets with at least one observation.
    pub fn non_empty_buckets(&self) -> usize {
        self.buckets.values().filter(|h| !h.is_empty()).count()
    }

    pub fn snapshot(&self) -> DistributionSnapshot {
        DistributionSnapshot {
            global: SnapshotEntry::new(None, &self.global),
            buckets: self
                .buckets()
                .map(|(key, hist)| SnapshotEntry::new(Some(key), hist))
                .collect(),
        }
    }
}

/// One histogram as handed to visualization: counts, probabilities and
/// sample count, ready for a 4-bin rendering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// `None` for the global aggregate.
    pub key: Option<BucketKey>,
    pub counts: [u64; Symbol::COUNT],
    pub probabilities: Option<[f64; Symbol::COUNT]>,
    pub samples: u64,
}

impl SnapshotEntry {
    fn new(key: Option<BucketKey>, hist: &Histogram) -> Self {
        SnapshotEntry {
            key,
            counts: hist.counts,
            probabilities: hist.probabilities(),
            samples: hist.samples(),
        }
    }

    /// Display label: the bucket key, or "total" for the global entry.
    pub fn label(&self) -> String {
        self.key.map_or_else(|| "total".to_string(), |k| k.to_string())
    }
}

/// Frozen view of a `DistributionTable`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DistributionSnapshot {
    pub global: SnapshotEntry,
    /// Ascending key order.
    pub buckets: Vec<SnapshotEntry>,
}
