// Sliding-window context tracking.
//
// The tracker holds the last two accepted symbols. Each call to `advance`
// drops the oldest entry, appends the new symbol and returns the resulting
// `Context` snapshot. The driver hands that snapshot to the encoder and the
// aggregator on the *next* step, which is what gives the encoder its one-step
// lag: the notes for symbol n are chosen from the window holding n-2 and n-1.
//
// Two keys are derived from one snapshot and kept as separate types:
// - `MarkovKey`: the newest entry only (4 values). An empty slot reads as
//   "00", the silent context.
// - `BucketKey`: both entries concatenated (16 values), used for the
//   distribution buckets. Only defined once the window is full.

use crate::symbol::Symbol;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of entries in the sliding window.
pub const WINDOW: usize = 2;

/// Lookup key for the emission table: the previous accepted symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkovKey(pub Symbol);

impl MarkovKey {
    /// The silent context ("00" or an empty window slot).
    pub const SILENT: MarkovKey = MarkovKey(Symbol::ZERO);

    pub fn is_silent(self) -> bool {
        self == Self::SILENT
    }
}

impl fmt::Display for MarkovKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Distribution bucket key: the two most recent symbols, oldest first.
///
/// The derived ordering compares `older` then `newer`, which is the same as
/// comparing the four-character text form lexicographically.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BucketKey {
    pub older: Symbol,
    pub newer: Symbol,
}

impl BucketKey {
    pub fn new(older: Symbol, newer: Symbol) -> Self {
        BucketKey { older, newer }
    }

    /// 4-bit value `older.code() * 4 + newer.code()`, in `0..16`.
    pub fn code(self) -> u8 {
        self.older.code() * 4 + self.newer.code()
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.older, self.newer)
    }
}

impl From<BucketKey> for String {
    fn from(key: BucketKey) -> String {
        key.to_string()
    }
}

impl TryFrom<String> for BucketKey {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let bytes = value.as_bytes();
        let parsed = match bytes.len() {
            4 => Symbol::parse(&bytes[..2]).zip(Symbol::parse(&bytes[2..])),
            _ => None,
        };
        match parsed {
            Some((older, newer)) => Ok(BucketKey { older, newer }),
            None => Err(format!("invalid bucket key {value:?}")),
        }
    }
}

/// Snapshot of the sliding window. `None` marks an empty placeholder slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Context {
    window: [Option<Symbol>; WINDOW],
}

impl Context {
    /// The window entries, oldest first.
    pub fn window(&self) -> [Option<Symbol>; WINDOW] {
        self.window
    }

    /// Newest entry as an emission lookup key.
    pub fn markov_key(&self) -> MarkovKey {
        self.window[WINDOW - 1].map_or(MarkovKey::SILENT, MarkovKey)
    }

    /// Full-window key, or `None` while placeholders remain.
    pub fn bucket_key(&self) -> Option<BucketKey> {
        match self.window {
            [Some(older), Some(newer)] => Some(BucketKey { older, newer }),
            _ => None,
        }
    }
}

impl fmt::Display for Context {
    /// Concatenation of the window entries; placeholders render as nothing.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in self.window.iter().flatten() {
            write!(f, "{symbol}")?;
        }
        Ok(())
    }
}

/// Order-1 context tracker over a two-entry window.
#[derive(Clone, Debug, Default)]
pub struct ContextTracker {
    current: Context,
}

impl ContextTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot as of the last `advance` (the initial empty window before
    /// any input).
    pub fn current(&self) -> Context {
        self.current
    }

    /// Slide the window: drop the oldest entry, append `symbol`.
    pub fn advance(&mut self, symbol: Symbol) -> Context {
        self.current.window.rotate_left(1);
        self.current.window[WINDOW - 1] = Some(symbol);
        self.current
    }
}
