// Contact bit-stream encoder and divergence analyzer
//
// Takes a stream of 2-bit symbols (one "00".."11" pair per input line, as
// produced by an external stochastic source) and does two things in a single
// pass: encodes it into timed note events with an order-1 Markov emission
// table, and tallies symbol distributions per two-symbol context so their
// divergence from the global distribution can be reported.
//
// Architecture:
// - symbol.rs: Symbol type and line decoding (malformed lines are skipped)
// - input.rs: Reading bits files, plain or gzipped
// - context.rs: Two-entry sliding window; derives the Markov key and the
//   bucket key from one snapshot
// - event.rs: TimedEvent, the EventSink trait, recording and discarding sinks
// - markov.rs: Emission rules and the context-keyed emission table
// - distribution.rs: Per-bucket and global histograms, frozen snapshots
// - divergence.rs: Mean absolute deviation report, text and JSON output
// - midi.rs: Standard MIDI File event sink (midly)
// - visual.rs: Visualization sinks (JSON snapshot, text histograms)
// - pipeline.rs: The synchronized analysis pass and sink plumbing
// - error.rs: Error type
//
// The pipeline is pure given its input: the same stream always yields the
// same events and the same report.

pub mod context;
pub mod distribution;
pub mod divergence;
pub mod error;
pub mod event;
pub mod input;
pub mod markov;
pub mod midi;
pub mod pipeline;
pub mod symbol;
pub mod visual;

pub use error::{Error, Result};
