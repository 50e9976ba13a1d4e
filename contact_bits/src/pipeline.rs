// The analysis pass.
//
// One synchronous sweep over the symbol stream drives the context tracker,
// the Markov encoder and the distribution table together:
//
//   context = tracker.current()            // snapshot from the previous step
//   for symbol in stream:
//       encode(context.markov_key(), symbol) -> event sink
//       table.observe(&context, symbol)
//       context = tracker.advance(symbol)
//   event sink: end of track
//
// The encoder never looks at the window after it has absorbed the current
// symbol; it always works from the snapshot returned by the previous
// `advance`. Sink failures abort the pass and name the sink.

use crate::context::ContextTracker;
use crate::distribution::{DistributionSnapshot, DistributionTable};
use crate::error::{Error, Result};
use crate::event::EventSink;
use crate::markov::{EmissionRule, EmissionTable};
use crate::symbol::SymbolStream;
use crate::visual::VisualizationSink;

/// Encode `stream` through `table` into `sink` and collect the per-context
/// distributions in the same pass.
pub fn analyze<S: EventSink + ?Sized>(
    stream: &SymbolStream,
    table: &EmissionTable,
    sink: &mut S,
) -> Result<DistributionTable> {
    let mut tracker = ContextTracker::new();
    let mut distributions = DistributionTable::new();
    let mut context = tracker.current();

    for symbol in stream.iter() {
        table
            .write_step(sink, context.markov_key(), symbol)
            .map_err(|e| Error::event_sink(sink.name(), e))?;
        distributions.observe(&context, symbol);
        context = tracker.advance(symbol);
    }
    sink.end_of_track()
        .map_err(|e| Error::event_sink(sink.name(), e))?;

    tracing::info!(
        symbols = stream.len(),
        buckets = distributions.non_empty_buckets(),
        sink = sink.name(),
        "analysis pass complete"
    );
    Ok(distributions)
}

/// Context-free encoding: every symbol through the same rule.
pub fn encode_direct<S: EventSink + ?Sized>(
    stream: &SymbolStream,
    rule: &EmissionRule,
    sink: &mut S,
) -> Result<()> {
    for symbol in stream.iter() {
        rule.write_step(sink, symbol)
            .map_err(|e| Error::event_sink(sink.name(), e))?;
    }
    sink.end_of_track()
        .map_err(|e| Error::event_sink(sink.name(), e))?;
    tracing::debug!(symbols = stream.len(), sink = sink.name(), "direct track encoded");
    Ok(())
}

/// Hand the snapshot to a visualization sink.
pub fn visualize<V: VisualizationSink + ?Sized>(
    snapshot: &DistributionSnapshot,
    sink: &mut V,
) -> Result<()> {
    sink.render(snapshot)
        .map_err(|e| Error::visualization_sink(sink.name(), e))
}
