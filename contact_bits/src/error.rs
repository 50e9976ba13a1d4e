// Error type shared by the library and the `contact` binary.
//
// Malformed input lines and empty buckets are not errors (they are skipped
// or omitted where they occur). What remains are failures that abort a run:
// unreadable input, a sink that cannot accept output, a report that cannot
// be written, or a bad emission table. Sink failures carry the sink's name so the user can tell which
// output broke.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read input `{}`: {source}", path.display())]
    Input { path: PathBuf, source: io::Error },

    #[error("event sink `{sink}` failed: {source}")]
    EventSink { sink: String, source: io::Error },

    #[error("visualization sink `{sink}` failed: {source}")]
    VisualizationSink { sink: String, source: io::Error },

    #[error("failed to write report: {0}")]
    Report(#[source] io::Error),

    #[error("invalid emission table: {0}")]
    EmissionTable(String),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn event_sink(sink: &str, source: io::Error) -> Self {
        Error::EventSink {
            sink: sink.to_string(),
            source,
        }
    }

    pub(crate) fn visualization_sink(sink: &str, source: io::Error) -> Self {
        Error::VisualizationSink {
            sink: sink.to_string(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
