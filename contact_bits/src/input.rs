// Input loading.
//
// Bits files are plain text, or gzip-compressed when the path ends in
// `.gz`. The whole file is read into memory before decoding; inputs are a
// few megabytes at most.

use crate::error::{Error, Result};
use crate::symbol::SymbolStream;
use flate2::read::GzDecoder;
use std::io::Read;
use std::path::Path;

/// Read the raw bytes of `path`, decompressing `.gz` files.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    let input_err = |source| Error::Input {
        path: path.to_path_buf(),
        source,
    };
    let raw = std::fs::read(path).map_err(input_err)?;
    if !is_gzip(path) {
        return Ok(raw);
    }
    let mut data = Vec::new();
    GzDecoder::new(raw.as_slice())
        .read_to_end(&mut data)
        .map_err(input_err)?;
    Ok(data)
}

/// Read and decode a bits file.
pub fn load_stream(path: &Path) -> Result<SymbolStream> {
    let stream = SymbolStream::decode(&read_input(path)?);
    tracing::info!(
        path = %path.display(),
        symbols = stream.len(),
        skipped = stream.skipped(),
        "decoded input"
    );
    Ok(stream)
}

fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}
