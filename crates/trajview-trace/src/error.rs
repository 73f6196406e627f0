//! Errors raised while loading a trajectory file.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed line-delimited envelope.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Trace file is empty")]
    Empty,
    #[error("Line {line}: invalid JSON: {source}")]
    InvalidJson {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("Line {line}: expected a JSON object")]
    NotAnObject { line: usize },
    #[error("Line {line}: `data` must be an array")]
    DataNotArray { line: usize },
    #[error("Line {line}, record {index}: invalid `{object}` record: {source}")]
    InvalidRecord {
        line: usize,
        index: usize,
        object: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// A trace could not be turned into a model. The previous model, if any, stays in use.
#[derive(Debug, Error)]
pub enum TraceLoadError {
    #[error("Failed to parse trace file: {0}")]
    Parse(#[from] ParseError),
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
