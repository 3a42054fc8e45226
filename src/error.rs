//! Error types for recombination runs.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Where a placeholder sits in the skeleton, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// 1-based source line of the placeholder's start tag, if known.
    pub line: Option<usize>,
    /// Element path from the root, e.g. `/html/body/div[3]`.
    pub path: String,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line} ({})", self.path),
            None => f.write_str(&self.path),
        }
    }
}

/// Errors that can occur while loading, merging, or writing documents.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML writing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("input not found: {}", path.display())]
    InputNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed document {}{}: {message}", path.display(), line_suffix(*line))]
    MalformedDocument {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    #[error("fragment container without id in {}{}", path.display(), line_suffix(*line))]
    MissingId { path: PathBuf, line: Option<usize> },

    #[error("missing metadata for title page: {0}")]
    MissingMetadata(String),

    #[error("missing required element: {0}")]
    MissingElement(String),

    #[error("unknown fragment id `{id}` referenced by placeholder at {location}")]
    UnknownFragmentId { id: String, location: Location },

    #[error("invalid reference expression `{expression}` at {location}: {reason}")]
    InvalidRangeExpression {
        expression: String,
        reason: String,
        location: Location,
    },
}

fn line_suffix(line: Option<usize>) -> String {
    line.map(|l| format!(" at line {l}")).unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;
