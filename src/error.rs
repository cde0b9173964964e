//! Error types for document assembly.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or merging documents.
#[derive(Debug, Error)]
pub enum Error {
    /// A required option is missing or has the wrong shape.
    #[error("invalid configuration for '{field}': {message}")]
    Config { field: String, message: String },

    /// An input file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An input file is binary or otherwise not UTF-8.
    #[error("{} is not UTF-8 text", path.display())]
    NotText { path: PathBuf },

    /// A glob pattern could not be compiled.
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// Malformed YAML, or a payload with the wrong shape.
    #[error("failed to parse {}{}: {message}", path.display(), at_line(line))]
    Parse {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    /// The assembled document was rejected by the validator.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The document could not be serialized.
    #[error("failed to serialize document: {message}")]
    Serialize { message: String },
}

impl Error {
    pub(crate) fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Wrap a YAML error, keeping its line number when known.
    pub(crate) fn yaml(path: impl Into<PathBuf>, err: &serde_yaml::Error) -> Self {
        Self::Parse {
            path: path.into(),
            line: err.location().map(|l| l.line()),
            message: err.to_string(),
        }
    }
}

fn at_line(line: &Option<usize>) -> String {
    line.map(|l| format!(" (line {})", l)).unwrap_or_default()
}

/// Every problem the validator found in one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub problems: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "document failed validation: {}", self.problems.join("; "))
    }
}

impl std::error::Error for ValidationError {}
