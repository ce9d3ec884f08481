// src/error.rs
use std::path::PathBuf;

use crate::record::DecodeFailure;

#[derive(Debug, thiserror::Error)]
pub enum PickError {
    /// No usable field selection or an invalid option combination
    #[error("{0}")]
    Configuration(String),

    #[error("No such file or directory: '{}'", .0.display())]
    SourceNotFound(PathBuf),

    /// Non-fatal; the driver logs it and moves on to the next source
    #[error("skipping '{}': {reason}", path.display())]
    SourceSkipped { path: PathBuf, reason: String },

    #[error("invalid log format ({source_name}, row {row})")]
    Decode {
        source_name: String,
        row: u64,
        #[source]
        failure: DecodeFailure,
    },

    /// An IO or CSV failure while reading or writing one source
    #[error("failed on '{source_name}'")]
    Input {
        source_name: String,
        #[source]
        inner: Box<PickError>,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl PickError {
    pub fn config(message: impl Into<String>) -> Self {
        PickError::Configuration(message.into())
    }

    /// Tag IO and CSV failures with the source they happened on
    pub fn in_source(self, source_name: &str) -> Self {
        match self {
            PickError::Io(_) | PickError::Csv(_) => PickError::Input {
                source_name: source_name.to_string(),
                inner: Box::new(self),
            },
            other => other,
        }
    }

    /// True when the downstream reader of stdout went away
    pub fn is_broken_pipe(&self) -> bool {
        match self {
            PickError::Input { inner, .. } => inner.is_broken_pipe(),
            PickError::Io(e) => e.kind() == std::io::ErrorKind::BrokenPipe,
            PickError::Csv(e) => match e.kind() {
                csv::ErrorKind::Io(io) => io.kind() == std::io::ErrorKind::BrokenPipe,
                _ => false,
            },
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, PickError>;
