//! Error type shared by the engine, the PPM reader and the binaries.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistoError {
    /// I/O errors while reading input or writing synthetic images
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The pixel source could not parse its input
    #[error("invalid input format: {message}")]
    InvalidFormat { message: String },

    /// Bit depth bound above 255
    #[error("maxrgb {depth} not supported")]
    UnsupportedDepth { depth: u32 },

    #[error("invalid thread count {threads}: {reason}")]
    InvalidThreadCount { threads: usize, reason: &'static str },

    /// The histogram sink could not be opened or written
    #[error("unable to output to {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OS refused to create a worker thread
    #[error("failed to spawn {phase} worker: {source}")]
    Spawn {
        phase: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("{phase} worker {worker} panicked")]
    WorkerPanicked { phase: &'static str, worker: usize },

    #[error("failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),

    /// Invalid CLI argument combinations
    #[error("configuration error: {message}")]
    Config { message: String },
}

pub type Result<T> = std::result::Result<T, HistoError>;

impl HistoError {
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Output failures are reported but never abort a run.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Output { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_error_is_not_fatal() {
        let err = HistoError::Output {
            path: PathBuf::from("/nope/out.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("/nope/out.txt"));
        assert!(HistoError::UnsupportedDepth { depth: 65535 }.is_fatal());
    }

    #[test]
    fn test_depth_message() {
        let err = HistoError::UnsupportedDepth { depth: 1023 };
        assert_eq!(err.to_string(), "maxrgb 1023 not supported");
    }
}
