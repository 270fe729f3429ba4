//! Error types for dispensing export ingestion.
//!
//! Almost every problem in an export is recoverable and lands in
//! [`ImportResult::errors`]. The variants here are reserved for conditions
//! that stop a parse call outright.

use std::path::PathBuf;

use his_model::{ImportResult, ModelError};
use thiserror::Error;

/// Errors that stop an import call.
#[derive(Debug, Error)]
pub enum IngestError {
    // === Markup Errors ===
    /// The markup document is not well formed.
    ///
    /// Carries the partially populated result so callers can still report the
    /// detected format and vendor.
    #[error("malformed markup near record {record}: {message}")]
    MalformedMarkup {
        record: usize,
        message: String,
        partial: Box<ImportResult>,
    },

    // === Configuration Errors ===
    /// Import options could not be read.
    #[error("invalid import options: {0}")]
    InvalidOptions(#[from] serde_json::Error),

    /// A model value (vendor code, format label) was rejected.
    #[error(transparent)]
    Model(#[from] ModelError),

    // === Logging Errors ===
    /// The log file could not be opened.
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A global subscriber was already installed.
    #[error("failed to initialize logging: {message}")]
    Logging { message: String },
}

impl IngestError {
    /// The best-effort result attached to a fatal markup error.
    pub fn partial_result(&self) -> Option<&ImportResult> {
        match self {
            Self::MalformedMarkup { partial, .. } => Some(partial),
            _ => None,
        }
    }

    /// Consumes the error, returning the attached best-effort result.
    pub fn into_partial_result(self) -> Option<ImportResult> {
        match self {
            Self::MalformedMarkup { partial, .. } => Some(*partial),
            _ => None,
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestError>;
