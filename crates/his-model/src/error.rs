//! Error types for the canonical dispensing model.

use thiserror::Error;

/// Errors raised while building model values from external input.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// A vendor code that is not in the supported vendor table.
    #[error("unknown vendor code: {code}")]
    UnknownVendor { code: String },

    /// A source format label that is not recognized.
    #[error("unknown source format: {label}")]
    UnknownSourceFormat { label: String },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
