//! Unified error types for the Podwire workspace.
//!
//! The client crate defines its own wire-level error enum that wraps these
//! common variants.

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum PodwireError {
    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A filter set could not be turned into its query parameter form.
    #[error("invalid filters: {message}")]
    Encoding {
        /// Description of the rejected filter.
        message: String,
    },

    /// The same item identifier was recorded twice in one bulk report.
    #[error("item {id} reported more than once")]
    DuplicateItem {
        /// Identifier that was seen again.
        id: String,
    },

    /// Serialization or deserialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, PodwireError>;
