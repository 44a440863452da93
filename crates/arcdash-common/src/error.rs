//! Error types for Arcdash.

use thiserror::Error;

/// Top-level error type for Arcdash operations outside the per-tick path.
#[derive(Debug, Error)]
pub enum ArcdashError {
    /// Tuning values failed validation
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Invalid tuning value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A value that must be strictly positive was not
    #[error("{field} must be > 0, got {value}")]
    NotPositive {
        /// Offending field name
        field: &'static str,
        /// Value found
        value: f32,
    },

    /// A value that must not be negative was
    #[error("{field} must be >= 0, got {value}")]
    Negative {
        /// Offending field name
        field: &'static str,
        /// Value found
        value: f32,
    },

    /// NaN or infinity
    #[error("{field} is not finite")]
    NonFinite {
        /// Offending field name
        field: &'static str,
    },
}

/// Result type alias for Arcdash operations.
pub type ArcdashResult<T> = Result<T, ArcdashError>;
