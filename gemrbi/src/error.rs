//! Error types for interface generation.
//!
//! Only structural failures surface here. A construct whose type cannot be
//! determined is not an error: the walker substitutes `T.untyped` and moves on.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GemRbiError {
    /// The runtime version string could not be turned into a comparable value.
    #[error("unsupported runtime version: {value:?}")]
    UnsupportedVersion { value: String },

    /// An internal invariant was violated while assembling the interface file.
    #[error("assembly failure in {construct}: {reason}")]
    AssemblyFailure { construct: String, reason: String },

    #[error("invalid package image: {0}")]
    InvalidImage(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl GemRbiError {
    pub fn assembly(construct: impl Into<String>, reason: impl Into<String>) -> Self {
        GemRbiError::AssemblyFailure {
            construct: construct.into(),
            reason: reason.into(),
        }
    }
}

impl From<std::io::Error> for GemRbiError {
    fn from(e: std::io::Error) -> Self {
        GemRbiError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for GemRbiError {
    fn from(e: serde_json::Error) -> Self {
        GemRbiError::InvalidImage(e.to_string())
    }
}

impl From<toml::de::Error> for GemRbiError {
    fn from(e: toml::de::Error) -> Self {
        GemRbiError::Config(e.to_string())
    }
}

pub type GemRbiResult<T> = Result<T, GemRbiError>;
