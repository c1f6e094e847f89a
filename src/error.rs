//! Error types for wsp-client.

use thiserror::Error;

/// Main error type for all message-building operations.
///
/// Every failure is detected synchronously at build time; builders never
/// return partial byte output alongside an error.
#[derive(Debug, Error)]
pub enum WspError {
    /// A value is incompatible with its declared type tag
    /// (e.g. a vector element whose type differs from the vector's).
    #[error("Build error: {0}")]
    Build(String),

    /// A variant type code outside the supported set for the operation.
    #[error("Unsupported variant type code: {0:#06x}")]
    UnsupportedType(u16),

    /// A seek or aggregate mode outside the fixed enumeration.
    #[error("Unsupported mode: {0:#010x}")]
    UnsupportedMode(u32),

    /// Configuration could not be deserialized.
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Transport-level failure reported by an external collaborator.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Result type alias using WspError.
pub type Result<T> = std::result::Result<T, WspError>;
