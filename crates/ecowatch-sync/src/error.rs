//! # Store Error Types
//!
//! Errors for store-level misuse. Remote failures are NOT here: those are
//! captured by the slices and stored as state (see `ecowatch_core::RemoteError`).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Store Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Construction   │  │    Lookup       │  │     Rendering           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  MissingService │  │  UnknownSlice   │  │  SerializationFailed    │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Store error type.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The builder was not given a service for a slice.
    #[error("No service configured for the {0} slice")]
    MissingService(&'static str),

    /// No slice is registered under this name.
    #[error("Unknown slice: {0}")]
    UnknownSlice(String),

    /// A snapshot could not be rendered to JSON.
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::SerializationFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            StoreError::UnknownSlice("weather".into()).to_string(),
            "Unknown slice: weather"
        );
        assert_eq!(
            StoreError::MissingService("user").to_string(),
            "No service configured for the user slice"
        );
    }
}
