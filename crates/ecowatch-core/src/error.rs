//! # Error Types
//!
//! Domain-specific error types for ecowatch-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  ecowatch-core errors (this file)                                      │
//! │  ├── RemoteError      - The ONE failure kind a service call can have   │
//! │  ├── ValidationError  - Fetch parameter / input validation failures    │
//! │  └── CoreError        - General domain errors                          │
//! │                                                                         │
//! │  ecowatch-sync errors (separate crate)                                 │
//! │  └── StoreError       - Store composition misuse                       │
//! │                                                                         │
//! │  Flow: service failure → RemoteError → slice `error` field → UI        │
//! │        (never re-thrown past the slice)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Remote failures are opaque text: no classification, no retry hints
//! 3. Validation errors carry the field name so the UI can point at it

use thiserror::Error;

// =============================================================================
// Remote Error
// =============================================================================

/// Failure of a remote resource operation.
///
/// The service layer reduces network, server and parsing failures to a single
/// descriptive string. Slices store [`RemoteError::message`] verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The remote call failed; the message is surfaced to the UI as-is.
    #[error("{0}")]
    RemoteOperationFailed(String),
}

impl RemoteError {
    /// Creates a remote failure from any message.
    pub fn new(message: impl Into<String>) -> Self {
        RemoteError::RemoteOperationFailed(message.into())
    }

    /// The human-readable failure text.
    pub fn message(&self) -> &str {
        match self {
            RemoteError::RemoteOperationFailed(message) => message,
        }
    }

    /// Consumes the error, returning its message.
    pub fn into_message(self) -> String {
        match self {
            RemoteError::RemoteOperationFailed(message) => message,
        }
    }
}

impl From<ValidationError> for RemoteError {
    fn from(err: ValidationError) -> Self {
        RemoteError::RemoteOperationFailed(err.to_string())
    }
}

/// Result type for service calls.
pub type RemoteResult<T> = Result<T, RemoteError>;

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before a service call is made, e.g. a latitude outside [-90, 90].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Numeric value is outside its allowed closed range.
    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        value: f64,
    },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value is not a finite number (NaN or infinity).
    #[error("{field} must be a finite number")]
    NotFinite { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Invalid format (e.g. malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Core Error
// =============================================================================

/// Core domain errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A fetch needs a parameter and neither the call nor the slice's
    /// selection supplies one.
    #[error("No {what} selected")]
    MissingSelection { what: &'static str },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl From<CoreError> for RemoteError {
    fn from(err: CoreError) -> Self {
        match err {
            // Keep the field-level text, drop the "Validation error:" prefix
            CoreError::Validation(inner) => inner.into(),
            other => RemoteError::RemoteOperationFailed(other.to_string()),
        }
    }
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_is_verbatim() {
        let err = RemoteError::new("Request failed with status code 500");
        assert_eq!(err.to_string(), "Request failed with status code 500");
        assert_eq!(err.message(), "Request failed with status code 500");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::OutOfRange {
            field: "latitude".to_string(),
            min: -90.0,
            max: 90.0,
            value: 91.5,
        };
        assert_eq!(err.to_string(), "latitude must be between -90 and 90, got 91.5");

        let err = ValidationError::MustBePositive {
            field: "radius_km".to_string(),
        };
        assert_eq!(err.to_string(), "radius_km must be positive");
    }

    #[test]
    fn test_core_error_converts_to_remote_message() {
        let err: RemoteError = CoreError::MissingSelection { what: "location" }.into();
        assert_eq!(err.message(), "No location selected");

        let err: RemoteError = CoreError::from(ValidationError::Required {
            field: "user_id".to_string(),
        })
        .into();
        assert_eq!(err.message(), "user_id is required");
    }
}
