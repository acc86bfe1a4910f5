//! # App Error Type
//!
//! Errors raised while starting the application: loading or saving the
//! config file, reading fixture data, building the store.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in EcoWatch                               │
//! │                                                                         │
//! │  config.rs ─── toml / io / validation ──┐                              │
//! │  services/ ─── serde_json / io ─────────┼──► AppError ──► anyhow (main)│
//! │  store build ─ StoreError ──────────────┘                              │
//! │                                                                         │
//! │  Remote failures during fetches are NOT AppErrors: they stay inside    │
//! │  the slices as state.                                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ecowatch_core::ValidationError;
use ecowatch_sync::StoreError;
use thiserror::Error;

/// Result type alias for app operations.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// A config value is out of range or malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The config file could not be parsed.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// The config file could not be written.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    // =========================================================================
    // Fixture Errors
    // =========================================================================
    /// The fixture file is missing or malformed.
    #[error("Failed to load fixtures: {0}")]
    FixtureLoadFailed(String),

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::ConfigSaveFailed(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::FixtureLoadFailed(err.to_string())
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::InvalidConfig(err.to_string())
    }
}
