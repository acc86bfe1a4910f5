//! # Validation Module
//!
//! Range checks for fetch parameters and profile edits.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: UI (TypeScript)                                              │
//! │  └── Map picker keeps coordinates on the globe                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Resource slice (Rust)                                        │
//! │  └── THIS MODULE: checked right after `start`; a failure settles the   │
//! │      fetch as Failed with the validation message                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote service                                               │
//! │  └── Server-side validation (400 → opaque failure message)             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use ecowatch_core::validation::{validate_location, validate_radius_km};
//! use ecowatch_core::Location;
//!
//! assert!(validate_location(&Location::new(40.0, -75.0)).is_ok());
//! assert!(validate_location(&Location::new(91.0, 0.0)).is_err());
//! assert!(validate_radius_km(10.0).is_ok());
//! assert!(validate_radius_km(0.0).is_err());
//! ```

use crate::error::ValidationError;
use crate::types::{Location, PreferencesUpdate, ProfileUpdate, UserId};
use crate::MAX_RADIUS_KM;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a display name.
const MAX_DISPLAY_NAME_LEN: usize = 100;

// =============================================================================
// Numeric Validators
// =============================================================================

fn check_range(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite {
            field: field.to_string(),
        });
    }

    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min,
            max,
            value,
        });
    }

    Ok(())
}

/// Validates a map coordinate.
///
/// ## Rules
/// - Latitude must be in [-90, 90]
/// - Longitude must be in [-180, 180]
/// - Both must be finite
pub fn validate_location(location: &Location) -> ValidationResult<()> {
    check_range("latitude", location.latitude, -90.0, 90.0)?;
    check_range("longitude", location.longitude, -180.0, 180.0)?;
    Ok(())
}

/// Validates a search radius in kilometres.
///
/// ## Rules
/// - Must be finite and strictly positive
/// - Must not exceed [`MAX_RADIUS_KM`]
pub fn validate_radius_km(radius_km: f64) -> ValidationResult<()> {
    if !radius_km.is_finite() {
        return Err(ValidationError::NotFinite {
            field: "radius_km".to_string(),
        });
    }

    if radius_km <= 0.0 {
        return Err(ValidationError::MustBePositive {
            field: "radius_km".to_string(),
        });
    }

    check_range("radius_km", radius_km, 0.0, MAX_RADIUS_KM)
}

// =============================================================================
// User Validators
// =============================================================================

/// Validates a user id (non-blank).
pub fn validate_user_id(user_id: &UserId) -> ValidationResult<()> {
    if user_id.as_str().trim().is_empty() {
        return Err(ValidationError::Required {
            field: "user_id".to_string(),
        });
    }
    Ok(())
}

/// Validates a partial profile update.
///
/// ## Rules
/// - `display_name`, when set, must be non-blank and at most 100 characters
/// - `email`, when set, must contain a single `@` with text on both sides
/// - `home_location`, when set, must be a valid location
pub fn validate_profile_update(update: &ProfileUpdate) -> ValidationResult<()> {
    if let Some(ref name) = update.display_name {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required {
                field: "display_name".to_string(),
            });
        }
        if name.chars().count() > MAX_DISPLAY_NAME_LEN {
            return Err(ValidationError::TooLong {
                field: "display_name".to_string(),
                max: MAX_DISPLAY_NAME_LEN,
            });
        }
    }

    if let Some(ref email) = update.email {
        let valid = match email.trim().split_once('@') {
            Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
            None => false,
        };
        if !valid {
            return Err(ValidationError::InvalidFormat {
                field: "email".to_string(),
                reason: "expected name@domain".to_string(),
            });
        }
    }

    if let Some(ref location) = update.home_location {
        validate_location(location)?;
    }

    Ok(())
}

/// Validates a partial preferences update.
pub fn validate_preferences_update(update: &PreferencesUpdate) -> ValidationResult<()> {
    if let Some(radius) = update.alert_radius_km {
        validate_radius_km(radius)?;
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
