//! # App Configuration
//!
//! Configuration for the EcoWatch client.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     ECOWATCH_USER_ID=u1                                                │
//! │     ECOWATCH_LOCATION=40.0,-75.0                                       │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/ecowatch/ecowatch.toml (Linux)                           │
//! │     ~/Library/Application Support/com.ecowatch.app/ecowatch.toml      │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     no location, no user, 25 km nearby radius                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # ecowatch.toml
//! [environmental]
//! default_radius_km = 10.0
//! nearby_radius_km = 25.0
//! default_location = { latitude = 40.0, longitude = -75.0 }
//!
//! [user]
//! user_id = "u1"
//!
//! [console]
//! extra_warn_patterns = ["Require cycle"]
//! extra_suppressed_patterns = ["ETIMEDOUT"]
//!
//! [fixtures]
//! path = "fixtures/demo.json"
//! ```

use std::path::PathBuf;

use ecowatch_core::validation::{validate_location, validate_radius_km};
use ecowatch_core::{Location, UserId, DEFAULT_NEARBY_RADIUS_KM};
use ecowatch_sync::EnvironmentalOptions;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::console::ConsolePatterns;
use crate::error::{AppError, AppResult};

// =============================================================================
// Sections
// =============================================================================

/// `[environmental]`: fetch defaults for the environmental slice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentalSettings {
    /// Radius for current-data requests. Unset lets the service decide.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_radius_km: Option<f64>,

    /// Radius for nearby-data requests.
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius_km: f64,

    /// Location selected at startup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_location: Option<Location>,
}

fn default_nearby_radius() -> f64 {
    DEFAULT_NEARBY_RADIUS_KM
}

impl Default for EnvironmentalSettings {
    fn default() -> Self {
        EnvironmentalSettings {
            default_radius_km: None,
            nearby_radius_km: default_nearby_radius(),
            default_location: None,
        }
    }
}

/// `[user]`: the user made active at startup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// `[console]`: patterns added to the compiled-in console filter lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    #[serde(default)]
    pub extra_warn_patterns: Vec<String>,

    #[serde(default)]
    pub extra_suppressed_patterns: Vec<String>,
}

/// `[fixtures]`: where the demo services read their data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureSettings {
    /// JSON fixture file. Unset uses the bundled demo data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

// =============================================================================
// Main App Configuration
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environmental: EnvironmentalSettings,

    #[serde(default)]
    pub user: UserSettings,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub fixtures: FixtureSettings,
}

impl AppConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (ecowatch.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> AppResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AppError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(radius) = self.environmental.default_radius_km {
            validate_radius_km(radius)?;
        }
        validate_radius_km(self.environmental.nearby_radius_km)?;

        if let Some(ref location) = self.environmental.default_location {
            validate_location(location)?;
        }

        if let Some(ref id) = self.user.user_id {
            if id.trim().is_empty() {
                return Err(AppError::InvalidConfig("user_id must not be blank".into()));
            }
        }

        let blank_pattern = self
            .console
            .extra_warn_patterns
            .iter()
            .chain(&self.console.extra_suppressed_patterns)
            .any(|p| p.is_empty());
        if blank_pattern {
            // An empty pattern is a substring of everything
            return Err(AppError::InvalidConfig(
                "console patterns must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(id) = lookup("ECOWATCH_USER_ID") {
            debug!(user_id = %id, "Overriding user from environment");
            self.user.user_id = Some(id);
        }

        if let Some(value) = lookup("ECOWATCH_LOCATION") {
            match parse_location(&value) {
                Some(location) => {
                    debug!(?location, "Overriding location from environment");
                    self.environmental.default_location = Some(location);
                }
                None => warn!(value = %value, "Expected ECOWATCH_LOCATION as 'lat,lng'"),
            }
        }

        if let Some(value) = lookup("ECOWATCH_DEFAULT_RADIUS_KM") {
            match value.parse::<f64>() {
                Ok(radius) => self.environmental.default_radius_km = Some(radius),
                Err(_) => warn!(value = %value, "Expected ECOWATCH_DEFAULT_RADIUS_KM in km"),
            }
        }

        if let Some(value) = lookup("ECOWATCH_NEARBY_RADIUS_KM") {
            match value.parse::<f64>() {
                Ok(radius) => self.environmental.nearby_radius_km = radius,
                Err(_) => warn!(value = %value, "Expected ECOWATCH_NEARBY_RADIUS_KM in km"),
            }
        }

        if let Some(path) = lookup("ECOWATCH_FIXTURES") {
            self.fixtures.path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "ecowatch", "app")
            .map(|dirs| dirs.config_dir().join("ecowatch.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Radius defaults for the environmental slice.
    pub fn environmental_options(&self) -> EnvironmentalOptions {
        EnvironmentalOptions {
            default_radius_km: self.environmental.default_radius_km,
            nearby_radius_km: self.environmental.nearby_radius_km,
        }
    }

    /// The user made active at startup.
    pub fn user_id(&self) -> Option<UserId> {
        self.user.user_id.as_deref().map(UserId::from)
    }

    /// Console patterns: compiled-in defaults plus the configured extras.
    pub fn console_patterns(&self) -> ConsolePatterns {
        ConsolePatterns::default().extended(
            self.console.extra_warn_patterns.iter().cloned(),
            self.console.extra_suppressed_patterns.iter().cloned(),
        )
    }
}

fn parse_location(value: &str) -> Option<Location> {
    let (lat, lng) = value.split_once(',')?;
    let latitude = lat.trim().parse().ok()?;
    let longitude = lng.trim().parse().ok()?;
    Some(Location::new(latitude, longitude))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("ecowatch-config-{}-{}", std::process::id(), name))
            .join("ecowatch.toml")
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.environmental.nearby_radius_km, 25.0);
        assert!(config.user_id().is_none());
    }

    #[test]
    fn test_parse_partial_file() {
        let config: AppConfig = toml::from_str(
            r#"
            [environmental]
            default_location = { lat = 40.0, lng = -75.0 }

            [user]
            user_id = "u1"
            "#,
        )
        .unwrap();

        assert_eq!(
            config.environmental.default_location,
            Some(Location::new(40.0, -75.0))
        );
        assert_eq!(config.environmental.nearby_radius_km, 25.0);
        assert_eq!(config.user_id(), Some(UserId::new("u1")));
        assert!(config.console.extra_warn_patterns.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ECOWATCH_USER_ID", "u9"),
            ("ECOWATCH_LOCATION", "51.5, -0.12"),
            ("ECOWATCH_NEARBY_RADIUS_KM", "5"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.user.user_id.as_deref(), Some("u9"));
        assert_eq!(
            config.environmental.default_location,
            Some(Location::new(51.5, -0.12))
        );
        assert_eq!(config.environmental.nearby_radius_km, 5.0);
    }

    #[test]
    fn test_malformed_location_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides(|key| (key == "ECOWATCH_LOCATION").then(|| "north".to_string()));
        assert!(config.environmental.default_location.is_none());
    }

    #[test]
    fn test_malformed_radius_overrides_are_ignored() {
        let vars: HashMap<&str, &str> = [
            ("ECOWATCH_DEFAULT_RADIUS_KM", "ten"),
            ("ECOWATCH_NEARBY_RADIUS_KM", "5km"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_or_default_falls_back_on_bad_file() {
        let path = temp_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[environmental]\nnearby_radius_km = -1.0\n").unwrap();

        assert!(AppConfig::load(Some(path.clone())).is_err());
        let config = AppConfig::load_or_default(Some(path.clone()));

        assert_eq!(config.environmental.nearby_radius_km, 25.0);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_config_validation() {
        let mut config = AppConfig::default();

        config.environmental.nearby_radius_km = 0.0;
        assert!(config.validate().is_err());

        config.environmental.nearby_radius_km = 10.0;
        config.environmental.default_location = Some(Location::new(0.0, 200.0));
        assert!(config.validate().is_err());

        config.environmental.default_location = None;
        config.user.user_id = Some(" ".into());
        assert!(config.validate().is_err());

        config.user.user_id = None;
        config.console.extra_suppressed_patterns = vec![String::new()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("roundtrip");
        let mut config = AppConfig::default();
        config.user.user_id = Some("u1".into());
        config.console.extra_suppressed_patterns = vec!["ETIMEDOUT".into()];

        config.save(Some(path.clone())).unwrap();
        let loaded: AppConfig = toml::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        assert_eq!(loaded, config);
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_console_patterns_include_extras() {
        let mut config = AppConfig::default();
        config.console.extra_suppressed_patterns = vec!["ETIMEDOUT".into()];

        let patterns = config.console_patterns();
        assert!(patterns.suppressed.iter().any(|p| p == "ETIMEDOUT"));
        assert!(patterns.suppressed.iter().any(|p| p == "ECONNREFUSED"));
    }
}
