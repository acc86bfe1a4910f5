//! # Domain Types
//!
//! Payload types fetched by the resource slices.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  Environmental family                 User family                       │
//! │  ┌──────────────────────┐            ┌──────────────────────┐          │
//! │  │ EnvironmentalReading │            │    UserProfile       │          │
//! │  │  ──────────────────  │            │  ──────────────────  │          │
//! │  │  id                  │            │  id (UserId)         │          │
//! │  │  location ─────────┐ │            │  display_name        │          │
//! │  │  indicator         │ │            │  preferences ──────┐ │          │
//! │  │  overall_score 0..1│ │            │  home_location     │ │          │
//! │  │  confidence    0..1│ │            └────────────────────┼─┘          │
//! │  └────────────────────┼─┘                                 ▼            │
//! │                       ▼                         ┌──────────────────┐   │
//! │               ┌──────────────┐                  │ UserPreferences  │   │
//! │               │   Location   │                  │  notifications   │   │
//! │               │  lat / lng   │                  │  units           │   │
//! │               └──────────────┘                  │  alert_radius_km │   │
//! │                                                 └──────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Wire names are camelCase: these are the same JSON shapes the mobile UI and
//! the services use.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Location
// =============================================================================

/// Mean Earth radius in kilometres (haversine).
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the map.
///
/// Accepts the short `lat`/`lng` keys on input as well as the long form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    /// Latitude in degrees, [-90, 90].
    #[serde(alias = "lat")]
    pub latitude: f64,

    /// Longitude in degrees, [-180, 180].
    #[serde(alias = "lng", alias = "lon")]
    pub longitude: f64,
}

impl Location {
    /// Creates a location. Use [`crate::validation::validate_location`] to
    /// range-check it.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Location {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometres.
    pub fn distance_km(&self, other: &Location) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lng = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

// =============================================================================
// Environmental Readings
// =============================================================================

/// What a reading measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    /// Turbidity and colour of surface water.
    WaterQuality,
    /// Visibility and smog.
    AirQuality,
    /// Waste and visible pollution.
    VisualContamination,
}

impl IndicatorKind {
    /// Weight of this indicator in the combined environmental score.
    pub const fn weight(&self) -> f64 {
        match self {
            IndicatorKind::WaterQuality | IndicatorKind::AirQuality => 0.35,
            IndicatorKind::VisualContamination => 0.30,
        }
    }
}

impl std::fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndicatorKind::WaterQuality => write!(f, "water_quality"),
            IndicatorKind::AirQuality => write!(f, "air_quality"),
            IndicatorKind::VisualContamination => write!(f, "visual_contamination"),
        }
    }
}

/// Descriptive band for a 0..1 quality score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QualityLevel {
    Poor,
    Fair,
    Good,
    Excellent,
}

/// Descriptive band for a 0..1 confidence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceLevel {
    VeryLow,
    Low,
    Medium,
    High,
}

/// Upper band thresholds shared by quality and confidence levels.
const HIGH_THRESHOLD: f64 = 0.8;
const MEDIUM_THRESHOLD: f64 = 0.6;
const LOW_THRESHOLD: f64 = 0.4;

impl QualityLevel {
    /// Maps a score in 0..1 onto a band.
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_THRESHOLD {
            QualityLevel::Excellent
        } else if score >= MEDIUM_THRESHOLD {
            QualityLevel::Good
        } else if score >= LOW_THRESHOLD {
            QualityLevel::Fair
        } else {
            QualityLevel::Poor
        }
    }
}

impl ConfidenceLevel {
    /// Maps a confidence in 0..1 onto a band.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= HIGH_THRESHOLD {
            ConfidenceLevel::High
        } else if confidence >= MEDIUM_THRESHOLD {
            ConfidenceLevel::Medium
        } else if confidence >= LOW_THRESHOLD {
            ConfidenceLevel::Low
        } else {
            ConfidenceLevel::VeryLow
        }
    }
}

/// One environmental measurement at a location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalReading {
    /// Server-assigned identifier.
    pub id: String,

    /// Where the reading was taken.
    pub location: Location,

    /// What was measured.
    pub indicator: IndicatorKind,

    /// Quality score, 0 (poor) to 1 (excellent).
    pub overall_score: f64,

    /// Model confidence in the score, 0 to 1.
    pub confidence: f64,

    /// Optional human-readable note ("slightly turbid").
    #[serde(default)]
    pub summary: Option<String>,

    /// When the measurement was taken.
    #[ts(as = "String")]
    pub recorded_at: DateTime<Utc>,
}

impl EnvironmentalReading {
    /// Quality band of this reading.
    pub fn quality_level(&self) -> QualityLevel {
        QualityLevel::from_score(self.overall_score)
    }

    /// Confidence band of this reading.
    pub fn confidence_level(&self) -> ConfidenceLevel {
        ConfidenceLevel::from_confidence(self.confidence)
    }

    /// Score pulled toward 0.5 in proportion to the model's uncertainty.
    pub fn confidence_weighted_score(&self) -> f64 {
        let confidence = self.confidence.clamp(0.0, 1.0);
        self.overall_score * confidence + 0.5 * (1.0 - confidence)
    }
}

/// Combined environmental score for a set of readings.
///
/// Each reading contributes its confidence-weighted score, weighted by its
/// indicator's share. Returns `None` for an empty set. The result is clamped
/// to 0..1.
pub fn environmental_score(readings: &[EnvironmentalReading]) -> Option<f64> {
    let total_weight: f64 = readings.iter().map(|r| r.indicator.weight()).sum();
    if readings.is_empty() || total_weight <= 0.0 {
        return None;
    }

    let weighted: f64 = readings
        .iter()
        .map(|r| r.confidence_weighted_score() * r.indicator.weight())
        .sum();

    Some((weighted / total_weight).clamp(0.0, 1.0))
}

// =============================================================================
// User Family
// =============================================================================

/// Identifier of an app user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Wraps a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        UserId(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        UserId(id.to_string())
    }
}

/// Measurement units shown in the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

/// Per-user settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Push alerts for readings near the user.
    #[serde(default)]
    pub notifications: bool,

    /// Display units.
    #[serde(default)]
    pub units: UnitSystem,

    /// Radius for proximity alerts.
    #[serde(default = "default_alert_radius")]
    pub alert_radius_km: f64,
}

fn default_alert_radius() -> f64 {
    crate::DEFAULT_RADIUS_KM
}

impl Default for UserPreferences {
    fn default() -> Self {
        UserPreferences {
            notifications: false,
            units: UnitSystem::default(),
            alert_radius_km: default_alert_radius(),
        }
    }
}

/// The signed-in user's profile.
///
/// Services may omit everything but `id`; missing fields take defaults so a
/// minimal `{ "id": "u1", "preferences": { "notifications": true } }` parses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub preferences: UserPreferences,

    /// Where the user lives; the map opens here.
    #[serde(default)]
    pub home_location: Option<Location>,
}

/// Partial profile update. `None` fields are left unchanged by the service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_location: Option<Location>,
}

impl ProfileUpdate {
    /// Applies the set fields onto `profile`.
    pub fn apply_to(&self, profile: &mut UserProfile) {
        if let Some(ref name) = self.display_name {
            profile.display_name = Some(name.clone());
        }
        if let Some(ref email) = self.email {
            profile.email = Some(email.clone());
        }
        if let Some(location) = self.home_location {
            profile.home_location = Some(location);
        }
    }
}

/// Partial preferences update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<UnitSystem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert_radius_km: Option<f64>,
}

impl PreferencesUpdate {
    /// Applies the set fields onto `preferences`.
    pub fn apply_to(&self, preferences: &mut UserPreferences) {
        if let Some(notifications) = self.notifications {
            preferences.notifications = notifications;
        }
        if let Some(units) = self.units {
            preferences.units = units;
        }
        if let Some(radius) = self.alert_radius_km {
            preferences.alert_radius_km = radius;
        }
    }
}

/// A location the user bookmarked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SavedLocation {
    pub name: String,
    pub location: Location,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(indicator: IndicatorKind, score: f64, confidence: f64) -> EnvironmentalReading {
        EnvironmentalReading {
            id: format!("{}-{}", indicator, score),
            location: Location::new(40.0, -75.0),
            indicator,
            overall_score: score,
            confidence,
            summary: None,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn test_location_accepts_short_keys() {
        let loc: Location = serde_json::from_str(r#"{"lat":40.0,"lng":-75.0}"#).unwrap();
        assert_eq!(loc, Location::new(40.0, -75.0));
    }

    #[test]
    fn test_distance_km() {
        let philly = Location::new(39.9526, -75.1652);
        let nyc = Location::new(40.7128, -74.0060);
        let d = philly.distance_km(&nyc);
        assert!((d - 129.6).abs() < 1.5, "distance was {}", d);
        assert!(philly.distance_km(&philly) < 1e-9);
    }

    #[test]
    fn test_quality_and_confidence_levels() {
        assert_eq!(QualityLevel::from_score(0.85), QualityLevel::Excellent);
        assert_eq!(QualityLevel::from_score(0.65), QualityLevel::Good);
        assert_eq!(QualityLevel::from_score(0.4), QualityLevel::Fair);
        assert_eq!(QualityLevel::from_score(0.1), QualityLevel::Poor);

        assert_eq!(ConfidenceLevel::from_confidence(0.8), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_confidence(0.7), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_confidence(0.5), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_confidence(0.2), ConfidenceLevel::VeryLow);

        let turbid = reading(IndicatorKind::WaterQuality, 0.45, 0.9);
        assert_eq!(turbid.quality_level(), QualityLevel::Fair);
        assert_eq!(turbid.confidence_level(), ConfidenceLevel::High);
    }

    #[test]
    fn test_environmental_score() {
        assert_eq!(environmental_score(&[]), None);

        // Full confidence: the score passes through unchanged
        let single = [reading(IndicatorKind::AirQuality, 0.7, 1.0)];
        assert!((environmental_score(&single).unwrap() - 0.7).abs() < 1e-9);

        // Zero confidence collapses to the neutral 0.5
        let unsure = [reading(IndicatorKind::WaterQuality, 0.1, 0.0)];
        assert!((environmental_score(&unsure).unwrap() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_minimal_profile_parses() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"id":"u1","preferences":{"notifications":true}}"#).unwrap();
        assert_eq!(profile.id.as_str(), "u1");
        assert!(profile.preferences.notifications);
        assert_eq!(profile.preferences.units, UnitSystem::Metric);
        assert!(profile.display_name.is_none());
    }

    #[test]
    fn test_preferences_update_applies_only_set_fields() {
        let mut prefs = UserPreferences::default();
        let update = PreferencesUpdate {
            notifications: Some(true),
            ..Default::default()
        };
        update.apply_to(&mut prefs);
        assert!(prefs.notifications);
        assert_eq!(prefs.alert_radius_km, crate::DEFAULT_RADIUS_KM);
    }
}
