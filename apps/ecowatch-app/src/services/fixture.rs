//! # Fixture Services
//!
//! Offline implementations of the service traits, backed by a JSON file.
//!
//! ## Fixture File
//! ```json
//! {
//!   "readings":       [ EnvironmentalReading, ... ],
//!   "profiles":       [ UserProfile, ... ],
//!   "savedLocations": { "u1": [ SavedLocation, ... ] },
//!   "failures":       { "get_nearby_data": "Request failed with status code 500" }
//! }
//! ```
//!
//! `failures` maps a service method name to the message that call fails
//! with, so the failure path can be exercised without a network.

use std::collections::HashMap;
use std::future::{ready, Future};
use std::path::Path;
use std::sync::{Arc, RwLock};

use ecowatch_core::{
    EnvironmentalReading, Location, PreferencesUpdate, ProfileUpdate, RemoteError, RemoteResult,
    SavedLocation, UserId, UserPreferences, UserProfile, DEFAULT_RADIUS_KM,
};
use ecowatch_sync::{EnvironmentalDataService, UserService};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::AppResult;

/// Bundled demo data.
const DEMO_FIXTURE: &str = include_str!("../../fixtures/demo.json");

// =============================================================================
// Fixture Data
// =============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureData {
    #[serde(default)]
    pub readings: Vec<EnvironmentalReading>,

    #[serde(default)]
    pub profiles: Vec<UserProfile>,

    #[serde(default)]
    pub saved_locations: HashMap<String, Vec<SavedLocation>>,

    /// Service method name → failure message.
    #[serde(default)]
    pub failures: HashMap<String, String>,
}

impl FixtureData {
    /// Reads a fixture file.
    pub fn load(path: &Path) -> AppResult<Self> {
        info!(?path, "Loading fixtures");
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// The bundled demo data.
    pub fn demo() -> AppResult<Self> {
        Ok(serde_json::from_str(DEMO_FIXTURE)?)
    }

    fn scripted_failure(&self, operation: &str) -> RemoteResult<()> {
        match self.failures.get(operation) {
            Some(message) => {
                debug!(operation, message = %message, "Scripted failure");
                Err(RemoteError::new(message.clone()))
            }
            None => Ok(()),
        }
    }

    /// Readings within `radius_km` of `location`, nearest first.
    fn readings_within(&self, location: Location, radius_km: f64) -> Vec<EnvironmentalReading> {
        let mut found: Vec<(f64, &EnvironmentalReading)> = self
            .readings
            .iter()
            .map(|r| (location.distance_km(&r.location), r))
            .filter(|(distance, _)| *distance <= radius_km)
            .collect();
        found.sort_by(|a, b| a.0.total_cmp(&b.0));
        found.into_iter().map(|(_, r)| r.clone()).collect()
    }
}

// =============================================================================
// Environmental Service
// =============================================================================

/// Serves fixture readings filtered by distance.
pub struct FixtureEnvironmentalService {
    data: Arc<FixtureData>,
}

impl FixtureEnvironmentalService {
    pub fn new(data: Arc<FixtureData>) -> Self {
        FixtureEnvironmentalService { data }
    }
}

impl EnvironmentalDataService for FixtureEnvironmentalService {
    fn get_current_data(
        &self,
        location: Location,
        radius_km: Option<f64>,
    ) -> impl Future<Output = RemoteResult<Vec<EnvironmentalReading>>> + Send {
        let result = self.data.scripted_failure("get_current_data").map(|_| {
            self.data
                .readings_within(location, radius_km.unwrap_or(DEFAULT_RADIUS_KM))
        });
        ready(result)
    }

    fn get_nearby_data(
        &self,
        location: Location,
        radius_km: f64,
    ) -> impl Future<Output = RemoteResult<Vec<EnvironmentalReading>>> + Send {
        let result = self
            .data
            .scripted_failure("get_nearby_data")
            .map(|_| self.data.readings_within(location, radius_km));
        ready(result)
    }
}

// =============================================================================
// User Service
// =============================================================================

/// Serves fixture profiles. Updates apply to the signed-in user and are kept
/// in memory for the life of the service.
pub struct FixtureUserService {
    data: Arc<FixtureData>,
    signed_in: UserId,
    profiles: RwLock<HashMap<UserId, UserProfile>>,
}

impl FixtureUserService {
    pub fn new(data: Arc<FixtureData>, signed_in: UserId) -> Self {
        let profiles = data
            .profiles
            .iter()
            .map(|p| (p.id.clone(), p.clone()))
            .collect();
        FixtureUserService {
            data,
            signed_in,
            profiles: RwLock::new(profiles),
        }
    }

    fn profile(&self, user_id: &UserId) -> RemoteResult<UserProfile> {
        self.profiles
            .read()
            .map_err(|_| RemoteError::new("Profile store unavailable"))?
            .get(user_id)
            .cloned()
            .ok_or_else(|| RemoteError::new("Request failed with status code 404"))
    }

    fn modify_signed_in<T>(&self, f: impl FnOnce(&mut UserProfile) -> T) -> RemoteResult<T> {
        let mut profiles = self
            .profiles
            .write()
            .map_err(|_| RemoteError::new("Profile store unavailable"))?;
        let profile = profiles
            .get_mut(&self.signed_in)
            .ok_or_else(|| RemoteError::new("Request failed with status code 404"))?;
        Ok(f(profile))
    }
}

impl UserService for FixtureUserService {
    fn get_profile(&self, user_id: UserId) -> impl Future<Output = RemoteResult<UserProfile>> + Send {
        let result = self
            .data
            .scripted_failure("get_profile")
            .and_then(|_| self.profile(&user_id));
        ready(result)
    }

    fn get_saved_locations(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = RemoteResult<Vec<SavedLocation>>> + Send {
        let result = self.data.scripted_failure("get_saved_locations").map(|_| {
            self.data
                .saved_locations
                .get(user_id.as_str())
                .cloned()
                .unwrap_or_default()
        });
        ready(result)
    }

    fn update_profile(
        &self,
        update: ProfileUpdate,
    ) -> impl Future<Output = RemoteResult<UserProfile>> + Send {
        let result = self
            .data
            .scripted_failure("update_profile")
            .and_then(|_| {
                self.modify_signed_in(|profile| {
                    update.apply_to(profile);
                    profile.clone()
                })
            });
        ready(result)
    }

    fn update_preferences(
        &self,
        update: PreferencesUpdate,
    ) -> impl Future<Output = RemoteResult<UserPreferences>> + Send {
        let result = self
            .data
            .scripted_failure("update_preferences")
            .and_then(|_| {
                self.modify_signed_in(|profile| {
                    update.apply_to(&mut profile.preferences);
                    profile.preferences.clone()
                })
            });
        ready(result)
    }
}
