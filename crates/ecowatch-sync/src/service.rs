//! # Resource Services
//!
//! Contracts for the remote services behind each slice. The HTTP clients that
//! implement them live outside this crate; tests use scripted fakes and the
//! app ships a fixture-backed implementation.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Service Contract                                 │
//! │                                                                         │
//! │  Every call resolves to the payload OR fails with                      │
//! │  RemoteError::RemoteOperationFailed(message).                          │
//! │                                                                         │
//! │  • Network, server and parse failures are already reduced to text      │
//! │  • Timeouts and retries, if any, are the service's business            │
//! │  • Futures must be Send: slices may be driven from spawned tasks       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::future::Future;
use std::sync::Arc;

use ecowatch_core::{
    EnvironmentalReading, Location, PreferencesUpdate, ProfileUpdate, RemoteResult,
    SavedLocation, UserId, UserPreferences, UserProfile,
};

/// Remote source of environmental readings.
pub trait EnvironmentalDataService: Send + Sync + 'static {
    /// Current readings around `location`. `radius_km = None` lets the
    /// service pick its default.
    fn get_current_data(
        &self,
        location: Location,
        radius_km: Option<f64>,
    ) -> impl Future<Output = RemoteResult<Vec<EnvironmentalReading>>> + Send;

    /// Readings from stations near `location`.
    fn get_nearby_data(
        &self,
        location: Location,
        radius_km: f64,
    ) -> impl Future<Output = RemoteResult<Vec<EnvironmentalReading>>> + Send;
}

/// Remote source of the user's profile.
pub trait UserService: Send + Sync + 'static {
    /// Profile of `user_id`.
    fn get_profile(&self, user_id: UserId) -> impl Future<Output = RemoteResult<UserProfile>> + Send;

    /// Locations the user bookmarked.
    fn get_saved_locations(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = RemoteResult<Vec<SavedLocation>>> + Send;

    /// Applies a partial update, returning the full updated profile.
    fn update_profile(
        &self,
        update: ProfileUpdate,
    ) -> impl Future<Output = RemoteResult<UserProfile>> + Send;

    /// Applies a partial update, returning the full updated preferences.
    fn update_preferences(
        &self,
        update: PreferencesUpdate,
    ) -> impl Future<Output = RemoteResult<UserPreferences>> + Send;
}

// Shared services: one client can back several stores.

impl<T: EnvironmentalDataService> EnvironmentalDataService for Arc<T> {
    fn get_current_data(
        &self,
        location: Location,
        radius_km: Option<f64>,
    ) -> impl Future<Output = RemoteResult<Vec<EnvironmentalReading>>> + Send {
        (**self).get_current_data(location, radius_km)
    }

    fn get_nearby_data(
        &self,
        location: Location,
        radius_km: f64,
    ) -> impl Future<Output = RemoteResult<Vec<EnvironmentalReading>>> + Send {
        (**self).get_nearby_data(location, radius_km)
    }
}

impl<T: UserService> UserService for Arc<T> {
    fn get_profile(&self, user_id: UserId) -> impl Future<Output = RemoteResult<UserProfile>> + Send {
        (**self).get_profile(user_id)
    }

    fn get_saved_locations(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = RemoteResult<Vec<SavedLocation>>> + Send {
        (**self).get_saved_locations(user_id)
    }

    fn update_profile(
        &self,
        update: ProfileUpdate,
    ) -> impl Future<Output = RemoteResult<UserProfile>> + Send {
        (**self).update_profile(update)
    }

    fn update_preferences(
        &self,
        update: PreferencesUpdate,
    ) -> impl Future<Output = RemoteResult<UserPreferences>> + Send {
        (**self).update_preferences(update)
    }
}
