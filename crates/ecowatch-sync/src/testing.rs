//! Scripted fake services for slice and store tests.
//!
//! Each service method pops the next scripted reply. A reply is either
//! immediate or gated on a oneshot the test fires later, which lets a test
//! pick the settlement order of overlapping requests. Every call is also
//! reported on an mpsc channel so the test can wait until a request is in
//! flight.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use chrono::{TimeZone, Utc};
use ecowatch_core::{
    EnvironmentalReading, IndicatorKind, Location, PreferencesUpdate, ProfileUpdate, RemoteError,
    RemoteResult, SavedLocation, UserId, UserPreferences, UserProfile,
};
use tokio::sync::{mpsc, oneshot};

use crate::service::{EnvironmentalDataService, UserService};

// =============================================================================
// Script
// =============================================================================

enum Reply<T> {
    Now(RemoteResult<T>),
    Gate(oneshot::Receiver<RemoteResult<T>>),
}

/// Queue of replies for one service method.
pub(crate) struct Script<T> {
    replies: Mutex<VecDeque<Reply<T>>>,
}

impl<T> Default for Script<T> {
    fn default() -> Self {
        Script {
            replies: Mutex::new(VecDeque::new()),
        }
    }
}

impl<T: Send> Script<T> {
    pub(crate) fn ok(&self, value: T) {
        self.replies.lock().unwrap().push_back(Reply::Now(Ok(value)));
    }

    pub(crate) fn err(&self, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .push_back(Reply::Now(Err(RemoteError::new(message))));
    }

    /// Queues a reply that settles when the returned sender fires.
    pub(crate) fn gate(&self) -> oneshot::Sender<RemoteResult<T>> {
        let (tx, rx) = oneshot::channel();
        self.replies.lock().unwrap().push_back(Reply::Gate(rx));
        tx
    }

    async fn next(&self) -> RemoteResult<T> {
        let reply = self.replies.lock().unwrap().pop_front();
        match reply {
            Some(Reply::Now(result)) => result,
            Some(Reply::Gate(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(RemoteError::new("gate dropped"))),
            None => Err(RemoteError::new("no scripted reply")),
        }
    }
}

// =============================================================================
// Environmental
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum EnvironmentalCall {
    Current { location: Location, radius_km: Option<f64> },
    Nearby { location: Location, radius_km: f64 },
}

pub(crate) struct FakeEnvironmentalService {
    pub(crate) current: Script<Vec<EnvironmentalReading>>,
    pub(crate) nearby: Script<Vec<EnvironmentalReading>>,
    calls: mpsc::UnboundedSender<EnvironmentalCall>,
}

impl FakeEnvironmentalService {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<EnvironmentalCall>) {
        let (calls, rx) = mpsc::unbounded_channel();
        let service = FakeEnvironmentalService {
            current: Script::default(),
            nearby: Script::default(),
            calls,
        };
        (service, rx)
    }
}

impl EnvironmentalDataService for FakeEnvironmentalService {
    fn get_current_data(
        &self,
        location: Location,
        radius_km: Option<f64>,
    ) -> impl Future<Output = RemoteResult<Vec<EnvironmentalReading>>> + Send {
        let _ = self.calls.send(EnvironmentalCall::Current { location, radius_km });
        self.current.next()
    }

    fn get_nearby_data(
        &self,
        location: Location,
        radius_km: f64,
    ) -> impl Future<Output = RemoteResult<Vec<EnvironmentalReading>>> + Send {
        let _ = self.calls.send(EnvironmentalCall::Nearby { location, radius_km });
        self.nearby.next()
    }
}

// =============================================================================
// User
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum UserCall {
    Profile(UserId),
    SavedLocations(UserId),
    UpdateProfile(ProfileUpdate),
    UpdatePreferences(PreferencesUpdate),
}

pub(crate) struct FakeUserService {
    pub(crate) profile: Script<UserProfile>,
    pub(crate) saved: Script<Vec<SavedLocation>>,
    pub(crate) update_profile: Script<UserProfile>,
    pub(crate) update_preferences: Script<UserPreferences>,
    calls: mpsc::UnboundedSender<UserCall>,
}

impl FakeUserService {
    pub(crate) fn new() -> (Self, mpsc::UnboundedReceiver<UserCall>) {
        let (calls, rx) = mpsc::unbounded_channel();
        let service = FakeUserService {
            profile: Script::default(),
            saved: Script::default(),
            update_profile: Script::default(),
            update_preferences: Script::default(),
            calls,
        };
        (service, rx)
    }
}

impl UserService for FakeUserService {
    fn get_profile(&self, user_id: UserId) -> impl Future<Output = RemoteResult<UserProfile>> + Send {
        let _ = self.calls.send(UserCall::Profile(user_id));
        self.profile.next()
    }

    fn get_saved_locations(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = RemoteResult<Vec<SavedLocation>>> + Send {
        let _ = self.calls.send(UserCall::SavedLocations(user_id));
        self.saved.next()
    }

    fn update_profile(
        &self,
        update: ProfileUpdate,
    ) -> impl Future<Output = RemoteResult<UserProfile>> + Send {
        let _ = self.calls.send(UserCall::UpdateProfile(update));
        self.update_profile.next()
    }

    fn update_preferences(
        &self,
        update: PreferencesUpdate,
    ) -> impl Future<Output = RemoteResult<UserPreferences>> + Send {
        let _ = self.calls.send(UserCall::UpdatePreferences(update));
        self.update_preferences.next()
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub(crate) fn reading(id: &str, indicator: IndicatorKind, score: f64) -> EnvironmentalReading {
    EnvironmentalReading {
        id: id.to_string(),
        location: Location::new(40.0, -75.0),
        indicator,
        overall_score: score,
        confidence: 0.9,
        summary: None,
        recorded_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
    }
}

pub(crate) fn profile(id: &str, notifications: bool) -> UserProfile {
    UserProfile {
        id: UserId::new(id),
        display_name: None,
        email: None,
        preferences: UserPreferences {
            notifications,
            ..UserPreferences::default()
        },
        home_location: None,
    }
}
