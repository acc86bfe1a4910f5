//! # User Slice
//!
//! The active user's profile, preferences and saved locations.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  primary    Option<UserProfile>    fetch_profile / refresh_profile      │
//! │                                    update_profile / update_preferences  │
//! │  secondary  Vec<SavedLocation>     fetch_saved_locations                │
//! │  selection  UserId                 set_active_user                      │
//! │                                                                         │
//! │  update_preferences folds the returned preferences into the profile    │
//! │  that is loaded WHEN THE CALL SETTLES, not when it started.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use ecowatch_core::validation::{
    validate_preferences_update, validate_profile_update, validate_user_id,
};
use ecowatch_core::{
    CoreError, CoreResult, PreferencesUpdate, ProfileUpdate, RemoteError, ResourceAction,
    ResourceState, SavedLocation, UserId, UserPreferences, UserProfile,
};
use tokio::sync::watch;
use tracing::warn;

use crate::events::StoreEventEmitter;
use crate::service::UserService;
use crate::slice::{ResourceSlice, Settlement};

/// Key of the user slice in the store tree.
pub const USER_SLICE: &str = "user";

/// State of the user slice.
pub type UserState = ResourceState<Option<UserProfile>, SavedLocation, UserId>;

/// Synchronous actions routed through the store.
#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    SetActiveUser(Option<UserId>),
    ClearError,
    ClearProfile,
}

/// The user resource family.
pub struct UserSlice<U> {
    slice: ResourceSlice<Option<UserProfile>, SavedLocation, UserId>,
    service: Arc<U>,
}

impl<U> Clone for UserSlice<U> {
    fn clone(&self) -> Self {
        UserSlice {
            slice: self.slice.clone(),
            service: self.service.clone(),
        }
    }
}

impl<U: UserService> UserSlice<U> {
    pub fn new(service: Arc<U>, emitter: Arc<dyn StoreEventEmitter>) -> Self {
        UserSlice {
            slice: ResourceSlice::new(USER_SLICE, emitter),
            service,
        }
    }

    /// A copy of the current state.
    pub fn state(&self) -> UserState {
        self.slice.snapshot()
    }

    /// Observes every transition.
    pub fn subscribe(&self) -> watch::Receiver<UserState> {
        self.slice.subscribe()
    }

    /// Preferences of the loaded profile.
    pub fn preferences(&self) -> Option<UserPreferences> {
        self.slice
            .read(|state| state.primary.as_ref().map(|p| p.preferences.clone()))
    }

    // =========================================================================
    // Synchronous Actions
    // =========================================================================

    pub fn set_active_user(&self, user_id: Option<UserId>) {
        self.slice.set_selection(user_id);
    }

    pub fn clear_error(&self) {
        self.slice.clear_error();
    }

    /// Forgets the profile and saved locations. The active user stays.
    pub fn clear_profile(&self) {
        self.slice.clear_resource();
    }

    /// Applies a routed store action.
    pub fn apply(&self, action: UserAction) {
        match action {
            UserAction::SetActiveUser(user_id) => self.set_active_user(user_id),
            UserAction::ClearError => self.clear_error(),
            UserAction::ClearProfile => self.clear_profile(),
        }
    }

    // =========================================================================
    // Asynchronous Operations
    // =========================================================================

    /// Loads the profile of `user_id`, or of the active user.
    pub async fn fetch_profile(&self, user_id: Option<UserId>) -> Settlement {
        let user_id = self.resolve_user(user_id);
        let service = self.service.clone();

        self.slice
            .fetch_primary("fetch_profile", async move {
                let user_id = user_id?;
                service.get_profile(user_id).await.map(Some)
            })
            .await
    }

    /// Loads the saved locations into `secondary`.
    pub async fn fetch_saved_locations(&self, user_id: Option<UserId>) -> Settlement {
        let user_id = self.resolve_user(user_id);
        let service = self.service.clone();

        self.slice
            .fetch_secondary("fetch_saved_locations", async move {
                let user_id = user_id?;
                service.get_saved_locations(user_id).await
            })
            .await
    }

    /// Re-fetches the profile without showing a loading state.
    pub async fn refresh_profile(&self, user_id: Option<UserId>) -> Settlement {
        let user_id = self.resolve_user(user_id);
        let service = self.service.clone();

        self.slice
            .refresh("refresh_profile", async move {
                let user_id = user_id?;
                service.get_profile(user_id).await.map(Some)
            })
            .await
    }

    /// Sends a partial profile update; the returned profile replaces the
    /// loaded one.
    pub async fn update_profile(&self, update: ProfileUpdate) -> Settlement {
        let service = self.service.clone();

        self.slice
            .run(
                "update_profile",
                async move {
                    validate_profile_update(&update).map_err(RemoteError::from)?;
                    service.update_profile(update).await
                },
                |profile, _| ResourceAction::PrimarySucceeded(Some(profile)),
            )
            .await
    }

    /// Sends a partial preferences update; the returned preferences replace
    /// those of the loaded profile.
    pub async fn update_preferences(&self, update: PreferencesUpdate) -> Settlement {
        let service = self.service.clone();

        self.slice
            .run(
                "update_preferences",
                async move {
                    validate_preferences_update(&update).map_err(RemoteError::from)?;
                    service.update_preferences(update).await
                },
                |preferences, state| {
                    let profile = match state.primary {
                        Some(ref profile) => Some(UserProfile {
                            preferences,
                            ..profile.clone()
                        }),
                        None => {
                            warn!("Preferences updated with no profile loaded");
                            None
                        }
                    };
                    ResourceAction::PrimarySucceeded(profile)
                },
            )
            .await
    }

    fn resolve_user(&self, user_id: Option<UserId>) -> CoreResult<UserId> {
        let user_id = match user_id {
            Some(user_id) => user_id,
            None => self
                .slice
                .read(|state| state.selection.clone())
                .ok_or(CoreError::MissingSelection { what: "user" })?,
        };
        validate_user_id(&user_id)?;
        Ok(user_id)
    }
}
