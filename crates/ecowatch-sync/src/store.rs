//! # Store
//!
//! Composes the resource slices into one state tree keyed by resource name.
//!
//! ## Composition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                               Store                                     │
//! │                                                                         │
//! │   dispatch(StoreAction) ──┬── Environmental(..) ──► EnvironmentalSlice │
//! │                           └── User(..)          ──► UserSlice          │
//! │                                                                         │
//! │   snapshot() ──► StoreSnapshot { environmental, user }                 │
//! │                                                                         │
//! │   The store never writes slice state itself. Each slice is mutated    │
//! │   only by its own transitions, so slices cannot interfere.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```ignore
//! let store = StoreBuilder::new()
//!     .with_environmental_service(env_service)
//!     .with_user_service(user_service)
//!     .with_emitter(Arc::new(TracingEmitter))
//!     .build()?;
//!
//! store.environmental().fetch_current_data(Some(here), None).await;
//! println!("{}", store.snapshot_json()?);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use ts_rs::TS;

use crate::environmental::{
    EnvironmentalAction, EnvironmentalDataSlice, EnvironmentalOptions, EnvironmentalState,
    ENVIRONMENTAL_SLICE,
};
use crate::error::{StoreError, StoreResult};
use crate::events::{NoOpEmitter, StoreEventEmitter};
use crate::service::{EnvironmentalDataService, UserService};
use crate::user::{UserAction, UserSlice, UserState, USER_SLICE};

// =============================================================================
// Actions and Snapshot
// =============================================================================

/// Names of the registered slices, in tree order.
pub const SLICE_NAMES: [&str; 2] = [ENVIRONMENTAL_SLICE, USER_SLICE];

/// A synchronous action addressed to one slice.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreAction {
    Environmental(EnvironmentalAction),
    User(UserAction),
}

/// The composed state tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct StoreSnapshot {
    pub environmental: EnvironmentalState,
    pub user: UserState,
}

// =============================================================================
// Store
// =============================================================================

/// Process-wide container of all slices. Clones share the same slices.
pub struct Store<E, U> {
    environmental: EnvironmentalDataSlice<E>,
    user: UserSlice<U>,
}

impl<E, U> Clone for Store<E, U> {
    fn clone(&self) -> Self {
        Store {
            environmental: self.environmental.clone(),
            user: self.user.clone(),
        }
    }
}

impl<E: EnvironmentalDataService, U: UserService> Store<E, U> {
    /// The environmental slice.
    pub fn environmental(&self) -> &EnvironmentalDataSlice<E> {
        &self.environmental
    }

    /// The user slice.
    pub fn user(&self) -> &UserSlice<U> {
        &self.user
    }

    /// Names of the registered slices.
    pub fn slice_names(&self) -> &'static [&'static str] {
        &SLICE_NAMES
    }

    /// Routes a synchronous action to its slice.
    pub fn dispatch(&self, action: StoreAction) {
        debug!(?action, "Dispatching store action");
        match action {
            StoreAction::Environmental(action) => self.environmental.apply(action),
            StoreAction::User(action) => self.user.apply(action),
        }
    }

    /// A copy of the whole tree.
    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            environmental: self.environmental.state(),
            user: self.user.state(),
        }
    }

    /// The whole tree as pretty JSON.
    pub fn snapshot_json(&self) -> StoreResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot())?)
    }

    /// One slice as pretty JSON.
    pub fn slice_snapshot_json(&self, name: &str) -> StoreResult<String> {
        let json = match name {
            ENVIRONMENTAL_SLICE => serde_json::to_string_pretty(&self.environmental.state())?,
            USER_SLICE => serde_json::to_string_pretty(&self.user.state())?,
            other => return Err(StoreError::UnknownSlice(other.to_string())),
        };
        Ok(json)
    }
}

// =============================================================================
// Builder Pattern
// =============================================================================

/// Builder for creating a Store.
pub struct StoreBuilder<E, U> {
    environmental_service: Option<Arc<E>>,
    user_service: Option<Arc<U>>,
    environmental_options: EnvironmentalOptions,
    emitter: Option<Arc<dyn StoreEventEmitter>>,
}

impl<E, U> Default for StoreBuilder<E, U> {
    fn default() -> Self {
        StoreBuilder {
            environmental_service: None,
            user_service: None,
            environmental_options: EnvironmentalOptions::default(),
            emitter: None,
        }
    }
}

impl<E: EnvironmentalDataService, U: UserService> StoreBuilder<E, U> {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the environmental data service.
    pub fn with_environmental_service(mut self, service: Arc<E>) -> Self {
        self.environmental_service = Some(service);
        self
    }

    /// Sets the user service.
    pub fn with_user_service(mut self, service: Arc<U>) -> Self {
        self.user_service = Some(service);
        self
    }

    /// Sets the radius defaults for environmental fetches.
    pub fn with_environmental_options(mut self, options: EnvironmentalOptions) -> Self {
        self.environmental_options = options;
        self
    }

    /// Sets the event emitter.
    pub fn with_emitter(mut self, emitter: Arc<dyn StoreEventEmitter>) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Builds the Store.
    pub fn build(self) -> StoreResult<Store<E, U>> {
        let environmental_service = self
            .environmental_service
            .ok_or(StoreError::MissingService(ENVIRONMENTAL_SLICE))?;
        let user_service = self
            .user_service
            .ok_or(StoreError::MissingService(USER_SLICE))?;
        let emitter = self.emitter.unwrap_or_else(|| Arc::new(NoOpEmitter));

        Ok(Store {
            environmental: EnvironmentalDataSlice::new(
                environmental_service,
                self.environmental_options,
                emitter.clone(),
            ),
            user: UserSlice::new(user_service, emitter),
        })
    }
}
