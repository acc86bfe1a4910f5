//! # ecowatch-sync: Resource Synchronization for EcoWatch
//!
//! This crate turns remote resources (environmental readings, the user's
//! profile) into local, observable state with a uniform loading/error
//! lifecycle.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Store Architecture                              │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                         Store                                    │  │
//! │  │                                                                  │  │
//! │  │  Built once at startup (StoreBuilder)                           │  │
//! │  │  Routes StoreAction, renders StoreSnapshot                      │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │              ┌────────────────┴────────────────┐                       │
//! │              ▼                                 ▼                        │
//! │  ┌────────────────────────┐        ┌────────────────────────┐          │
//! │  │ EnvironmentalDataSlice │        │ UserSlice              │          │
//! │  │                        │        │                        │          │
//! │  │ readings, nearby,      │        │ profile, saved         │          │
//! │  │ selected location      │        │ locations, active user │          │
//! │  └───────────┬────────────┘        └───────────┬────────────┘          │
//! │              │                                 │                        │
//! │              └──────────► ResourceSlice ◄──────┘                        │
//! │                           watch::Sender<ResourceState>                  │
//! │                           Started → Succeeded | Failed                  │
//! │                                  │                                      │
//! │                                  ▼                                      │
//! │                 EnvironmentalDataService / UserService                  │
//! │                 (network clients, implemented elsewhere)                │
//! │                                                                         │
//! │  OBSERVERS:                                                            │
//! │  • watch receivers  - every transition, per slice                      │
//! │  • StoreEventEmitter - status changes and stored errors                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Model
//! A service failure never escapes as an `Err`. It is stored as the slice's
//! `error`, the previous data stays readable, and the operation returns
//! [`Settlement::Failed`] so callers can still sequence work.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod environmental;
pub mod error;
pub mod events;
pub mod service;
pub mod slice;
pub mod store;
pub mod user;

#[cfg(test)]
mod testing;

// =============================================================================
// Re-exports
// =============================================================================

pub use environmental::{
    EnvironmentalAction, EnvironmentalDataSlice, EnvironmentalOptions, EnvironmentalState,
    ENVIRONMENTAL_SLICE,
};
pub use error::{StoreError, StoreResult};
pub use events::{NoOpEmitter, StoreEventEmitter, TracingEmitter};
pub use service::{EnvironmentalDataService, UserService};
pub use slice::{ResourceSlice, Settlement};
pub use store::{Store, StoreAction, StoreBuilder, StoreSnapshot, SLICE_NAMES};
pub use user::{UserAction, UserSlice, UserState, USER_SLICE};
