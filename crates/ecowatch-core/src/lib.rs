//! # ecowatch-core: Pure Domain Logic for EcoWatch
//!
//! This crate holds the state model of the EcoWatch client: the payload types
//! fetched from the environmental and user services, the generic
//! [`ResourceState`] every resource slice owns, and the pure reducer that folds
//! fetch outcomes into that state.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        EcoWatch Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Mobile UI (TypeScript)                       │   │
//! │  │    Map View ──► Readings List ──► Profile ──► Settings          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ snapshots (JSON, ts-rs types)          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 ecowatch-sync (Store + Slices)                  │   │
//! │  │    fetch_current_data, fetch_profile, refresh_data, etc.        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ResourceAction                         │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ ecowatch-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │ resource  │  │   error   │  │ validation│  │   │
//! │  │   │ Location  │  │ State     │  │ Remote    │  │  ranges   │  │   │
//! │  │   │ Reading   │  │ Action    │  │ Validation│  │  checks   │  │   │
//! │  │   │ Profile   │  │ reducer   │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO CLOCK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain payloads (Location, EnvironmentalReading, UserProfile, etc.)
//! - [`resource`] - `ResourceState`, `SyncStatus`, `ResourceAction` and the reducer
//! - [`error`] - `RemoteError`, `ValidationError`, `CoreError`
//! - [`validation`] - Range checks for fetch parameters
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use ecowatch_core::resource::{ResourceAction, ResourceState, SyncStatus};
//!
//! let mut state: ResourceState<Vec<u32>, u32, ()> = ResourceState::default();
//!
//! state.apply(ResourceAction::Started, Utc::now());
//! assert_eq!(state.status, SyncStatus::Loading);
//!
//! state.apply(ResourceAction::PrimarySucceeded(vec![1, 2, 3]), Utc::now());
//! assert_eq!(state.status, SyncStatus::Ready);
//! assert_eq!(state.primary, vec![1, 2, 3]);
//! assert!(state.last_synced_at.is_some());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod resource;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, RemoteError, RemoteResult, ValidationError};
pub use resource::{ResourceAction, ResourceState, SyncStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default search radius (km) for current readings when the caller gives none.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Default radius (km) for the "nearby" query.
pub const DEFAULT_NEARBY_RADIUS_KM: f64 = 25.0;

/// Largest radius (km) a fetch may ask for.
pub const MAX_RADIUS_KM: f64 = 500.0;
