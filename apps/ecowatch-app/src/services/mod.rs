//! Service implementations used by the app.
//!
//! Only offline, fixture-backed services live here. Network clients implement
//! the same `ecowatch_sync` traits.

pub mod fixture;

pub use fixture::{FixtureData, FixtureEnvironmentalService, FixtureUserService};
