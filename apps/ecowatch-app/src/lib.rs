//! # EcoWatch App Library
//!
//! Startup wiring for the EcoWatch client state layer: configuration,
//! logging, the console filter, and a store over fixture-backed services.
//!
//! ## Module Organization
//! ```text
//! ecowatch_app/
//! ├── lib.rs          ◄─── You are here (startup & run)
//! ├── config.rs       ◄─── AppConfig: defaults → ecowatch.toml → ECOWATCH_*
//! ├── console.rs      ◄─── ConsoleFilter, ConsoleSink, rejection chain
//! ├── services/
//! │   ├── mod.rs      ◄─── Service exports
//! │   └── fixture.rs  ◄─── JSON fixture services
//! └── error.rs        ◄─── AppError
//! ```

pub mod config;
pub mod console;
pub mod error;
pub mod services;

use std::path::PathBuf;
use std::sync::Arc;

use ecowatch_core::UserId;
use ecowatch_sync::{
    EnvironmentalAction, Settlement, Store, StoreAction, StoreBuilder, TracingEmitter, UserAction,
};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use config::AppConfig;
use console::{ConsoleFilter, TracingSink};
use error::AppResult;
use services::{FixtureData, FixtureEnvironmentalService, FixtureUserService};

/// User signed in when the config names none.
pub const DEMO_USER_ID: &str = "u1";

/// Store type used by the app.
pub type AppStore = Store<FixtureEnvironmentalService, FixtureUserService>;

/// Runs one synchronization pass and prints the resulting state.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Load Config ──────────────────────────────────────────────────────► │
/// │     • defaults → ecowatch.toml → ECOWATCH_* env vars                    │
/// │                                                                         │
/// │  2. Console Filter ───────────────────────────────────────────────────► │
/// │     • compiled-in patterns + [console] extras                           │
/// │                                                                         │
/// │  3. Build Store ──────────────────────────────────────────────────────► │
/// │     • fixture services, tracing emitter                                 │
/// │     • active user and selected location from config                     │
/// │                                                                         │
/// │  4. Fetch ────────────────────────────────────────────────────────────► │
/// │     • profile first (its home location is the fallback selection)       │
/// │     • saved locations, current and nearby readings concurrently         │
/// │     • background refresh on a spawned task                              │
/// │                                                                         │
/// │  5. Print the composed snapshot                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run(config_path: Option<PathBuf>) -> AppResult<()> {
    info!("Starting EcoWatch");

    let config = AppConfig::load(config_path)?;
    let console = ConsoleFilter::new(Arc::new(TracingSink), config.console_patterns())
        .with_previous_rejection_handler(Box::new(|message: &str| {
            error!(rejection = message, "Background task failed");
        }));

    let store = build_store(&config)?;
    info!(slices = ?store.slice_names(), "Store initialized");

    // Profile first: it may supply the location
    report(&console, store.user().fetch_profile(None).await);

    let location = config.environmental.default_location.or_else(|| {
        store
            .user()
            .state()
            .primary
            .and_then(|profile| profile.home_location)
    });
    store.dispatch(StoreAction::Environmental(
        EnvironmentalAction::SetSelectedLocation(location),
    ));

    let (saved, current, nearby) = tokio::join!(
        store.user().fetch_saved_locations(None),
        store.environmental().fetch_current_data(None, None),
        store.environmental().fetch_nearby_data(None, None),
    );
    for settlement in [saved, current, nearby] {
        report(&console, settlement);
    }

    let background = {
        let store = store.clone();
        tokio::spawn(async move { store.environmental().refresh_data(None, None).await })
    };
    match background.await {
        Ok(Settlement::Failed(message)) => {
            console.warn(["Background refresh failed:", message.as_str()]);
        }
        Ok(Settlement::Succeeded) => {}
        Err(join_error) => {
            console.handle_rejection(&join_error.to_string());
        }
    }

    for reading in store.environmental().state().primary {
        debug!(
            id = %reading.id,
            indicator = %reading.indicator,
            quality = ?reading.quality_level(),
            confidence = ?reading.confidence_level(),
            "Current reading"
        );
    }
    if let Some(score) = store.environmental().current_score() {
        console.log(["Environmental score:", format!("{:.2}", score).as_str()]);
    }
    console.unfiltered().log([store.snapshot_json()?]);

    Ok(())
}

/// Builds the store over fixture services and applies the startup selections.
pub fn build_store(config: &AppConfig) -> AppResult<AppStore> {
    let fixtures = Arc::new(match config.fixtures.path {
        Some(ref path) => FixtureData::load(path)?,
        None => FixtureData::demo()?,
    });

    let user_id = config.user_id().unwrap_or_else(|| {
        info!(user_id = DEMO_USER_ID, "No user configured, using demo user");
        UserId::new(DEMO_USER_ID)
    });

    let store = StoreBuilder::new()
        .with_environmental_service(Arc::new(FixtureEnvironmentalService::new(fixtures.clone())))
        .with_user_service(Arc::new(FixtureUserService::new(fixtures, user_id.clone())))
        .with_environmental_options(config.environmental_options())
        .with_emitter(Arc::new(TracingEmitter))
        .build()?;

    store.dispatch(StoreAction::User(UserAction::SetActiveUser(Some(user_id))));
    if let Some(location) = config.environmental.default_location {
        store.dispatch(StoreAction::Environmental(
            EnvironmentalAction::SetSelectedLocation(Some(location)),
        ));
    }

    Ok(store)
}

fn report(console: &ConsoleFilter, settlement: Settlement) {
    if let Settlement::Failed(message) = settlement {
        console.error(["Fetch failed:", message.as_str()]);
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=ecowatch_sync=trace` - Show trace for the sync crate only
/// - Default: INFO, DEBUG for ecowatch crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ecowatch=debug"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use ecowatch_core::{Location, SyncStatus};

    #[tokio::test]
    async fn test_build_store_applies_config() {
        let mut config = AppConfig::default();
        config.user.user_id = Some("u2".into());
        config.environmental.default_location = Some(Location::new(40.0, -75.0));

        let store = build_store(&config).unwrap();
        let snapshot = store.snapshot();

        assert_eq!(snapshot.user.selection, Some(UserId::new("u2")));
        assert_eq!(
            snapshot.environmental.selection,
            Some(Location::new(40.0, -75.0))
        );
        assert_eq!(snapshot.environmental.status, SyncStatus::Idle);
    }

    #[tokio::test]
    async fn test_fixture_store_end_to_end() {
        let store = build_store(&AppConfig::default()).unwrap();

        assert!(store.user().fetch_profile(None).await.is_succeeded());
        let home = store
            .user()
            .state()
            .primary
            .and_then(|p| p.home_location)
            .unwrap();

        store.environmental().set_selected_location(Some(home));
        assert!(store
            .environmental()
            .fetch_current_data(None, Some(5.0))
            .await
            .is_succeeded());

        let state = store.environmental().state();
        assert_eq!(state.status, SyncStatus::Ready);
        assert_eq!(state.primary.len(), 3);
        assert!(store.environmental().current_score().is_some());
    }

    #[tokio::test]
    async fn test_run_with_missing_config_file() {
        let path = std::env::temp_dir().join("ecowatch-missing-config.toml");
        assert!(run(Some(path)).await.is_ok());
    }
}
