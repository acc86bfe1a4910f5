//! # Environmental Data Slice
//!
//! Readings around the selected location.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  primary    Vec<EnvironmentalReading>   fetch_current_data / refresh    │
//! │  secondary  Vec<EnvironmentalReading>   fetch_nearby_data               │
//! │  selection  Location                    set_selected_location           │
//! │                                                                         │
//! │  A missing location falls back to the selection. With neither, the     │
//! │  fetch still starts and then fails with "No location selected".        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use ecowatch_core::validation::{validate_location, validate_radius_km};
use ecowatch_core::{
    environmental_score, CoreError, CoreResult, EnvironmentalReading, Location, ResourceState,
    DEFAULT_NEARBY_RADIUS_KM,
};
use tokio::sync::watch;

use crate::events::StoreEventEmitter;
use crate::service::EnvironmentalDataService;
use crate::slice::{ResourceSlice, Settlement};

/// Key of the environmental slice in the store tree.
pub const ENVIRONMENTAL_SLICE: &str = "environmental";

/// State of the environmental slice.
pub type EnvironmentalState = ResourceState<Vec<EnvironmentalReading>, EnvironmentalReading, Location>;

/// Radius defaults for environmental fetches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentalOptions {
    /// Radius sent with current-data requests when the caller gives none.
    /// `None` lets the service choose.
    pub default_radius_km: Option<f64>,

    /// Radius for nearby-data requests when the caller gives none.
    pub nearby_radius_km: f64,
}

impl Default for EnvironmentalOptions {
    fn default() -> Self {
        EnvironmentalOptions {
            default_radius_km: None,
            nearby_radius_km: DEFAULT_NEARBY_RADIUS_KM,
        }
    }
}

/// Synchronous actions routed through the store.
#[derive(Debug, Clone, PartialEq)]
pub enum EnvironmentalAction {
    SetSelectedLocation(Option<Location>),
    ClearError,
    ClearData,
}

/// The environmental resource family.
pub struct EnvironmentalDataSlice<E> {
    slice: ResourceSlice<Vec<EnvironmentalReading>, EnvironmentalReading, Location>,
    service: Arc<E>,
    options: EnvironmentalOptions,
}

impl<E> Clone for EnvironmentalDataSlice<E> {
    fn clone(&self) -> Self {
        EnvironmentalDataSlice {
            slice: self.slice.clone(),
            service: self.service.clone(),
            options: self.options,
        }
    }
}

impl<E: EnvironmentalDataService> EnvironmentalDataSlice<E> {
    pub fn new(
        service: Arc<E>,
        options: EnvironmentalOptions,
        emitter: Arc<dyn StoreEventEmitter>,
    ) -> Self {
        EnvironmentalDataSlice {
            slice: ResourceSlice::new(ENVIRONMENTAL_SLICE, emitter),
            service,
            options,
        }
    }

    /// A copy of the current state.
    pub fn state(&self) -> EnvironmentalState {
        self.slice.snapshot()
    }

    /// Observes every transition.
    pub fn subscribe(&self) -> watch::Receiver<EnvironmentalState> {
        self.slice.subscribe()
    }

    /// Combined score of the current readings, `None` when there are none.
    pub fn current_score(&self) -> Option<f64> {
        self.slice.read(|state| environmental_score(&state.primary))
    }

    // =========================================================================
    // Synchronous Actions
    // =========================================================================

    pub fn set_selected_location(&self, location: Option<Location>) {
        self.slice.set_selection(location);
    }

    pub fn clear_error(&self) {
        self.slice.clear_error();
    }

    pub fn clear_data(&self) {
        self.slice.clear_resource();
    }

    /// Applies a routed store action.
    pub fn apply(&self, action: EnvironmentalAction) {
        match action {
            EnvironmentalAction::SetSelectedLocation(location) => self.set_selected_location(location),
            EnvironmentalAction::ClearError => self.clear_error(),
            EnvironmentalAction::ClearData => self.clear_data(),
        }
    }

    // =========================================================================
    // Asynchronous Operations
    // =========================================================================

    /// Loads current readings. Replaces the reading list on success.
    pub async fn fetch_current_data(
        &self,
        location: Option<Location>,
        radius_km: Option<f64>,
    ) -> Settlement {
        let params = self.current_params(location, radius_km);
        let service = self.service.clone();

        self.slice
            .fetch_primary("fetch_current_data", async move {
                let (location, radius_km) = params?;
                service.get_current_data(location, radius_km).await
            })
            .await
    }

    /// Loads readings from nearby stations into `secondary`.
    pub async fn fetch_nearby_data(
        &self,
        location: Option<Location>,
        radius_km: Option<f64>,
    ) -> Settlement {
        let params = self.nearby_params(location, radius_km);
        let service = self.service.clone();

        self.slice
            .fetch_secondary("fetch_nearby_data", async move {
                let (location, radius_km) = params?;
                service.get_nearby_data(location, radius_km).await
            })
            .await
    }

    /// Re-fetches current readings without showing a loading state.
    pub async fn refresh_data(&self, location: Option<Location>, radius_km: Option<f64>) -> Settlement {
        let params = self.current_params(location, radius_km);
        let service = self.service.clone();

        self.slice
            .refresh("refresh_data", async move {
                let (location, radius_km) = params?;
                service.get_current_data(location, radius_km).await
            })
            .await
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    fn resolve_location(&self, location: Option<Location>) -> CoreResult<Location> {
        let location = match location {
            Some(location) => location,
            None => self
                .slice
                .read(|state| state.selection)
                .ok_or(CoreError::MissingSelection { what: "location" })?,
        };
        validate_location(&location)?;
        Ok(location)
    }

    fn current_params(
        &self,
        location: Option<Location>,
        radius_km: Option<f64>,
    ) -> CoreResult<(Location, Option<f64>)> {
        let location = self.resolve_location(location)?;
        let radius_km = radius_km.or(self.options.default_radius_km);
        if let Some(radius) = radius_km {
            validate_radius_km(radius)?;
        }
        Ok((location, radius_km))
    }

    fn nearby_params(&self, location: Option<Location>, radius_km: Option<f64>) -> CoreResult<(Location, f64)> {
        let location = self.resolve_location(location)?;
        let radius_km = radius_km.unwrap_or(self.options.nearby_radius_km);
        validate_radius_km(radius_km)?;
        Ok((location, radius_km))
    }
}
