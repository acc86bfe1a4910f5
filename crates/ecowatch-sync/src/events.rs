//! # Store Events
//!
//! Push-style notifications for observers that do not want to hold a watch
//! receiver per slice (the UI bridge, devtools, logs).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  slice transition ──► StoreEventEmitter                                 │
//! │                        • emit_status(slice, status)  status changed     │
//! │                        • emit_error(slice, message)  failure stored     │
//! │                                                                         │
//! │  Implementations: NoOpEmitter (default), TracingEmitter (app)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use ecowatch_core::SyncStatus;
use tracing::{info, warn};

/// Trait for emitting store events.
pub trait StoreEventEmitter: Send + Sync {
    /// A slice's status changed.
    fn emit_status(&self, slice: &str, status: SyncStatus);

    /// A slice stored a failure message.
    fn emit_error(&self, slice: &str, message: &str);
}

/// No-op event emitter.
pub struct NoOpEmitter;

impl StoreEventEmitter for NoOpEmitter {
    fn emit_status(&self, _slice: &str, _status: SyncStatus) {}
    fn emit_error(&self, _slice: &str, _message: &str) {}
}

/// Emits store events as tracing records.
pub struct TracingEmitter;

impl StoreEventEmitter for TracingEmitter {
    fn emit_status(&self, slice: &str, status: SyncStatus) {
        info!(slice, %status, "Slice status changed");
    }

    fn emit_error(&self, slice: &str, message: &str) {
        warn!(slice, message, "Slice stored an error");
    }
}
