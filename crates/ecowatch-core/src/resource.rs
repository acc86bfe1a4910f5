//! # Resource State
//!
//! The state every resource slice owns, and the pure reducer that folds fetch
//! outcomes into it.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Resource Sync State Machine                          │
//! │                                                                         │
//! │  ┌──────┐   Started    ┌─────────┐  PrimarySucceeded   ┌───────┐       │
//! │  │ Idle │ ───────────► │ Loading │ ──────────────────► │ Ready │       │
//! │  └──────┘              └────┬────┘  SecondarySucceeded └───┬───┘       │
//! │                             │ ▲                            │           │
//! │                      Failed │ │ Started                    │ Started   │
//! │                             ▼ │                            │           │
//! │                        ┌────────┐                          │           │
//! │                        │ Failed │ ◄────────────────────────┘           │
//! │                        └────────┘   (via Loading)                      │
//! │                                                                         │
//! │  Started    any → Loading, error cleared                               │
//! │  Succeeded  → Ready, error cleared, payload to the targeted field      │
//! │  Failed     → Failed, error set, data fields untouched                 │
//! │                                                                         │
//! │  Refreshed / RefreshFailed never move `status`                         │
//! │  SetSelection / ClearError / ClearResource never move `status`         │
//! │                                                                         │
//! │  No terminal state, no cancel. A late settlement still applies:        │
//! │  the LAST SETTLED operation wins, not the last one started.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The async driver (ecowatch-sync) decides which action to apply and when.
//! What an action does lives here, with the clock passed in.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// =============================================================================
// Sync Status
// =============================================================================

/// Synchronization status of one resource. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// Nothing fetched yet.
    #[default]
    Idle,
    /// A fetch has started and not settled.
    Loading,
    /// The last settled fetch succeeded.
    Ready,
    /// The last settled fetch failed; `error` holds the message.
    Failed,
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncStatus::Idle => write!(f, "idle"),
            SyncStatus::Loading => write!(f, "loading"),
            SyncStatus::Ready => write!(f, "ready"),
            SyncStatus::Failed => write!(f, "failed"),
        }
    }
}

// =============================================================================
// Resource State
// =============================================================================

/// Local state of one remote resource family.
///
/// ## Type Parameters
/// - `P`: primary payload. `P::default()` is the "empty value"
///   (`Vec<T>` for list resources, `Option<T>` for single objects).
/// - `S`: element of the secondary result set.
/// - `Sel`: user-chosen context that parameterizes future fetches.
///
/// ## Invariants
/// - `status == Loading` ⇒ `error.is_none()`
/// - `status == Failed` ⇒ `error.is_some()`, and data fields hold whatever
///   they held before the failed fetch
/// - `last_synced_at` never decreases until an explicit `ClearResource`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ResourceState<P, S, Sel> {
    /// Main fetched payload. Replaced wholesale on success.
    pub primary: P,

    /// Auxiliary result set (e.g. nearby readings).
    pub secondary: Vec<S>,

    /// User-chosen context; never derived from fetch results.
    pub selection: Option<Sel>,

    /// Current synchronization status.
    pub status: SyncStatus,

    /// Last failure message, verbatim from the service.
    pub error: Option<String>,

    /// When the primary payload last arrived.
    #[ts(as = "Option<String>")]
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl<P: Default, S, Sel> Default for ResourceState<P, S, Sel> {
    fn default() -> Self {
        ResourceState {
            primary: P::default(),
            secondary: Vec::new(),
            selection: None,
            status: SyncStatus::Idle,
            error: None,
            last_synced_at: None,
        }
    }
}

// =============================================================================
// Resource Action
// =============================================================================

/// Everything that can happen to a [`ResourceState`].
///
/// The first three are synchronous user actions; the rest are the observable
/// outcomes of an asynchronous operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceAction<P, S, Sel> {
    /// Overwrite `selection`.
    SetSelection(Option<Sel>),

    /// Drop the error message, nothing else.
    ClearError,

    /// Reset primary, secondary and `last_synced_at` to empty.
    ClearResource,

    /// A full fetch began.
    Started,

    /// A primary-targeted fetch settled successfully.
    PrimarySucceeded(P),

    /// A secondary-targeted fetch settled successfully.
    SecondarySucceeded(Vec<S>),

    /// A full fetch settled with a failure message.
    Failed(String),

    /// A background refresh delivered a new primary payload.
    Refreshed(P),

    /// A background refresh failed.
    RefreshFailed(String),
}

impl<P, S, Sel> ResourceAction<P, S, Sel> {
    /// Short name for logs.
    pub fn name(&self) -> &'static str {
        match self {
            ResourceAction::SetSelection(_) => "set_selection",
            ResourceAction::ClearError => "clear_error",
            ResourceAction::ClearResource => "clear_resource",
            ResourceAction::Started => "started",
            ResourceAction::PrimarySucceeded(_) => "primary_succeeded",
            ResourceAction::SecondarySucceeded(_) => "secondary_succeeded",
            ResourceAction::Failed(_) => "failed",
            ResourceAction::Refreshed(_) => "refreshed",
            ResourceAction::RefreshFailed(_) => "refresh_failed",
        }
    }
}

// =============================================================================
// Reducer
// =============================================================================

impl<P: Default, S, Sel> ResourceState<P, S, Sel> {
    /// Applies one action. `now` is only read by primary-targeted successes.
    pub fn apply(&mut self, action: ResourceAction<P, S, Sel>, now: DateTime<Utc>) {
        match action {
            ResourceAction::SetSelection(selection) => {
                self.selection = selection;
            }

            ResourceAction::ClearError => {
                self.error = None;
            }

            ResourceAction::ClearResource => {
                self.primary = P::default();
                self.secondary = Vec::new();
                self.last_synced_at = None;
            }

            ResourceAction::Started => {
                self.status = SyncStatus::Loading;
                self.error = None;
            }

            ResourceAction::PrimarySucceeded(payload) => {
                self.primary = payload;
                self.status = SyncStatus::Ready;
                self.error = None;
                self.stamp(now);
            }

            ResourceAction::SecondarySucceeded(payload) => {
                self.secondary = payload;
                self.status = SyncStatus::Ready;
                self.error = None;
            }

            ResourceAction::Failed(message) => {
                self.status = SyncStatus::Failed;
                self.error = Some(message);
            }

            ResourceAction::Refreshed(payload) => {
                self.primary = payload;
                self.stamp(now);
            }

            ResourceAction::RefreshFailed(message) => {
                // A full fetch is in flight and will settle the status;
                // Loading never carries an error.
                if self.status != SyncStatus::Loading {
                    self.error = Some(message);
                }
            }
        }
    }

    /// Stamps `last_synced_at`, strictly after any previous stamp.
    fn stamp(&mut self, now: DateTime<Utc>) {
        let next = match self.last_synced_at {
            Some(previous) if now <= previous => previous + Duration::microseconds(1),
            _ => now,
        };
        self.last_synced_at = Some(next);
    }
}

impl<P, S, Sel> ResourceState<P, S, Sel> {
    /// True while a full fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.status == SyncStatus::Loading
    }

    /// True when the last full fetch failed.
    pub fn is_failed(&self) -> bool {
        self.status == SyncStatus::Failed
    }

    /// True once the primary payload has arrived at least once since the
    /// last clear.
    pub fn has_synced(&self) -> bool {
        self.last_synced_at.is_some()
    }

    /// Checks the status/error pairing that fetch-driven transitions keep:
    /// `Failed ⇔ error present`, and no error while `Loading`.
    pub fn status_matches_error(&self) -> bool {
        match self.status {
            SyncStatus::Failed => self.error.is_some(),
            _ => self.error.is_none(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================


#[cfg(test)]
mod proptests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    type ByteState = ResourceState<Vec<u8>, u8, u8>;
    type ByteAction = ResourceAction<Vec<u8>, u8, u8>;

    const BASE_SECS: i64 = 1_700_000_000;

    /// Actions a fetch or a user selection can produce.
    fn fetch_action() -> impl Strategy<Value = ByteAction> {
        prop_oneof![
            Just(ByteAction::Started),
            prop::collection::vec(any::<u8>(), 0..4).prop_map(ByteAction::PrimarySucceeded),
            prop::collection::vec(any::<u8>(), 0..4).prop_map(ByteAction::SecondarySucceeded),
            "[a-z]{1,8}".prop_map(ByteAction::Failed),
            prop::option::of(any::<u8>()).prop_map(ByteAction::SetSelection),
        ]
    }

    /// Fetch actions plus background refresh outcomes.
    fn any_action() -> impl Strategy<Value = ByteAction> {
        prop_oneof![
            4 => fetch_action(),
            1 => prop::collection::vec(any::<u8>(), 0..4).prop_map(ByteAction::Refreshed),
            1 => "[a-z]{1,8}".prop_map(ByteAction::RefreshFailed),
        ]
    }

    /// Clock readings that may stall or jump backwards between steps.
    fn clock(offset: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(BASE_SECS + offset, 0).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Fetch-driven transitions keep `Failed ⇔ error present`, and a
        /// failure leaves every data field as it was.
        #[test]
        fn prop_fetch_sequences_keep_status_and_data(
            steps in prop::collection::vec((fetch_action(), -3i64..3), 0..40)
        ) {
            let mut state = ByteState::default();

            for (action, offset) in steps {
                let before = state.clone();
                let failed = matches!(action, ByteAction::Failed(_));

                state.apply(action, clock(offset));

                prop_assert!(state.status_matches_error(), "{:?}", state);
                if failed {
                    prop_assert_eq!(&state.primary, &before.primary);
                    prop_assert_eq!(&state.secondary, &before.secondary);
                    prop_assert_eq!(state.selection, before.selection);
                    prop_assert_eq!(state.last_synced_at, before.last_synced_at);
                }
            }
        }

        /// `last_synced_at` never decreases, and moves strictly forward on
        /// every primary delivery, whatever the clock does.
        #[test]
        fn prop_last_synced_at_is_monotonic(
            steps in prop::collection::vec((any_action(), -3i64..3), 0..40)
        ) {
            let mut state = ByteState::default();

            for (action, offset) in steps {
                let before = state.last_synced_at;
                let delivers_primary = matches!(
                    action,
                    ByteAction::PrimarySucceeded(_) | ByteAction::Refreshed(_)
                );

                state.apply(action, clock(offset));

                if let Some(previous) = before {
                    let current = state.last_synced_at;
                    prop_assert!(current.is_some());
                    prop_assert!(current >= Some(previous));
                    if delivers_primary {
                        prop_assert!(current > Some(previous));
                    }
                }
                if state.is_loading() {
                    prop_assert!(state.error.is_none());
                }
            }
        }
    }
}
