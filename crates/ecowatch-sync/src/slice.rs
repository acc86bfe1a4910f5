//! # Resource Slice
//!
//! The async driver around one [`ResourceState`]. A slice owns its state,
//! turns each async operation into the three observable outcomes (started,
//! succeeded, failed) and feeds them through the pure reducer in
//! `ecowatch_core::resource`.
//!
//! ## Operation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      fetch_primary / fetch_secondary                    │
//! │                                                                         │
//! │  caller ──► dispatch(Started) ──► status = Loading, error = None        │
//! │                   │                                                     │
//! │                   ▼                                                     │
//! │             task.await   (service call; the only suspension point)      │
//! │                   │                                                     │
//! │         ┌─────────┴──────────┐                                          │
//! │         ▼                    ▼                                          │
//! │   Ok(payload)           Err(RemoteError)                                │
//! │   dispatch(*Succeeded)  dispatch(Failed(message))                       │
//! │   status = Ready        status = Failed, data untouched                 │
//! │         │                    │                                          │
//! │         └─────────┬──────────┘                                          │
//! │                   ▼                                                     │
//! │          watch receivers notified, emitter called                       │
//! │          Settlement returned (never an Err)                             │
//! │                                                                         │
//! │  refresh: same, minus Started; Refreshed / RefreshFailed keep status    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering
//! There is no cancellation and no request generation check. Two overlapping
//! fetches both apply their result in the order they SETTLE, so a slow, older
//! request can overwrite a newer one. Every operation gets a request id in its
//! tracing span to make that visible.

use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use ecowatch_core::{RemoteResult, ResourceAction, ResourceState, SyncStatus};
use tokio::sync::watch;
use tracing::{debug, debug_span, warn, Instrument};
use uuid::Uuid;

use crate::events::StoreEventEmitter;

// =============================================================================
// Settlement
// =============================================================================

/// How an async slice operation ended.
///
/// Returned for sequencing only: the outcome is already in the slice state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// The payload was applied.
    Succeeded,
    /// The failure message was stored.
    Failed(String),
}

impl Settlement {
    /// True for [`Settlement::Succeeded`].
    pub fn is_succeeded(&self) -> bool {
        matches!(self, Settlement::Succeeded)
    }

    /// The failure message, if any.
    pub fn error(&self) -> Option<&str> {
        match self {
            Settlement::Succeeded => None,
            Settlement::Failed(message) => Some(message),
        }
    }
}

// =============================================================================
// Resource Slice
// =============================================================================

/// Owner of one resource family's state.
///
/// Cloning is cheap and yields a handle to the SAME state.
pub struct ResourceSlice<P, S, Sel> {
    /// Resource name, the key in the composed store tree.
    name: &'static str,

    /// The state. Receivers are handed out to observers; only this slice sends.
    state: Arc<watch::Sender<ResourceState<P, S, Sel>>>,

    /// Push notifications for status changes and failures.
    emitter: Arc<dyn StoreEventEmitter>,
}

impl<P, S, Sel> Clone for ResourceSlice<P, S, Sel> {
    fn clone(&self) -> Self {
        ResourceSlice {
            name: self.name,
            state: self.state.clone(),
            emitter: self.emitter.clone(),
        }
    }
}

/// What a dispatch changed, collected under the state lock and reported after.
struct Transition {
    action: &'static str,
    before: SyncStatus,
    after: SyncStatus,
    new_error: Option<String>,
}

impl<P, S, Sel> ResourceSlice<P, S, Sel>
where
    P: Default + Clone,
    S: Clone,
    Sel: Clone,
{
    /// Creates a slice in its initial state.
    pub fn new(name: &'static str, emitter: Arc<dyn StoreEventEmitter>) -> Self {
        let (state, _) = watch::channel(ResourceState::default());
        ResourceSlice {
            name,
            state: Arc::new(state),
            emitter,
        }
    }

    /// The resource name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> ResourceState<P, S, Sel> {
        self.state.borrow().clone()
    }

    /// Reads the current state without copying it.
    pub fn read<R>(&self, f: impl FnOnce(&ResourceState<P, S, Sel>) -> R) -> R {
        f(&self.state.borrow())
    }

    /// A receiver that observes every transition of this slice.
    pub fn subscribe(&self) -> watch::Receiver<ResourceState<P, S, Sel>> {
        self.state.subscribe()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Applies one action through the reducer and notifies observers.
    pub fn dispatch(&self, action: ResourceAction<P, S, Sel>) {
        self.dispatch_with(move |_| action);
    }

    /// Builds the action from the current state and applies it atomically.
    pub fn dispatch_with<F>(&self, make_action: F)
    where
        F: FnOnce(&ResourceState<P, S, Sel>) -> ResourceAction<P, S, Sel>,
    {
        let now = Utc::now();
        let mut transition = None;

        self.state.send_modify(|state| {
            let action = make_action(state);
            let name = action.name();
            let reports_error = matches!(
                action,
                ResourceAction::Failed(_) | ResourceAction::RefreshFailed(_)
            );
            let before = state.status;

            state.apply(action, now);

            transition = Some(Transition {
                action: name,
                before,
                after: state.status,
                new_error: if reports_error { state.error.clone() } else { None },
            });
        });

        let Some(t) = transition else { return };

        debug!(
            slice = self.name,
            action = t.action,
            from = %t.before,
            to = %t.after,
            "Applied action"
        );

        if t.before != t.after {
            self.emitter.emit_status(self.name, t.after);
        }
        if let Some(ref message) = t.new_error {
            self.emitter.emit_error(self.name, message);
        }
    }

    // =========================================================================
    // Synchronous Actions
    // =========================================================================

    /// Overwrites the selection. No status or error change.
    pub fn set_selection(&self, selection: Option<Sel>) {
        self.dispatch(ResourceAction::SetSelection(selection));
    }

    /// Drops the error message only.
    pub fn clear_error(&self) {
        self.dispatch(ResourceAction::ClearError);
    }

    /// Empties primary, secondary and the sync stamp.
    pub fn clear_resource(&self) {
        self.dispatch(ResourceAction::ClearResource);
    }

    // =========================================================================
    // Asynchronous Operations
    // =========================================================================

    /// Full fetch whose payload replaces `primary`.
    pub async fn fetch_primary<F>(&self, operation: &'static str, task: F) -> Settlement
    where
        F: Future<Output = RemoteResult<P>>,
    {
        self.run(operation, task, |payload, _| {
            ResourceAction::PrimarySucceeded(payload)
        })
        .await
    }

    /// Full fetch whose payload replaces `secondary`.
    pub async fn fetch_secondary<F>(&self, operation: &'static str, task: F) -> Settlement
    where
        F: Future<Output = RemoteResult<Vec<S>>>,
    {
        self.run(operation, task, |payload, _| {
            ResourceAction::SecondarySucceeded(payload)
        })
        .await
    }

    /// Full fetch with a custom success action.
    ///
    /// `on_success` receives the payload and the state as it is at settlement
    /// time, so partial results (e.g. a preferences object) can be folded
    /// into the current primary value.
    pub async fn run<T, F, M>(&self, operation: &'static str, task: F, on_success: M) -> Settlement
    where
        F: Future<Output = RemoteResult<T>>,
        M: FnOnce(T, &ResourceState<P, S, Sel>) -> ResourceAction<P, S, Sel>,
    {
        let request_id = Uuid::new_v4();
        let span = debug_span!("resource_op", slice = self.name, operation, %request_id);

        async move {
            self.dispatch(ResourceAction::Started);

            match task.await {
                Ok(payload) => {
                    self.dispatch_with(move |state| on_success(payload, state));
                    debug!("Operation succeeded");
                    Settlement::Succeeded
                }
                Err(err) => {
                    let message = err.into_message();
                    warn!(error = %message, "Operation failed");
                    self.dispatch(ResourceAction::Failed(message.clone()));
                    Settlement::Failed(message)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Background refresh of `primary`: no Loading state, and a failure only
    /// records the message.
    pub async fn refresh<F>(&self, operation: &'static str, task: F) -> Settlement
    where
        F: Future<Output = RemoteResult<P>>,
    {
        let request_id = Uuid::new_v4();
        let span = debug_span!("resource_refresh", slice = self.name, operation, %request_id);

        async move {
            match task.await {
                Ok(payload) => {
                    self.dispatch(ResourceAction::Refreshed(payload));
                    debug!("Refresh succeeded");
                    Settlement::Succeeded
                }
                Err(err) => {
                    let message = err.into_message();
                    warn!(error = %message, "Refresh failed");
                    self.dispatch(ResourceAction::RefreshFailed(message.clone()));
                    Settlement::Failed(message)
                }
            }
        }
        .instrument(span)
        .await
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NoOpEmitter;
    use ecowatch_core::RemoteError;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    type TestSlice = ResourceSlice<Vec<u32>, u32, String>;

    fn slice() -> TestSlice {
        ResourceSlice::new("test", Arc::new(NoOpEmitter))
    }

    /// Records every event for assertions.
    #[derive(Default)]
    struct RecordingEmitter {
        statuses: Mutex<Vec<SyncStatus>>,
        errors: Mutex<Vec<String>>,
    }

    impl StoreEventEmitter for RecordingEmitter {
        fn emit_status(&self, _slice: &str, status: SyncStatus) {
            self.statuses.lock().unwrap().push(status);
        }

        fn emit_error(&self, _slice: &str, message: &str) {
            self.errors.lock().unwrap().push(message.to_string());
        }
    }

    /// A task that settles when the test sends on the gate.
    fn gated<T: Send + 'static>() -> (
        oneshot::Sender<RemoteResult<T>>,
        impl Future<Output = RemoteResult<T>> + Send,
    ) {
        let (tx, rx) = oneshot::channel();
        let task = async move {
            rx.await
                .unwrap_or_else(|_| Err(RemoteError::new("gate dropped")))
        };
        (tx, task)
    }

    #[tokio::test]
    async fn test_fetch_primary_success() {
        let slice = slice();
        let settlement = slice
            .fetch_primary("load", async { Ok(vec![1, 2, 3]) })
            .await;

        assert!(settlement.is_succeeded());
        let state = slice.snapshot();
        assert_eq!(state.status, SyncStatus::Ready);
        assert_eq!(state.primary, vec![1, 2, 3]);
        assert!(state.error.is_none());
        assert!(state.last_synced_at.is_some());
    }

    #[tokio::test]
    async fn test_loading_is_visible_while_pending() {
        let slice = slice();
        let (gate, task) = gated::<Vec<u32>>();

        let worker = {
            let slice = slice.clone();
            tokio::spawn(async move { slice.fetch_primary("load", task).await })
        };

        let mut rx = slice.subscribe();
        rx.wait_for(|s| s.is_loading()).await.unwrap();
        assert!(slice.read(|s| s.error.is_none()));

        gate.send(Ok(vec![9])).unwrap();
        assert!(worker.await.unwrap().is_succeeded());
        assert_eq!(slice.snapshot().primary, vec![9]);
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_previous_primary() {
        let slice = slice();
        slice.fetch_primary("load", async { Ok(vec![1]) }).await;
        let synced = slice.snapshot().last_synced_at;

        let settlement = slice
            .fetch_primary("load", async {
                Err::<Vec<u32>, _>(RemoteError::new("Network Error"))
            })
            .await;

        assert_eq!(settlement.error(), Some("Network Error"));
        let state = slice.snapshot();
        assert_eq!(state.status, SyncStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("Network Error"));
        assert_eq!(state.primary, vec![1]);
        assert_eq!(state.last_synced_at, synced);
    }

    #[tokio::test]
    async fn test_secondary_shares_status_with_primary() {
        let slice = slice();
        slice.fetch_primary("load", async { Ok(vec![1]) }).await;

        slice
            .fetch_secondary("nearby", async {
                Err::<Vec<u32>, _>(RemoteError::new("nearby down"))
            })
            .await;

        // Primary data is fine, yet the whole slice reads as failed
        let state = slice.snapshot();
        assert_eq!(state.status, SyncStatus::Failed);
        assert_eq!(state.primary, vec![1]);
        assert!(state.secondary.is_empty());
    }

    #[tokio::test]
    async fn test_last_settled_wins() {
        let slice = slice();
        let (gate_a, task_a) = gated::<Vec<u32>>();
        let (gate_b, task_b) = gated::<Vec<u32>>();

        // A is issued first and stays pending
        let worker_a = {
            let slice = slice.clone();
            tokio::spawn(async move { slice.fetch_primary("a", task_a).await })
        };
        slice
            .subscribe()
            .wait_for(|s| s.status == SyncStatus::Loading)
            .await
            .unwrap();

        // B is issued later and settles first
        gate_b.send(Ok(vec![2])).unwrap();
        slice.fetch_primary("b", task_b).await;
        assert_eq!(slice.snapshot().primary, vec![2]);

        // A settles last and overwrites B
        gate_a.send(Ok(vec![1])).unwrap();
        worker_a.await.unwrap();
        assert_eq!(slice.snapshot().primary, vec![1]);
        assert_eq!(slice.snapshot().status, SyncStatus::Ready);
    }

    #[tokio::test]
    async fn test_late_success_clears_overlapping_failure() {
        let slice = slice();
        let (gate_a, task_a) = gated::<Vec<u32>>();

        let worker_a = {
            let slice = slice.clone();
            tokio::spawn(async move { slice.fetch_primary("a", task_a).await })
        };
        slice
            .subscribe()
            .wait_for(|s| s.is_loading())
            .await
            .unwrap();

        // B is issued later and fails while A is still pending
        slice
            .fetch_primary("b", async {
                Err::<Vec<u32>, _>(RemoteError::new("B failed"))
            })
            .await;
        assert!(slice.read(|s| s.is_failed()));

        gate_a.send(Ok(vec![1])).unwrap();
        assert!(worker_a.await.unwrap().is_succeeded());

        let state = slice.snapshot();
        assert_eq!(state.status, SyncStatus::Ready);
        assert!(state.error.is_none());
        assert_eq!(state.primary, vec![1]);
        assert!(state.status_matches_error());
    }

    #[tokio::test]
    async fn test_late_secondary_success_clears_primary_failure() {
        let slice = slice();
        let (gate, task) = gated::<Vec<u32>>();

        let nearby = {
            let slice = slice.clone();
            tokio::spawn(async move { slice.fetch_secondary("nearby", task).await })
        };
        slice
            .subscribe()
            .wait_for(|s| s.is_loading())
            .await
            .unwrap();

        slice
            .fetch_primary("load", async {
                Err::<Vec<u32>, _>(RemoteError::new("current down"))
            })
            .await;

        gate.send(Ok(vec![5])).unwrap();
        nearby.await.unwrap();

        let state = slice.snapshot();
        assert_eq!(state.status, SyncStatus::Ready);
        assert!(state.error.is_none());
        assert_eq!(state.secondary, vec![5]);
        assert!(!state.has_synced());
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_status() {
        let slice = slice();
        slice.fetch_primary("load", async { Ok(vec![1]) }).await;

        slice
            .refresh("refresh", async {
                Err::<Vec<u32>, _>(RemoteError::new("offline"))
            })
            .await;

        let state = slice.snapshot();
        assert_eq!(state.status, SyncStatus::Ready);
        assert_eq!(state.error.as_deref(), Some("offline"));
        assert_eq!(state.primary, vec![1]);
    }

    #[tokio::test]
    async fn test_refresh_success_from_idle_stays_idle() {
        let slice = slice();
        slice.refresh("refresh", async { Ok(vec![4]) }).await;

        let state = slice.snapshot();
        assert_eq!(state.status, SyncStatus::Idle);
        assert_eq!(state.primary, vec![4]);
        assert!(state.has_synced());
    }

    #[tokio::test]
    async fn test_sync_actions() {
        let slice = slice();
        slice.set_selection(Some("here".to_string()));
        slice.fetch_primary("load", async { Ok(vec![1]) }).await;
        slice
            .fetch_primary("load", async { Err::<Vec<u32>, _>(RemoteError::new("x")) })
            .await;

        slice.clear_error();
        let state = slice.snapshot();
        assert!(state.error.is_none());
        assert_eq!(state.status, SyncStatus::Failed);

        slice.clear_resource();
        let state = slice.snapshot();
        assert!(state.primary.is_empty());
        assert!(!state.has_synced());
        assert!(state.is_failed());
        assert_eq!(state.selection.as_deref(), Some("here"));
    }

    #[tokio::test]
    async fn test_emitter_sees_status_changes_and_errors() {
        let emitter = Arc::new(RecordingEmitter::default());
        let slice: TestSlice = ResourceSlice::new("test", emitter.clone());

        slice.fetch_primary("load", async { Ok(vec![1]) }).await;
        slice
            .fetch_primary("load", async { Err::<Vec<u32>, _>(RemoteError::new("500")) })
            .await;
        // No status change, no event
        slice.clear_error();

        assert_eq!(
            *emitter.statuses.lock().unwrap(),
            vec![
                SyncStatus::Loading,
                SyncStatus::Ready,
                SyncStatus::Loading,
                SyncStatus::Failed
            ]
        );
        assert_eq!(*emitter.errors.lock().unwrap(), vec!["500".to_string()]);
    }
}
