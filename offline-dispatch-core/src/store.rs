//! Centralized state store with offline-aware dispatch

use crate::action::{Action, Dispatch, Dispatchable};
use crate::config::OfflineConfig;
use crate::error::ConfigurationError;
use crate::offline::{Forwarded, OfflineMiddleware};
use crate::queue::{Envelope, HasNetwork, NetworkAction, NetworkState, QueuedEntry};
use crate::replay::ReplayTrigger;

/// A reducer function that handles actions and mutates state
///
/// Returns `true` if the state changed and a re-render is needed.
pub type Reducer<S, A> = fn(&mut S, A) -> bool;

/// Store whose dispatch runs through the offline middleware
///
/// Every dispatched action or thunk is intercepted first. Directives the
/// middleware emits (dismissals, dequeues, offline notifications) are reduced
/// into the state's [`NetworkSlice`](crate::NetworkSlice); plain actions go
/// to the application reducer; thunks are run with the store as their
/// dispatcher, so nested dispatches resolve before the outer call returns.
///
/// # Type Parameters
/// * `S` - The application state type, embedding a network slice
/// * `A` - The action type (must implement `Action`)
/// * `M` - Observer middleware, called around every forwarded item
///
/// # Example
/// ```ignore
/// let mut store = OfflineStore::new(AppState::default(), reducer, OfflineConfig::new());
///
/// store.set_connected(false)?;
/// store.dispatch(AppAction::FetchFeedRequest)?; // deferred
/// assert_eq!(store.queue().len(), 1);
///
/// store.set_connected(true)?; // replayed
/// assert!(store.queue().is_empty());
/// ```
pub struct OfflineStore<S, A: Action, M: Middleware<A> = NoopMiddleware> {
    state: S,
    reducer: Reducer<S, A>,
    offline: OfflineMiddleware,
    middleware: M,
    trigger: ReplayTrigger,
    /// Set by dispatches made from inside a running thunk
    thunk_changed: bool,
}

impl<S: HasNetwork<A>, A: Action> OfflineStore<S, A> {
    /// Create a new store with initial state, reducer and matching config
    pub fn new(state: S, reducer: Reducer<S, A>, config: OfflineConfig) -> Self {
        Self::with_middleware(state, reducer, config, NoopMiddleware)
    }
}

impl<S: HasNetwork<A>, A: Action, M: Middleware<A>> OfflineStore<S, A, M> {
    /// Create a new store with an observer middleware
    pub fn with_middleware(
        state: S,
        reducer: Reducer<S, A>,
        config: OfflineConfig,
        middleware: M,
    ) -> Self {
        let trigger = ReplayTrigger::new(state.network().is_connected());
        Self {
            state,
            reducer,
            offline: OfflineMiddleware::new(config),
            middleware,
            trigger,
            thunk_changed: false,
        }
    }

    /// Dispatch an action or thunk
    ///
    /// Returns `true` if any reducer reported a state change, or the
    /// configuration error that aborted the dispatch.
    pub fn dispatch(
        &mut self,
        item: impl Into<Dispatchable<A>>,
    ) -> Result<bool, ConfigurationError> {
        self.dispatch_envelope(Envelope::fresh(item.into()))
    }

    /// Re-dispatch a queued entry, keeping its queue id
    pub fn dispatch_entry(&mut self, entry: QueuedEntry<A>) -> Result<bool, ConfigurationError> {
        self.dispatch_envelope(entry.into())
    }

    /// Run one envelope through the offline middleware and apply the outcome
    pub fn dispatch_envelope(
        &mut self,
        envelope: Envelope<A>,
    ) -> Result<bool, ConfigurationError> {
        let interception = self.offline.intercept(envelope, self.state.network())?;

        let mut changed = false;
        for directive in interception.directives {
            changed |= self.forward(Forwarded::Network(directive))?;
        }
        changed |= self.forward(interception.forward)?;
        Ok(changed)
    }

    fn forward(&mut self, item: Forwarded<A>) -> Result<bool, ConfigurationError> {
        self.middleware.before(&item);
        let changed = match &item {
            Forwarded::Network(action) => self.state.network_mut().reduce(action),
            Forwarded::Action(action) => (self.reducer)(&mut self.state, action.clone()),
            Forwarded::Thunk(thunk) => {
                let outer = std::mem::replace(&mut self.thunk_changed, false);
                let result = thunk.clone().run(self);
                let changed = std::mem::replace(&mut self.thunk_changed, outer);
                result?;
                changed
            }
        };
        self.middleware.after(&item, changed);
        Ok(changed)
    }

    /// Record a connectivity change
    ///
    /// On a transition from disconnected to connected the queue is replayed
    /// in enqueue order. Returns the number of entries replayed.
    pub fn set_connected(&mut self, is_connected: bool) -> Result<usize, ConfigurationError> {
        self.forward(Forwarded::Network(NetworkAction::ConnectionChange {
            is_connected,
        }))?;

        if self.trigger.observe(is_connected) {
            self.replay()
        } else {
            Ok(0)
        }
    }

    /// Replay a snapshot of the queue through the pipeline
    ///
    /// Entries that left the queue during the drain (dismissed by an earlier
    /// replayed item) are skipped. The drain stops if connectivity drops.
    pub fn replay(&mut self) -> Result<usize, ConfigurationError> {
        let snapshot = self.state.network().action_queue().to_vec();
        tracing::debug!(queued = snapshot.len(), "Replaying offline queue");

        let mut replayed = 0;
        for entry in snapshot {
            let network = self.state.network();
            if !network.is_connected() {
                tracing::debug!(remaining = network.len(), "Connection lost during replay");
                break;
            }
            if !network.contains(entry.id) {
                tracing::debug!(entry = %entry.id, "Skipping entry dismissed during replay");
                continue;
            }
            self.dispatch_entry(entry)?;
            replayed += 1;
        }
        Ok(replayed)
    }

    /// Get a reference to the current state
    pub fn state(&self) -> &S {
        &self.state
    }

    /// Get a mutable reference to the state
    ///
    /// Use this sparingly - prefer dispatching actions for state changes.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state.network().is_connected()
    }

    /// Queued entries, oldest first
    pub fn queue(&self) -> &[QueuedEntry<A>] {
        self.state.network().action_queue()
    }

    pub fn offline(&self) -> &OfflineMiddleware {
        &self.offline
    }

    /// Mutable access to the offline middleware, e.g. to swap its config
    pub fn offline_mut(&mut self) -> &mut OfflineMiddleware {
        &mut self.offline
    }

    /// Get a reference to the middleware
    pub fn middleware(&self) -> &M {
        &self.middleware
    }

    /// Get a mutable reference to the middleware
    pub fn middleware_mut(&mut self) -> &mut M {
        &mut self.middleware
    }
}

impl<S: HasNetwork<A>, A: Action, M: Middleware<A>> Dispatch<A> for OfflineStore<S, A, M> {
    fn dispatch(&mut self, item: Dispatchable<A>) -> Result<(), ConfigurationError> {
        let changed = OfflineStore::dispatch(self, item)?;
        self.thunk_changed |= changed;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        OfflineStore::is_connected(self)
    }
}

/// Middleware trait for observing forwarded items
///
/// Implement this trait to add logging, persistence, or other
/// cross-cutting concerns to your store.
pub trait Middleware<A: Action> {
    /// Called before the item reaches its reducer (or, for a thunk, runs)
    fn before(&mut self, item: &Forwarded<A>);

    /// Called after the item is processed
    fn after(&mut self, item: &Forwarded<A>, state_changed: bool);
}

/// A no-op middleware that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMiddleware;

impl<A: Action> Middleware<A> for NoopMiddleware {
    fn before(&mut self, _item: &Forwarded<A>) {}
    fn after(&mut self, _item: &Forwarded<A>, _state_changed: bool) {}
}

/// Middleware that logs forwarded items (for debugging)
#[derive(Debug, Clone, Default)]
pub struct LoggingMiddleware {
    /// Whether to log before dispatch
    pub log_before: bool,
    /// Whether to log after dispatch
    pub log_after: bool,
}

impl LoggingMiddleware {
    /// Create a new logging middleware with default settings (log after only)
    pub fn new() -> Self {
        Self {
            log_before: false,
            log_after: true,
        }
    }

    /// Create a logging middleware that logs both before and after
    pub fn verbose() -> Self {
        Self {
            log_before: true,
            log_after: true,
        }
    }
}

impl<A: Action> Middleware<A> for LoggingMiddleware {
    fn before(&mut self, item: &Forwarded<A>) {
        if self.log_before {
            tracing::debug!(action = %item.name(), "Forwarding");
        }
    }

    fn after(&mut self, item: &Forwarded<A>, state_changed: bool) {
        if self.log_after {
            tracing::debug!(
                action = %item.name(),
                state_changed = state_changed,
                "Forwarded item processed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{DynAction, Thunk};
    use crate::queue::NetworkSlice;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct AppState {
        network: NetworkSlice<DynAction>,
        refreshed: u32,
    }

    impl HasNetwork<DynAction> for AppState {
        fn network(&self) -> &NetworkSlice<DynAction> {
            &self.network
        }

        fn network_mut(&mut self) -> &mut NetworkSlice<DynAction> {
            &mut self.network
        }
    }

    fn reducer(state: &mut AppState, action: DynAction) -> bool {
        match action.kind.as_str() {
            "REFRESH_DATA" => {
                state.refreshed += 1;
                true
            }
            _ => false,
        }
    }

    fn store() -> OfflineStore<AppState, DynAction> {
        OfflineStore::new(
            AppState::default(),
            reducer,
            OfflineConfig::new().action_types(["REFRESH_DATA"]),
        )
    }

    #[test]
    fn test_online_dispatch_reaches_reducer() {
        let mut store = store();
        assert!(store.dispatch(DynAction::new("REFRESH_DATA")).unwrap());
        assert_eq!(store.state().refreshed, 1);
        assert!(store.queue().is_empty());
    }

    #[test]
    fn test_offline_dispatch_is_queued_not_reduced() {
        let mut store = store();
        store.set_connected(false).unwrap();

        assert!(store.dispatch(DynAction::new("REFRESH_DATA")).unwrap());
        assert_eq!(store.state().refreshed, 0);
        assert_eq!(store.queue().len(), 1);
    }

    #[test]
    fn test_reconnect_replays_in_order() {
        let mut store = store();
        store.set_connected(false).unwrap();
        store
            .dispatch(DynAction::new("REFRESH_DATA").with_payload(serde_json::json!(1)))
            .unwrap();
        store
            .dispatch(DynAction::new("REFRESH_DATA").with_payload(serde_json::json!(2)))
            .unwrap();

        assert_eq!(store.set_connected(true).unwrap(), 2);
        assert_eq!(store.state().refreshed, 2);
        assert!(store.queue().is_empty());

        // staying connected does not replay again
        assert_eq!(store.set_connected(true).unwrap(), 0);
    }

    #[test]
    fn test_thunk_runs_with_nested_dispatch() {
        let mut store = store();
        let thunk = Thunk::<DynAction>::new("refreshTwice", |dispatch| {
            dispatch.dispatch(DynAction::new("REFRESH_DATA").into())?;
            dispatch.dispatch(DynAction::new("REFRESH_DATA").into())
        });

        assert!(store.dispatch(thunk).unwrap());
        assert_eq!(store.state().refreshed, 2);
    }

    #[test]
    fn test_thunk_reports_change_only_from_its_own_dispatches() {
        let mut store = store();
        let ping = Thunk::<DynAction>::new("ping", |dispatch| {
            dispatch.dispatch(DynAction::new("PING").into())
        });
        assert!(!store.dispatch(ping.clone()).unwrap());

        let outer = Thunk::<DynAction>::new("outer", move |dispatch| {
            dispatch.dispatch(DynAction::new("REFRESH_DATA").into())?;
            dispatch.dispatch(ping.clone().into())
        });
        assert!(store.dispatch(outer).unwrap());
        assert_eq!(store.state().refreshed, 1);
    }

    #[test]
    fn test_thunk_nested_dispatch_is_queued_offline() {
        let mut store = store();
        store.set_connected(false).unwrap();

        let thunk = Thunk::<DynAction>::new("refresh", |dispatch| {
            assert!(!dispatch.is_connected());
            dispatch.dispatch(DynAction::new("REFRESH_DATA").into())
        });
        store.dispatch(thunk).unwrap();
        assert_eq!(store.queue().len(), 1);
        assert_eq!(store.queue()[0].item.name(), "REFRESH_DATA");
    }

    #[test]
    fn test_config_error_aborts_thunk_dispatch() {
        let mut store = store();
        store.offline_mut().config_mut().action_types = Some("REFRESH_DATA".into());

        let thunk = Thunk::<DynAction>::new("refresh", |dispatch| {
            dispatch.dispatch(DynAction::new("REFRESH_DATA").into())
        });
        assert_eq!(store.dispatch(thunk), Err(ConfigurationError::ActionTypes));
    }

    #[derive(Clone, Default)]
    struct CountingMiddleware {
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Middleware<DynAction> for CountingMiddleware {
        fn before(&mut self, item: &Forwarded<DynAction>) {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(format!("before:{}", item.name()));
            }
        }

        fn after(&mut self, item: &Forwarded<DynAction>, _state_changed: bool) {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(format!("after:{}", item.name()));
            }
        }
    }

    #[test]
    fn test_middleware_wraps_each_forwarded_item() {
        let counting = CountingMiddleware::default();
        let seen = Arc::clone(&counting.seen);
        let mut store = OfflineStore::with_middleware(
            AppState::default(),
            reducer,
            OfflineConfig::new(),
            counting,
        );
        store.set_connected(false).unwrap();
        store.dispatch(DynAction::new("FETCH_USER_REQUEST")).unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                "before:CONNECTION_CHANGE",
                "after:CONNECTION_CHANGE",
                "before:FETCH_OFFLINE_MODE",
                "after:FETCH_OFFLINE_MODE"
            ]
        );
    }
}
