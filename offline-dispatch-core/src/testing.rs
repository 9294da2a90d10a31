//! Test utilities for offline-dispatch applications
//!
//! This module provides helpers for testing code built on the offline store:
//!
//! - [`RecordingMiddleware`]: captures every forwarded item in order
//! - [`TestHarness`]: store over a bare [`NetworkSlice`] with recording built in
//! - Assertion macros for verifying forwarded items
//!
//! # Example
//!
//! ```
//! use offline_dispatch_core::testing::TestHarness;
//! use offline_dispatch_core::{DynAction, OfflineConfig};
//!
//! let config = OfflineConfig::new().action_types(["REFRESH_DATA"]);
//! let mut harness = TestHarness::<DynAction>::offline(config);
//! harness.dispatch(DynAction::new("REFRESH_DATA")).unwrap();
//!
//! assert_eq!(harness.forwarded_names(), vec!["FETCH_OFFLINE_MODE"]);
//! assert_eq!(harness.queue().len(), 1);
//! ```

use crate::action::{Action, Dispatchable};
use crate::config::OfflineConfig;
use crate::error::ConfigurationError;
use crate::offline::Forwarded;
use crate::queue::{NetworkSlice, NetworkState, QueuedEntry};
use crate::store::{Middleware, OfflineStore};

/// Middleware that records every forwarded item.
#[derive(Debug)]
pub struct RecordingMiddleware<A: Action> {
    forwarded: Vec<Forwarded<A>>,
}

impl<A: Action> Default for RecordingMiddleware<A> {
    fn default() -> Self {
        Self {
            forwarded: Vec::new(),
        }
    }
}

impl<A: Action> RecordingMiddleware<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything recorded so far.
    pub fn drain(&mut self) -> Vec<Forwarded<A>> {
        std::mem::take(&mut self.forwarded)
    }

    pub fn forwarded(&self) -> &[Forwarded<A>] {
        &self.forwarded
    }
}

impl<A: Action> Middleware<A> for RecordingMiddleware<A> {
    fn before(&mut self, item: &Forwarded<A>) {
        self.forwarded.push(item.clone());
    }

    fn after(&mut self, _item: &Forwarded<A>, _state_changed: bool) {}
}

fn ignore<A: Action>(_state: &mut NetworkSlice<A>, _action: A) -> bool {
    false
}

/// Store type wrapped by [`TestHarness`].
pub type HarnessStore<A> = OfflineStore<NetworkSlice<A>, A, RecordingMiddleware<A>>;

/// Generic test harness for the offline pipeline.
///
/// Wraps an [`OfflineStore`] whose state is just a [`NetworkSlice`], and
/// records what the pipeline forwards so tests can assert on the exact
/// sequence.
pub struct TestHarness<A: Action> {
    store: HarnessStore<A>,
}

impl<A: Action> TestHarness<A> {
    /// Harness that starts connected with an empty queue.
    pub fn new(config: OfflineConfig) -> Self {
        Self::with_network(config, NetworkSlice::new(true))
    }

    /// Harness that starts disconnected with an empty queue.
    pub fn offline(config: OfflineConfig) -> Self {
        Self::with_network(config, NetworkSlice::new(false))
    }

    pub fn with_network(config: OfflineConfig, network: NetworkSlice<A>) -> Self {
        Self {
            store: OfflineStore::with_middleware(
                network,
                ignore::<A>,
                config,
                RecordingMiddleware::new(),
            ),
        }
    }

    pub fn dispatch(
        &mut self,
        item: impl Into<Dispatchable<A>>,
    ) -> Result<bool, ConfigurationError> {
        self.store.dispatch(item)
    }

    pub fn dispatch_entry(&mut self, entry: QueuedEntry<A>) -> Result<bool, ConfigurationError> {
        self.store.dispatch_entry(entry)
    }

    pub fn set_connected(&mut self, connected: bool) -> Result<usize, ConfigurationError> {
        self.store.set_connected(connected)
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_connected()
    }

    pub fn queue(&self) -> &[QueuedEntry<A>] {
        self.store.state().action_queue()
    }

    /// Drain all forwarded items recorded so far.
    pub fn drain_forwarded(&mut self) -> Vec<Forwarded<A>> {
        self.store.middleware_mut().drain()
    }

    /// Drain and return the names of forwarded items.
    pub fn forwarded_names(&mut self) -> Vec<String> {
        self.drain_forwarded()
            .iter()
            .map(|item| item.name().to_string())
            .collect()
    }

    pub fn store(&self) -> &HarnessStore<A> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut HarnessStore<A> {
        &mut self.store
    }
}

/// Assert that a forwarded item matching a pattern was recorded.
///
/// # Example
///
/// ```ignore
/// let forwarded = harness.drain_forwarded();
/// assert_forwarded!(forwarded, Forwarded::Network(NetworkAction::FetchOfflineMode(_)));
/// ```
#[macro_export]
macro_rules! assert_forwarded {
    ($forwarded:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            $forwarded.iter().any(|f| matches!(f, $pattern $(if $guard)?)),
            "Expected item matching `{}` to be forwarded, but got: {:?}",
            stringify!($pattern),
            $forwarded
        );
    };
}

/// Assert that NO forwarded item matches a pattern.
///
/// # Example
///
/// ```ignore
/// let forwarded = harness.drain_forwarded();
/// assert_not_forwarded!(forwarded, Forwarded::Network(NetworkAction::RemoveFromQueue(_)));
/// ```
#[macro_export]
macro_rules! assert_not_forwarded {
    ($forwarded:expr, $pattern:pat $(if $guard:expr)?) => {
        assert!(
            !$forwarded.iter().any(|f| matches!(f, $pattern $(if $guard)?)),
            "Expected item matching `{}` NOT to be forwarded, but it was: {:?}",
            stringify!($pattern),
            $forwarded
        );
    };
}

/// Find and return the first forwarded item matching a pattern.
#[macro_export]
macro_rules! find_forwarded {
    ($forwarded:expr, $pattern:pat $(if $guard:expr)?) => {
        $forwarded.iter().find(|f| matches!(f, $pattern $(if $guard)?))
    };
}

/// Count how many forwarded items match a pattern.
#[macro_export]
macro_rules! count_forwarded {
    ($forwarded:expr, $pattern:pat $(if $guard:expr)?) => {
        $forwarded.iter().filter(|f| matches!(f, $pattern $(if $guard)?)).count()
    };
}
