//! Core traits and types for offline-dispatch
//!
//! This crate sits between a Redux-style store's dispatch and its reducers,
//! and decides per action whether it runs now, waits in an offline queue, or
//! invalidates entries already waiting there.
//!
//! # Core Concepts
//!
//! - **Action**: Plain data events; [`DynAction`] for string-typed actions
//! - **Thunk**: Named deferred computation that can dispatch further actions
//! - **OfflineConfig**: Which actions qualify for queueing
//! - **OfflineMiddleware**: Per-dispatch decision: pass, enqueue, dismiss, dequeue
//! - **NetworkSlice**: Connectivity flag plus the queue, changed only by reducing [`NetworkAction`]s
//! - **OfflineStore**: State container that wires it all together and replays on reconnect
//!
//! # Basic Example
//!
//! ```
//! use offline_dispatch_core::prelude::*;
//!
//! #[derive(Default)]
//! struct AppState {
//!     network: NetworkSlice<DynAction>,
//!     refreshes: u32,
//! }
//!
//! impl HasNetwork<DynAction> for AppState {
//!     fn network(&self) -> &NetworkSlice<DynAction> { &self.network }
//!     fn network_mut(&mut self) -> &mut NetworkSlice<DynAction> { &mut self.network }
//! }
//!
//! fn reducer(state: &mut AppState, action: DynAction) -> bool {
//!     match action.kind.as_str() {
//!         "REFRESH_DATA" => { state.refreshes += 1; true }
//!         _ => false,
//!     }
//! }
//!
//! let config = OfflineConfig::new().action_types(["REFRESH_DATA"]);
//! let mut store = OfflineStore::new(AppState::default(), reducer, config);
//!
//! store.set_connected(false).unwrap();
//! store.dispatch(DynAction::new("REFRESH_DATA")).unwrap();
//! assert_eq!(store.state().refreshes, 0);
//! assert_eq!(store.queue().len(), 1);
//!
//! store.set_connected(true).unwrap();
//! assert_eq!(store.state().refreshes, 1);
//! assert!(store.queue().is_empty());
//! ```
//!
//! # Dismissal
//!
//! A queued action can name action types that make it obsolete. When one of
//! those is dispatched, the queued entry is dropped before the dispatched
//! action itself is handled:
//!
//! ```ignore
//! let fetch = DynAction::new("FETCH_FEED_REQUEST").with_dismiss(["NAVIGATE_BACK"]);
//! store.dispatch(fetch)?;                          // offline: queued
//! store.dispatch(DynAction::new("NAVIGATE_BACK"))?; // dismisses it, then runs
//! ```

pub mod action;
pub mod config;
pub mod dismiss;
pub mod error;
pub mod matcher;
pub mod offline;
pub mod queue;
pub mod replay;
pub mod store;
pub mod testing;

// Core trait exports
pub use action::{Action, ActionMeta, Dispatch, Dispatchable, DynAction, Thunk, ThunkFn};

// Configuration and errors
pub use config::{ConfigValue, OfflineConfig};
pub use error::{ConfigurationError, LoadError};

// Decision logic
pub use dismiss::resolve_dismissals;
pub use matcher::{matches, Matcher, DEFAULT_PATTERN};
pub use offline::{Forwarded, Interception, OfflineMiddleware};

// Queue state
pub use queue::{
    EntryId, Envelope, HasNetwork, NetworkAction, NetworkSlice, NetworkState, QueuedEntry,
};

// Store exports
pub use replay::{watch_connectivity, ReplayTrigger};
pub use store::{LoggingMiddleware, Middleware, NoopMiddleware, OfflineStore, Reducer};

// Testing exports
pub use testing::{HarnessStore, RecordingMiddleware, TestHarness};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::action::{Action, Dispatch, Dispatchable, DynAction, Thunk};
    pub use crate::config::OfflineConfig;
    pub use crate::error::ConfigurationError;
    pub use crate::offline::Forwarded;
    pub use crate::queue::{EntryId, HasNetwork, NetworkAction, NetworkSlice, NetworkState};
    pub use crate::replay::watch_connectivity;
    pub use crate::store::{LoggingMiddleware, Middleware, OfflineStore};
}
