//! offline-dispatch: Offline action queueing for Redux-style stores
//!
//! Actions that need the network are held in a queue while disconnected and
//! replayed in order when the connection returns. Navigation-style actions
//! can dismiss queued work that no longer makes sense.
//!
//! # Example
//! ```ignore
//! use offline_dispatch::prelude::*;
//!
//! #[derive(Action, Clone, Debug)]
//! enum AppAction {
//!     #[action(dismiss = "NAVIGATE_BACK")]
//!     FetchFeedRequest { page: u32 },
//!     NavigateBack,
//! }
//!
//! let mut store = OfflineStore::new(AppState::default(), reducer, OfflineConfig::new());
//! store.set_connected(false)?;
//! store.dispatch(AppAction::FetchFeedRequest { page: 1 })?; // queued
//! store.dispatch(AppAction::NavigateBack)?;                  // dismisses it
//! ```

// Re-export everything from core
pub use offline_dispatch_core::*;

// Re-export derive macros
pub use offline_dispatch_macros::Action;

/// Prelude for convenient imports
pub mod prelude {
    // Traits
    pub use offline_dispatch_core::{Action, Dispatch, HasNetwork, Middleware, NetworkState};

    // Actions
    pub use offline_dispatch_core::{Dispatchable, DynAction, Thunk};

    // Configuration
    pub use offline_dispatch_core::{ConfigurationError, OfflineConfig};

    // Queue and store
    pub use offline_dispatch_core::{
        watch_connectivity, EntryId, Forwarded, LoggingMiddleware, NetworkAction, NetworkSlice,
        OfflineStore,
    };

    // Derive macros
    pub use offline_dispatch_macros::Action;
}
