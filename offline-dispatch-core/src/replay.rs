//! Replay of the offline queue when connectivity returns
//!
//! [`ReplayTrigger`] turns a stream of connectivity observations into
//! "replay now" signals, firing once per disconnected to connected
//! transition. [`OfflineStore::set_connected`] uses it to drain the queue;
//! [`watch_connectivity`] feeds the store from a tokio watch channel.
//!
//! # Example
//!
//! ```ignore
//! let (tx, rx) = tokio::sync::watch::channel(true);
//! let cancel = CancellationToken::new();
//!
//! // Whatever detects reachability sends on `tx`
//! spawn_reachability_probe(tx);
//!
//! watch_connectivity(&mut store, rx, cancel.clone()).await?;
//! ```

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::action::Action;
use crate::error::ConfigurationError;
use crate::queue::HasNetwork;
use crate::store::{Middleware, OfflineStore};

/// Detects disconnected to connected transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplayTrigger {
    connected: bool,
}

impl ReplayTrigger {
    /// Start from the currently known connectivity.
    pub fn new(connected: bool) -> Self {
        Self { connected }
    }

    /// Record an observation. Returns `true` exactly when it reconnects.
    pub fn observe(&mut self, connected: bool) -> bool {
        let reconnected = connected && !self.connected;
        self.connected = connected;
        reconnected
    }

    pub fn connected(&self) -> bool {
        self.connected
    }
}

/// Drive a store's connectivity from a watch channel.
///
/// The current value is applied immediately, then every change, until the
/// token is cancelled or the sender is dropped. Each reconnect replays the
/// queue; a configuration error during replay stops the loop.
pub async fn watch_connectivity<S, A, M>(
    store: &mut OfflineStore<S, A, M>,
    mut changes: watch::Receiver<bool>,
    cancel: CancellationToken,
) -> Result<(), ConfigurationError>
where
    S: HasNetwork<A>,
    A: Action,
    M: Middleware<A>,
{
    let initial = *changes.borrow_and_update();
    store.set_connected(initial)?;

    loop {
        tokio::select! {
            biased;
            changed = changes.changed() => {
                if changed.is_err() {
                    tracing::debug!("Connectivity sender closed");
                    break;
                }
                let connected = *changes.borrow_and_update();
                let replayed = store.set_connected(connected)?;
                if replayed > 0 {
                    tracing::debug!(replayed, "Replayed offline queue after reconnect");
                }
            }
            _ = cancel.cancelled() => {
                tracing::debug!("Connectivity watch cancelled");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_reconnect() {
        let mut trigger = ReplayTrigger::new(true);
        assert!(!trigger.observe(true));
        assert!(!trigger.observe(false));
        assert!(!trigger.observe(false));
        assert!(trigger.observe(true));
        assert!(!trigger.observe(true));
        assert!(!trigger.observe(false));
        assert!(trigger.observe(true));
    }

    #[test]
    fn test_starting_offline() {
        let mut trigger = ReplayTrigger::new(false);
        assert!(!trigger.connected());
        assert!(trigger.observe(true));
        assert!(trigger.connected());
    }
}
