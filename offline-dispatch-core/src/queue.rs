//! Network slice: connectivity flag plus the queue of deferred items
//!
//! The store owns this state; the middleware only reads it through
//! [`NetworkState`]. It changes exclusively by reducing [`NetworkAction`]s.

use std::fmt;

use crate::action::{Action, Dispatchable};

/// Stable handle for a queued entry, assigned at enqueue time.
///
/// Queue membership, removal and replay recognition all compare ids, never
/// the contents of the queued item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntryId(u64);

impl EntryId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }

    /// The following id. Saturates at `u64::MAX`.
    pub fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A deferred action or thunk with its queue id.
#[derive(Debug, Clone)]
pub struct QueuedEntry<A: Action> {
    pub id: EntryId,
    pub item: Dispatchable<A>,
}

/// An item entering the offline pipeline.
///
/// Fresh dispatches carry no id. Replayed entries carry the id they were
/// queued with, which is how the pipeline recognises them.
#[derive(Debug, Clone)]
pub struct Envelope<A: Action> {
    pub id: Option<EntryId>,
    pub item: Dispatchable<A>,
}

impl<A: Action> Envelope<A> {
    pub fn fresh(item: Dispatchable<A>) -> Self {
        Self { id: None, item }
    }
}

impl<A: Action> From<Dispatchable<A>> for Envelope<A> {
    fn from(item: Dispatchable<A>) -> Self {
        Self::fresh(item)
    }
}

impl<A: Action> From<QueuedEntry<A>> for Envelope<A> {
    fn from(entry: QueuedEntry<A>) -> Self {
        Self {
            id: Some(entry.id),
            item: entry.item,
        }
    }
}

/// Actions synthesized by the offline layer.
#[derive(Debug, Clone)]
pub enum NetworkAction<A: Action> {
    /// Connectivity changed
    ConnectionChange { is_connected: bool },
    /// Offline notification: the wrapped item was deferred and joins the queue
    FetchOfflineMode(QueuedEntry<A>),
    /// A queued entry is being replayed and leaves the queue
    RemoveFromQueue(EntryId),
    /// A queued entry was invalidated by a dispatch of `action_type`
    DismissFromQueue { action_type: String, id: EntryId },
}

impl<A: Action> NetworkAction<A> {
    pub fn name(&self) -> &'static str {
        match self {
            NetworkAction::ConnectionChange { .. } => "CONNECTION_CHANGE",
            NetworkAction::FetchOfflineMode(_) => "FETCH_OFFLINE_MODE",
            NetworkAction::RemoveFromQueue(_) => "REMOVE_FROM_ACTION_QUEUE",
            NetworkAction::DismissFromQueue { .. } => "DISMISS_ACTIONS_FROM_QUEUE",
        }
    }
}

/// Read-only view of connectivity and the action queue.
pub trait NetworkState<A: Action> {
    fn is_connected(&self) -> bool;

    /// Queued entries, oldest first.
    fn action_queue(&self) -> &[QueuedEntry<A>];

    fn contains(&self, id: EntryId) -> bool {
        self.action_queue().iter().any(|entry| entry.id == id)
    }
}

/// Stock network state and its reducer.
#[derive(Debug, Clone)]
pub struct NetworkSlice<A: Action> {
    is_connected: bool,
    action_queue: Vec<QueuedEntry<A>>,
}

impl<A: Action> Default for NetworkSlice<A> {
    fn default() -> Self {
        Self::new(true)
    }
}

impl<A: Action> NetworkSlice<A> {
    pub fn new(is_connected: bool) -> Self {
        Self {
            is_connected,
            action_queue: Vec::new(),
        }
    }

    /// Start from a previously saved queue.
    pub fn with_queue(is_connected: bool, action_queue: Vec<QueuedEntry<A>>) -> Self {
        Self {
            is_connected,
            action_queue,
        }
    }

    pub fn len(&self) -> usize {
        self.action_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.action_queue.is_empty()
    }

    /// Apply a network action. Returns `true` if the slice changed.
    pub fn reduce(&mut self, action: &NetworkAction<A>) -> bool {
        match action {
            NetworkAction::ConnectionChange { is_connected } => {
                let changed = self.is_connected != *is_connected;
                self.is_connected = *is_connected;
                changed
            }
            NetworkAction::FetchOfflineMode(entry) => {
                // an entry deferred again moves to the tail instead of duplicating
                self.remove(entry.id);
                self.action_queue.push(entry.clone());
                true
            }
            NetworkAction::RemoveFromQueue(id) => self.remove(*id),
            NetworkAction::DismissFromQueue { id, .. } => self.remove(*id),
        }
    }

    fn remove(&mut self, id: EntryId) -> bool {
        let before = self.action_queue.len();
        self.action_queue.retain(|entry| entry.id != id);
        self.action_queue.len() != before
    }
}

impl<A: Action> NetworkState<A> for NetworkSlice<A> {
    fn is_connected(&self) -> bool {
        self.is_connected
    }

    fn action_queue(&self) -> &[QueuedEntry<A>] {
        &self.action_queue
    }
}

/// Application state that embeds a [`NetworkSlice`].
pub trait HasNetwork<A: Action> {
    fn network(&self) -> &NetworkSlice<A>;
    fn network_mut(&mut self) -> &mut NetworkSlice<A>;
}

impl<A: Action> HasNetwork<A> for NetworkSlice<A> {
    fn network(&self) -> &NetworkSlice<A> {
        self
    }

    fn network_mut(&mut self) -> &mut NetworkSlice<A> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::DynAction;

    fn entry(id: u64, kind: &str) -> QueuedEntry<DynAction> {
        QueuedEntry {
            id: EntryId::new(id),
            item: DynAction::new(kind).into(),
        }
    }

    fn ids(slice: &NetworkSlice<DynAction>) -> Vec<u64> {
        slice.action_queue().iter().map(|e| e.id.get()).collect()
    }

    #[test]
    fn test_entry_id_next_saturates() {
        assert_eq!(EntryId::new(7).next(), EntryId::new(8));
        assert_eq!(EntryId::new(u64::MAX).next(), EntryId::new(u64::MAX));
    }

    #[test]
    fn test_default_is_connected_and_empty() {
        let slice = NetworkSlice::<DynAction>::default();
        assert!(slice.is_connected());
        assert!(slice.is_empty());
    }

    #[test]
    fn test_connection_change() {
        let mut slice = NetworkSlice::<DynAction>::new(true);
        assert!(slice.reduce(&NetworkAction::ConnectionChange {
            is_connected: false
        }));
        assert!(!slice.is_connected());
        assert!(!slice.reduce(&NetworkAction::ConnectionChange {
            is_connected: false
        }));
    }

    #[test]
    fn test_offline_mode_appends_in_order() {
        let mut slice = NetworkSlice::new(false);
        slice.reduce(&NetworkAction::FetchOfflineMode(entry(1, "A")));
        slice.reduce(&NetworkAction::FetchOfflineMode(entry(2, "B")));
        assert_eq!(ids(&slice), vec![1, 2]);
    }

    #[test]
    fn test_requeue_same_id_moves_to_tail() {
        let mut slice = NetworkSlice::new(false);
        slice.reduce(&NetworkAction::FetchOfflineMode(entry(1, "A")));
        slice.reduce(&NetworkAction::FetchOfflineMode(entry(2, "B")));
        slice.reduce(&NetworkAction::FetchOfflineMode(entry(1, "A")));
        assert_eq!(ids(&slice), vec![2, 1]);
    }

    #[test]
    fn test_structurally_equal_entries_are_distinct() {
        let mut slice = NetworkSlice::new(false);
        slice.reduce(&NetworkAction::FetchOfflineMode(entry(1, "A")));
        slice.reduce(&NetworkAction::FetchOfflineMode(entry(2, "A")));
        assert_eq!(slice.len(), 2);

        assert!(slice.reduce(&NetworkAction::RemoveFromQueue(EntryId::new(1))));
        assert_eq!(ids(&slice), vec![2]);
    }

    #[test]
    fn test_remove_and_dismiss_by_id() {
        let mut slice = NetworkSlice::with_queue(true, vec![entry(1, "A"), entry(2, "B")]);
        assert!(slice.contains(EntryId::new(2)));

        assert!(slice.reduce(&NetworkAction::DismissFromQueue {
            action_type: "NAVIGATE_BACK".into(),
            id: EntryId::new(2),
        }));
        assert!(!slice.contains(EntryId::new(2)));

        // removing an absent entry is a no-op
        assert!(!slice.reduce(&NetworkAction::RemoveFromQueue(EntryId::new(2))));
        assert_eq!(ids(&slice), vec![1]);
    }

    #[test]
    fn test_network_action_names() {
        let action: NetworkAction<DynAction> = NetworkAction::RemoveFromQueue(EntryId::new(3));
        assert_eq!(action.name(), "REMOVE_FROM_ACTION_QUEUE");
        assert_eq!(EntryId::new(3).to_string(), "#3");
    }
}
