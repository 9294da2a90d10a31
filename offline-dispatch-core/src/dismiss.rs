//! Finds queued entries invalidated by an incoming dispatch

use crate::action::{Action, Dispatchable};
use crate::queue::QueuedEntry;

/// Queued entries whose dismiss descriptor names the incoming action's type.
///
/// Returned in queue order. Thunks carry no action type, so an incoming
/// thunk never dismisses anything.
pub fn resolve_dismissals<'q, A: Action>(
    incoming: &Dispatchable<A>,
    queue: &'q [QueuedEntry<A>],
) -> Vec<&'q QueuedEntry<A>> {
    let Some(action_type) = incoming.action_type() else {
        return Vec::new();
    };

    queue
        .iter()
        .filter(|entry| entry.item.dismissed_by(action_type))
        .collect()
}
