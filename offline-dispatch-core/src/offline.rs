//! The offline interception pipeline
//!
//! [`OfflineMiddleware::intercept`] runs once per dispatched item and decides
//! what reaches the reducers:
//!
//! 1. Queued entries whose dismiss descriptor names the incoming action type
//!    are dismissed, in queue order.
//! 2. A non-matching item passes through unchanged.
//! 3. A matching item that is being replayed (connected, and its id is still
//!    queued) is removed from the queue, then passes through.
//! 4. A matching item dispatched while connected passes through.
//! 5. A matching item dispatched while disconnected is replaced by an
//!    offline notification, which appends it to the queue.
//!
//! The pipeline is pure with respect to the network state: it only reads it,
//! and returns the directives for the store to apply.

use crate::action::{Action, Dispatchable, Thunk};
use crate::config::OfflineConfig;
use crate::dismiss::resolve_dismissals;
use crate::error::ConfigurationError;
use crate::matcher::matches;
use crate::queue::{EntryId, Envelope, NetworkAction, NetworkState, QueuedEntry};

/// An item passed down the chain to the reducers.
#[derive(Debug, Clone)]
pub enum Forwarded<A: Action> {
    /// Synthesized by the offline layer, reduced into the network slice
    Network(NetworkAction<A>),
    /// Plain action for the application reducer
    Action(A),
    /// Thunk to be run by the store
    Thunk(Thunk<A>),
}

impl<A: Action> Forwarded<A> {
    pub fn name(&self) -> &str {
        match self {
            Forwarded::Network(action) => action.name(),
            Forwarded::Action(action) => action.name(),
            Forwarded::Thunk(thunk) => thunk.name(),
        }
    }
}

impl<A: Action> From<Dispatchable<A>> for Forwarded<A> {
    fn from(item: Dispatchable<A>) -> Self {
        match item {
            Dispatchable::Action(action) => Forwarded::Action(action),
            Dispatchable::Thunk(thunk) => Forwarded::Thunk(thunk),
        }
    }
}

/// Outcome of intercepting one dispatch.
///
/// `directives` are applied before `forward`, and exactly one item is
/// forwarded.
#[derive(Debug, Clone)]
pub struct Interception<A: Action> {
    pub directives: Vec<NetworkAction<A>>,
    pub forward: Forwarded<A>,
}

impl<A: Action> Interception<A> {
    fn pass_through(directives: Vec<NetworkAction<A>>, item: Dispatchable<A>) -> Self {
        Self {
            directives,
            forward: item.into(),
        }
    }

    /// Whether the dispatched item was deferred into the queue.
    pub fn is_deferred(&self) -> bool {
        matches!(
            self.forward,
            Forwarded::Network(NetworkAction::FetchOfflineMode(_))
        )
    }

    /// Directives followed by the forwarded item, in emission order.
    pub fn into_steps(self) -> Vec<Forwarded<A>> {
        let mut steps: Vec<_> = self
            .directives
            .into_iter()
            .map(Forwarded::Network)
            .collect();
        steps.push(self.forward);
        steps
    }
}

/// Decides, per dispatch, between pass-through, enqueue and dismissal.
#[derive(Debug, Clone)]
pub struct OfflineMiddleware {
    config: OfflineConfig,
    next_id: EntryId,
}

impl Default for OfflineMiddleware {
    fn default() -> Self {
        Self::new(OfflineConfig::default())
    }
}

impl OfflineMiddleware {
    pub fn new(config: OfflineConfig) -> Self {
        Self {
            config,
            next_id: EntryId::new(0),
        }
    }

    pub fn config(&self) -> &OfflineConfig {
        &self.config
    }

    /// Configuration is re-validated on every dispatch, so changes made here
    /// apply to the next one.
    pub fn config_mut(&mut self) -> &mut OfflineConfig {
        &mut self.config
    }

    /// Intercept one dispatch against the current network state.
    ///
    /// A configuration error aborts the dispatch: nothing is emitted and
    /// nothing is forwarded.
    pub fn intercept<A, N>(
        &mut self,
        envelope: Envelope<A>,
        network: &N,
    ) -> Result<Interception<A>, ConfigurationError>
    where
        A: Action,
        N: NetworkState<A> + ?Sized,
    {
        let Envelope { id, item } = envelope;

        let is_match = matches(&item, &self.config).inspect_err(|err| {
            tracing::warn!(action = %item.name(), error = %err, "Dispatch rejected");
        })?;

        let queue = network.action_queue();
        let dismissed = resolve_dismissals(&item, queue);
        let mut directives = Vec::with_capacity(dismissed.len() + 1);
        if let Some(action_type) = item.action_type() {
            for entry in &dismissed {
                tracing::debug!(
                    action = %action_type,
                    entry = %entry.id,
                    dismissed = %entry.item.name(),
                    "Dismissing queued entry"
                );
                directives.push(NetworkAction::DismissFromQueue {
                    action_type: action_type.to_string(),
                    id: entry.id,
                });
            }
        }

        if !is_match {
            tracing::trace!(action = %item.name(), "Passing through");
            return Ok(Interception::pass_through(directives, item));
        }

        // a dismissed entry has already left the queue
        let id = id.filter(|id| !dismissed.iter().any(|entry| entry.id == *id));

        if network.is_connected() {
            let queued = id.filter(|id| network.contains(*id));
            if let Some(id) = queued {
                tracing::debug!(action = %item.name(), entry = %id, "Dequeuing replayed entry");
                directives.push(NetworkAction::RemoveFromQueue(id));
            } else {
                tracing::trace!(action = %item.name(), "Online, passing through");
            }
            return Ok(Interception::pass_through(directives, item));
        }

        let id = match id {
            Some(id) => id,
            None => self.allocate_id(queue),
        };
        tracing::debug!(action = %item.name(), entry = %id, "Offline, deferring");
        Ok(Interception {
            directives,
            forward: Forwarded::Network(NetworkAction::FetchOfflineMode(QueuedEntry { id, item })),
        })
    }

    /// Next unused id, skipping past anything already queued.
    fn allocate_id<A: Action>(&mut self, queue: &[QueuedEntry<A>]) -> EntryId {
        if let Some(floor) = queue.iter().map(|entry| entry.id.next()).max() {
            self.next_id = self.next_id.max(floor);
        }
        let id = self.next_id;
        self.next_id = id.next();
        id
    }
}
