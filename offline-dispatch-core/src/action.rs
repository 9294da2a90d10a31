//! Action and thunk types that flow through the offline pipeline

use std::fmt::{self, Debug};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Trait for plain data actions that can be dispatched to the store
///
/// Actions should be:
/// - Clone: queued actions are replayed from a snapshot of the queue
/// - Debug: for debugging and logging
/// - Send + 'static: for async dispatch across threads
///
/// Use `#[derive(Action)]` from `offline-dispatch-macros` to auto-implement this trait.
pub trait Action: Clone + Debug + Send + 'static {
    /// The action type, tested by the matcher and the dismiss resolver
    fn name(&self) -> &str;

    /// Whether this action asked to be retried once connectivity returns
    fn retry(&self) -> bool {
        false
    }

    /// Whether dispatching an action of `action_type` drops this action from the queue
    fn dismissed_by(&self, action_type: &str) -> bool {
        let _ = action_type;
        false
    }
}

/// Something a thunk can dispatch into.
///
/// Implemented by [`OfflineStore`](crate::OfflineStore), so nested dispatches
/// go back through the offline middleware.
pub trait Dispatch<A: Action> {
    /// Dispatch an action or thunk through the full pipeline.
    fn dispatch(&mut self, item: Dispatchable<A>) -> Result<(), ConfigurationError>;

    /// Current connectivity as seen by the store.
    fn is_connected(&self) -> bool;
}

/// Body of a [`Thunk`].
pub type ThunkFn<A> =
    dyn Fn(&mut dyn Dispatch<A>) -> Result<(), ConfigurationError> + Send + Sync + 'static;

/// A named unit of deferred work
///
/// The body is shared, so cloning a thunk into the queue is cheap and every
/// clone runs the same computation.
pub struct Thunk<A: Action> {
    name: String,
    retry: bool,
    dismiss: Vec<String>,
    body: Arc<ThunkFn<A>>,
}

impl<A: Action> Thunk<A> {
    /// Create a thunk with the given name and body.
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(&mut dyn Dispatch<A>) -> Result<(), ConfigurationError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            retry: false,
            dismiss: Vec::new(),
            body: Arc::new(body),
        }
    }

    /// Mark the thunk for retry.
    pub fn with_retry(mut self, retry: bool) -> Self {
        self.retry = retry;
        self
    }

    /// Action types that drop this thunk from the queue when dispatched.
    pub fn with_dismiss<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.dismiss = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn retry(&self) -> bool {
        self.retry
    }

    pub fn dismiss(&self) -> &[String] {
        &self.dismiss
    }

    /// Run the thunk body against a dispatcher.
    pub fn run(&self, dispatch: &mut dyn Dispatch<A>) -> Result<(), ConfigurationError> {
        (self.body)(dispatch)
    }

    /// Whether two thunks share the same body.
    pub fn same_body(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.body, &other.body)
    }
}

impl<A: Action> Clone for Thunk<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            retry: self.retry,
            dismiss: self.dismiss.clone(),
            body: Arc::clone(&self.body),
        }
    }
}

impl<A: Action> Debug for Thunk<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thunk")
            .field("name", &self.name)
            .field("retry", &self.retry)
            .field("dismiss", &self.dismiss)
            .finish_non_exhaustive()
    }
}

/// Either a plain action or a thunk.
#[derive(Clone, Debug)]
pub enum Dispatchable<A: Action> {
    Action(A),
    Thunk(Thunk<A>),
}

impl<A: Action> Dispatchable<A> {
    /// Wrap a plain action.
    pub fn action(action: A) -> Self {
        Self::Action(action)
    }

    /// Wrap a thunk.
    pub fn thunk(thunk: Thunk<A>) -> Self {
        Self::Thunk(thunk)
    }

    /// The action type, or the thunk name.
    pub fn name(&self) -> &str {
        match self {
            Self::Action(action) => action.name(),
            Self::Thunk(thunk) => thunk.name(),
        }
    }

    pub fn retry(&self) -> bool {
        match self {
            Self::Action(action) => action.retry(),
            Self::Thunk(thunk) => thunk.retry(),
        }
    }

    /// Whether dispatching `action_type` should drop this item from the queue.
    pub fn dismissed_by(&self, action_type: &str) -> bool {
        match self {
            Self::Action(action) => action.dismissed_by(action_type),
            Self::Thunk(thunk) => thunk.dismiss().iter().any(|t| t == action_type),
        }
    }

    /// The action type this item dismisses with, if it is a plain action.
    ///
    /// Thunks have no type, so they never dismiss queued entries.
    pub fn action_type(&self) -> Option<&str> {
        match self {
            Self::Action(action) => Some(action.name()),
            Self::Thunk(_) => None,
        }
    }

    pub fn is_thunk(&self) -> bool {
        matches!(self, Self::Thunk(_))
    }
}

impl<A: Action> From<Thunk<A>> for Dispatchable<A> {
    fn from(thunk: Thunk<A>) -> Self {
        Self::Thunk(thunk)
    }
}

/// Offline metadata carried by a [`DynAction`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionMeta {
    #[serde(default)]
    pub retry: bool,
    #[serde(default)]
    pub dismiss: Vec<String>,
}

/// A string-typed action with a JSON payload
///
/// For apps that describe actions as `{ "type": ..., "payload": ..., "meta": ... }`
/// rather than as an enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynAction {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
    #[serde(default)]
    pub meta: ActionMeta,
}

impl DynAction {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: serde_json::Value::Null,
            meta: ActionMeta::default(),
        }
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_retry(mut self, retry: bool) -> Self {
        self.meta.retry = retry;
        self
    }

    pub fn with_dismiss<I, T>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.meta.dismiss = types.into_iter().map(Into::into).collect();
        self
    }
}

impl Action for DynAction {
    fn name(&self) -> &str {
        &self.kind
    }

    fn retry(&self) -> bool {
        self.meta.retry
    }

    fn dismissed_by(&self, action_type: &str) -> bool {
        self.meta.dismiss.iter().any(|t| t == action_type)
    }
}

impl From<DynAction> for Dispatchable<DynAction> {
    fn from(action: DynAction) -> Self {
        Self::Action(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_dyn_action_from_json() {
        let action: DynAction = serde_json::from_value(json!({
            "type": "FETCH_USER_REQUEST",
            "payload": { "id": 7 },
            "meta": { "retry": true, "dismiss": ["NAVIGATE_BACK"] }
        }))
        .unwrap();

        assert_eq!(action.name(), "FETCH_USER_REQUEST");
        assert!(action.retry());
        assert!(action.dismissed_by("NAVIGATE_BACK"));
        assert!(!action.dismissed_by("LOGOUT"));
        assert_eq!(action.payload["id"], 7);
    }

    #[test]
    fn test_dyn_action_meta_defaults() {
        let action: DynAction = serde_json::from_value(json!({ "type": "PING" })).unwrap();
        assert!(!action.retry());
        assert!(action.meta.dismiss.is_empty());
        assert!(action.payload.is_null());
    }

    #[test]
    fn test_thunk_metadata() {
        let thunk: Thunk<DynAction> = Thunk::new("fetchData", |_| Ok(()))
            .with_retry(true)
            .with_dismiss(["NAVIGATE_BACK"]);
        let item = Dispatchable::from(thunk.clone());

        assert_eq!(item.name(), "fetchData");
        assert!(item.retry());
        assert!(item.dismissed_by("NAVIGATE_BACK"));
        assert_eq!(item.action_type(), None);
        assert!(item.is_thunk());

        match item {
            Dispatchable::Thunk(cloned) => assert!(cloned.same_body(&thunk)),
            Dispatchable::Action(_) => panic!("expected a thunk"),
        }
    }

    #[test]
    fn test_action_has_type() {
        let item = Dispatchable::from(DynAction::new("NAVIGATE_BACK"));
        assert_eq!(item.action_type(), Some("NAVIGATE_BACK"));
        assert!(!item.is_thunk());
    }
}
