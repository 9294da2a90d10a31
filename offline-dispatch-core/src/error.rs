//! Error types for offline-dispatch

use thiserror::Error;

/// A matching configuration field is present but has the wrong shape.
///
/// Raised while a dispatch is being intercepted, before anything is emitted
/// or forwarded. Configuration is re-validated on every dispatch, so fixing
/// the offending field recovers on the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("You should pass an array as actionTypes param")]
    ActionTypes,

    #[error("You should pass a regex as regexActionType param")]
    RegexActionType,

    #[error("You should pass a regex as regexFunctionName param")]
    RegexFunctionName,
}

/// Failure to load an [`OfflineConfig`](crate::OfflineConfig) from JSON.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid regex for {field}: {source}")]
    Regex {
        field: &'static str,
        #[source]
        source: regex::Error,
    },
}
