//! Matching configuration for the offline middleware
//!
//! At most one of `action_types`, `regex_action_type` and
//! `regex_function_name` should be set. Fields hold a loosely typed
//! [`ConfigValue`] so that a config loaded from JSON can carry a value of
//! the wrong shape; the shape is checked on every dispatch by
//! [`OfflineConfig::matcher`].
//!
//! # Example
//!
//! ```
//! use offline_dispatch_core::OfflineConfig;
//!
//! let config = OfflineConfig::new().action_types(["REFRESH_DATA"]);
//! assert!(config.matcher().is_ok());
//!
//! let config = OfflineConfig::from_json_str(r#"{ "regexActionType": { "regex": "^FETCH_" } }"#)
//!     .unwrap();
//! assert!(config.matcher().is_ok());
//! ```

use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::{ConfigurationError, LoadError};
use crate::matcher::Matcher;

/// A configuration field value.
#[derive(Debug, Clone)]
pub enum ConfigValue {
    /// Ordered list of action type strings
    List(Vec<String>),
    /// Compiled regular expression
    Regex(Regex),
    /// A bare string
    Text(String),
    /// Anything else (numbers, objects, mixed arrays)
    Other(Value),
}

impl ConfigValue {
    fn from_json(field: &'static str, value: Value) -> Result<Self, LoadError> {
        match value {
            Value::String(s) => Ok(Self::Text(s)),
            Value::Array(items) if items.iter().all(Value::is_string) => Ok(Self::List(
                items
                    .into_iter()
                    .filter_map(|v| match v {
                        Value::String(s) => Some(s),
                        _ => None,
                    })
                    .collect(),
            )),
            Value::Object(map) if map.len() == 1 => {
                let pattern = map.get("regex").and_then(Value::as_str).map(str::to_string);
                match pattern {
                    Some(pattern) => Regex::new(&pattern)
                        .map(Self::Regex)
                        .map_err(|source| LoadError::Regex { field, source }),
                    None => Ok(Self::Other(Value::Object(map))),
                }
            }
            other => Ok(Self::Other(other)),
        }
    }
}

impl From<Regex> for ConfigValue {
    fn from(regex: Regex) -> Self {
        Self::Regex(regex)
    }
}

impl From<&str> for ConfigValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for ConfigValue {
    fn from(list: Vec<String>) -> Self {
        Self::List(list)
    }
}

impl From<Vec<&str>> for ConfigValue {
    fn from(list: Vec<&str>) -> Self {
        Self::List(list.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ConfigValue {
    fn from(list: [&str; N]) -> Self {
        Self::List(list.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        Self::Other(value)
    }
}

/// Configuration for [`OfflineMiddleware`](crate::OfflineMiddleware).
#[derive(Debug, Clone, Default)]
pub struct OfflineConfig {
    /// Queue items whose name is in this list
    pub action_types: Option<ConfigValue>,
    /// Queue items whose action type matches this regex
    pub regex_action_type: Option<ConfigValue>,
    /// Queue thunks whose name matches this regex
    pub regex_function_name: Option<ConfigValue>,
    /// Only queue items that carry the retry marker
    pub require_retry: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawConfig {
    action_types: Option<Value>,
    regex_action_type: Option<Value>,
    regex_function_name: Option<Value>,
    #[serde(default)]
    require_retry: bool,
}

impl OfflineConfig {
    /// Default configuration: match the built-in `FETCH.*REQUEST` pattern.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn action_types(mut self, value: impl Into<ConfigValue>) -> Self {
        self.action_types = Some(value.into());
        self
    }

    pub fn regex_action_type(mut self, value: impl Into<ConfigValue>) -> Self {
        self.regex_action_type = Some(value.into());
        self
    }

    pub fn regex_function_name(mut self, value: impl Into<ConfigValue>) -> Self {
        self.regex_function_name = Some(value.into());
        self
    }

    pub fn require_retry(mut self, require_retry: bool) -> Self {
        self.require_retry = require_retry;
        self
    }

    /// Parse a config from JSON with camelCase keys.
    ///
    /// Regexes are written as `{ "regex": "pattern" }`. Values of the wrong
    /// shape load fine and fail later, at dispatch time.
    pub fn from_json_str(json: &str) -> Result<Self, LoadError> {
        let raw: RawConfig = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Read and parse a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    fn from_raw(raw: RawConfig) -> Result<Self, LoadError> {
        let field = |name: &'static str, value: Option<Value>| {
            value
                .filter(|v| !v.is_null())
                .map(|v| ConfigValue::from_json(name, v))
                .transpose()
        };

        Ok(Self {
            action_types: field("actionTypes", raw.action_types)?,
            regex_action_type: field("regexActionType", raw.regex_action_type)?,
            regex_function_name: field("regexFunctionName", raw.regex_function_name)?,
            require_retry: raw.require_retry,
        })
    }

    /// Validate the configuration and select the active matching mode.
    ///
    /// The first configured field wins, in the order `action_types`,
    /// `regex_action_type`, `regex_function_name`; with none set the
    /// default pattern is used.
    pub fn matcher(&self) -> Result<Matcher<'_>, ConfigurationError> {
        if let Some(value) = &self.action_types {
            return match value {
                ConfigValue::List(types) => Ok(Matcher::ActionTypes(types)),
                _ => Err(ConfigurationError::ActionTypes),
            };
        }

        if let Some(value) = &self.regex_action_type {
            return match value {
                ConfigValue::Regex(regex) => Ok(Matcher::ActionType(regex)),
                _ => Err(ConfigurationError::RegexActionType),
            };
        }

        if let Some(value) = &self.regex_function_name {
            return match value {
                ConfigValue::Regex(regex) => Ok(Matcher::FunctionName(regex)),
                _ => Err(ConfigurationError::RegexFunctionName),
            };
        }

        Ok(Matcher::Default)
    }
}
