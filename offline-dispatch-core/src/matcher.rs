//! Decides whether an action or thunk qualifies for offline handling

use once_cell::sync::Lazy;
use regex::Regex;

use crate::action::{Action, Dispatchable};
use crate::config::OfflineConfig;
use crate::error::ConfigurationError;

/// Pattern used when no matching mode is configured.
pub const DEFAULT_PATTERN: &str = "FETCH.*REQUEST";

static DEFAULT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DEFAULT_PATTERN).unwrap_or_else(|e| panic!("Invalid default regex: {e}"))
});

/// The active matching mode, borrowed from a validated [`OfflineConfig`].
#[derive(Debug, Clone, Copy)]
pub enum Matcher<'a> {
    /// Action type is one of the listed types
    ActionTypes(&'a [String]),
    /// Regex tested against the action type
    ActionType(&'a Regex),
    /// Regex tested against the thunk name
    FunctionName(&'a Regex),
    /// Built-in `FETCH.*REQUEST` pattern
    Default,
}

impl Matcher<'_> {
    /// Test an item against the active mode.
    ///
    /// The type list, the type regex and the default pattern look only at
    /// plain actions; the function-name regex looks only at thunks.
    pub fn matches<A: Action>(&self, item: &Dispatchable<A>) -> bool {
        match (self, item) {
            (Matcher::ActionTypes(types), Dispatchable::Action(action)) => {
                types.iter().any(|t| t == action.name())
            }
            (Matcher::ActionType(regex), Dispatchable::Action(action)) => {
                regex.is_match(action.name())
            }
            (Matcher::FunctionName(regex), Dispatchable::Thunk(thunk)) => {
                regex.is_match(thunk.name())
            }
            (Matcher::Default, Dispatchable::Action(action)) => {
                DEFAULT_REGEX.is_match(action.name())
            }
            _ => false,
        }
    }
}

/// Validate `config` and test `item` against it.
///
/// With [`OfflineConfig::require_retry`] set, a matching item must also carry
/// the retry marker.
pub fn matches<A: Action>(
    item: &Dispatchable<A>,
    config: &OfflineConfig,
) -> Result<bool, ConfigurationError> {
    let matcher = config.matcher()?;
    Ok(matcher.matches(item) && (!config.require_retry || item.retry()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{DynAction, Thunk};

    fn action(kind: &str) -> Dispatchable<DynAction> {
        DynAction::new(kind).into()
    }

    fn thunk(name: &str) -> Dispatchable<DynAction> {
        Thunk::<DynAction>::new(name, |_| Ok(())).into()
    }

    #[test]
    fn test_default_pattern() {
        let config = OfflineConfig::new();
        assert!(matches(&action("FETCH_USER_REQUEST"), &config).unwrap());
        assert!(matches(&action("FETCH_REQUEST"), &config).unwrap());
        assert!(!matches(&action("FETCH_USER_SUCCESS"), &config).unwrap());
        assert!(!matches(&action("NAVIGATE_BACK"), &config).unwrap());
    }

    #[test]
    fn test_action_types() {
        let config = OfflineConfig::new().action_types(["REFRESH_DATA", "FETCH_USER"]);
        assert!(matches(&action("REFRESH_DATA"), &config).unwrap());
        assert!(matches(&action("FETCH_USER"), &config).unwrap());
        assert!(!matches(&action("REFRESH"), &config).unwrap());
        // default pattern is not consulted once a mode is configured
        assert!(!matches(&action("FETCH_USER_REQUEST"), &config).unwrap());
    }

    #[test]
    fn test_empty_action_types_matches_nothing() {
        let config = OfflineConfig::new().action_types(Vec::<String>::new());
        assert!(!matches(&action("FETCH_USER_REQUEST"), &config).unwrap());
    }

    #[test]
    fn test_regex_action_type() {
        let config = OfflineConfig::new().regex_action_type(Regex::new("^REFRESH_").unwrap());
        assert!(matches(&action("REFRESH_DATA"), &config).unwrap());
        assert!(!matches(&action("FETCH_DATA_REQUEST"), &config).unwrap());
    }

    #[test]
    fn test_regex_function_name() {
        let config = OfflineConfig::new().regex_function_name(Regex::new("^fetch").unwrap());
        assert!(matches(&thunk("fetchData"), &config).unwrap());
        assert!(!matches(&thunk("logout"), &config).unwrap());
    }

    #[test]
    fn test_require_retry() {
        let config = OfflineConfig::new().require_retry(true);
        assert!(!matches(&action("FETCH_USER_REQUEST"), &config).unwrap());

        let retried: Dispatchable<DynAction> =
            DynAction::new("FETCH_USER_REQUEST").with_retry(true).into();
        assert!(matches(&retried, &config).unwrap());

        let config = OfflineConfig::new()
            .regex_function_name(Regex::new("^fetch").unwrap())
            .require_retry(true);
        assert!(!matches(&thunk("fetchFeed"), &config).unwrap());
        let retried_thunk: Dispatchable<DynAction> =
            Thunk::<DynAction>::new("fetchFeed", |_| Ok(()))
                .with_retry(true)
                .into();
        assert!(matches(&retried_thunk, &config).unwrap());
    }

    #[test]
    fn test_type_modes_ignore_thunks() {
        let config = OfflineConfig::new().action_types(["REFRESH_DATA"]);
        assert!(!matches(&thunk("REFRESH_DATA"), &config).unwrap());

        let config = OfflineConfig::new().regex_action_type(Regex::new("^REFRESH_").unwrap());
        assert!(!matches(&thunk("REFRESH_DATA"), &config).unwrap());

        assert!(!matches(&thunk("FETCH_USER_REQUEST"), &OfflineConfig::new()).unwrap());
    }

    #[test]
    fn test_function_name_ignores_actions() {
        let config = OfflineConfig::new().regex_function_name(Regex::new("^fetch").unwrap());
        assert!(!matches(&action("fetchSomething"), &config).unwrap());
    }

    #[test]
    fn test_bad_config_fails_for_any_item() {
        let config = OfflineConfig::new().action_types("REFRESH_DATA");
        assert_eq!(
            matches(&action("ANYTHING"), &config),
            Err(ConfigurationError::ActionTypes)
        );
        assert_eq!(
            matches(&thunk("anything"), &config),
            Err(ConfigurationError::ActionTypes)
        );
    }
}
