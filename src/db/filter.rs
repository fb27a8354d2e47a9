//! Query filters.
//!
//! A filter is a caller-supplied transformation registered against a hook
//! point. The executor runs the `Query` hook over the SQL text before the
//! statement is prepared.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::DbError;

/// A registered transformation.
pub type Filter = Box<dyn Fn(String) -> String + Send>;

/// Points in query processing where a filter can be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HookPoint {
    /// Rewrites the SQL text before preparation
    Query,
}

impl HookPoint {
    pub fn name(self) -> &'static str {
        match self {
            HookPoint::Query => "query",
        }
    }
}

impl fmt::Display for HookPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HookPoint {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" => Ok(HookPoint::Query),
            other => Err(DbError::Config {
                message: format!("unknown filter hook '{}'", other),
            }),
        }
    }
}

/// Filters keyed by hook point.
///
/// An entry may hold a disabled marker, which reads the same as no filter.
#[derive(Default)]
pub struct FilterRegistry {
    filters: BTreeMap<HookPoint, Option<Filter>>,
}

impl FilterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `filter` for `hook`, replacing any previous entry.
    pub fn register_filter<F>(&mut self, hook: HookPoint, filter: F)
    where
        F: Fn(String) -> String + Send + 'static,
    {
        self.filters.insert(hook, Some(Box::new(filter)));
    }

    /// Replace the entry for `hook` with a disabled marker.
    pub fn disable_filter(&mut self, hook: HookPoint) {
        self.filters.insert(hook, None);
    }

    /// Remove the entry for `hook` entirely.
    pub fn unregister_filter(&mut self, hook: HookPoint) {
        self.filters.remove(&hook);
    }

    /// True iff an enabled filter is registered for `hook`.
    pub fn has_filter(&self, hook: HookPoint) -> bool {
        matches!(self.filters.get(&hook), Some(Some(_)))
    }

    /// Run the filter for `hook` over `value`.
    ///
    /// # Errors
    /// `DbError::FilterNotRegistered` if no enabled filter exists for `hook`.
    pub fn apply_filter(&self, hook: HookPoint, value: String) -> Result<String, DbError> {
        match self.filters.get(&hook) {
            Some(Some(filter)) => Ok(filter(value)),
            _ => Err(DbError::FilterNotRegistered { hook }),
        }
    }

    /// Run the filter for `hook` if one is enabled, otherwise return `value` unchanged.
    pub fn apply_if_present(&self, hook: HookPoint, value: String) -> String {
        match self.filters.get(&hook) {
            Some(Some(filter)) => filter(value),
            _ => value,
        }
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (hook, filter) in &self.filters {
            map.entry(hook, &if filter.is_some() { "enabled" } else { "disabled" });
        }
        map.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limit_one(sql: String) -> String {
        format!("{} LIMIT 1", sql)
    }

    #[test]
    fn test_empty_registry_has_no_filter() {
        let registry = FilterRegistry::new();
        assert!(!registry.has_filter(HookPoint::Query));
    }

    #[test]
    fn test_register_and_apply() {
        let mut registry = FilterRegistry::new();
        registry.register_filter(HookPoint::Query, limit_one);
        assert!(registry.has_filter(HookPoint::Query));
        let out = registry
            .apply_filter(HookPoint::Query, "SELECT * FROM users".to_string())
            .unwrap();
        assert_eq!(out, "SELECT * FROM users LIMIT 1");
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = FilterRegistry::new();
        registry.register_filter(HookPoint::Query, limit_one);
        registry.register_filter(HookPoint::Query, |sql: String| sql.to_lowercase());
        let out = registry.apply_filter(HookPoint::Query, "SELECT 1".to_string()).unwrap();
        assert_eq!(out, "select 1");
    }

    #[test]
    fn test_disabled_marker_counts_as_absent() {
        let mut registry = FilterRegistry::new();
        registry.register_filter(HookPoint::Query, limit_one);
        registry.disable_filter(HookPoint::Query);
        assert!(!registry.has_filter(HookPoint::Query));
        assert_eq!(
            registry.apply_if_present(HookPoint::Query, "SELECT 1".to_string()),
            "SELECT 1"
        );
    }

    #[test]
    fn test_apply_without_filter_is_an_error() {
        let registry = FilterRegistry::new();
        let err = registry
            .apply_filter(HookPoint::Query, "SELECT 1".to_string())
            .unwrap_err();
        assert!(matches!(err, DbError::FilterNotRegistered { hook: HookPoint::Query }));
    }

    #[test]
    fn test_unregister() {
        let mut registry = FilterRegistry::new();
        registry.register_filter(HookPoint::Query, limit_one);
        registry.unregister_filter(HookPoint::Query);
        assert!(!registry.has_filter(HookPoint::Query));
    }

    #[test]
    fn test_hook_point_parse() {
        assert_eq!("query".parse::<HookPoint>().unwrap(), HookPoint::Query);
        assert!("insert".parse::<HookPoint>().is_err());
        assert_eq!(HookPoint::Query.to_string(), "query");
    }

    #[test]
    fn test_debug_lists_state() {
        let mut registry = FilterRegistry::new();
        registry.disable_filter(HookPoint::Query);
        assert_eq!(format!("{:?}", registry), r#"{Query: "disabled"}"#);
    }
}
