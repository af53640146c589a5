//! # Module Paths
//!
//! A module path is the ordered list of child keys from the root module.
//! The same path addresses the module's slice of the composite state tree.

use super::errors::StoreError;
use serde_json::Value;
use std::fmt;

/// Ordered sequence of keys from the root module. Empty = root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ModulePath(Vec<String>);

impl ModulePath {
    /// The root path.
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// This path extended by `key`.
    #[must_use]
    pub fn child(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(key.to_string());
        Self(segments)
    }

    /// Parent path and final key; `None` for the root.
    #[must_use]
    pub fn split_last(&self) -> Option<(&[String], &str)> {
        self.0
            .split_last()
            .map(|(last, parent)| (parent, last.as_str()))
    }

    /// Reject the root path and empty segments.
    pub fn validate_for_registration(&self) -> Result<(), StoreError> {
        if self.is_root() {
            return Err(StoreError::EmptyPath);
        }
        self.validate()
    }

    /// Reject empty segments.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.0.iter().any(String::is_empty) {
            return Err(StoreError::InvalidPath {
                path: self.0.clone(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

// A bare string is a single segment; '/' is not split.
impl From<&str> for ModulePath {
    fn from(key: &str) -> Self {
        Self(vec![key.to_string()])
    }
}

impl From<String> for ModulePath {
    fn from(key: String) -> Self {
        Self(vec![key])
    }
}

impl From<Vec<String>> for ModulePath {
    fn from(segments: Vec<String>) -> Self {
        Self(segments)
    }
}

impl From<Vec<&str>> for ModulePath {
    fn from(segments: Vec<&str>) -> Self {
        Self(segments.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for ModulePath {
    fn from(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| (*s).to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for ModulePath {
    fn from(segments: [&str; N]) -> Self {
        Self(segments.iter().map(|s| (*s).to_string()).collect())
    }
}

impl From<&ModulePath> for ModulePath {
    fn from(path: &ModulePath) -> Self {
        path.clone()
    }
}

/// Walk `path` from `state`.
#[must_use]
pub fn get_nested_state<'a>(state: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(state, |node, key| node.get(key))
}

/// Mutable walk of `path` from `state`.
pub fn get_nested_state_mut<'a>(state: &'a mut Value, path: &[String]) -> Option<&'a mut Value> {
    path.iter().try_fold(state, |node, key| node.get_mut(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_path_conversions() {
        assert_eq!(ModulePath::from("cart").segments(), &["cart".to_string()]);
        assert_eq!(ModulePath::from("a/b").segments().len(), 1);
        assert_eq!(ModulePath::from(["a", "b"]).to_string(), "a/b");
        assert!(ModulePath::root().is_root());
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            ModulePath::root().validate_for_registration(),
            Err(StoreError::EmptyPath)
        );
        assert!(matches!(
            ModulePath::from(["a", ""]).validate_for_registration(),
            Err(StoreError::InvalidPath { .. })
        ));
        assert!(ModulePath::from("a").validate_for_registration().is_ok());
    }

    #[test]
    fn test_split_last() {
        let path = ModulePath::from(["a", "b", "c"]);
        let (parent, key) = path.split_last().unwrap();
        assert_eq!(parent, &["a".to_string(), "b".to_string()]);
        assert_eq!(key, "c");
        assert!(ModulePath::root().split_last().is_none());
    }

    #[test]
    fn test_nested_state_lookup() {
        let mut state = json!({"a": {"b": {"n": 1}}});
        let path = vec!["a".to_string(), "b".to_string()];

        assert_eq!(get_nested_state(&state, &path), Some(&json!({"n": 1})));
        assert_eq!(get_nested_state(&state, &["zz".to_string()]), None);
        assert_eq!(get_nested_state(&state, &[]), Some(&state.clone()));

        *get_nested_state_mut(&mut state, &path).unwrap() = json!({"n": 2});
        assert_eq!(state["a"]["b"]["n"], json!(2));
    }
}
