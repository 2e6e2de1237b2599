//! Inline style properties carried by element nodes
//!
//! Styles are stored as an ordered property map (`text-align` -> `center`).
//! Ordering is by property name so that rendering and equality are stable
//! regardless of the order properties were applied in.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Ordered map of style property names to values
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleMap(BTreeMap<String, String>);

impl StyleMap {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build a map from `(property, value)` pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0.get(property).map(String::as_str)
    }

    pub fn set(&mut self, property: impl Into<String>, value: impl Into<String>) {
        self.0.insert(property.into(), value.into());
    }

    pub fn remove(&mut self, property: &str) -> Option<String> {
        self.0.remove(property)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn properties(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Merge another map into this one; `other` wins on conflicts
    pub fn merge(&mut self, other: &StyleMap) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Whether every property of `other` is present here with the same value
    pub fn contains_all(&self, other: &StyleMap) -> bool {
        other
            .0
            .iter()
            .all(|(k, v)| self.0.get(k).is_some_and(|own| own == v))
    }

    /// Whether every property name of `other` is present here, any value
    pub fn has_properties_of(&self, other: &StyleMap) -> bool {
        other.0.keys().all(|k| self.0.contains_key(k))
    }

    /// Remove every property named in `other`. Returns true if anything changed.
    pub fn remove_properties_of(&mut self, other: &StyleMap) -> bool {
        let before = self.0.len();
        for k in other.0.keys() {
            self.0.remove(k);
        }
        before != self.0.len()
    }

    /// CSS declaration text, e.g. `color: red; text-align: center`
    pub fn to_css(&self) -> String {
        self.0
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_overrides() {
        let mut a = StyleMap::from_pairs([("text-align", "left"), ("color", "red")]);
        let b = StyleMap::from_pairs([("text-align", "center")]);
        a.merge(&b);
        assert_eq!(a.get("text-align"), Some("center"));
        assert_eq!(a.get("color"), Some("red"));
    }

    #[test]
    fn test_contains_all_checks_values() {
        let a = StyleMap::from_pairs([("font-weight", "bold"), ("color", "red")]);
        assert!(a.contains_all(&StyleMap::from_pairs([("font-weight", "bold")])));
        assert!(!a.contains_all(&StyleMap::from_pairs([("font-weight", "normal")])));
        assert!(a.has_properties_of(&StyleMap::from_pairs([("font-weight", "normal")])));
    }

    #[test]
    fn test_remove_properties_of() {
        let mut a = StyleMap::from_pairs([("text-align", "center"), ("color", "red")]);
        assert!(a.remove_properties_of(&StyleMap::from_pairs([("text-align", "")])));
        assert_eq!(a.to_css(), "color: red");
        assert!(!a.remove_properties_of(&StyleMap::from_pairs([("margin-left", "")])));
    }
}
