//! Composite storage keys
//!
//! A key is an ordered list of string segments. The cache never flattens a key into a
//! single string; resolving segments to a physical location is up to the storage adapter.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Leading segment used when no namespace is configured.
pub const DEFAULT_NAMESPACE: &str = "Fhir";

/// Segment separating the resource type from the query string.
pub const BY_QUERY: &str = "by_query";

/// Trailing segment under which the payload is stored.
pub const DATA: &str = "data";

/// Ordered sequence of key segments.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompositeKey {
    segments: Vec<String>,
}

impl CompositeKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns a new key with `segment` appended.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when `self` equals `other` or is one of its ancestors.
    pub fn is_prefix_of(&self, other: &CompositeKey) -> bool {
        other.segments.len() >= self.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }
}

impl fmt::Display for CompositeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", segment)?;
        }
        write!(f, "]")
    }
}

/// Builds by-query keys under a fixed namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpace {
    namespace: String,
}

impl KeySpace {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// `[namespace, resource_type, "by_query", query]`
    pub fn by_query(&self, resource_type: &str, query: &str) -> CompositeKey {
        CompositeKey::new([
            self.namespace.as_str(),
            resource_type,
            BY_QUERY,
            query,
        ])
    }

    /// `[namespace, resource_type, "by_query", query, "data"]`
    pub fn by_query_data(&self, resource_type: &str, query: &str) -> CompositeKey {
        self.by_query(resource_type, query).child(DATA)
    }
}

impl Default for KeySpace {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_query_key_layout() {
        let keys = KeySpace::default();
        let key = keys.by_query("Immunization", "identifier=test");
        assert_eq!(
            key.segments(),
            &["Fhir", "Immunization", "by_query", "identifier=test"]
        );

        let data = keys.by_query_data("Immunization", "identifier=test");
        assert_eq!(data.len(), 5);
        assert_eq!(data.segments().last().map(String::as_str), Some("data"));
        assert!(key.is_prefix_of(&data));
        assert!(!data.is_prefix_of(&key));
    }

    #[test]
    fn test_custom_namespace() {
        let keys = KeySpace::new("Tenant42");
        assert_eq!(keys.by_query("Patient", "").segments()[0], "Tenant42");
    }

    #[test]
    fn test_query_is_not_normalized() {
        let keys = KeySpace::default();
        let a = keys.by_query("Patient", "name=a&birthdate=2000");
        let b = keys.by_query("Patient", "birthdate=2000&name=a");
        assert_ne!(a, b);

        // Empty queries still produce a distinct segment
        assert_eq!(keys.by_query("Patient", "").len(), 4);
    }

    #[test]
    fn test_prefix_requires_whole_segments() {
        let parent = CompositeKey::new(["Fhir", "Patient", "by_query", "name=a"]);
        let sibling = CompositeKey::new(["Fhir", "Patient", "by_query", "name=ab", "data"]);
        assert!(!parent.is_prefix_of(&sibling));
    }

    #[test]
    fn test_display() {
        let key = CompositeKey::new(["Fhir", "Patient"]);
        assert_eq!(key.to_string(), r#"["Fhir", "Patient"]"#);
    }
}
