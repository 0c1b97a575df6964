use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identity shared by a source element and its destination counterpart.
///
/// A list tile and the detail view showing the same story carry equal
/// keys; the transition layer pairs their anchors through it. Wraps
/// `Arc<str>` because keys are cloned into every marker, anchor, and
/// render command each frame.
#[derive(Debug, Clone, Eq)]
pub struct ElementKey(Arc<str>);

impl ElementKey {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for ElementKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl PartialEq<str> for ElementKey {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for ElementKey {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl Ord for ElementKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialOrd for ElementKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::hash::Hash for ElementKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        (*self.0).hash(state);
    }
}

impl std::ops::Deref for ElementKey {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ElementKey {
    #[inline]
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for ElementKey {
    #[inline]
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementKey {
    #[inline]
    fn from(s: &str) -> Self {
        ElementKey(Arc::from(s))
    }
}

impl From<String> for ElementKey {
    #[inline]
    fn from(s: String) -> Self {
        ElementKey(Arc::from(s))
    }
}

impl std::fmt::Display for ElementKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// Serialized as a plain string; avoids serde's `rc` feature.
impl Serialize for ElementKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ElementKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(ElementKey::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_compare_equal() {
        let a = ElementKey::from("story-42");
        let b = a.clone();
        assert_eq!(a, b);
        assert_eq!(a, "story-42");
    }

    #[test]
    fn distinct_allocations_compare_by_content() {
        let a = ElementKey::from("story-1");
        let b = ElementKey::from(format!("story-{}", 1));
        assert_eq!(a, b);
    }

    #[test]
    fn hashmap_lookup_by_str() {
        let mut map = std::collections::HashMap::new();
        map.insert(ElementKey::from("story-7"), 7);
        assert_eq!(map.get("story-7"), Some(&7));
    }

    #[test]
    fn serializes_as_plain_string() {
        let key = ElementKey::from("story-3");
        let json = serde_json::to_string(&key).unwrap_or_default();
        assert_eq!(json, "\"story-3\"");
        let back: ElementKey =
            serde_json::from_str(&json).unwrap_or_else(|_| ElementKey::from(""));
        assert_eq!(back, key);
    }

    #[test]
    fn escaped_strings_deserialize() {
        let back: ElementKey =
            serde_json::from_str("\"a\\\"b\"").unwrap_or_else(|_| ElementKey::from(""));
        assert_eq!(back, "a\"b");
    }
}
