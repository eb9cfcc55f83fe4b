//! Resource identity types.
//!
//! A resource is identified purely by its key (a URL or a path). Two
//! descriptors with the same key refer to the same logical resource, no
//! matter what metadata they carry.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Stable identity of a fetchable resource.
///
/// Usually an absolute URL or a path relative to the transport's base URL.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    /// Create a new key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the inner string reference.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File extension of the key's last path segment, lowercased.
    ///
    /// Query strings and fragments are ignored, so `clip.MP3?v=2` yields
    /// `mp3`.
    pub fn extension(&self) -> Option<String> {
        let path = self.0.split(['?', '#']).next().unwrap_or_default();
        let segment = path.rsplit('/').next()?;
        let (stem, ext) = segment.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ResourceKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Caller-supplied record identifying a fetchable resource.
///
/// The metadata map is opaque to the loader and is handed back unchanged in
/// every event that references the descriptor. Manifests written for older
/// tooling use `src` for the key, which is accepted as an alias.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Identity of the resource.
    #[serde(alias = "src")]
    pub key: ResourceKey,
    /// Free-form caller metadata.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl ResourceDescriptor {
    /// Create a descriptor with no metadata.
    pub fn new(key: impl Into<ResourceKey>) -> Self {
        Self {
            key: key.into(),
            metadata: Map::new(),
        }
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_meta(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(name.into(), value.into());
        self
    }

    /// Look up a metadata entry.
    pub fn meta(&self, name: &str) -> Option<&Value> {
        self.metadata.get(name)
    }
}

impl From<&str> for ResourceDescriptor {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ResourceDescriptor {
    fn from(key: String) -> Self {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_display() {
        let key = ResourceKey::new("sounds/a.bin");
        assert_eq!(key.to_string(), "sounds/a.bin");
        assert_eq!(key.as_str(), "sounds/a.bin");
    }

    #[test]
    fn test_key_extension() {
        assert_eq!(ResourceKey::from("a.MP3").extension().as_deref(), Some("mp3"));
        assert_eq!(
            ResourceKey::from("https://cdn.test/x/clip.ogg?v=2#t=3").extension().as_deref(),
            Some("ogg")
        );
        assert_eq!(ResourceKey::from("https://cdn.test/x/noext").extension(), None);
        assert_eq!(ResourceKey::from("dir.d/.hidden").extension(), None);
    }

    #[test]
    fn test_descriptor_identity_ignores_metadata() {
        let a = ResourceDescriptor::new("a.bin").with_meta("title", "first");
        let b = ResourceDescriptor::new("a.bin").with_meta("title", "second");
        assert_eq!(a.key, b.key);
        assert_ne!(a, b);
    }

    #[test]
    fn test_descriptor_deserializes_src_alias() {
        let json = r#"{"src": "sounds/ping.mp3", "id": "ping", "volume": 0.5}"#;
        let descriptor: ResourceDescriptor = serde_json::from_str(json).unwrap();

        assert_eq!(descriptor.key.as_str(), "sounds/ping.mp3");
        assert_eq!(descriptor.meta("id"), Some(&Value::from("ping")));
        assert_eq!(descriptor.metadata.len(), 2);
    }

    #[test]
    fn test_descriptor_serializes_flat() {
        let descriptor = ResourceDescriptor::new("a.bin").with_meta("id", 7);
        let json = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(json, serde_json::json!({"key": "a.bin", "id": 7}));
    }
}
