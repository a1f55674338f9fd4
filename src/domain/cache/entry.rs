//! Cache entry schema

use std::time::Duration;

use uuid::Uuid;

/// A single entry in the semantic cache.
///
/// Entries are created only by the populate path, read only by lookup,
/// and removed only by the store's TTL enforcement. There is no
/// update-in-place: a later miss for a previously-seen topic creates a
/// fresh entry under a fresh key.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Opaque unique identifier, generated at write time.
    key: String,
    /// Canonicalized topic, stored as a secondary text field in the
    /// index; not a lookup key on its own.
    normalized_topic: String,
    /// Embedding of `normalized_topic`, length = configured dimension.
    embedding: Vec<f32>,
    /// Serialized JSON payload.
    payload: Vec<u8>,
    /// Expiry; `None` means the entry persists indefinitely.
    ttl: Option<Duration>,
}

impl CacheEntry {
    /// Create an entry with a freshly generated key under the given
    /// prefix. Collision probability of the random key is negligible.
    pub fn new(
        key_prefix: &str,
        normalized_topic: impl Into<String>,
        embedding: Vec<f32>,
        payload: Vec<u8>,
        ttl: Option<Duration>,
    ) -> Self {
        Self {
            key: format!("{}:{}", key_prefix, Uuid::new_v4().simple()),
            normalized_topic: normalized_topic.into(),
            embedding,
            payload,
            ttl,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn normalized_topic(&self) -> &str {
        &self.normalized_topic
    }

    pub fn embedding(&self) -> &[f32] {
        &self.embedding
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_key_has_prefix() {
        let entry = CacheEntry::new("topic", "blog engine", vec![0.1, 0.2], b"{}".to_vec(), None);

        assert!(entry.key().starts_with("topic:"));
        assert!(entry.key().len() > "topic:".len());
    }

    #[test]
    fn test_entry_keys_unique() {
        let a = CacheEntry::new("topic", "t", vec![0.1], b"{}".to_vec(), None);
        let b = CacheEntry::new("topic", "t", vec![0.1], b"{}".to_vec(), None);

        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_entry_fields() {
        let ttl = Some(Duration::from_secs(60));
        let entry = CacheEntry::new(
            "topic",
            "portfolio website",
            vec![0.5, 0.5],
            br#"{"pages": 3}"#.to_vec(),
            ttl,
        );

        assert_eq!(entry.normalized_topic(), "portfolio website");
        assert_eq!(entry.embedding(), &[0.5, 0.5]);
        assert_eq!(entry.payload(), br#"{"pages": 3}"#);
        assert_eq!(entry.ttl(), ttl);
    }
}
