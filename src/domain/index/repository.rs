//! Vector index and cache store contracts
//!
//! The reference deployment backs both traits with a single Redis
//! connection (RediSearch for the ANN queries, plain hashes + EXPIRE for
//! storage), but they are logically separate concerns: `CacheStore` owns
//! durable writes and TTL, `VectorIndex` owns index administration and
//! top-k similarity search.

use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::cache::CacheEntry;
use crate::domain::DomainError;

/// Distance metric used by the vector index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    L2,
    Ip,
}

impl DistanceMetric {
    /// Name of the metric as the index provider spells it.
    pub fn as_provider_str(&self) -> &'static str {
        match self {
            Self::Cosine => "COSINE",
            Self::L2 => "L2",
            Self::Ip => "IP",
        }
    }
}

/// Schema for the vector index, fixed once at creation time.
///
/// The embedding dimension lives here so that a mismatch between the
/// embedder and the index is caught as a configuration error up front,
/// not per-entry at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSpec {
    /// Index name known to the provider.
    pub name: String,
    /// Key prefix for entries covered by the index.
    pub key_prefix: String,
    /// Name of the vector field.
    pub vector_field: String,
    /// Name of the text field holding the normalized topic.
    pub topic_field: String,
    /// Name of the field holding the serialized payload.
    pub output_field: String,
    /// Embedding dimension.
    pub dim: usize,
    /// Distance metric for similarity search.
    pub metric: DistanceMetric,
}

impl Default for IndexSpec {
    fn default() -> Self {
        Self {
            name: "topic_index".to_string(),
            key_prefix: "topic".to_string(),
            vector_field: "embedding".to_string(),
            topic_field: "topic".to_string(),
            output_field: "output".to_string(),
            dim: 384,
            metric: DistanceMetric::Cosine,
        }
    }
}

/// A single result of a top-k similarity query, with the stored
/// attributes needed to serve a cache hit without a second read.
#[derive(Debug, Clone)]
pub struct Neighbor {
    /// Entry key.
    pub key: String,
    /// Raw distance under the configured metric; for cosine,
    /// `similarity = 1 - distance`.
    pub distance: f32,
    /// Normalized topic stored with the entry.
    pub normalized_topic: String,
    /// Serialized payload bytes.
    pub payload: Vec<u8>,
}

impl Neighbor {
    /// Similarity derived from the stored distance. Fixed conversion,
    /// not tunable per call.
    pub fn similarity(&self) -> f32 {
        1.0 - self.distance
    }
}

/// Approximate nearest-neighbor index over cache entries.
#[async_trait]
pub trait VectorIndex: Send + Sync + Debug {
    /// Create the index if it does not exist.
    ///
    /// Idempotent: an "already exists" response from the provider is
    /// success. Safe to call redundantly from multiple process instances
    /// at startup.
    async fn ensure_index(&self, spec: &IndexSpec) -> Result<(), DomainError>;

    /// Top-k similarity search. Returns up to `k` neighbors ordered by
    /// ascending distance.
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>, DomainError>;
}

/// Durable key-value storage with per-entry TTL.
#[async_trait]
pub trait CacheStore: Send + Sync + Debug {
    /// Write an entry under its key, applying the entry's TTL when set.
    /// Entries are immutable after creation; keys are never reused.
    async fn put(&self, entry: CacheEntry) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_conversion() {
        let neighbor = Neighbor {
            key: "topic:abc".to_string(),
            distance: 0.25,
            normalized_topic: "portfolio website".to_string(),
            payload: b"{}".to_vec(),
        };

        assert!((neighbor.similarity() - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_metric_provider_names() {
        assert_eq!(DistanceMetric::Cosine.as_provider_str(), "COSINE");
        assert_eq!(DistanceMetric::L2.as_provider_str(), "L2");
        assert_eq!(DistanceMetric::Ip.as_provider_str(), "IP");
    }

    #[test]
    fn test_default_spec() {
        let spec = IndexSpec::default();

        assert_eq!(spec.name, "topic_index");
        assert_eq!(spec.dim, 384);
        assert_eq!(spec.metric, DistanceMetric::Cosine);
    }
}
