//! Semantic Cache
//!
//! Caches the results of expensive, non-deterministic generation calls
//! (e.g. LLM requests) keyed by *semantic similarity* of a topic string
//! rather than exact text. Two differently-worded requests that mean the
//! same thing resolve to the same cache entry.
//!
//! The pipeline: normalize the topic, embed it, run an approximate
//! nearest-neighbor search against the vector index, and treat any
//! neighbor at or above the similarity threshold as a hit. On miss the
//! caller-supplied generator runs and its result is written back
//! (cache-aside), with expiry delegated to the store's per-entry TTL.

pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::DomainError;
pub use domain::cache::{
    CacheEntry, CacheStats, CachedValue, LookupOptions, LookupOutcome, MissReason, SemanticCache,
    SemanticCacheConfig,
};
pub use domain::embedding::Embedder;
pub use domain::index::{CacheStore, DistanceMetric, IndexSpec, Neighbor, VectorIndex};
pub use domain::normalize::TextNormalizer;
