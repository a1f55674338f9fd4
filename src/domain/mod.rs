//! Domain layer - Core types, traits and the cache orchestrator

pub mod cache;
pub mod embedding;
pub mod error;
pub mod index;
pub mod normalize;

pub use cache::{
    CacheEntry, CacheStats, CachedValue, LookupOptions, LookupOutcome, MissReason, SemanticCache,
    SemanticCacheConfig,
};
pub use embedding::{cosine_similarity, Embedder};
pub use error::{BoxError, DomainError};
pub use index::{CacheStore, DistanceMetric, IndexSpec, Neighbor, VectorIndex};
pub use normalize::TextNormalizer;
