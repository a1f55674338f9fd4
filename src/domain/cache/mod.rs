//! Semantic cache entries, lookup outcomes and the orchestrator

mod config;
mod entry;
mod lookup;
mod service;
mod value;

pub use config::SemanticCacheConfig;
pub use entry::CacheEntry;
pub use lookup::{LookupOptions, LookupOutcome, MissReason};
pub use service::{CacheStats, SemanticCache};
pub use value::CachedValue;
