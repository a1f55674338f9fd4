//! Semantic cache orchestrator
//!
//! Composes the normalizer, embedder, vector index and cache store into
//! the cache-aside flow: `lookup` → generate on miss → `populate`.
//! Providers are injected at construction time so tests can substitute
//! doubles for the index and the embedding model.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::cache::{
    CacheEntry, CachedValue, LookupOptions, LookupOutcome, MissReason, SemanticCacheConfig,
};
use crate::domain::embedding::Embedder;
use crate::domain::error::BoxError;
use crate::domain::index::{CacheStore, IndexSpec, VectorIndex};
use crate::domain::normalize::TextNormalizer;
use crate::domain::DomainError;

/// Hit/miss counters for the cache.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f32 {
        let total = self.hits + self.misses;

        if total == 0 {
            return 0.0;
        }

        self.hits as f32 / total as f32
    }
}

/// Similarity-keyed cache over an expensive generation operation.
///
/// Concurrency: every call is an independent unit of work against the
/// shared store; no client-side locking is performed. Two concurrent
/// callers that miss on the same (or a very similar) topic will both
/// invoke their generator and both write an entry. That race is an
/// accepted trade-off; enabling `coalesce_inflight` serializes the miss
/// path per normalized topic within this process as an opt-in mitigation.
#[derive(Debug)]
pub struct SemanticCache {
    normalizer: TextNormalizer,
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    store: Arc<dyn CacheStore>,
    spec: IndexSpec,
    config: SemanticCacheConfig,
    inflight: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl SemanticCache {
    /// Create a cache with default configuration.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        store: Arc<dyn CacheStore>,
        spec: IndexSpec,
    ) -> Self {
        Self::with_config(embedder, index, store, spec, SemanticCacheConfig::default())
    }

    /// Create a cache with custom configuration.
    pub fn with_config(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        store: Arc<dyn CacheStore>,
        spec: IndexSpec,
        config: SemanticCacheConfig,
    ) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            embedder,
            index,
            store,
            spec,
            config,
            inflight: Mutex::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Replace the default normalizer (custom stop-word set).
    pub fn with_normalizer(mut self, normalizer: TextNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    pub fn config(&self) -> &SemanticCacheConfig {
        &self.config
    }

    pub fn index_spec(&self) -> &IndexSpec {
        &self.spec
    }

    /// Provision the index, once at startup.
    ///
    /// A dimension mismatch between the embedder and the index spec is a
    /// configuration error and fails hard. Index creation itself is
    /// fail-open: "already exists" is success, and any other creation
    /// failure is logged and ignored so the process can come up without
    /// a working index (lookups then behave as permanent misses).
    pub async fn init(&self) -> Result<(), DomainError> {
        if self.embedder.dimensions() != self.spec.dim {
            return Err(DomainError::configuration(format!(
                "embedder produces {}-dimension vectors but index '{}' is configured for {}",
                self.embedder.dimensions(),
                self.spec.name,
                self.spec.dim,
            )));
        }

        if let Err(e) = self.index.ensure_index(&self.spec).await {
            warn!(index = %self.spec.name, error = %e, "index creation failed, continuing without it");
        }

        Ok(())
    }

    /// Aggregate hit/miss counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Look up a topic using the configured default threshold and k.
    pub async fn lookup(&self, topic: &str) -> Result<LookupOutcome, DomainError> {
        self.lookup_with(topic, self.config.lookup_options()).await
    }

    /// Look up a topic in the cache.
    ///
    /// Embedding failures propagate: without a query vector no search is
    /// possible. Index failures and timeouts do not; they come back as a
    /// miss carrying the underlying cause, preferring regeneration over
    /// breaking the caller.
    pub async fn lookup_with(
        &self,
        topic: &str,
        options: LookupOptions,
    ) -> Result<LookupOutcome, DomainError> {
        let normalized = self.normalizer.normalize(topic);
        let outcome = self.lookup_inner(&normalized, options).await?;

        match &outcome {
            LookupOutcome::Hit { similarity, key, .. } => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(topic = %normalized, %key, similarity, "cache hit");
            }
            LookupOutcome::Miss(reason) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                debug!(topic = %normalized, ?reason, "cache miss");
            }
        }

        Ok(outcome)
    }

    /// Lookup without touching the hit/miss counters. The coalesced
    /// re-check goes through here so one caller counts at most once.
    async fn lookup_inner(
        &self,
        normalized: &str,
        options: LookupOptions,
    ) -> Result<LookupOutcome, DomainError> {
        match self.config.operation_timeout() {
            Some(timeout) => {
                match tokio::time::timeout(timeout, self.search(normalized, options)).await {
                    Ok(result) => result,
                    Err(_) => {
                        warn!(topic = %normalized, "lookup timed out, treating as miss");
                        Ok(LookupOutcome::Miss(MissReason::TimedOut))
                    }
                }
            }
            None => self.search(normalized, options).await,
        }
    }

    async fn search(
        &self,
        normalized: &str,
        options: LookupOptions,
    ) -> Result<LookupOutcome, DomainError> {
        let vector = self.embedder.embed(normalized).await?;

        let neighbors = match self.index.query(&vector, options.k).await {
            Ok(neighbors) => neighbors,
            Err(e) => {
                warn!(error = %e, "index query failed, treating as miss");
                return Ok(LookupOutcome::Miss(MissReason::SearchFailed {
                    cause: e.to_string(),
                }));
            }
        };

        let Some(best) = neighbors.first() else {
            return Ok(LookupOutcome::Miss(MissReason::NoNeighbors));
        };

        let similarity = best.similarity();

        if similarity >= options.threshold {
            Ok(LookupOutcome::Hit {
                value: CachedValue::decode(&best.payload),
                similarity,
                key: best.key.clone(),
            })
        } else {
            Ok(LookupOutcome::Miss(MissReason::BelowThreshold {
                best_similarity: similarity,
            }))
        }
    }

    /// Store a payload under a topic with the configured default TTL.
    pub async fn populate(
        &self,
        topic: &str,
        payload: &serde_json::Value,
    ) -> Result<String, DomainError> {
        self.populate_with(topic, payload, self.config.ttl()).await
    }

    /// Store a payload under a topic, returning the new entry's key.
    ///
    /// Always creates a fresh entry; there is no dedup check against
    /// similar existing entries, so paraphrased topics accumulate
    /// near-duplicates until TTL expiry clears them.
    pub async fn populate_with(
        &self,
        topic: &str,
        payload: &serde_json::Value,
        ttl: Option<Duration>,
    ) -> Result<String, DomainError> {
        let normalized = self.normalizer.normalize(topic);
        let vector = self.embedder.embed(&normalized).await?;

        let bytes = serde_json::to_vec(payload)
            .map_err(|e| DomainError::internal(format!("failed to serialize payload: {}", e)))?;

        let entry = CacheEntry::new(&self.spec.key_prefix, normalized, vector, bytes, ttl);
        let key = entry.key().to_string();

        self.store.put(entry).await?;
        debug!(%key, "entry stored");

        Ok(key)
    }

    /// Cache-aside entry point using the configured defaults.
    pub async fn get_or_generate<F, Fut>(
        &self,
        topic: &str,
        generator: F,
    ) -> Result<CachedValue, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, BoxError>>,
    {
        self.get_or_generate_with(topic, self.config.lookup_options(), self.config.ttl(), generator)
            .await
    }

    /// Cache-aside entry point with explicit options.
    ///
    /// On a hit the cached value is returned and the generator never
    /// runs. On a miss the generator runs exactly once here; its failure
    /// propagates unchanged (wrapped as [`DomainError::Generate`]) with
    /// no retry and nothing written. A store failure after a successful
    /// generation is logged and swallowed: the fresh value is still
    /// returned, because a cache write must never fail the primary
    /// operation.
    pub async fn get_or_generate_with<F, Fut>(
        &self,
        topic: &str,
        options: LookupOptions,
        ttl: Option<Duration>,
        generator: F,
    ) -> Result<CachedValue, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, BoxError>>,
    {
        if let LookupOutcome::Hit { value, .. } = self.lookup_with(topic, options).await? {
            return Ok(value);
        }

        let coalesce_guard = if self.config.coalesce_inflight {
            let normalized = self.normalizer.normalize(topic);
            let lock = self.topic_lock(&normalized).await;
            let guard = lock.clone().lock_owned().await;

            // Another caller may have populated while we waited. The
            // map entry is released on every exit from this block, the
            // error path included, so a failed re-check cannot leave a
            // stale lock behind.
            match self.lookup_inner(&normalized, options).await {
                Ok(LookupOutcome::Hit { value, .. }) => {
                    drop(guard);
                    self.release_topic_lock(&normalized, &lock).await;
                    return Ok(value);
                }
                Ok(LookupOutcome::Miss(_)) => Some((guard, normalized, lock)),
                Err(e) => {
                    drop(guard);
                    self.release_topic_lock(&normalized, &lock).await;
                    return Err(e);
                }
            }
        } else {
            None
        };

        let result = self.generate_and_populate(topic, ttl, generator).await;

        if let Some((guard, normalized, lock)) = coalesce_guard {
            drop(guard);
            self.release_topic_lock(&normalized, &lock).await;
        }

        result
    }

    async fn generate_and_populate<F, Fut>(
        &self,
        topic: &str,
        ttl: Option<Duration>,
        generator: F,
    ) -> Result<CachedValue, DomainError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<serde_json::Value, BoxError>>,
    {
        let fresh = generator().await.map_err(|e| DomainError::generate(e))?;

        if let Err(e) = self.populate_with(topic, &fresh, ttl).await {
            warn!(error = %e, "failed to populate cache, returning fresh value anyway");
        }

        Ok(CachedValue::Json(fresh))
    }

    async fn topic_lock(&self, normalized: &str) -> Arc<Mutex<()>> {
        let mut inflight = self.inflight.lock().await;
        inflight
            .entry(normalized.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn release_topic_lock(&self, normalized: &str, lock: &Arc<Mutex<()>>) {
        let mut inflight = self.inflight.lock().await;
        // Drop the map entry once no other caller holds a clone.
        if Arc::strong_count(lock) <= 2 {
            inflight.remove(normalized);
        }
    }
}
