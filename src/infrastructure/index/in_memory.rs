//! In-memory vector index and store
//!
//! Linear cosine scan over a hash map. Suitable for development and
//! tests; production deployments use the Redis adapter.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Instant;

use async_trait::async_trait;

use crate::domain::cache::CacheEntry;
use crate::domain::embedding::cosine_similarity;
use crate::domain::index::{CacheStore, IndexSpec, Neighbor, VectorIndex};
use crate::domain::DomainError;

#[derive(Debug, Clone)]
struct StoredEntry {
    normalized_topic: String,
    embedding: Vec<f32>,
    payload: Vec<u8>,
    expires_at: Option<Instant>,
}

impl StoredEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

/// In-memory implementation of both the vector index and the cache
/// store, mirroring the reference deployment where one Redis connection
/// backs both concerns.
#[derive(Debug)]
pub struct InMemoryVectorIndex {
    spec: IndexSpec,
    entries: RwLock<HashMap<String, StoredEntry>>,
}

impl InMemoryVectorIndex {
    pub fn new(spec: IndexSpec) -> Self {
        Self {
            spec,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live (non-expired) entries.
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .map(|entries| entries.values().filter(|e| !e.is_expired(now)).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired entries eagerly. The TTL filter in `query` makes
    /// this optional; it only reclaims memory.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = match self.entries.write() {
            Ok(entries) => entries,
            Err(_) => return 0,
        };

        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn ensure_index(&self, spec: &IndexSpec) -> Result<(), DomainError> {
        if spec.dim != self.spec.dim {
            return Err(DomainError::configuration(format!(
                "index '{}' holds {}-dimension vectors, requested {}",
                self.spec.name, self.spec.dim, spec.dim,
            )));
        }

        Ok(())
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>, DomainError> {
        let now = Instant::now();
        let entries = self
            .entries
            .read()
            .map_err(|e| DomainError::internal(format!("failed to acquire read lock: {}", e)))?;

        let mut neighbors: Vec<Neighbor> = entries
            .iter()
            .filter(|(_, entry)| !entry.is_expired(now))
            .map(|(key, entry)| Neighbor {
                key: key.clone(),
                distance: 1.0 - cosine_similarity(vector, &entry.embedding),
                normalized_topic: entry.normalized_topic.clone(),
                payload: entry.payload.clone(),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }
}

#[async_trait]
impl CacheStore for InMemoryVectorIndex {
    async fn put(&self, entry: CacheEntry) -> Result<(), DomainError> {
        if entry.embedding().len() != self.spec.dim {
            return Err(DomainError::configuration(format!(
                "entry embedding has {} dimensions, index '{}' expects {}",
                entry.embedding().len(),
                self.spec.name,
                self.spec.dim,
            )));
        }

        let stored = StoredEntry {
            normalized_topic: entry.normalized_topic().to_string(),
            embedding: entry.embedding().to_vec(),
            payload: entry.payload().to_vec(),
            expires_at: entry.ttl().map(|ttl| Instant::now() + ttl),
        };

        let mut entries = self
            .entries
            .write()
            .map_err(|e| DomainError::internal(format!("failed to acquire write lock: {}", e)))?;

        entries.insert(entry.key().to_string(), stored);

        Ok(())
    }
}
