//! Redis-backed vector index and cache store
//!
//! Uses RediSearch for the ANN side (FT.CREATE with an HNSW vector
//! field, FT.SEARCH with a KNN clause) and plain hashes with EXPIRE for
//! the storage side. One connection serves both traits.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, Value};

use crate::domain::cache::CacheEntry;
use crate::domain::index::{CacheStore, IndexSpec, Neighbor, VectorIndex};
use crate::domain::DomainError;

/// Alias under which FT.SEARCH yields the KNN distance.
const DISTANCE_ALIAS: &str = "distance";

/// Configuration for the Redis connection.
#[derive(Debug, Clone)]
pub struct RedisIndexConfig {
    /// Redis connection URL (e.g., "redis://127.0.0.1:6379").
    pub url: String,
    /// Connection timeout.
    pub connection_timeout: Duration,
}

impl Default for RedisIndexConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            connection_timeout: Duration::from_secs(5),
        }
    }
}

impl RedisIndexConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }
}

/// Redis implementation of [`VectorIndex`] and [`CacheStore`].
#[derive(Clone)]
pub struct RedisVectorIndex {
    connection: ConnectionManager,
    spec: IndexSpec,
}

impl fmt::Debug for RedisVectorIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisVectorIndex")
            .field("spec", &self.spec)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisVectorIndex {
    /// Connect to Redis.
    pub async fn connect(config: RedisIndexConfig, spec: IndexSpec) -> Result<Self, DomainError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| DomainError::index(format!("failed to create Redis client: {}", e)))?;

        let connection = tokio::time::timeout(
            config.connection_timeout,
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| DomainError::index("timed out connecting to Redis"))?
        .map_err(|e| DomainError::index(format!("failed to connect to Redis: {}", e)))?;

        Ok(Self { connection, spec })
    }

    fn vector_bytes(vector: &[f32]) -> Vec<u8> {
        vector.iter().flat_map(|v| v.to_le_bytes()).collect()
    }

    fn parse_search_reply(spec: &IndexSpec, reply: Value) -> Result<Vec<Neighbor>, DomainError> {
        let Value::Array(items) = reply else {
            return Err(DomainError::index("unexpected FT.SEARCH reply shape"));
        };

        // Reply layout: [total, key, [field, value, ...], key, fields, ...]
        let mut neighbors = Vec::new();
        let mut items = items.into_iter().skip(1);

        while let (Some(key), Some(fields)) = (items.next(), items.next()) {
            let key = match key {
                Value::BulkString(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Value::SimpleString(s) => s,
                other => {
                    return Err(DomainError::index(format!(
                        "unexpected document key in FT.SEARCH reply: {:?}",
                        other
                    )));
                }
            };

            let Value::Array(pairs) = fields else {
                return Err(DomainError::index("unexpected document fields shape"));
            };

            let mut distance = None;
            let mut normalized_topic = String::new();
            let mut payload = Vec::new();

            let mut pairs = pairs.into_iter();
            while let (Some(name), Some(value)) = (pairs.next(), pairs.next()) {
                let name = match name {
                    Value::BulkString(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    Value::SimpleString(s) => s,
                    _ => continue,
                };
                let bytes = match value {
                    Value::BulkString(bytes) => bytes,
                    Value::SimpleString(s) => s.into_bytes(),
                    _ => continue,
                };

                if name == DISTANCE_ALIAS {
                    distance = std::str::from_utf8(&bytes)
                        .ok()
                        .and_then(|s| s.parse::<f32>().ok());
                } else if name == spec.topic_field {
                    normalized_topic = String::from_utf8_lossy(&bytes).into_owned();
                } else if name == spec.output_field {
                    payload = bytes;
                }
            }

            let distance = distance.ok_or_else(|| {
                DomainError::index(format!("document '{}' missing distance field", key))
            })?;

            neighbors.push(Neighbor {
                key,
                distance,
                normalized_topic,
                payload,
            });
        }

        // FT.SEARCH with SORTBY already orders ascending, but the sort
        // is the contract, so enforce it.
        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(neighbors)
    }
}

#[async_trait]
impl VectorIndex for RedisVectorIndex {
    async fn ensure_index(&self, spec: &IndexSpec) -> Result<(), DomainError> {
        let mut conn = self.connection.clone();

        let result: Result<(), _> = redis::cmd("FT.CREATE")
            .arg(&spec.name)
            .arg("ON")
            .arg("HASH")
            .arg("PREFIX")
            .arg(1)
            .arg(format!("{}:", spec.key_prefix))
            .arg("SCHEMA")
            .arg(&spec.vector_field)
            .arg("VECTOR")
            .arg("HNSW")
            .arg(6)
            .arg("TYPE")
            .arg("FLOAT32")
            .arg("DIM")
            .arg(spec.dim)
            .arg("DISTANCE_METRIC")
            .arg(spec.metric.as_provider_str())
            .arg(&spec.topic_field)
            .arg("TEXT")
            .query_async(&mut conn)
            .await;

        match result {
            Ok(()) => Ok(()),
            // Re-creating an existing index is not an error.
            Err(e) if e.to_string().contains("Index already exists") => Ok(()),
            Err(e) => Err(DomainError::index(format!(
                "failed to create index '{}': {}",
                spec.name, e
            ))),
        }
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<Neighbor>, DomainError> {
        let mut conn = self.connection.clone();

        let knn = format!(
            "*=>[KNN {} @{} $vec AS {}]",
            k, self.spec.vector_field, DISTANCE_ALIAS
        );

        let reply: Value = redis::cmd("FT.SEARCH")
            .arg(&self.spec.name)
            .arg(&knn)
            .arg("PARAMS")
            .arg(2)
            .arg("vec")
            .arg(Self::vector_bytes(vector))
            .arg("SORTBY")
            .arg(DISTANCE_ALIAS)
            .arg("RETURN")
            .arg(3)
            .arg(&self.spec.topic_field)
            .arg(&self.spec.output_field)
            .arg(DISTANCE_ALIAS)
            .arg("DIALECT")
            .arg(2)
            .query_async(&mut conn)
            .await
            .map_err(|e| DomainError::index(format!("FT.SEARCH failed: {}", e)))?;

        Self::parse_search_reply(&self.spec, reply)
    }
}

#[async_trait]
impl CacheStore for RedisVectorIndex {
    async fn put(&self, entry: CacheEntry) -> Result<(), DomainError> {
        if entry.embedding().len() != self.spec.dim {
            return Err(DomainError::configuration(format!(
                "entry embedding has {} dimensions, index '{}' expects {}",
                entry.embedding().len(),
                self.spec.name,
                self.spec.dim,
            )));
        }

        let mut conn = self.connection.clone();

        let fields: Vec<(&str, Vec<u8>)> = vec![
            (
                self.spec.topic_field.as_str(),
                entry.normalized_topic().as_bytes().to_vec(),
            ),
            (self.spec.output_field.as_str(), entry.payload().to_vec()),
            (
                self.spec.vector_field.as_str(),
                Self::vector_bytes(entry.embedding()),
            ),
        ];

        let _: () = conn
            .hset_multiple(entry.key(), &fields)
            .await
            .map_err(|e| DomainError::index(format!("failed to store entry: {}", e)))?;

        if let Some(ttl) = entry.ttl() {
            let ttl_secs = ttl.as_secs().max(1) as i64;
            let _: () = conn.expire(entry.key(), ttl_secs).await.map_err(|e| {
                DomainError::index(format!("failed to set TTL on '{}': {}", entry.key(), e))
            })?;
        }

        Ok(())
    }
}
