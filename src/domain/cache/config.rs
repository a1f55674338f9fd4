//! Semantic cache configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::LookupOptions;

/// Configuration for the semantic cache orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SemanticCacheConfig {
    /// Default similarity threshold for lookups (0.0 to 1.0).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f32,

    /// Default number of neighbors considered per lookup.
    #[serde(default = "default_k")]
    pub k: usize,

    /// Default time-to-live for populated entries in seconds.
    /// `None` means entries persist until the store drops them.
    #[serde(default)]
    pub ttl_secs: Option<u64>,

    /// Timeout for the embed + index-query phase of a lookup, in
    /// milliseconds. Elapsing is treated as a miss (fail-open).
    /// `None` disables the timeout.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: Option<u64>,

    /// Coalesce concurrent misses for the same normalized topic so the
    /// generator runs once. Off by default; without it two concurrent
    /// callers that both miss will both generate and both write.
    #[serde(default)]
    pub coalesce_inflight: bool,
}

fn default_similarity_threshold() -> f32 {
    0.75
}

fn default_k() -> usize {
    3
}

fn default_operation_timeout_ms() -> Option<u64> {
    Some(10_000)
}

impl Default for SemanticCacheConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: default_similarity_threshold(),
            k: default_k(),
            ttl_secs: None,
            operation_timeout_ms: default_operation_timeout_ms(),
            coalesce_inflight: false,
        }
    }
}

impl SemanticCacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default lookup options derived from this config.
    pub fn lookup_options(&self) -> LookupOptions {
        LookupOptions::new(self.similarity_threshold, self.k)
    }

    /// Default TTL as a Duration.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }

    /// Operation timeout as a Duration.
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_ms.map(Duration::from_millis)
    }

    pub fn with_similarity_threshold(mut self, threshold: f32) -> Self {
        self.similarity_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// TTL resolution is whole seconds; sub-second durations round up
    /// rather than truncating to "expire immediately".
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl_secs = ttl.map(|t| (t.as_millis() as u64).div_ceil(1000));
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.operation_timeout_ms = timeout.map(|t| t.as_millis() as u64);
        self
    }

    pub fn with_coalesce_inflight(mut self, coalesce: bool) -> Self {
        self.coalesce_inflight = coalesce;
        self
    }
}
