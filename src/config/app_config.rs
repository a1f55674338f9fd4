use serde::Deserialize;
use std::time::Duration;

use crate::domain::cache::SemanticCacheConfig;
use crate::domain::index::IndexSpec;
use crate::infrastructure::embedding::EmbeddingConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub redis: RedisConfig,
    pub index: IndexSpec,
    pub embedding: EmbeddingConfig,
    pub cache: SemanticCacheConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RedisConfig {
    pub url: String,
    pub connection_timeout_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            connection_timeout_secs: 5,
        }
    }
}

impl RedisConfig {
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(self.connection_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("SEMCACHE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::index::DistanceMetric;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();

        assert_eq!(config.redis.url, "redis://127.0.0.1:6379");
        assert_eq!(config.redis.connection_timeout(), Duration::from_secs(5));
        assert_eq!(config.index.name, "topic_index");
        assert_eq!(config.index.dim, 384);
        assert_eq!(config.index.metric, DistanceMetric::Cosine);
        assert_eq!(config.logging.level, "info");
        assert!((config.cache.similarity_threshold - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_deserialize_partial_overrides() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "redis": {"url": "redis://cache:6379"},
            "index": {"name": "outline_index", "dim": 768},
            "cache": {"similarity_threshold": 0.85, "k": 1},
        }))
        .unwrap();

        assert_eq!(config.redis.url, "redis://cache:6379");
        assert_eq!(config.index.name, "outline_index");
        assert_eq!(config.index.dim, 768);
        // Untouched fields keep their defaults.
        assert_eq!(config.index.vector_field, "embedding");
        assert_eq!(config.cache.k, 1);
        assert_eq!(config.embedding.dimensions, 384);
    }
}
