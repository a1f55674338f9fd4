//! Infrastructure layer - Provider adapters and process wiring

pub mod embedding;
pub mod index;
pub mod logging;

pub use embedding::{EmbeddingConfig, OpenAiEmbedder};
pub use index::{InMemoryVectorIndex, RedisIndexConfig, RedisVectorIndex};
pub use logging::init_logging;
