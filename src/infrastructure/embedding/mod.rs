//! Embedding provider adapters

mod openai;

pub use openai::{EmbeddingConfig, OpenAiEmbedder};
