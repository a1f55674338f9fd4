//! Embedding provider trait and vector math

mod provider;
mod similarity;

pub use provider::Embedder;
pub use similarity::cosine_similarity;

#[cfg(test)]
pub use provider::mock::MockEmbedder;
