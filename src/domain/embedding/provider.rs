//! Embedder trait definition

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

/// Trait for embedding providers.
///
/// `embed` must be a pure function of the model and the input text: the
/// same text against the same model version yields the same vector,
/// which is what makes cached entries reproducible across lookups. When
/// the underlying model is unavailable the call fails with
/// [`DomainError::ModelUnavailable`]; there is no silent fallback to a
/// zero vector, since a fabricated vector would poison similarity search.
#[async_trait]
pub trait Embedder: Send + Sync + Debug {
    /// Embed a single text into a fixed-dimension vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError>;

    /// Dimension of the vectors this embedder produces.
    fn dimensions(&self) -> usize;

    /// Identifier of the underlying model.
    fn model_id(&self) -> &str;
}

#[cfg(test)]
pub mod mock {
    use super::*;

    /// Deterministic embedder for tests.
    ///
    /// Derives a pseudo-vector from a hash of the input text, so equal
    /// texts always embed identically and different texts land far apart
    /// with high probability.
    #[derive(Debug)]
    pub struct MockEmbedder {
        dimensions: usize,
        error: Option<String>,
        calls: std::sync::atomic::AtomicUsize,
    }

    impl MockEmbedder {
        pub fn new(dimensions: usize) -> Self {
            Self {
                dimensions,
                error: None,
                calls: std::sync::atomic::AtomicUsize::new(0),
            }
        }

        /// Make every `embed` call fail with `ModelUnavailable`.
        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.load(std::sync::atomic::Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl Embedder for MockEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

            if let Some(ref error) = self.error {
                return Err(DomainError::model_unavailable(error.clone()));
            }

            let hash = text.bytes().fold(0u64, |acc, b| {
                acc.wrapping_mul(31).wrapping_add(b as u64)
            });
            let vector: Vec<f32> = (0..self.dimensions)
                .map(|i| {
                    // splitmix64-style finalizer so elements of different
                    // texts are uncorrelated, not merely offset.
                    let mut x = hash ^ (i as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
                    x ^= x >> 33;
                    x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
                    x ^= x >> 33;
                    ((x % 1000) as f32 / 1000.0) - 0.5
                })
                .collect();

            Ok(vector)
        }

        fn dimensions(&self) -> usize {
            self.dimensions
        }

        fn model_id(&self) -> &str {
            "mock-embedding"
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_embedder_deterministic() {
            let embedder = MockEmbedder::new(64);

            let a = embedder.embed("portfolio website").await.unwrap();
            let b = embedder.embed("portfolio website").await.unwrap();

            assert_eq!(a, b);
            assert_eq!(a.len(), 64);
        }

        #[tokio::test]
        async fn test_mock_embedder_distinct_texts() {
            let embedder = MockEmbedder::new(64);

            let a = embedder.embed("portfolio website").await.unwrap();
            let b = embedder.embed("real-time chat app").await.unwrap();

            assert_ne!(a, b);
        }

        #[tokio::test]
        async fn test_mock_embedder_error() {
            let embedder = MockEmbedder::new(64).with_error("model offline");
            let result = embedder.embed("anything").await;

            assert!(matches!(
                result,
                Err(DomainError::ModelUnavailable { .. })
            ));
        }

        #[tokio::test]
        async fn test_mock_embedder_counts_calls() {
            let embedder = MockEmbedder::new(8);
            assert_eq!(embedder.call_count(), 0);

            let _ = embedder.embed("one").await;
            let _ = embedder.embed("two").await;

            assert_eq!(embedder.call_count(), 2);
        }
    }
}
