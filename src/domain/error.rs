use thiserror::Error;

/// Boxed error type used to carry a generator's failure unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Embedding model unavailable: {message}")]
    ModelUnavailable { message: String },

    #[error("Index error: {message}")]
    Index { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Generation failed: {source}")]
    Generate {
        #[source]
        source: BoxError,
    },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DomainError {
    pub fn model_unavailable(message: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            message: message.into(),
        }
    }

    pub fn index(message: impl Into<String>) -> Self {
        Self::Index {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Wrap a generator failure, preserving the original error as the source.
    pub fn generate(source: impl Into<BoxError>) -> Self {
        Self::Generate {
            source: source.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_unavailable_error() {
        let error = DomainError::model_unavailable("connection refused");
        assert_eq!(
            error.to_string(),
            "Embedding model unavailable: connection refused"
        );
    }

    #[test]
    fn test_index_error() {
        let error = DomainError::index("search failed");
        assert_eq!(error.to_string(), "Index error: search failed");
    }

    #[test]
    fn test_generate_error_preserves_source() {
        let inner = std::io::Error::other("upstream exploded");
        let error = DomainError::generate(inner);

        assert!(error.to_string().contains("upstream exploded"));
        assert!(std::error::Error::source(&error).is_some());
    }
}
