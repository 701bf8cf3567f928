//! Collaborator-layer errors.
//!
//! None of these are fatal to a validation session: the pipeline logs them and
//! carries on with fewer (or no) items.

/// Errors raised by retrieval and analysis providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{service} returned status {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("request timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    #[error("{operation} failed after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        operation: String,
        attempts: u32,
        last_error: String,
    },

    #[error("missing credential: {0} is not set")]
    MissingCredential(&'static str),

    #[error("unparseable response: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Http(e) => !e.is_builder() && !e.is_decode(),
            ProviderError::Timeout { .. } => true,
            ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
            ProviderError::RetriesExhausted { .. }
            | ProviderError::MissingCredential(_)
            | ProviderError::Parse(_) => false,
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(err.to_string())
    }
}

/// Result type for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let status = |status| ProviderError::Status {
            service: "serper",
            status,
            body: String::new(),
        };
        assert!(status(429).is_retryable());
        assert!(status(503).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(ProviderError::Timeout { elapsed_ms: 10 }.is_retryable());
        assert!(!ProviderError::MissingCredential("SERPER_API_KEY").is_retryable());
        assert!(!ProviderError::Parse("bad".into()).is_retryable());
    }

    #[test]
    fn test_display() {
        let err = ProviderError::RetriesExhausted {
            operation: "search".into(),
            attempts: 3,
            last_error: "status 503".into(),
        };
        assert_eq!(err.to_string(), "search failed after 3 attempts: status 503");
    }
}
