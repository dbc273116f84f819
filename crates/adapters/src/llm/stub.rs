//! Stub completion backend for testing and offline mode

use async_trait::async_trait;
use news_digest_domain::{CompletionBackend, CompletionError};

/// Stub backend that returns configurable responses
pub struct StubBackend {
    response: Option<String>,
    error: Option<CompletionError>,
}

impl StubBackend {
    /// Stub that echoes a canned summary
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            error: None,
        }
    }

    /// Stub that always fails with the given error
    pub fn with_error(error: CompletionError) -> Self {
        Self {
            response: None,
            error: Some(error),
        }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::with_response("Stub summary")
    }
}

fn clone_error(error: &CompletionError) -> CompletionError {
    match error {
        CompletionError::Unconfigured => CompletionError::Unconfigured,
        CompletionError::RateLimited => CompletionError::RateLimited,
        CompletionError::Timeout => CompletionError::Timeout,
        CompletionError::Api(m) => CompletionError::Api(m.clone()),
        CompletionError::InvalidFormat(m) => CompletionError::InvalidFormat(m.clone()),
    }
}

#[async_trait]
impl CompletionBackend for StubBackend {
    async fn complete(&self, _prompt: &str, _temperature: f64) -> Result<String, CompletionError> {
        if let Some(error) = &self.error {
            return Err(clone_error(error));
        }
        Ok(self.response.clone().unwrap_or_default())
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn provider(&self) -> &'static str {
        "stub"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_configured_response() {
        let stub = StubBackend::with_response("canned");
        assert_eq!(stub.complete("p", 0.3).await.unwrap(), "canned");
    }

    #[tokio::test]
    async fn returns_configured_error() {
        let stub = StubBackend::with_error(CompletionError::RateLimited);
        assert!(matches!(
            stub.complete("p", 0.3).await,
            Err(CompletionError::RateLimited)
        ));
    }
}
