use super::error::ProviderError;
use async_trait::async_trait;

#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Sends `prompt` to the provider and returns its raw text reply.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}
