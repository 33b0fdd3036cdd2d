mod error;
mod gemini;
mod types;

use crate::config::Config;
pub use error::ProviderError;
pub use gemini::GeminiClient;
use std::sync::Arc;
pub use types::TextProvider;

pub fn create_text_provider(config: &Config) -> Result<Arc<dyn TextProvider>, ProviderError> {
    let client = GeminiClient::new(
        &config.api_key,
        &config.api_url,
        &config.model,
        config.request_timeout,
    )?;
    Ok(Arc::new(client))
}
