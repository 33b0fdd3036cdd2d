use thiserror::Error;

/// Substring the provider puts in credential failures. Matching on message
/// text is fragile; it only backs up the structured `Auth` variant for
/// failures whose body carried no machine-readable reason.
const API_KEY_MARKER: &str = "API key";

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider rejected the API key: {0}")]
    Auth(String),
    #[error("{0}")]
    Failed(String),
}

impl ProviderError {
    pub fn is_auth(&self) -> bool {
        match self {
            ProviderError::Auth(_) => true,
            ProviderError::Failed(message) => message.contains(API_KEY_MARKER),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Failed(e.without_url().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_variant_is_auth() {
        assert!(ProviderError::Auth("bad".into()).is_auth());
    }

    #[test]
    fn api_key_text_in_generic_failure_is_auth() {
        let err = ProviderError::Failed("400 API key not valid. Please pass a valid API key.".into());
        assert!(err.is_auth());
    }

    #[test]
    fn other_failures_are_not_auth() {
        assert!(!ProviderError::Failed("503 model overloaded".into()).is_auth());
        assert!(!ProviderError::Failed("api key".into()).is_auth());
    }
}
