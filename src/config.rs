use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
const CONFIG_PATH_ENV: &str = "DREAM_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

const DEFAULT_BIND: &str = "127.0.0.1:8000";
const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-1.5-pro";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    server: ServerConfig,
    api: ApiConfig,
    storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ServerConfig {
    bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct ApiConfig {
    url: String,
    model: String,
    timeout: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct StorageConfig {
    data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: ".".to_string(),
        }
    }
}

/// Process-wide settings, resolved once at startup and handed to each
/// component's constructor.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind: String,
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub request_timeout: Duration,
    pub data_dir: PathBuf,
}

impl Config {
    /// Builds the config from TOML text plus the API key taken from the
    /// environment. The key is required; everything else has a default.
    pub fn from_parts(content: &str, api_key: Option<String>) -> Result<Self> {
        let config_file: ConfigFile =
            toml::from_str(content).context("Failed to parse config file")?;

        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .with_context(|| format!("{} environment variable is not set", API_KEY_ENV))?;

        Ok(Self {
            bind: config_file.server.bind,
            api_key,
            api_url: config_file.api.url.trim_end_matches('/').to_string(),
            model: config_file.api.model,
            request_timeout: Duration::from_secs(config_file.api.timeout),
            data_dir: config_file.storage.data_dir.into(),
        })
    }

    pub fn from_file(path: &Path, api_key: Option<String>) -> Result<Self> {
        let content = if path.exists() {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?
        } else {
            String::new()
        };

        Self::from_parts(&content, api_key)
    }

    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::from_file(Path::new(&path), std::env::var(API_KEY_ENV).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_parts("", Some("secret".into())).unwrap();

        assert_eq!(config.bind, DEFAULT_BIND);
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.data_dir, PathBuf::from("."));
    }

    #[test]
    fn file_overrides_individual_fields() {
        let content = r#"
            [server]
            bind = "0.0.0.0:9000"

            [api]
            model = "gemini-2.0-flash"
            url = "http://localhost:4000/v1beta/"

            [storage]
            data_dir = "/var/lib/dreams"
        "#;

        let config = Config::from_parts(content, Some("k".into())).unwrap();

        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.api_url, "http://localhost:4000/v1beta");
        assert_eq!(config.request_timeout, Duration::from_secs(120));
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/dreams"));
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let err = Config::from_parts("", None).unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));

        let err = Config::from_parts("", Some("   ".into())).unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(Config::from_parts("[api\nmodel = ", Some("k".into())).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("absent.toml"), Some("k".into())).unwrap();
        assert_eq!(config.bind, DEFAULT_BIND);
    }
}
