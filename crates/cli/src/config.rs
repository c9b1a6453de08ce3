//! Configuration loading from iati-mcp.toml.

use runtime::http::{DEFAULT_CODELIST_URL, DEFAULT_DATASTORE_URL};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Config file looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE: &str = "iati-mcp.toml";

/// Top-level configuration. Every key is optional.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub datastore: DatastoreConfig,

    #[serde(default)]
    pub codelists: CodelistConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

/// Datastore search endpoint.
#[derive(Debug, Deserialize)]
pub struct DatastoreConfig {
    #[serde(default = "default_datastore_url")]
    pub base_url: String,
}

impl Default for DatastoreConfig {
    fn default() -> Self {
        Self {
            base_url: default_datastore_url(),
        }
    }
}

/// Codelist downloads and cache lifetime.
#[derive(Debug, Deserialize)]
pub struct CodelistConfig {
    #[serde(default = "default_codelist_url")]
    pub base_url: String,

    /// Seconds before a cached codelist is refreshed.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CodelistConfig {
    fn default() -> Self {
        Self {
            base_url: default_codelist_url(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_datastore_url() -> String {
    DEFAULT_DATASTORE_URL.to_string()
}

fn default_codelist_url() -> String {
    DEFAULT_CODELIST_URL.to_string()
}

fn default_ttl_secs() -> u64 {
    codelist::DEFAULT_TTL.as_secs()
}

fn default_timeout_secs() -> u64 {
    runtime::http::DEFAULT_TIMEOUT.as_secs()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml)
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else `iati-mcp.toml` if present, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None if Path::new(CONFIG_FILE).exists() => Self::load(CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.codelists.ttl_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::Invalid("http.timeout_secs must be positive".into()));
        }
        for (key, url) in [
            ("datastore.base_url", &self.datastore.base_url),
            ("codelists.base_url", &self.codelists.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "{key} must be an http(s) URL, got '{url}'"
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.datastore.base_url, DEFAULT_DATASTORE_URL);
        assert_eq!(config.codelists.base_url, DEFAULT_CODELIST_URL);
        assert_eq!(config.ttl(), Duration::from_secs(86_400));
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn parses_overrides() {
        let config = Config::parse(
            r#"
[datastore]
base_url = "http://localhost:8080/datastore"

[codelists]
ttl_secs = 600

[http]
timeout_secs = 5
"#,
        )
        .unwrap();
        assert_eq!(config.datastore.base_url, "http://localhost:8080/datastore");
        assert_eq!(config.codelists.base_url, DEFAULT_CODELIST_URL);
        assert_eq!(config.ttl(), Duration::from_secs(600));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            Config::parse("[http]\ntimeout_secs = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::parse("[datastore]\nbase_url = \"ftp://example.org\""),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            Config::parse("[codelists]\nttl_secs = \"daily\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = Config::resolve(Some(Path::new("/nonexistent/iati-mcp.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
