// Client configuration, layered from TOML files and FLOWTING_* environment variables.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_PERSONA_TEST_PATH: &str = "/personas/test/";
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_persona_test_path")]
    pub persona_test_path: String,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Sent as `X-CSRFToken` when present.
    #[serde(default)]
    pub csrf_token: Option<String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            persona_test_path: default_persona_test_path(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            csrf_token: None,
            logging: LoggingConfig::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_persona_test_path() -> String {
    DEFAULT_PERSONA_TEST_PATH.to_string()
}

fn default_connect_timeout_ms() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_MS
}

impl ClientConfig {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. Environment variables prefixed with `FLOWTING_`
    ///    (nested keys use `__`, e.g. `FLOWTING_LOGGING__LEVEL`)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("FLOWTING")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: ClientConfig = config.try_deserialize()?;
        Ok(cfg.normalized())
    }

    /// Load config from a specific path (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?;

        let cfg: ClientConfig = config.try_deserialize()?;
        Ok(cfg.normalized())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self.normalized()
    }

    pub fn with_csrf_token(mut self, token: impl Into<String>) -> Self {
        self.csrf_token = Some(token.into());
        self
    }

    /// Full URL of the persona test endpoint.
    pub fn persona_test_url(&self) -> String {
        if self.persona_test_path.starts_with("http") {
            return self.persona_test_path.clone();
        }
        format!("{}{}", self.base_url, self.persona_test_path)
    }

    fn normalized(mut self) -> Self {
        let trimmed = self.base_url.trim_end_matches('/').len();
        self.base_url.truncate(trimmed);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_structure() {
        let toml = r#"
            base_url = "https://api.example.com"
            persona_test_path = "/personas/test/"
            connect_timeout_ms = 2500
            csrf_token = "abc"

            [logging]
            level = "debug"
            format = "json"
        "#;

        let config: ClientConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.connect_timeout_ms, 2500);
        assert_eq!(config.csrf_token.as_deref(), Some("abc"));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.persona_test_path, DEFAULT_PERSONA_TEST_PATH);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_trailing_slashes_are_stripped() {
        let config = ClientConfig::default().with_base_url("https://api.example.com///");
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(
            config.persona_test_url(),
            "https://api.example.com/personas/test/"
        );
    }

    #[test]
    fn test_absolute_test_path_wins() {
        let mut config = ClientConfig::default();
        config.persona_test_path = "https://other.example.com/test".to_string();
        assert_eq!(config.persona_test_url(), "https://other.example.com/test");
    }
}
