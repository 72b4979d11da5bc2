use super::error::ConfigError;
use super::provider::{ModelProviderConfig, RetryConfig};
use super::schema::TableConfig;
use super::server::RestServerConfig;
use super::warehouse::WarehouseConfig;
use std::path::{Path, PathBuf};

/// Application configuration loaded from agent.toml
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub default_provider: String,
    pub model: String,
    /// Role framing for the system prompt, e.g. "Acme's Snowflake data warehouse".
    pub domain: String,
    pub providers: Vec<ModelProviderConfig>,
    pub retry: RetryConfig,
    pub warehouse: WarehouseConfig,
    pub rest_server: RestServerConfig,
    pub tables: Vec<TableConfig>,
    pub schema_file: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Parse configuration from an in-memory TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        super::loader::parse_config(content, Path::new("<inline>"))
    }

    /// The provider entry selected by `default_provider`.
    pub fn selected_provider(&self) -> Option<&ModelProviderConfig> {
        self.providers.iter().find(|p| p.id == self.default_provider)
    }
}
