pub mod app;
pub mod error;
pub mod loader;
pub mod provider;
pub mod schema;
pub mod server;
pub mod warehouse;

/// Default config file path - can be overridden via CLI argument
pub const CONFIG_PATH: &str = "config/agent.toml";

pub use app::AppConfig;
pub use error::ConfigError;
pub use provider::{ModelInfo, ModelProviderConfig, RetryConfig};
pub use schema::{ColumnConfig, TableConfig};
pub use server::RestServerConfig;
pub use warehouse::WarehouseConfig;
