use serde::Deserialize;

const DEFAULT_BIND: &str = "127.0.0.1:5000";

/// REST server settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RestServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}

impl Default for RestServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            cors_origins: Vec::new(),
        }
    }
}
