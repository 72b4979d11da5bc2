//! Application constants
//!
//! Single source of truth for paths and other constants.

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// Role framing used when the config does not provide `domain`
pub const DEFAULT_DOMAIN: &str = "the company's Snowflake data warehouse";

/// Default Gemini API path (fallback when not specified in config)
pub const DEFAULT_GEMINI_API_PATH: &str = "v1beta/models";

/// Anthropic API version header value
pub const ANTHROPIC_VERSION: &str = "2023-06-01";
