//! Model infrastructure module
//!
//! Generation providers behind a single capability trait.
//!
//! # Structure
//! - `types` - Request and Error types
//! - `traits` - ModelProvider, ModelClient traits
//! - `adapter` - Message format adapters
//! - `factory` - Provider factory for creating clients
//! - `clients` - Individual vendor client implementations
//! - `retry` - Transport-level retry policy
//! - `provider` - SelectedProvider, the startup-selected provider

pub mod adapter;
pub mod clients;
pub mod factory;
pub mod provider;
pub mod retry;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use provider::SelectedProvider;
pub use retry::RetryPolicy;
pub use traits::{ModelClient, ModelProvider, TextStream};
pub use types::{ModelError, ModelRequest};
