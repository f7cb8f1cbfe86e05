//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! host config file (TOML section) or in-code ProxyConfig
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → ForwardDefaults / HyperClient
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - Per-call settings live in `ForwardOptions`, never here

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{LimitsConfig, LogFormat, ObservabilityConfig, ProxyConfig, ResponseConfig, UpstreamConfig};
pub use validation::{validate_config, ValidationError};
