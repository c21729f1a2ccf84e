//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON/TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BalancerConfig (validated)
//!     → startup builds the ServerPool from `urls`
//!
//! On PUT /config:
//!     reload.rs parses + validates the payload
//!     → loader.rs persists the updated config
//!     → ServerPool backends replaced in one swap
//! ```
//!
//! # Design Decisions
//! - All fields except `port`/`urls` have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - A rejected reload never touches the running pool

pub mod loader;
pub mod reload;
pub mod schema;
pub mod validation;

pub use loader::{load_config, save_config, ConfigError};
pub use reload::{ConfigReloader, ReloadError, ReloadPayload};
pub use schema::{
    AdminConfig, BalancerConfig, HealthCheckConfig, ListenerConfig, ObservabilityConfig,
    RetryConfig, TimeoutConfig,
};
pub use validation::ValidationError;
