//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RouterConfig (validated, immutable)
//!     → APP_ENV overrides `environment`
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; routes are never hot-reloaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks;
//!   template syntax is left to the trie build

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    Environment, ListenerConfig, ObservabilityConfig, RouteConfig, RouterConfig, RoutingConfig,
};
