//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Deployment environment. Production enables the route and trie caches.
    pub environment: Environment,

    /// Listener for the `serve` command.
    pub listener: ListenerConfig,

    /// Cache locations.
    pub routing: RoutingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Declarative route definitions.
    pub routes: Vec<RouteConfig>,
}

/// Deployment environment switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Production,
    #[default]
    Development,
    Testing,
}

impl Environment {
    /// Applies an `APP_ENV` value over the configured environment.
    ///
    /// Unrecognised values are logged and ignored.
    pub fn resolve(app_env: Option<&str>, configured: Environment) -> Environment {
        match app_env.map(str::parse::<Environment>) {
            Some(Ok(env)) => env,
            Some(Err(e)) => {
                tracing::warn!(error = %e, fallback = %configured, "Ignoring APP_ENV");
                configured
            }
            None => configured,
        }
    }

    /// Reads `APP_ENV` from the process environment.
    pub fn from_env_or(configured: Environment) -> Environment {
        let app_env = std::env::var("APP_ENV").ok();
        Self::resolve(app_env.as_deref(), configured)
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "development" | "dev" => Ok(Environment::Development),
            "testing" | "test" => Ok(Environment::Testing),
            other => Err(format!("unknown environment `{}`", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::Production => "production",
            Environment::Development => "development",
            Environment::Testing => "testing",
        };
        f.write_str(name)
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Route and trie cache locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// File holding the serialized trie.
    pub trie_cache_path: String,

    /// File holding the serialized route descriptors.
    pub route_cache_path: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            trie_cache_path: "cache/routing/trie.json".to_string(),
            route_cache_path: "cache/routing/routes.json".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// A route declared in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route name for URI generation.
    pub name: Option<String>,

    /// HTTP methods. Empty matches any method.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Host template.
    pub host: Option<String>,

    /// Path template.
    pub path: String,

    /// Handler identifier passed through to the application.
    pub handler: String,

    /// Arbitrary pass-through metadata.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}
