//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber once per process
//! - Resolve the filter from `RUST_LOG` or the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - Library code never installs a subscriber; tests stay silent

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Builds the filter directive for a configured level.
///
/// The crate's own events follow `log_level`; HTTP spans from tower-http
/// are kept one notch quieter.
pub fn default_directive(log_level: &str) -> String {
    format!("trie_router={},tower_http=warn", log_level)
}

/// Installs the global subscriber.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(log_level)))
        .unwrap_or_else(|_| EnvFilter::new(default_directive("info")));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
