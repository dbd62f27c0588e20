//! Trie-based HTTP route matching.
//!
//! Routes are registered as URI templates, folded into a segment trie once,
//! then matched many times. The same compiled table drives reverse URI
//! generation by route name.
//!
//! # Architecture Overview
//!
//! ```text
//!   config file ──▶ config ──▶ lifecycle::startup
//!                                   │
//!                                   ▼
//!   registrants ──▶ routing::registry ──▶ routing::trie ◀──▶ cache
//!                                             │
//!                         ┌───────────────────┴──────────────┐
//!                         ▼                                  ▼
//!                 routing::matcher                    routing::uri
//!                         │
//!                         ▼
//!                 http::server (404 / 405 / 200)
//! ```

pub mod cache;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::{Environment, RouterConfig};
pub use routing::{
    MatchError, RouteMatch, RouteMatcher, RouteRegistrantCollection, RouteUriFactory,
    TrieProvider,
};
