//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Validate → Resolve environment
//!     → Assemble registrants (+ route cache in production)
//!     → TrieProvider (+ trie cache in production)
//!
//! Shutdown:
//!     Ctrl+C → http::server stops accepting → drains → exits
//! ```
//!
//! # Design Decisions
//! - Fail fast: config errors are fatal before any route is registered
//! - The trie itself is built lazily on first use, not at startup

pub mod startup;

pub use startup::{bootstrap, Caches};
