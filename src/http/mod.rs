//! HTTP collaborator subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum catch-all route, TraceLayer)
//!     → RouteMatcher::match_request(host, method, path)
//!     → 200 JSON description of the route
//!       | 404 (no route / host mismatch) | 405 + Allow
//! ```
//!
//! Status codes are decided here; the routing core only reports why a
//! request missed.

pub mod server;

pub use server::{build_router, HttpServer, ResolvedRoute};
