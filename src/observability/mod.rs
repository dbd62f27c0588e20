//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields (route, nodes, error, ...)
//!
//! Consumers:
//!     → logging.rs (EnvFilter + fmt layer, stdout)
//!     → tower-http TraceLayer spans in the HTTP collaborator
//! ```
//!
//! # Design Decisions
//! - The library only emits events; the binary installs the subscriber
//! - `RUST_LOG` overrides the configured level

pub mod logging;
