//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (startup, single-threaded):
//!     RouteRegistrant[] (builder callbacks, config file)
//!     → registrant.rs (ordered, optionally via route cache)
//!     → RouteRegistry (mutable, ordered)
//!
//! Compilation (first matcher request):
//!     RouteRegistry
//!     → template.rs (parse path/host templates + constraints)
//!     → trie.rs (fold into one segment trie + route table)
//!     → CompiledTrie (immutable, shared via Arc)
//!
//! Per request:
//!     (host, method, path) → matcher.rs → RouteMatch | MatchError
//!
//! On demand:
//!     (route name, params) → uri.rs → URI | UriError
//! ```
//!
//! # Design Decisions
//! - Two phases: mutable `RouteRegistry`, then immutable `CompiledTrie`
//! - Literal segments beat variable segments at the same depth
//! - Deterministic: registration order breaks ties
//! - Build errors are fatal; match and generation errors are per call

pub mod builder;
pub mod constraint;
pub mod error;
pub mod matcher;
pub mod provider;
pub mod registrant;
pub mod registry;
pub mod template;
pub mod trie;
pub mod uri;

pub use builder::{RouteBuilder, RouteCollectionBuilder, RouteGroup};
pub use constraint::{Constraint, ParamValue};
pub use error::{BuildError, MatchError, TemplateError, UriError};
pub use matcher::{RouteMatch, RouteMatcher};
pub use provider::TrieProvider;
pub use registrant::{
    ConfigRouteRegistrant, RouteBuilderRegistrant, RouteRegistrant, RouteRegistrantCollection,
};
pub use registry::{HandlerRef, RouteDescriptor, RouteRegistry};
pub use template::UriTemplate;
pub use trie::{CompiledRoute, CompiledTrie};
pub use uri::RouteUriFactory;
