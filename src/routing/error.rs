//! Routing error taxonomy.
//!
//! Build-time errors abort startup. Match-time and generation errors are
//! per-call results for the HTTP layer to map onto responses.

use std::collections::BTreeSet;

use thiserror::Error;

/// A URI template could not be compiled.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("unbalanced braces in template `{template}`")]
    UnbalancedBraces { template: String },

    #[error("variable must occupy a whole segment in template `{template}`")]
    PartialSegment { template: String },

    #[error("invalid variable name `{name}` in template `{template}`")]
    InvalidVariableName { template: String, name: String },

    #[error("variable `{name}` appears more than once in template `{template}`")]
    DuplicateVariable { template: String, name: String },

    #[error("required segment follows optional variable `{name}` in template `{template}`")]
    OptionalBeforeRequired { template: String, name: String },

    #[error("unknown constraint `{constraint}`")]
    UnknownConstraint { constraint: String },

    #[error("invalid arguments for constraint `{constraint}`: {reason}")]
    InvalidConstraintArgs { constraint: String, reason: String },

    #[error("invalid regex `{pattern}`: {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("default value `{value}` of variable `{name}` violates its constraints")]
    InvalidDefault { name: String, value: String },
}

/// The route set could not be compiled into a trie.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("route `{route}` has an invalid template: {source}")]
    TemplateSyntax {
        route: String,
        #[source]
        source: TemplateError,
    },

    #[error("route `{route}` is ambiguous: variable {conflicting} collides with {existing} at the same position")]
    AmbiguousRoute {
        route: String,
        existing: String,
        conflicting: String,
    },

    #[error("route name `{0}` is registered more than once")]
    DuplicateRouteName(String),
}

/// Why a request did not resolve to a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("no route found")]
    NoRouteFound,

    #[error("method not allowed (allowed: {})", join(.allowed))]
    MethodNotAllowed { allowed: BTreeSet<String> },

    #[error("host does not match any route for this path")]
    HostMismatch,
}

impl MatchError {
    /// Value for an `Allow` header, when the miss carries one.
    pub fn allow_header(&self) -> Option<String> {
        match self {
            MatchError::MethodNotAllowed { allowed } => Some(join(allowed)),
            _ => None,
        }
    }
}

fn join(methods: &BTreeSet<String>) -> String {
    methods.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

/// A URI could not be generated for a route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UriError {
    #[error("no route named `{0}`")]
    RouteNotFound(String),

    #[error("route `{route}` requires parameter `{name}`")]
    MissingParameter { route: String, name: String },

    #[error("value `{value}` for parameter `{name}` of route `{route}` violates its constraints")]
    ParameterConstraintViolation {
        route: String,
        name: String,
        value: String,
    },

    #[error("route `{0}` has a wildcard host and cannot produce a concrete URI")]
    WildcardHost(String),
}
