//! Route registry (phase one of the build-then-freeze lifecycle).
//!
//! # Responsibilities
//! - Hold route descriptors in registration order
//! - Look up descriptors by name
//!
//! # Design Decisions
//! - Mutable only while registrants run; consumed by `CompiledTrie::build`
//! - Name uniqueness is enforced by the build, which owns the fatal error

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque reference to the application handler a route dispatches to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HandlerRef(pub String);

impl HandlerRef {
    pub fn new(handler: impl Into<String>) -> Self {
        Self(handler.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A route as registered: templates are still uncompiled text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Unique route name, used for URI generation.
    pub name: Option<String>,

    /// Upper-case HTTP methods. Empty means any method.
    pub methods: BTreeSet<String>,

    /// Host template (e.g. `{tenant}.example.com`).
    pub host: Option<String>,

    /// Path template (e.g. `/users/{id:int}`).
    pub path: String,

    pub handler: HandlerRef,

    /// Pass-through data for the handler layer.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl RouteDescriptor {
    pub fn new<I, S>(methods: I, path: impl Into<String>, handler: HandlerRef) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: None,
            methods: methods
                .into_iter()
                .map(|m| m.as_ref().to_ascii_uppercase())
                .collect(),
            host: None,
            path: path.into(),
            handler,
            metadata: BTreeMap::new(),
        }
    }

    /// Human-readable label for logs and errors.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} {}", self.method_list(), self.path),
        }
    }

    fn method_list(&self) -> String {
        if self.methods.is_empty() {
            "*".to_string()
        } else {
            self.methods.iter().cloned().collect::<Vec<_>>().join("|")
        }
    }
}

/// Ordered, mutable store of route descriptors.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: Vec<RouteDescriptor>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, route: RouteDescriptor) {
        tracing::trace!(route = %route.label(), "Route registered");
        self.routes.push(route);
    }

    pub fn extend(&mut self, routes: impl IntoIterator<Item = RouteDescriptor>) {
        for route in routes {
            self.add(route);
        }
    }

    /// First descriptor registered under the given name.
    pub fn get(&self, name: &str) -> Option<&RouteDescriptor> {
        self.routes.iter().find(|r| r.name.as_deref() == Some(name))
    }

    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn into_routes(self) -> Vec<RouteDescriptor> {
        self.routes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_methods_normalized() {
        let route = RouteDescriptor::new(["get", "Post"], "/items", HandlerRef::new("items"));
        assert!(route.methods.contains("GET"));
        assert!(route.methods.contains("POST"));
        assert_eq!(route.label(), "GET|POST /items");
    }

    #[test]
    fn test_registry_preserves_order() {
        let mut registry = RouteRegistry::new();
        let mut first = RouteDescriptor::new(["GET"], "/a", HandlerRef::new("a"));
        first.name = Some("a".into());
        registry.add(first);
        registry.add(RouteDescriptor::new(Vec::<&str>::new(), "/b", HandlerRef::new("b")));

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.routes()[0].path, "/a");
        assert_eq!(registry.get("a").unwrap().handler.as_str(), "a");
        assert!(registry.get("missing").is_none());
    }
}
