//! Trie builder (phase two of the build-then-freeze lifecycle).
//!
//! # Responsibilities
//! - Compile every registered template
//! - Fold all path templates into one segment trie
//! - Attach terminal bindings at each valid truncation point
//! - Keep a route table for reverse lookup by name
//!
//! # Design Decisions
//! - Nodes live in an arena (`Vec<TrieNode>`) and refer to children by index
//! - At most one variable edge per node; any second edge with a different
//!   constraint signature is an `AmbiguousRoute` error
//! - Variable names are not part of the edge: `/u/{id}` and `/u/{uid}/x`
//!   share it, and each route binds its own names at match time
//! - All-or-nothing: a failed build never yields a partial trie

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::routing::constraint::{signature, Constraint};
use crate::routing::error::{BuildError, TemplateError};
use crate::routing::registry::{RouteDescriptor, RouteRegistry};
use crate::routing::template::{Segment, UriTemplate, Variable};

pub type NodeId = usize;
pub type RouteId = usize;

pub const ROOT: NodeId = 0;

/// A variable edge out of a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariableEdge {
    pub constraints: Vec<Constraint>,
    pub child: NodeId,
}

/// A route that terminates at a node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerminalBinding {
    pub route: RouteId,
    pub methods: BTreeSet<String>,
    pub host: Option<UriTemplate>,
}

impl TerminalBinding {
    pub fn allows(&self, method: &str) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrieNode {
    pub literals: HashMap<String, NodeId>,
    pub variable: Option<VariableEdge>,
    pub bindings: Vec<TerminalBinding>,
}

/// A registered route with its templates compiled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledRoute {
    pub descriptor: RouteDescriptor,
    pub path: UriTemplate,
    pub host: Option<UriTemplate>,
}

impl CompiledRoute {
    pub fn name(&self) -> Option<&str> {
        self.descriptor.name.as_deref()
    }
}

/// The immutable routing table: trie arena plus route table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompiledTrie {
    nodes: Vec<TrieNode>,
    routes: Vec<CompiledRoute>,
    names: HashMap<String, RouteId>,
}

impl CompiledTrie {
    /// Consumes the registry and compiles it.
    pub fn build(registry: RouteRegistry) -> Result<Self, BuildError> {
        let mut trie = Self {
            nodes: vec![TrieNode::default()],
            routes: Vec::new(),
            names: HashMap::new(),
        };

        for descriptor in registry.into_routes() {
            let route = compile_route(descriptor)?;
            let id = trie.routes.len();
            if let Some(name) = route.name() {
                if trie.names.insert(name.to_string(), id).is_some() {
                    return Err(BuildError::DuplicateRouteName(name.to_string()));
                }
            }
            trie.insert(id, &route)?;
            trie.routes.push(route);
        }

        tracing::info!(
            routes = trie.routes.len(),
            nodes = trie.nodes.len(),
            "Route trie built"
        );
        Ok(trie)
    }

    fn insert(&mut self, id: RouteId, route: &CompiledRoute) -> Result<(), BuildError> {
        let required = route.path.required_len();
        let mut node = ROOT;
        if required == 0 {
            self.bind(node, id, route);
        }

        for (depth, segment) in route.path.segments().iter().enumerate() {
            node = match segment {
                Segment::Literal(text) => self.literal_child(node, text),
                Segment::Variable(variable) => self.variable_child(node, variable, route)?,
                // Paths never compile wildcards; treat one as a literal star.
                Segment::Wildcard => self.literal_child(node, "*"),
            };
            if depth + 1 >= required {
                self.bind(node, id, route);
            }
        }
        Ok(())
    }

    fn bind(&mut self, node: NodeId, id: RouteId, route: &CompiledRoute) {
        self.nodes[node].bindings.push(TerminalBinding {
            route: id,
            methods: route.descriptor.methods.clone(),
            host: route.host.clone(),
        });
    }

    fn literal_child(&mut self, node: NodeId, text: &str) -> NodeId {
        if let Some(&child) = self.nodes[node].literals.get(text) {
            return child;
        }
        let child = self.push_node();
        self.nodes[node].literals.insert(text.to_string(), child);
        child
    }

    fn variable_child(
        &mut self,
        node: NodeId,
        variable: &Variable,
        route: &CompiledRoute,
    ) -> Result<NodeId, BuildError> {
        if let Some(edge) = &self.nodes[node].variable {
            if edge.constraints == variable.constraints {
                return Ok(edge.child);
            }
            return Err(BuildError::AmbiguousRoute {
                route: route.descriptor.label(),
                existing: signature(&edge.constraints),
                conflicting: signature(&variable.constraints),
            });
        }

        let child = self.push_node();
        self.nodes[node].variable = Some(VariableEdge {
            constraints: variable.constraints.clone(),
            child,
        });
        Ok(child)
    }

    fn push_node(&mut self) -> NodeId {
        self.nodes.push(TrieNode::default());
        self.nodes.len() - 1
    }

    pub fn node(&self, id: NodeId) -> &TrieNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn routes(&self) -> &[CompiledRoute] {
        &self.routes
    }

    pub fn route(&self, id: RouteId) -> &CompiledRoute {
        &self.routes[id]
    }

    pub fn route_by_name(&self, name: &str) -> Option<&CompiledRoute> {
        self.names.get(name).map(|&id| &self.routes[id])
    }

    /// Verifies every index refers to an existing node or route.
    ///
    /// Deserialized tries must pass this before the matcher may index into them.
    pub fn check_integrity(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("trie has no root node".to_string());
        }
        let node_ok = |id: NodeId| id < self.nodes.len();
        let route_ok = |id: RouteId| id < self.routes.len();

        for (index, node) in self.nodes.iter().enumerate() {
            let children_ok = node.literals.values().all(|&c| node_ok(c))
                && node.variable.as_ref().map_or(true, |e| node_ok(e.child));
            if !children_ok {
                return Err(format!("node {} has a dangling child", index));
            }
            if !node.bindings.iter().all(|b| route_ok(b.route)) {
                return Err(format!("node {} binds an unknown route", index));
            }
        }
        if !self.names.values().all(|&id| route_ok(id)) {
            return Err("route name index is out of range".to_string());
        }
        Ok(())
    }
}

fn compile_route(descriptor: RouteDescriptor) -> Result<CompiledRoute, BuildError> {
    let syntax = |source: TemplateError| BuildError::TemplateSyntax {
        route: descriptor.label(),
        source,
    };

    let path = UriTemplate::parse_path(&descriptor.path).map_err(syntax)?;
    let host = descriptor
        .host
        .as_deref()
        .map(UriTemplate::parse_host)
        .transpose()
        .map_err(syntax)?;

    // Host and path variables end up in one parameter map.
    if let Some(host) = &host {
        if let Some(shared) = host
            .variables()
            .find(|hv| path.variables().any(|pv| pv.name == hv.name))
        {
            return Err(syntax(TemplateError::DuplicateVariable {
                template: format!("{}{}", host.source(), path.source()),
                name: shared.name.clone(),
            }));
        }
    }

    Ok(CompiledRoute {
        descriptor,
        path,
        host,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::registry::HandlerRef;

    fn registry(routes: &[(&str, &str)]) -> RouteRegistry {
        let mut registry = RouteRegistry::new();
        for (method, path) in routes {
            registry.add(RouteDescriptor::new([*method], *path, HandlerRef::new(*path)));
        }
        registry
    }

    #[test]
    fn test_shared_prefix_reuses_nodes() {
        let trie = CompiledTrie::build(registry(&[
            ("GET", "/users"),
            ("GET", "/users/{id}"),
            ("GET", "/users/{uid}/posts"),
        ]))
        .unwrap();
        // root, users, {id}, posts
        assert_eq!(trie.node_count(), 4);
    }

    #[test]
    fn test_optional_binds_every_truncation_point() {
        let trie = CompiledTrie::build(registry(&[("GET", "/posts/{slug?}")])).unwrap();
        let posts = trie.node(ROOT).literals["posts"];
        assert_eq!(trie.node(posts).bindings.len(), 1);
        let slug = trie.node(posts).variable.as_ref().unwrap().child;
        assert_eq!(trie.node(slug).bindings.len(), 1);
    }

    #[test]
    fn test_root_binding() {
        let trie = CompiledTrie::build(registry(&[("GET", "/"), ("GET", "/{page?}")])).unwrap();
        assert_eq!(trie.node(ROOT).bindings.len(), 2);
    }

    #[test]
    fn test_same_path_different_methods_share_node() {
        let trie = CompiledTrie::build(registry(&[("GET", "/items"), ("POST", "/items")])).unwrap();
        let items = trie.node(ROOT).literals["items"];
        assert_eq!(trie.node(items).bindings.len(), 2);
    }

    #[test]
    fn test_ambiguous_variable_edges() {
        let err = CompiledTrie::build(registry(&[("GET", "/x/{a:int}"), ("GET", "/x/{b:string}")]))
            .unwrap_err();
        assert!(matches!(err, BuildError::AmbiguousRoute { .. }));
    }

    #[test]
    fn test_duplicate_names() {
        let mut registry = RouteRegistry::new();
        for path in ["/a", "/b"] {
            let mut route = RouteDescriptor::new(["GET"], path, HandlerRef::new(path));
            route.name = Some("dup".into());
            registry.add(route);
        }
        assert!(matches!(
            CompiledTrie::build(registry),
            Err(BuildError::DuplicateRouteName(name)) if name == "dup"
        ));
    }

    #[test]
    fn test_syntax_error_aborts_build() {
        let err = CompiledTrie::build(registry(&[("GET", "/ok"), ("GET", "/bad/{id")])).unwrap_err();
        assert!(matches!(err, BuildError::TemplateSyntax { .. }));
    }

    #[test]
    fn test_host_and_path_variables_must_differ() {
        let mut registry = RouteRegistry::new();
        let mut route = RouteDescriptor::new(["GET"], "/{tenant}", HandlerRef::new("h"));
        route.host = Some("{tenant}.example.com".into());
        registry.add(route);
        assert!(matches!(
            CompiledTrie::build(registry),
            Err(BuildError::TemplateSyntax {
                source: TemplateError::DuplicateVariable { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_integrity_of_fresh_build() {
        let trie = CompiledTrie::build(registry(&[("GET", "/a/{b}/c")])).unwrap();
        assert!(trie.check_integrity().is_ok());
    }
}
