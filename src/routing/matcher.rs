//! Route matching against the compiled trie.
//!
//! # Algorithm
//! ```text
//! path → segments
//! depth-first walk, explicit frame stack:
//!     at each node try the literal edge, then the variable edge
//!     (variable edge only if the segment passes its constraints)
//!     dead end → pop frame, resume at the sibling alternative
//! all segments consumed → evaluate terminal bindings
//!     host filter → method filter → coerce variables → first hit wins
//! ```
//!
//! # Design Decisions
//! - Literal edges beat variable edges at the same depth
//! - No recursion: depth is bounded by the path, not the call stack
//! - Misses from different nodes combine: `MethodNotAllowed` (with the union
//!   of allowed methods) outranks `HostMismatch`, which outranks `NoRouteFound`
//! - Segments are percent-decoded before constraint checks and binding
//! - Read-only over `Arc<CompiledTrie>`; safe for any number of threads

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use percent_encoding::percent_decode_str;

use crate::routing::constraint::{validate_all, ParamValue};
use crate::routing::error::MatchError;
use crate::routing::registry::HandlerRef;
use crate::routing::trie::{CompiledRoute, CompiledTrie, NodeId, ROOT};

/// A successful match.
#[derive(Debug, Clone)]
pub struct RouteMatch<'t> {
    pub route: &'t CompiledRoute,
    /// Host and path variables, coerced per their constraints.
    pub variables: BTreeMap<String, ParamValue>,
    pub host: String,
    pub path: String,
}

impl RouteMatch<'_> {
    pub fn name(&self) -> Option<&str> {
        self.route.name()
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.route.descriptor.handler
    }

    pub fn variable(&self, name: &str) -> Option<&ParamValue> {
        self.variables.get(name)
    }
}

/// A path segment as received and percent-decoded.
///
/// `decoded` is `None` when the escapes do not form valid UTF-8; such a
/// segment can still match a literal edge verbatim but never a variable.
#[derive(Debug)]
struct RequestSegment<'p> {
    raw: &'p str,
    decoded: Option<Cow<'p, str>>,
}

impl<'p> RequestSegment<'p> {
    fn new(raw: &'p str) -> Self {
        Self {
            raw,
            decoded: percent_decode_str(raw).decode_utf8().ok(),
        }
    }

    fn literal(&self) -> &str {
        self.decoded.as_deref().unwrap_or(self.raw)
    }
}

#[derive(Debug, Clone, Copy)]
enum Next {
    Literal,
    Variable,
    Exhausted,
}

#[derive(Debug)]
struct Frame {
    node: NodeId,
    depth: usize,
    captured: bool,
    next: Next,
}

/// Collected reasons why terminal nodes did not produce a match.
#[derive(Debug, Default)]
struct Misses {
    host_mismatch: bool,
    allowed: BTreeSet<String>,
}

impl Misses {
    fn into_error(self) -> MatchError {
        if !self.allowed.is_empty() {
            MatchError::MethodNotAllowed {
                allowed: self.allowed,
            }
        } else if self.host_mismatch {
            MatchError::HostMismatch
        } else {
            MatchError::NoRouteFound
        }
    }
}

/// Matches requests against an immutable compiled trie.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    trie: Arc<CompiledTrie>,
}

impl RouteMatcher {
    pub fn new(trie: Arc<CompiledTrie>) -> Self {
        Self { trie }
    }

    pub fn trie(&self) -> &CompiledTrie {
        &self.trie
    }

    /// Resolves a `(host, method, path)` triple to a route.
    pub fn match_request(
        &self,
        host: &str,
        method: &str,
        path: &str,
    ) -> Result<RouteMatch<'_>, MatchError> {
        let method = method.to_ascii_uppercase();
        let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or(path);
        let segments: Vec<RequestSegment<'_>> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(RequestSegment::new)
            .collect();

        let mut misses = Misses::default();
        let mut captures: Vec<&str> = Vec::with_capacity(segments.len());
        let mut stack = vec![Frame {
            node: ROOT,
            depth: 0,
            captured: false,
            next: Next::Literal,
        }];

        while let Some(frame) = stack.last_mut() {
            let node = self.trie.node(frame.node);

            if frame.depth == segments.len() {
                let terminal = frame.node;
                if let Some(found) = self.resolve(terminal, &captures, host, &method, path, &mut misses) {
                    return Ok(found);
                }
                pop(&mut stack, &mut captures);
                continue;
            }

            let segment = &segments[frame.depth];
            let depth = frame.depth;
            let next = frame.next;
            match next {
                Next::Literal => {
                    frame.next = Next::Variable;
                    if let Some(&child) = node.literals.get(segment.literal()) {
                        stack.push(Frame {
                            node: child,
                            depth: depth + 1,
                            captured: false,
                            next: Next::Literal,
                        });
                    }
                }
                Next::Variable => {
                    frame.next = Next::Exhausted;
                    if let (Some(edge), Some(value)) = (&node.variable, segment.decoded.as_deref()) {
                        if validate_all(&edge.constraints, value) {
                            captures.push(value);
                            stack.push(Frame {
                                node: edge.child,
                                depth: depth + 1,
                                captured: true,
                                next: Next::Literal,
                            });
                        }
                    }
                }
                Next::Exhausted => pop(&mut stack, &mut captures),
            }
        }

        let miss = misses.into_error();
        tracing::trace!(host, method = %method, path, miss = %miss, "Route miss");
        Err(miss)
    }

    /// Evaluates the terminal bindings of a fully consumed path.
    fn resolve(
        &self,
        node: NodeId,
        captures: &[&str],
        host: &str,
        method: &str,
        path: &str,
        misses: &mut Misses,
    ) -> Option<RouteMatch<'_>> {
        let bindings = &self.trie.node(node).bindings;
        let mut host_matched = false;

        for binding in bindings {
            let host_values = match &binding.host {
                Some(template) => match template.match_host(host) {
                    Some(values) => values,
                    None => continue,
                },
                None => Vec::new(),
            };
            host_matched = true;

            if !binding.allows(method) {
                misses.allowed.extend(binding.methods.iter().cloned());
                continue;
            }

            let route = self.trie.route(binding.route);
            // A failed coercion means this route does not really match.
            let Some(mut variables) = route.path.bind(captures) else {
                continue;
            };
            if let Some(host_template) = &route.host {
                let Some(host_variables) = host_template.bind(host_values.as_slice()) else {
                    continue;
                };
                variables.extend(host_variables);
            }

            return Some(RouteMatch {
                route,
                variables,
                host: host.to_string(),
                path: path.to_string(),
            });
        }

        if !bindings.is_empty() && !host_matched {
            misses.host_mismatch = true;
        }
        None
    }
}

fn pop(stack: &mut Vec<Frame>, captures: &mut Vec<&str>) {
    if let Some(frame) = stack.pop() {
        if frame.captured {
            captures.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::registry::{RouteDescriptor, RouteRegistry};

    /// Methods are comma-separated; an empty string means any method.
    fn matcher(routes: &[(&str, &str, Option<&str>)]) -> RouteMatcher {
        let mut registry = RouteRegistry::new();
        for (methods, path, host) in routes {
            let methods = methods.split(',').filter(|m| !m.is_empty());
            let mut route = RouteDescriptor::new(methods, *path, HandlerRef::new(*path));
            route.host = host.map(str::to_string);
            registry.add(route);
        }
        RouteMatcher::new(Arc::new(CompiledTrie::build(registry).unwrap()))
    }

    #[test]
    fn test_literal_beats_variable() {
        let m = matcher(&[("GET", "/users/{id}", None), ("GET", "/users/me", None)]);
        let found = m.match_request("", "GET", "/users/me").unwrap();
        assert_eq!(found.handler().as_str(), "/users/me");

        let found = m.match_request("", "GET", "/users/42").unwrap();
        assert_eq!(found.handler().as_str(), "/users/{id}");
        assert_eq!(found.variable("id"), Some(&ParamValue::Text("42".into())));
    }

    #[test]
    fn test_backtracks_out_of_literal_dead_end() {
        let m = matcher(&[("GET", "/a/{x}/c", None), ("GET", "/a/b/d", None)]);
        let found = m.match_request("", "GET", "/a/b/c").unwrap();
        assert_eq!(found.handler().as_str(), "/a/{x}/c");
        assert_eq!(found.variable("x"), Some(&ParamValue::Text("b".into())));

        let found = m.match_request("", "GET", "/a/b/d").unwrap();
        assert_eq!(found.handler().as_str(), "/a/b/d");
    }

    #[test]
    fn test_backtracks_past_method_mismatch() {
        let m = matcher(&[("GET", "/a/b", None), ("POST", "/a/{x}", None)]);
        let found = m.match_request("", "post", "/a/b").unwrap();
        assert_eq!(found.handler().as_str(), "/a/{x}");
    }

    #[test]
    fn test_constraint_rejects_segment() {
        let m = matcher(&[("GET", "/users/{id:int}", None)]);
        assert!(m.match_request("", "GET", "/users/7").is_ok());
        assert_eq!(
            m.match_request("", "GET", "/users/abc").unwrap_err(),
            MatchError::NoRouteFound
        );
    }

    #[test]
    fn test_optional_trailing_variable() {
        let m = matcher(&[("GET", "/posts/{slug?}", None)]);
        let bare = m.match_request("", "GET", "/posts").unwrap();
        assert!(bare.variable("slug").is_none());
        let full = m.match_request("", "GET", "/posts/hello").unwrap();
        assert_eq!(full.variable("slug").unwrap().to_string(), "hello");
    }

    #[test]
    fn test_default_value_is_filled_in() {
        let m = matcher(&[("GET", "/list/{page:int=1}", None)]);
        let found = m.match_request("", "GET", "/list").unwrap();
        assert_eq!(found.variable("page"), Some(&ParamValue::Int(1)));
    }

    #[test]
    fn test_method_not_allowed_lists_methods() {
        let m = matcher(&[("GET", "/items", None), ("PUT,DELETE", "/items", None)]);
        let err = m.match_request("", "POST", "/items").unwrap_err();
        assert_eq!(
            err,
            MatchError::MethodNotAllowed {
                allowed: ["DELETE", "GET", "PUT"].iter().map(|s| s.to_string()).collect()
            }
        );
        assert_eq!(err.allow_header().as_deref(), Some("DELETE, GET, PUT"));
    }

    #[test]
    fn test_host_mismatch_and_host_variables() {
        let m = matcher(&[("GET", "/dashboard", Some("{tenant}.example.com"))]);
        let found = m.match_request("acme.example.com", "GET", "/dashboard").unwrap();
        assert_eq!(found.variable("tenant").unwrap().to_string(), "acme");

        assert_eq!(
            m.match_request("example.org", "GET", "/dashboard").unwrap_err(),
            MatchError::HostMismatch
        );
    }

    #[test]
    fn test_host_filter_before_method_filter() {
        let m = matcher(&[("GET", "/x", Some("api.example.com"))]);
        assert_eq!(
            m.match_request("www.example.com", "POST", "/x").unwrap_err(),
            MatchError::HostMismatch
        );
        assert!(matches!(
            m.match_request("api.example.com", "POST", "/x").unwrap_err(),
            MatchError::MethodNotAllowed { .. }
        ));
    }

    #[test]
    fn test_first_registered_wins_ties() {
        let m = matcher(&[("GET", "/same", None), ("", "/same", None)]);
        let mut second = RouteRegistry::new();
        second.add(RouteDescriptor::new(["GET"], "/same", HandlerRef::new("first")));
        second.add(RouteDescriptor::new(["GET"], "/same", HandlerRef::new("second")));
        let m2 = RouteMatcher::new(Arc::new(CompiledTrie::build(second).unwrap()));

        assert_eq!(m.match_request("", "GET", "/same").unwrap().handler().as_str(), "/same");
        assert_eq!(m2.match_request("", "GET", "/same").unwrap().handler().as_str(), "first");
    }

    #[test]
    fn test_query_string_ignored_and_root_path() {
        let m = matcher(&[("GET", "/", None), ("GET", "/search", None)]);
        assert_eq!(m.match_request("", "GET", "/").unwrap().handler().as_str(), "/");
        assert_eq!(
            m.match_request("", "GET", "/search?q=x").unwrap().handler().as_str(),
            "/search"
        );
        assert_eq!(
            m.match_request("", "GET", "/missing").unwrap_err(),
            MatchError::NoRouteFound
        );
    }

    #[test]
    fn test_segments_are_percent_decoded() {
        let m = matcher(&[("GET", "/posts/{slug}", None), ("GET", "/caf\u{e9}/menu", None)]);

        let found = m.match_request("", "GET", "/posts/a%3Fb").unwrap();
        assert_eq!(found.variable("slug"), Some(&ParamValue::Text("a?b".into())));
        let found = m.match_request("", "GET", "/posts/two%20words").unwrap();
        assert_eq!(found.variable("slug"), Some(&ParamValue::Text("two words".into())));
        let found = m.match_request("", "GET", "/caf%C3%A9/menu").unwrap();
        assert_eq!(found.handler().as_str(), "/caf\u{e9}/menu");
    }

    #[test]
    fn test_invalid_utf8_escape_never_binds_a_variable() {
        let m = matcher(&[("GET", "/posts/{slug}", None)]);
        assert_eq!(
            m.match_request("", "GET", "/posts/%FF").unwrap_err(),
            MatchError::NoRouteFound
        );
    }
}
