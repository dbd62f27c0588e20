//! Fluent, programmatic route registration.
//!
//! ```text
//! builder.get("/users/{id:int}").named("users.show").to("UserController@show");
//! builder.group(RouteGroup::prefix("/api").host("api.example.com"), |api| {
//!     api.post("/users").to("UserController@create");
//! });
//! ```

use crate::routing::registry::{HandlerRef, RouteDescriptor};

/// Shared prefix and host applied to every route declared inside a group.
#[derive(Debug, Clone, Default)]
pub struct RouteGroup {
    prefix: String,
    host: Option<String>,
}

impl RouteGroup {
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            host: None,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }
}

/// Collects route descriptors declared through the fluent API.
#[derive(Debug, Default)]
pub struct RouteCollectionBuilder {
    routes: Vec<RouteDescriptor>,
    group: RouteGroup,
}

impl RouteCollectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a route for an explicit method set (empty = any method).
    pub fn route<I, S>(&mut self, methods: I, path: &str) -> RouteBuilder<'_>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut descriptor = RouteDescriptor::new(
            methods,
            join_paths(&self.group.prefix, path),
            HandlerRef::new(""),
        );
        descriptor.host = self.group.host.clone();

        RouteBuilder {
            routes: &mut self.routes,
            descriptor,
        }
    }

    pub fn get(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(["GET"], path)
    }

    pub fn post(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(["POST"], path)
    }

    pub fn put(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(["PUT"], path)
    }

    pub fn patch(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(["PATCH"], path)
    }

    pub fn delete(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(["DELETE"], path)
    }

    pub fn head(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(["HEAD"], path)
    }

    pub fn options(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(["OPTIONS"], path)
    }

    pub fn any(&mut self, path: &str) -> RouteBuilder<'_> {
        self.route(Vec::<&str>::new(), path)
    }

    /// Declares routes under a shared prefix and host. Groups nest.
    pub fn group(&mut self, group: RouteGroup, declare: impl FnOnce(&mut RouteCollectionBuilder)) {
        let outer = self.group.clone();
        self.group = RouteGroup {
            prefix: join_paths(&outer.prefix, &group.prefix),
            host: group.host.or_else(|| outer.host.clone()),
        };
        declare(self);
        self.group = outer;
    }

    pub fn build(self) -> Vec<RouteDescriptor> {
        self.routes
    }
}

/// A route under construction. Nothing is registered until `to` is called.
#[must_use = "a route is only registered once `to` is called"]
pub struct RouteBuilder<'a> {
    routes: &'a mut Vec<RouteDescriptor>,
    descriptor: RouteDescriptor,
}

impl RouteBuilder<'_> {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.descriptor.name = Some(name.into());
        self
    }

    pub fn on_host(mut self, host: impl Into<String>) -> Self {
        self.descriptor.host = Some(host.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.descriptor.metadata.insert(key.into(), value.into());
        self
    }

    /// Binds the route to its handler and registers it.
    pub fn to(mut self, handler: impl Into<String>) {
        self.descriptor.handler = HandlerRef::new(handler);
        self.routes.push(self.descriptor);
    }
}

fn join_paths(prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let path = path.trim_start_matches('/');
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => format!("/{}", path),
        (false, true) => format!("/{}", prefix),
        (false, false) => format!("/{}/{}", prefix, path),
    }
}
