//! Route registrants.
//!
//! # Responsibilities
//! - Define the pluggable source interface (`RouteRegistrant`)
//! - Compose registrants additively in a fixed order
//! - Consult the route cache before running registrants (production)
//!
//! # Design Decisions
//! - Registrants run once, before the trie is built
//! - A route cache hit skips every registrant
//! - Route cache failures never stop registration

use std::fmt;

use crate::cache::RouteCache;
use crate::config::RouteConfig;
use crate::routing::builder::RouteCollectionBuilder;
use crate::routing::registry::{HandlerRef, RouteDescriptor, RouteRegistry};

/// A source of routes.
pub trait RouteRegistrant: Send + Sync {
    fn register_routes(&self, registry: &mut RouteRegistry);
}

impl<F> RouteRegistrant for F
where
    F: Fn(&mut RouteRegistry) + Send + Sync,
{
    fn register_routes(&self, registry: &mut RouteRegistry) {
        self(registry)
    }
}

type BuilderCallback = Box<dyn Fn(&mut RouteCollectionBuilder) + Send + Sync>;

/// Registers the routes declared by fluent builder callbacks.
#[derive(Default)]
pub struct RouteBuilderRegistrant {
    callbacks: Vec<BuilderCallback>,
}

impl RouteBuilderRegistrant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_routes<F>(mut self, callback: F) -> Self
    where
        F: Fn(&mut RouteCollectionBuilder) + Send + Sync + 'static,
    {
        self.callbacks.push(Box::new(callback));
        self
    }
}

impl RouteRegistrant for RouteBuilderRegistrant {
    fn register_routes(&self, registry: &mut RouteRegistry) {
        let mut builder = RouteCollectionBuilder::new();
        for callback in &self.callbacks {
            callback(&mut builder);
        }
        registry.extend(builder.build());
    }
}

/// Registers routes declared in the configuration file.
#[derive(Debug, Clone)]
pub struct ConfigRouteRegistrant {
    routes: Vec<RouteConfig>,
}

impl ConfigRouteRegistrant {
    pub fn new(routes: Vec<RouteConfig>) -> Self {
        Self { routes }
    }
}

impl RouteRegistrant for ConfigRouteRegistrant {
    fn register_routes(&self, registry: &mut RouteRegistry) {
        for config in &self.routes {
            let mut route = RouteDescriptor::new(
                &config.methods,
                config.path.clone(),
                HandlerRef::new(config.handler.clone()),
            );
            route.name = config.name.clone();
            route.host = config.host.clone();
            route.metadata = config.metadata.clone();
            registry.add(route);
        }
    }
}

/// Ordered collection of registrants.
#[derive(Default)]
pub struct RouteRegistrantCollection {
    registrants: Vec<Box<dyn RouteRegistrant>>,
    route_cache: Option<RouteCache>,
}

impl RouteRegistrantCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the route cache in front of the registrants.
    pub fn with_route_cache(mut self, cache: RouteCache) -> Self {
        self.route_cache = Some(cache);
        self
    }

    pub fn add(&mut self, registrant: impl RouteRegistrant + 'static) -> &mut Self {
        self.registrants.push(Box::new(registrant));
        self
    }

    pub fn len(&self) -> usize {
        self.registrants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrants.is_empty()
    }

    /// Populates the registry from the route cache, or from every registrant
    /// in order on a cache miss.
    pub fn register_routes(&self, registry: &mut RouteRegistry) {
        if let Some(cache) = &self.route_cache {
            if let Some(routes) = cache.fetch() {
                tracing::debug!(routes = routes.len(), "Routes loaded from route cache");
                registry.extend(routes);
                return;
            }
        }

        for (index, registrant) in self.registrants.iter().enumerate() {
            let before = registry.len();
            registrant.register_routes(registry);
            tracing::debug!(
                registrant = index,
                added = registry.len() - before,
                "Registrant finished"
            );
        }

        if let Some(cache) = &self.route_cache {
            if let Err(e) = cache.store(registry.routes()) {
                tracing::warn!(error = %e, "Failed to store route cache");
            }
        }
    }
}

/// Collections nest, so callers can hand a whole set to the bootstrap.
impl RouteRegistrant for RouteRegistrantCollection {
    fn register_routes(&self, registry: &mut RouteRegistry) {
        RouteRegistrantCollection::register_routes(self, registry)
    }
}

impl fmt::Debug for RouteRegistrantCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteRegistrantCollection")
            .field("registrants", &self.registrants.len())
            .field("route_cache", &self.route_cache)
            .finish()
    }
}
