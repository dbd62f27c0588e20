//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use trie_router::routing::{
    CompiledTrie, RouteBuilderRegistrant, RouteGroup, RouteRegistrantCollection, RouteRegistry,
    TrieProvider,
};

/// A small application: blog, users, tenant dashboards.
pub fn app_registrants() -> RouteRegistrantCollection {
    let mut registrants = RouteRegistrantCollection::new();
    registrants.add(RouteBuilderRegistrant::new().with_routes(|b| {
        b.get("/").named("home").to("HomeController@index");
        b.get("/users").named("users.index").to("UserController@index");
        b.post("/users").named("users.store").to("UserController@store");
        b.get("/users/me").named("users.me").to("UserController@me");
        b.get("/users/{id:int}")
            .named("users.show")
            .with_metadata("auth", true)
            .to("UserController@show");
        b.put("/users/{id:int}").named("users.update").to("UserController@update");
        b.get("/users/{id:int}/posts/{slug:alphanumeric?}")
            .named("users.posts")
            .to("PostController@byUser");
        b.get("/archive/{year:between(1990,2100)=2024}/{month:int?}")
            .named("archive")
            .to("ArchiveController@show");
        b.get("/tags/{tag}").named("tags.show").to("TagController@show");
        b.get("/files/{kind:in(image,video)}/{id:uuid}")
            .named("files.show")
            .to("FileController@show");

        b.group(RouteGroup::prefix("/dashboard").host("{tenant}.example.com"), |b| {
            b.get("/").named("tenant.home").to("TenantController@home");
            b.get("/settings").named("tenant.settings").to("TenantController@settings");
        });
    }));
    registrants
}

pub fn app_provider() -> TrieProvider {
    TrieProvider::new(app_registrants(), None)
}

pub fn build_trie(registrants: &RouteRegistrantCollection) -> Arc<CompiledTrie> {
    let mut registry = RouteRegistry::new();
    registrants.register_routes(&mut registry);
    Arc::new(CompiledTrie::build(registry).unwrap())
}

pub fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}
