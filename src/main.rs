//! Command-line entry point.
//!
//! ```text
//! trie-router [--config router.toml] match GET https://acme.example.com/users/7
//! trie-router generate users.show id=7
//! trie-router routes
//! trie-router serve
//! trie-router cache flush
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use axum::http::Uri;
use clap::{Parser, Subcommand};
use tokio::net::TcpListener;

use trie_router::config::{load_config, Environment, RouterConfig};
use trie_router::http::{HttpServer, ResolvedRoute};
use trie_router::lifecycle::{bootstrap, Caches};
use trie_router::observability::logging;
use trie_router::routing::RouteRegistrantCollection;

#[derive(Parser)]
#[command(name = "trie-router")]
#[command(about = "Trie-based HTTP route matcher", long_about = None)]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a request and print the matched route
    Match {
        method: String,
        /// Absolute URL or bare path
        url: String,
        /// Host to match against when the URL has none
        #[arg(long)]
        host: Option<String>,
    },
    /// Generate the URI of a named route
    Generate {
        name: String,
        /// Parameters as key=value
        #[arg(value_parser = parse_param)]
        params: Vec<(String, String)>,
    },
    /// List registered routes in registration order
    Routes,
    /// Serve HTTP, answering each request with its resolved route
    Serve,
    /// Manage the route and trie caches
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Delete both cached artifacts
    Flush,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected key=value, got `{}`", raw))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };
    logging::init(&config.observability.log_level);

    let environment = Environment::from_env_or(config.environment);
    tracing::debug!(environment = %environment, "Configuration loaded");

    let provider = bootstrap(&config, environment, RouteRegistrantCollection::new());

    match cli.command {
        Commands::Match { method, url, host } => {
            let uri: Uri = url.parse()?;
            let host = uri.host().map(str::to_string).or(host).unwrap_or_default();
            let matcher = provider.matcher()?;
            let found = matcher.match_request(&host, &method, uri.path())?;
            println!("{}", serde_json::to_string_pretty(&ResolvedRoute::from(&found))?);
        }
        Commands::Generate { name, params } => {
            let params: HashMap<String, String> = params.into_iter().collect();
            println!("{}", provider.uri_factory()?.generate(&name, &params)?);
        }
        Commands::Routes => {
            let trie = provider.trie()?;
            for route in trie.routes() {
                let descriptor = &route.descriptor;
                let methods = if descriptor.methods.is_empty() {
                    "ANY".to_string()
                } else {
                    descriptor.methods.iter().cloned().collect::<Vec<_>>().join("|")
                };
                println!(
                    "{:<12} {}{:<40} {:<24} {}",
                    methods,
                    descriptor.host.as_deref().unwrap_or(""),
                    descriptor.path,
                    descriptor.name.as_deref().unwrap_or("-"),
                    descriptor.handler,
                );
            }
        }
        Commands::Serve => {
            let matcher = provider.matcher()?;
            let listener = TcpListener::bind(&config.listener.bind_address).await?;
            HttpServer::new(matcher).run(listener).await?;
        }
        Commands::Cache {
            action: CacheAction::Flush,
        } => {
            Caches::from_config(&config.routing).flush()?;
            println!("caches flushed");
        }
    }

    Ok(())
}
