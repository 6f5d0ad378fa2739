//! Fieldwarden Server — application entry point.

use fieldwarden_policy::PolicyConfig;
use fieldwarden_server::{PolicyHandlers, StaticIdentityResolver};
use fieldwarden_store::{MemoryDefinitionCatalog, MemoryRouteAclCatalog, MemoryStore, default_seed};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("fieldwarden=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Fieldwarden server...");

    let store = MemoryStore::new();
    let definitions = MemoryDefinitionCatalog::new();
    let route_acls = MemoryRouteAclCatalog::new();
    if let Err(err) = default_seed().apply(&store, &definitions, &route_acls).await {
        tracing::error!(%err, "Failed to apply seed data");
        return;
    }

    let _handlers = PolicyHandlers::new(
        StaticIdentityResolver::new(),
        store,
        definitions,
        route_acls,
        PolicyConfig::default(),
    );

    // TODO: Load identity tokens and extra seed data from configuration
    // TODO: Mount an HTTP transport on the handlers

    tracing::info!("Fieldwarden server ready.");
}
