//! Seed data: serde-loadable bundles applied to the in-memory
//! registries, plus the stock deployment defaults.

use fieldwarden_core::models::validation::ValidationDefinition;
use fieldwarden_core::{Document, DocumentStore, PolicyResult, RouteAcl};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::memory::{MemoryDefinitionCatalog, MemoryRouteAclCatalog, MemoryStore};

/// One record to insert into a named collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRecord {
    pub collection: String,
    pub document: Document,
}

/// A complete seed bundle, loadable from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub definitions: Vec<ValidationDefinition>,
    #[serde(default)]
    pub route_acls: Vec<RouteAcl>,
    #[serde(default)]
    pub records: Vec<SeedRecord>,
}

impl SeedData {
    /// Apply the bundle: register definitions (vetting their rules),
    /// register route ACLs, insert records.
    pub async fn apply(
        &self,
        store: &MemoryStore,
        definitions: &MemoryDefinitionCatalog,
        route_acls: &MemoryRouteAclCatalog,
    ) -> PolicyResult<()> {
        for definition in &self.definitions {
            definitions.register(definition.clone()).await?;
        }
        for acl in &self.route_acls {
            route_acls.register(acl.clone()).await;
        }
        for record in &self.records {
            store
                .insert(&record.collection, record.document.clone())
                .await?;
        }
        info!(
            definitions = self.definitions.len(),
            route_acls = self.route_acls.len(),
            records = self.records.len(),
            "seed data applied"
        );
        Ok(())
    }
}

/// The stock deployment seed: the `standard` role and its route
/// grants.
pub fn default_seed() -> SeedData {
    SeedData {
        definitions: Vec::new(),
        route_acls: vec![standard_role()],
        records: Vec::new(),
    }
}

fn standard_role() -> RouteAcl {
    RouteAcl::new("standard")
        .grant(
            "GET",
            &[
                "api/v1/{resource}",
                "api/v1/{resource}/{id}",
                "api/v1/configuration",
                "api/v1/profiles",
                "api/v1/profiles/{profiles}",
                "api/v1/slack/users",
            ],
        )
        .grant(
            "PUT",
            &["api/v1/profiles/changePassword", "api/v1/profiles/{profiles}"],
        )
        .grant("PATCH", &["api/v1/profiles/{profiles}"])
}
