//! In-memory implementations of the persistence and catalog
//! capabilities.
//!
//! These back the tests and the reference wiring; swapping in a real
//! storage engine means re-implementing the same three traits.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use fieldwarden_core::models::validation::ValidationDefinition;
use fieldwarden_core::{
    DefinitionCatalog, Document, DocumentStore, PolicyResult, RouteAcl, RouteAclCatalog,
};
use fieldwarden_policy::RuleSet;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;

// ---------------------------------------------------------------------------
// Document store
// ---------------------------------------------------------------------------

/// Revision-checked document store over in-memory collections.
///
/// Cheap to clone; clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, HashMap<Uuid, Document>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    async fn find(&self, collection: &str, id: Uuid) -> PolicyResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|records| records.get(&id))
            .cloned())
    }

    async fn insert(&self, collection: &str, mut document: Document) -> PolicyResult<Document> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();
        if records.contains_key(&document.id) {
            return Err(StoreError::DuplicateRecord {
                collection: collection.into(),
                id: document.id,
            }
            .into());
        }
        document.revision = 1;
        let now = Utc::now();
        document.created_at = now;
        document.updated_at = now;
        records.insert(document.id, document.clone());
        Ok(document)
    }

    async fn save(
        &self,
        collection: &str,
        document: Document,
        expected_revision: u64,
    ) -> PolicyResult<Document> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection.to_string()).or_default();
        let Some(stored) = records.get_mut(&document.id) else {
            return Err(StoreError::MissingRecord {
                collection: collection.into(),
                id: document.id,
            }
            .into());
        };
        if stored.revision != expected_revision {
            return Err(StoreError::RevisionConflict {
                collection: collection.into(),
                id: document.id,
                expected: expected_revision,
                found: stored.revision,
            }
            .into());
        }
        let mut saved = document;
        saved.revision = expected_revision + 1;
        saved.updated_at = Utc::now();
        *stored = saved.clone();
        Ok(saved)
    }
}

// ---------------------------------------------------------------------------
// Definition catalog
// ---------------------------------------------------------------------------

/// Validation definition registry keyed by resource name.
///
/// `register` parses every field's rule expression up front, so a
/// malformed definition surfaces to the operator at load time and
/// never at request time.
#[derive(Clone, Default)]
pub struct MemoryDefinitionCatalog {
    definitions: Arc<RwLock<HashMap<String, ValidationDefinition>>>,
}

impl MemoryDefinitionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a definition after vetting its rules.
    pub async fn register(&self, definition: ValidationDefinition) -> Result<(), StoreError> {
        for (field, expr) in &definition.fields {
            RuleSet::parse(expr).map_err(|source| StoreError::InvalidDefinition {
                resource: definition.resource.clone(),
                field: field.clone(),
                source,
            })?;
        }
        self.definitions
            .write()
            .await
            .insert(definition.resource.clone(), definition);
        Ok(())
    }
}

impl DefinitionCatalog for MemoryDefinitionCatalog {
    async fn find(&self, resource: &str) -> PolicyResult<Option<ValidationDefinition>> {
        Ok(self.definitions.read().await.get(resource).cloned())
    }
}

// ---------------------------------------------------------------------------
// Route-ACL catalog
// ---------------------------------------------------------------------------

/// Route-ACL registry keyed by role name.
#[derive(Clone, Default)]
pub struct MemoryRouteAclCatalog {
    acls: Arc<RwLock<HashMap<String, RouteAcl>>>,
}

impl MemoryRouteAclCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register(&self, acl: RouteAcl) {
        self.acls.write().await.insert(acl.role.clone(), acl);
    }
}

impl RouteAclCatalog for MemoryRouteAclCatalog {
    async fn resolve(&self, role: &str) -> PolicyResult<Option<RouteAcl>> {
        Ok(self.acls.read().await.get(role).cloned())
    }
}
