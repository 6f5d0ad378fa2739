//! Capability trait definitions for the seams the policy layer
//! consumes: identity, persistence, and the two configuration
//! catalogs.
//!
//! All operations are async. Implementations live outside this crate;
//! services are generic over these traits.

use uuid::Uuid;

use crate::error::PolicyResult;
use crate::models::{
    caller::Caller,
    record::Document,
    route_acl::RouteAcl,
    validation::ValidationDefinition,
};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Resolves a bearer token to the authenticated caller.
pub trait IdentityResolver: Send + Sync {
    /// `Ok(None)` when the token is absent or unknown; the boundary
    /// turns that into an unauthorized response.
    fn resolve(
        &self,
        token: Option<&str>,
    ) -> impl Future<Output = PolicyResult<Option<Caller>>> + Send;
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

/// Schemaless document persistence with optimistic concurrency.
pub trait DocumentStore: Send + Sync {
    fn find(
        &self,
        collection: &str,
        id: Uuid,
    ) -> impl Future<Output = PolicyResult<Option<Document>>> + Send;

    /// Stores a new document. The returned copy carries revision 1.
    fn insert(
        &self,
        collection: &str,
        document: Document,
    ) -> impl Future<Output = PolicyResult<Document>> + Send;

    /// Replaces a document, failing with a stale-write error unless the
    /// stored revision still equals `expected_revision`. The returned
    /// copy carries the incremented revision.
    fn save(
        &self,
        collection: &str,
        document: Document,
        expected_revision: u64,
    ) -> impl Future<Output = PolicyResult<Document>> + Send;
}

// ---------------------------------------------------------------------------
// Configuration catalogs
// ---------------------------------------------------------------------------

/// Looks up the validation definition governing a resource.
pub trait DefinitionCatalog: Send + Sync {
    fn find(
        &self,
        resource: &str,
    ) -> impl Future<Output = PolicyResult<Option<ValidationDefinition>>> + Send;
}

/// Looks up the route grants attached to a role.
pub trait RouteAclCatalog: Send + Sync {
    fn resolve(&self, role: &str)
    -> impl Future<Output = PolicyResult<Option<RouteAcl>>> + Send;
}
