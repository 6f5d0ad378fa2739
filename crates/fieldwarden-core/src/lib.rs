//! Fieldwarden Core — domain models, capability traits, and the shared
//! error taxonomy for the policy layer.

pub mod capability;
pub mod error;
pub mod models;

pub use capability::{DefinitionCatalog, DocumentStore, IdentityResolver, RouteAclCatalog};
pub use error::{ConflictReason, PolicyError, PolicyResult};
pub use models::caller::Caller;
pub use models::record::{Document, FieldMap, ReservationEntry};
pub use models::route_acl::RouteAcl;
pub use models::validation::{RoleGrants, ValidationDefinition, Verb};
