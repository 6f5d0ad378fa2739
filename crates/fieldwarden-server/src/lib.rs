//! Fieldwarden Server — boundary plumbing over the policy layer:
//! identity resolution, request handlers, and envelope translation.

pub mod handlers;
pub mod identity;
pub mod response;

pub use handlers::{PolicyHandlers, Request};
pub use identity::StaticIdentityResolver;
pub use response::Envelope;
