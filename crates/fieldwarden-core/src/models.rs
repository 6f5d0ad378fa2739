//! Domain models for Fieldwarden.
//!
//! These are the core types shared across all crates.

pub mod caller;
pub mod record;
pub mod route_acl;
pub mod validation;
