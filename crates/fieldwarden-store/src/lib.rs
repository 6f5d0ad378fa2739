//! Fieldwarden Store — in-memory implementations of the persistence
//! and catalog capabilities, plus seed loading.

mod error;
mod memory;
mod seed;

pub use error::StoreError;
pub use memory::{MemoryDefinitionCatalog, MemoryRouteAclCatalog, MemoryStore};
pub use seed::{SeedData, SeedRecord, default_seed};
