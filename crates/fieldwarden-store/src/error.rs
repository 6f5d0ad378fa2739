//! Store-specific error types and conversions.

use fieldwarden_core::PolicyError;
use fieldwarden_policy::RuleError;
use uuid::Uuid;

/// Storage-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("revision conflict on {collection}/{id}: expected {expected}, found {found}")]
    RevisionConflict {
        collection: String,
        id: Uuid,
        expected: u64,
        found: u64,
    },

    #[error("duplicate record {id} in {collection}")]
    DuplicateRecord { collection: String, id: Uuid },

    #[error("no record {id} in {collection} to save over")]
    MissingRecord { collection: String, id: Uuid },

    #[error("invalid rule for `{resource}.{field}`: {source}")]
    InvalidDefinition {
        resource: String,
        field: String,
        #[source]
        source: RuleError,
    },
}

impl From<StoreError> for PolicyError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RevisionConflict {
                collection,
                id,
                expected,
                ..
            } => PolicyError::StaleWrite {
                collection,
                id,
                expected,
            },
            other => PolicyError::Store(other.to_string()),
        }
    }
}
