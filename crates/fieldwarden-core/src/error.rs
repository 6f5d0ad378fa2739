//! Error types for the Fieldwarden policy layer.

use thiserror::Error;
use uuid::Uuid;

/// Why a reservation transition was refused.
///
/// Each cause carries the fixed client-facing message surfaced in the
/// error envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConflictReason {
    /// A claim inside the TTL window already exists, by any actor.
    #[error("Record already reserved.")]
    AlreadyReserved,

    /// The record has an `acceptedBy`; it is terminal for everyone.
    #[error("Record already accepted.")]
    AlreadyAccepted,

    /// The caller already declined this record once.
    #[error("Record already declined.")]
    AlreadyDeclined,

    /// Another actor holds a live claim on the record.
    #[error("Permission denied.")]
    HeldByAnother,
}

#[derive(Debug, Error)]
pub enum PolicyError {
    /// No validation definition is configured for the resource. An
    /// operator problem, not a caller problem.
    #[error("Validation definition is missing for this resource.")]
    ConfigurationMissing { resource: String },

    /// Field content violated the declared rules. Carries every
    /// violation message, in definition order.
    #[error("validation failed")]
    ValidationFailed { errors: Vec<String> },

    /// A reservation transition was refused.
    #[error("{0}")]
    ReservationConflict(ConflictReason),

    /// The record id does not resolve.
    #[error("ID not found.")]
    NotFound,

    /// No caller identity could be resolved for the request.
    #[error("Unauthorized.")]
    Unauthorized,

    /// A revision-checked save lost to a concurrent writer.
    #[error("stale write on {collection}/{id}: expected revision {expected}")]
    StaleWrite {
        collection: String,
        id: Uuid,
        expected: u64,
    },

    /// Storage failure.
    #[error("storage error: {0}")]
    Store(String),

    /// Anything else that should never reach a caller as its own class.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type PolicyResult<T> = Result<T, PolicyError>;
