//! JSON envelope translation for handler outcomes.
//!
//! Success responses carry the data itself with status 200 and echo
//! the caller's bearer token back in an `Authorization` header. Error
//! responses carry `{"error": true, "errors": [...]}` with the status
//! the taxonomy assigns, and never echo the token.

use fieldwarden_core::PolicyError;
use serde_json::{Value, json};

/// A transport-agnostic response ready for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub status: u16,
    pub body: Value,
    /// `Authorization: bearer <token>` echo, success only.
    pub authorization: Option<String>,
}

impl Envelope {
    pub fn success(body: Value, bearer: Option<&str>) -> Self {
        Self {
            status: 200,
            body,
            authorization: bearer.map(|token| format!("bearer {token}")),
        }
    }

    pub fn error(status: u16, errors: Vec<String>) -> Self {
        Self {
            status,
            body: json!({ "error": true, "errors": errors }),
            authorization: None,
        }
    }

    pub fn from_policy_error(err: &PolicyError) -> Self {
        Self::error(status_for(err), messages_for(err))
    }
}

/// Status per error class: 400 validation, 401 missing identity, 403
/// reservation conflicts, 404 missing record, 405 missing resource
/// configuration, 500 storage and internal faults.
pub fn status_for(err: &PolicyError) -> u16 {
    match err {
        PolicyError::ValidationFailed { .. } => 400,
        PolicyError::Unauthorized => 401,
        PolicyError::ReservationConflict(_) => 403,
        PolicyError::NotFound => 404,
        PolicyError::ConfigurationMissing { .. } => 405,
        PolicyError::StaleWrite { .. } | PolicyError::Store(_) | PolicyError::Internal(_) => 500,
    }
}

fn messages_for(err: &PolicyError) -> Vec<String> {
    match err {
        PolicyError::ValidationFailed { errors } => errors.clone(),
        other => vec![other.to_string()],
    }
}
