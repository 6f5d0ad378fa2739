//! Caller identity model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The authenticated caller behind a request.
///
/// Resolved once at the boundary by an
/// [`IdentityResolver`](crate::capability::IdentityResolver) and passed
/// explicitly into every policy call. There is no ambient
/// "current user" state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Caller {
    pub id: Uuid,
    /// Role name; the key into ACL capability matrices.
    pub role: String,
    /// Administrators bypass every field-level access check.
    pub is_admin: bool,
}
