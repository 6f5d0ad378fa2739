//! Validation definition model — per-resource field rules and role grants.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Closed set of operations governed by a [`ValidationDefinition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verb {
    Create,
    Read,
    Update,
    Delete,
}

impl Verb {
    /// Map an HTTP method name onto a verb.
    ///
    /// `PUT` and `PATCH` both update; unknown methods map to none and
    /// must be refused at the boundary.
    pub fn from_method(method: &str) -> Option<Self> {
        match method {
            "POST" => Some(Self::Create),
            "GET" => Some(Self::Read),
            "PUT" | "PATCH" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            _ => None,
        }
    }
}

/// Per-role capability record inside a definition's `acl` matrix.
///
/// Absent booleans deserialize to `false`, so seed data only has to
/// spell out what a role is granted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoleGrants {
    #[serde(default)]
    pub can_create: bool,
    #[serde(default)]
    pub can_read: bool,
    #[serde(default)]
    pub can_delete: bool,
    /// Fields this role may submit on update, in declaration order.
    #[serde(default)]
    pub editable: Vec<String>,
}

/// Field validation rules, custom messages, and the role capability
/// matrix for one resource name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationDefinition {
    /// Resource name, unique within a catalog (e.g. `"projects"`).
    pub resource: String,
    /// Field name → rule expression (e.g. `"required|max:255"`), in
    /// declaration order. Violation messages are reported in this order.
    #[serde(default)]
    pub fields: IndexMap<String, String>,
    /// Custom violation messages. Keys are `"field.rule"` (specific) or
    /// `"rule"` (blanket); specific wins.
    #[serde(default)]
    pub messages: BTreeMap<String, String>,
    /// Role name → grants. A role missing from this map is denied,
    /// which is a distinct outcome from the definition itself missing.
    #[serde(default)]
    pub acl: BTreeMap<String, RoleGrants>,
}

impl ValidationDefinition {
    /// Look up the grants for a role, if the role is known to this
    /// definition at all.
    pub fn grants_for(&self, role: &str) -> Option<&RoleGrants> {
        self.acl.get(role)
    }
}
