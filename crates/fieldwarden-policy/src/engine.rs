//! Dynamic validation engine: per-resource, per-role field-level
//! access control plus rule-based content validation.

use fieldwarden_core::models::validation::ValidationDefinition;
use fieldwarden_core::{
    Caller, DefinitionCatalog, FieldMap, PolicyError, PolicyResult, RouteAclCatalog, Verb,
};
use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::rules::{RuleSet, Violation};

/// Outcome of a validation pass.
///
/// `fields` is the surviving field set; on UPDATE it is the
/// intersection with the role's editable list, on every other verb it
/// is the input unchanged. Callers apply it explicitly; the engine
/// never mutates the request.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDecision {
    pub fields: FieldMap,
    pub allowed: bool,
}

/// Validation engine.
///
/// Generic over the two catalog capabilities so that the policy layer
/// has no dependency on any particular storage crate.
pub struct ValidationEngine<D: DefinitionCatalog, A: RouteAclCatalog> {
    definitions: D,
    route_acls: A,
}

impl<D: DefinitionCatalog, A: RouteAclCatalog> ValidationEngine<D, A> {
    pub fn new(definitions: D, route_acls: A) -> Self {
        Self {
            definitions,
            route_acls,
        }
    }

    /// Gate and filter `fields` for one request against the resource's
    /// validation definition.
    ///
    /// A missing definition is an operator problem and fails
    /// [`PolicyError::ConfigurationMissing`]; rule violations fail
    /// [`PolicyError::ValidationFailed`]. Authorization outcomes are
    /// not errors: they come back as `allowed = false`.
    ///
    /// `overrides` are extra field rules merged over the declared ones
    /// for this call only.
    pub async fn validate_for_resource(
        &self,
        caller: &Caller,
        fields: FieldMap,
        resource: &str,
        verb: Verb,
        overrides: IndexMap<String, String>,
    ) -> PolicyResult<FieldDecision> {
        // 1. Administrators bypass every check.
        if caller.is_admin {
            return Ok(FieldDecision {
                fields,
                allowed: true,
            });
        }

        // 2. No definition for the resource means nobody configured it,
        //    which is distinct from the caller lacking permission.
        let definition = self
            .definitions
            .find(resource)
            .await?
            .ok_or_else(|| PolicyError::ConfigurationMissing {
                resource: resource.to_string(),
            })?;

        // 3. The role must resolve through the route-ACL catalog.
        if self.route_acls.resolve(&caller.role).await?.is_none() {
            warn!(role = %caller.role, resource, "role not present in ACL catalog, denying");
            return Ok(FieldDecision {
                fields,
                allowed: false,
            });
        }

        // 4. The role must appear in the definition's ACL matrix.
        let Some(grants) = definition.grants_for(&caller.role) else {
            warn!(role = %caller.role, resource, "role has no grants for resource, denying");
            return Ok(FieldDecision {
                fields,
                allowed: false,
            });
        };

        // 5. Verb gate. UPDATE filters to the editable intersection and
        //    only allows when nothing was dropped; the filtered set is
        //    returned either way.
        let decision = match verb {
            Verb::Create => FieldDecision {
                fields,
                allowed: grants.can_create,
            },
            Verb::Read => FieldDecision {
                fields,
                allowed: grants.can_read,
            },
            Verb::Delete => FieldDecision {
                fields,
                allowed: grants.can_delete,
            },
            Verb::Update => {
                let submitted = fields.len();
                let filtered: FieldMap = fields
                    .into_iter()
                    .filter(|(name, _)| grants.editable.iter().any(|e| e == name))
                    .collect();
                if filtered.len() != submitted {
                    debug!(
                        role = %caller.role,
                        resource,
                        dropped = submitted - filtered.len(),
                        "update submitted fields outside the editable set"
                    );
                }
                let allowed = filtered.len() == submitted;
                FieldDecision {
                    fields: filtered,
                    allowed,
                }
            }
        };
        if !decision.allowed {
            return Ok(decision);
        }

        // 6. Content validation over the surviving fields.
        let errors = self.content_violations(&definition, &decision.fields, overrides)?;
        if !errors.is_empty() {
            return Err(PolicyError::ValidationFailed { errors });
        }

        Ok(decision)
    }

    /// Run the definition's field rules (with `overrides` merged over
    /// them) against the fields actually present, in declaration order.
    fn content_violations(
        &self,
        definition: &ValidationDefinition,
        fields: &FieldMap,
        overrides: IndexMap<String, String>,
    ) -> PolicyResult<Vec<String>> {
        let mut rule_exprs = definition.fields.clone();
        for (field, expr) in overrides {
            rule_exprs.insert(field, expr);
        }

        let mut errors = Vec::new();
        for (field, expr) in &rule_exprs {
            // Absent fields are never validated; only what is present
            // gets checked.
            let Some(value) = fields.get(field) else {
                continue;
            };
            let set = RuleSet::parse(expr)?;
            for violation in set.check(field, value) {
                errors.push(resolve_message(definition, field, &violation));
            }
        }
        Ok(errors)
    }
}

/// Pick the message for a violation: the definition's `"field.rule"`
/// entry wins over its blanket `"rule"` entry, which wins over the
/// rule's built-in default.
fn resolve_message(definition: &ValidationDefinition, field: &str, violation: &Violation) -> String {
    let specific = format!("{field}.{}", violation.rule);
    if let Some(message) = definition.messages.get(&specific) {
        return message.clone();
    }
    if let Some(message) = definition.messages.get(violation.rule) {
        return message.clone();
    }
    violation.message.clone()
}
