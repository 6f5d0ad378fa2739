//! Request handlers for the reservation endpoints and validated
//! mutations.
//!
//! A transport parses the wire request into [`Request`] and picks the
//! handler; everything after that (identity, route gate, policy call,
//! envelope) happens here.

use chrono::Utc;
use fieldwarden_core::{
    Caller, DefinitionCatalog, Document, DocumentStore, FieldMap, IdentityResolver, PolicyError,
    RouteAclCatalog, Verb,
};
use fieldwarden_policy::{PolicyConfig, ReservationService, ValidationEngine};
use indexmap::IndexMap;
use tracing::warn;
use uuid::Uuid;

use crate::response::Envelope;

const PERMISSION_DENIED: &str = "Permission denied.";
const METHOD_NOT_ALLOWED: &str = "Method not allowed.";

/// One inbound request, already parsed by the transport.
#[derive(Debug, Clone, Default)]
pub struct Request {
    /// Upper-case HTTP method.
    pub method: String,
    /// Concrete request path, e.g. `api/v1/projects/42`.
    pub path: String,
    /// Bearer token, when the request carried one.
    pub bearer: Option<String>,
    /// Parsed body fields.
    pub fields: FieldMap,
}

#[derive(Debug, Clone, Copy)]
enum ReservationOp {
    Reserve,
    Accept,
    Decline,
}

/// The policy layer's request surface.
///
/// Generic over the capability traits; production wiring and tests
/// differ only in what they plug in.
pub struct PolicyHandlers<I, S, D, A>
where
    I: IdentityResolver,
    S: DocumentStore + Clone,
    D: DefinitionCatalog,
    A: RouteAclCatalog + Clone,
{
    identity: I,
    store: S,
    engine: ValidationEngine<D, A>,
    reservations: ReservationService<S>,
    route_acls: A,
}

impl<I, S, D, A> PolicyHandlers<I, S, D, A>
where
    I: IdentityResolver,
    S: DocumentStore + Clone,
    D: DefinitionCatalog,
    A: RouteAclCatalog + Clone,
{
    pub fn new(identity: I, store: S, definitions: D, route_acls: A, config: PolicyConfig) -> Self {
        Self {
            identity,
            engine: ValidationEngine::new(definitions, route_acls.clone()),
            reservations: ReservationService::new(store.clone(), config),
            store,
            route_acls,
        }
    }

    /// Claim the record for the caller.
    pub async fn reserve(&self, request: &Request, id: Uuid) -> Envelope {
        self.reservation(request, id, ReservationOp::Reserve).await
    }

    /// Accept the record, ending the reservation protocol for it.
    pub async fn accept(&self, request: &Request, id: Uuid) -> Envelope {
        self.reservation(request, id, ReservationOp::Accept).await
    }

    /// Permanently opt the caller out of the record.
    pub async fn decline(&self, request: &Request, id: Uuid) -> Envelope {
        self.reservation(request, id, ReservationOp::Decline).await
    }

    /// Validated create (POST) or update (PUT/PATCH) against a named
    /// resource. Update needs `id`; other methods answer 405.
    pub async fn mutate(&self, request: &Request, resource: &str, id: Option<Uuid>) -> Envelope {
        let caller = match self.authorize(request).await {
            Ok(caller) => caller,
            Err(envelope) => return envelope,
        };

        let Some(verb) = Verb::from_method(&request.method) else {
            return Envelope::error(405, vec![METHOD_NOT_ALLOWED.to_string()]);
        };

        let decision = match self
            .engine
            .validate_for_resource(
                &caller,
                request.fields.clone(),
                resource,
                verb,
                IndexMap::new(),
            )
            .await
        {
            Ok(decision) => decision,
            Err(err) => return Envelope::from_policy_error(&err),
        };
        if !decision.allowed {
            return Envelope::error(403, vec![PERMISSION_DENIED.to_string()]);
        }

        let result = match verb {
            Verb::Create => {
                let mut document = Document::new(Uuid::new_v4());
                document.fields = decision.fields;
                self.store.insert(resource, document).await
            }
            Verb::Update => match id {
                None => Err(PolicyError::NotFound),
                Some(id) => match self.store.find(resource, id).await {
                    Ok(Some(mut document)) => {
                        let revision = document.revision;
                        for (field, value) in decision.fields {
                            document.set(field, value);
                        }
                        self.store.save(resource, document, revision).await
                    }
                    Ok(None) => Err(PolicyError::NotFound),
                    Err(err) => Err(err),
                },
            },
            Verb::Read | Verb::Delete => {
                return Envelope::error(405, vec![METHOD_NOT_ALLOWED.to_string()]);
            }
        };

        match result {
            Ok(document) => document_envelope(&document, request.bearer.as_deref()),
            Err(err) => Envelope::from_policy_error(&err),
        }
    }

    async fn reservation(&self, request: &Request, id: Uuid, op: ReservationOp) -> Envelope {
        let caller = match self.authorize(request).await {
            Ok(caller) => caller,
            Err(envelope) => return envelope,
        };

        let now = Utc::now().timestamp();
        let result = match op {
            ReservationOp::Reserve => self.reservations.claim(&caller, id, now).await,
            ReservationOp::Accept => self.reservations.accept(&caller, id, now).await,
            ReservationOp::Decline => self.reservations.decline(&caller, id, now).await,
        };

        match result {
            Ok(document) => document_envelope(&document, request.bearer.as_deref()),
            Err(err) => Envelope::from_policy_error(&err),
        }
    }

    /// Resolve the caller and gate the route. Administrators skip the
    /// route gate.
    async fn authorize(&self, request: &Request) -> Result<Caller, Envelope> {
        let caller = match self.identity.resolve(request.bearer.as_deref()).await {
            Ok(Some(caller)) => caller,
            Ok(None) => return Err(Envelope::from_policy_error(&PolicyError::Unauthorized)),
            Err(err) => return Err(Envelope::from_policy_error(&err)),
        };
        if caller.is_admin {
            return Ok(caller);
        }

        let allowed = match self.route_acls.resolve(&caller.role).await {
            Ok(Some(acl)) => acl.allows(&request.method, &request.path),
            Ok(None) => false,
            Err(err) => return Err(Envelope::from_policy_error(&err)),
        };
        if !allowed {
            warn!(
                role = %caller.role,
                method = %request.method,
                path = %request.path,
                "route not granted for role"
            );
            return Err(Envelope::error(403, vec![PERMISSION_DENIED.to_string()]));
        }
        Ok(caller)
    }
}

fn document_envelope(document: &Document, bearer: Option<&str>) -> Envelope {
    match serde_json::to_value(document) {
        Ok(body) => Envelope::success(body, bearer),
        Err(err) => Envelope::from_policy_error(&PolicyError::Internal(err.to_string())),
    }
}
