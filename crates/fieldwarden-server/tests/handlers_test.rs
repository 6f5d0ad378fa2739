//! Integration tests for the request handlers: identity, route gate,
//! reservation endpoints, and validated mutations.

use std::collections::BTreeMap;

use fieldwarden_core::models::validation::{RoleGrants, ValidationDefinition};
use fieldwarden_core::{Caller, Document, DocumentStore, FieldMap, RouteAcl};
use fieldwarden_policy::PolicyConfig;
use fieldwarden_server::{PolicyHandlers, Request, StaticIdentityResolver};
use fieldwarden_store::{MemoryDefinitionCatalog, MemoryRouteAclCatalog, MemoryStore};
use indexmap::IndexMap;
use serde_json::json;
use uuid::Uuid;

type Handlers =
    PolicyHandlers<StaticIdentityResolver, MemoryStore, MemoryDefinitionCatalog, MemoryRouteAclCatalog>;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn member_a() -> Caller {
    Caller {
        id: Uuid::from_u128(0xA1),
        role: "member".into(),
        is_admin: false,
    }
}

fn member_b() -> Caller {
    Caller {
        id: Uuid::from_u128(0xB2),
        role: "member".into(),
        is_admin: false,
    }
}

fn editor() -> Caller {
    Caller {
        id: Uuid::from_u128(0xE3),
        role: "editor".into(),
        is_admin: false,
    }
}

fn admin() -> Caller {
    Caller {
        id: Uuid::from_u128(0xAD),
        role: "admin".into(),
        is_admin: true,
    }
}

fn widgets_definition() -> ValidationDefinition {
    let mut fields = IndexMap::new();
    fields.insert("name".to_string(), "required|string|max:255".to_string());
    fields.insert("price".to_string(), "required|numeric|min:1".to_string());

    let mut messages = BTreeMap::new();
    messages.insert("name.required".to_string(), "A widget needs a name.".to_string());
    messages.insert("numeric".to_string(), "Numbers only.".to_string());

    let mut acl = BTreeMap::new();
    acl.insert(
        "editor".to_string(),
        RoleGrants {
            can_create: true,
            can_read: true,
            can_delete: false,
            editable: vec!["name".to_string(), "price".to_string()],
        },
    );

    ValidationDefinition {
        resource: "widgets".to_string(),
        fields,
        messages,
        acl,
    }
}

/// Handlers over a seeded store: one reservable project, one widget,
/// the member/editor route grants, and four known tokens.
async fn setup() -> (Handlers, MemoryStore, Uuid, Uuid) {
    let store = MemoryStore::new();
    let definitions = MemoryDefinitionCatalog::new();
    let route_acls = MemoryRouteAclCatalog::new();

    let project_id = Uuid::new_v4();
    store
        .insert("projects", Document::new(project_id))
        .await
        .unwrap();

    let widget_id = Uuid::new_v4();
    let mut widget = Document::new(widget_id);
    widget.set("name", json!("Gears"));
    widget.set("price", json!(10));
    store.insert("widgets", widget).await.unwrap();

    definitions.register(widgets_definition()).await.unwrap();

    route_acls
        .register(RouteAcl::new("member").grant("POST", &["api/v1/projects/{id}/{action}"]))
        .await;
    route_acls
        .register(
            RouteAcl::new("editor")
                .grant("POST", &["api/v1/{resource}"])
                .grant("PUT", &["api/v1/{resource}/{id}"]),
        )
        .await;

    let identity = StaticIdentityResolver::new()
        .with_token("tok-a", member_a())
        .with_token("tok-b", member_b())
        .with_token("tok-editor", editor())
        .with_token("tok-admin", admin());

    let handlers = PolicyHandlers::new(
        identity,
        store.clone(),
        definitions,
        route_acls,
        PolicyConfig::default(),
    );
    (handlers, store, project_id, widget_id)
}

fn request(method: &str, path: &str, token: Option<&str>, fields: serde_json::Value) -> Request {
    let fields = match fields {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => FieldMap::new(),
        other => panic!("expected an object, got {other}"),
    };
    Request {
        method: method.into(),
        path: path.into(),
        bearer: token.map(str::to_string),
        fields,
    }
}

fn action_path(id: Uuid, action: &str) -> String {
    format!("api/v1/projects/{id}/{action}")
}

// ---------------------------------------------------------------------------
// Identity and route gate
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let (handlers, _store, project_id, _) = setup().await;
    let req = request("POST", &action_path(project_id, "reserve"), None, json!(null));

    let envelope = handlers.reserve(&req, project_id).await;
    assert_eq!(envelope.status, 401);
    assert_eq!(
        envelope.body,
        json!({ "error": true, "errors": ["Unauthorized."] })
    );
    assert!(envelope.authorization.is_none());
}

#[tokio::test]
async fn unknown_token_is_unauthorized() {
    let (handlers, _store, project_id, _) = setup().await;
    let req = request(
        "POST",
        &action_path(project_id, "reserve"),
        Some("tok-forged"),
        json!(null),
    );

    let envelope = handlers.reserve(&req, project_id).await;
    assert_eq!(envelope.status, 401);
}

#[tokio::test]
async fn ungranted_route_is_permission_denied() {
    let (handlers, _store, project_id, _) = setup().await;
    // Editors have no POST grant on the reservation path.
    let req = request(
        "POST",
        &action_path(project_id, "reserve"),
        Some("tok-editor"),
        json!(null),
    );

    let envelope = handlers.reserve(&req, project_id).await;
    assert_eq!(envelope.status, 403);
    assert_eq!(
        envelope.body,
        json!({ "error": true, "errors": ["Permission denied."] })
    );
}

#[tokio::test]
async fn admin_skips_the_route_gate() {
    let (handlers, _store, project_id, _) = setup().await;
    let req = request(
        "POST",
        &action_path(project_id, "reserve"),
        Some("tok-admin"),
        json!(null),
    );

    let envelope = handlers.reserve(&req, project_id).await;
    assert_eq!(envelope.status, 200);
}

// ---------------------------------------------------------------------------
// Reservation endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reserve_returns_the_record_and_echoes_the_token() {
    let (handlers, _store, project_id, _) = setup().await;
    let req = request(
        "POST",
        &action_path(project_id, "reserve"),
        Some("tok-a"),
        json!(null),
    );

    let envelope = handlers.reserve(&req, project_id).await;
    assert_eq!(envelope.status, 200);
    assert_eq!(envelope.authorization.as_deref(), Some("bearer tok-a"));
    assert_eq!(envelope.body["id"], json!(project_id));
    assert_eq!(envelope.body["revision"], json!(2));
    assert_eq!(
        envelope.body["reservationsBy"][0]["user_id"],
        json!(member_a().id)
    );
}

#[tokio::test]
async fn second_reserve_is_a_conflict_without_token_echo() {
    let (handlers, _store, project_id, _) = setup().await;
    let first = request(
        "POST",
        &action_path(project_id, "reserve"),
        Some("tok-a"),
        json!(null),
    );
    handlers.reserve(&first, project_id).await;

    let second = request(
        "POST",
        &action_path(project_id, "reserve"),
        Some("tok-b"),
        json!(null),
    );
    let envelope = handlers.reserve(&second, project_id).await;
    assert_eq!(envelope.status, 403);
    assert_eq!(
        envelope.body,
        json!({ "error": true, "errors": ["Record already reserved."] })
    );
    assert!(envelope.authorization.is_none());
}

#[tokio::test]
async fn reserve_on_a_missing_record_is_not_found() {
    let (handlers, _store, _project_id, _) = setup().await;
    let ghost = Uuid::new_v4();
    let req = request(
        "POST",
        &action_path(ghost, "reserve"),
        Some("tok-a"),
        json!(null),
    );

    let envelope = handlers.reserve(&req, ghost).await;
    assert_eq!(envelope.status, 404);
    assert_eq!(
        envelope.body,
        json!({ "error": true, "errors": ["ID not found."] })
    );
}

#[tokio::test]
async fn accept_is_terminal_across_callers() {
    let (handlers, _store, project_id, _) = setup().await;
    let first = request(
        "POST",
        &action_path(project_id, "accept"),
        Some("tok-a"),
        json!(null),
    );
    let envelope = handlers.accept(&first, project_id).await;
    assert_eq!(envelope.status, 200);
    assert_eq!(envelope.body["acceptedBy"], json!(member_a().id));

    let second = request(
        "POST",
        &action_path(project_id, "accept"),
        Some("tok-b"),
        json!(null),
    );
    let envelope = handlers.accept(&second, project_id).await;
    assert_eq!(envelope.status, 403);
    assert_eq!(
        envelope.body,
        json!({ "error": true, "errors": ["Record already accepted."] })
    );
}

#[tokio::test]
async fn decline_twice_is_a_conflict() {
    let (handlers, _store, project_id, _) = setup().await;
    let req = request(
        "POST",
        &action_path(project_id, "decline"),
        Some("tok-a"),
        json!(null),
    );

    let envelope = handlers.decline(&req, project_id).await;
    assert_eq!(envelope.status, 200);

    let envelope = handlers.decline(&req, project_id).await;
    assert_eq!(envelope.status, 403);
    assert_eq!(
        envelope.body,
        json!({ "error": true, "errors": ["Record already declined."] })
    );
}

// ---------------------------------------------------------------------------
// Validated mutations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_persists_the_validated_fields() {
    let (handlers, store, _project_id, _) = setup().await;
    let req = request(
        "POST",
        "api/v1/widgets",
        Some("tok-editor"),
        json!({"name": "Sprocket", "price": 5}),
    );

    let envelope = handlers.mutate(&req, "widgets", None).await;
    assert_eq!(envelope.status, 200);
    assert_eq!(envelope.authorization.as_deref(), Some("bearer tok-editor"));

    let id: Uuid = serde_json::from_value(envelope.body["id"].clone()).unwrap();
    let stored = store.find("widgets", id).await.unwrap().unwrap();
    assert_eq!(stored.get("name"), Some(&json!("Sprocket")));
    assert_eq!(stored.get("price"), Some(&json!(5)));
    assert_eq!(stored.revision, 1);
}

#[tokio::test]
async fn create_with_invalid_fields_is_rejected() {
    let (handlers, _store, _project_id, _) = setup().await;
    let req = request(
        "POST",
        "api/v1/widgets",
        Some("tok-editor"),
        json!({"name": "", "price": "soon"}),
    );

    let envelope = handlers.mutate(&req, "widgets", None).await;
    assert_eq!(envelope.status, 400);
    assert_eq!(
        envelope.body,
        json!({
            "error": true,
            "errors": ["A widget needs a name.", "Numbers only."]
        })
    );
}

#[tokio::test]
async fn update_with_a_non_editable_field_is_denied_and_unapplied() {
    let (handlers, store, _project_id, widget_id) = setup().await;
    let req = request(
        "PUT",
        &format!("api/v1/widgets/{widget_id}"),
        Some("tok-editor"),
        json!({"name": "New name", "secret": "y"}),
    );

    let envelope = handlers.mutate(&req, "widgets", Some(widget_id)).await;
    assert_eq!(envelope.status, 403);
    assert_eq!(
        envelope.body,
        json!({ "error": true, "errors": ["Permission denied."] })
    );

    let stored = store.find("widgets", widget_id).await.unwrap().unwrap();
    assert_eq!(stored.get("name"), Some(&json!("Gears")));
    assert_eq!(stored.revision, 1);
}

#[tokio::test]
async fn update_applies_editable_fields_and_bumps_the_revision() {
    let (handlers, store, _project_id, widget_id) = setup().await;
    let req = request(
        "PUT",
        &format!("api/v1/widgets/{widget_id}"),
        Some("tok-editor"),
        json!({"name": "Cog"}),
    );

    let envelope = handlers.mutate(&req, "widgets", Some(widget_id)).await;
    assert_eq!(envelope.status, 200);

    let stored = store.find("widgets", widget_id).await.unwrap().unwrap();
    assert_eq!(stored.get("name"), Some(&json!("Cog")));
    assert_eq!(stored.get("price"), Some(&json!(10)));
    assert_eq!(stored.revision, 2);
}

#[tokio::test]
async fn update_on_a_missing_record_is_not_found() {
    let (handlers, _store, _project_id, _) = setup().await;
    let ghost = Uuid::new_v4();
    let req = request(
        "PUT",
        &format!("api/v1/widgets/{ghost}"),
        Some("tok-editor"),
        json!({"name": "Cog"}),
    );

    let envelope = handlers.mutate(&req, "widgets", Some(ghost)).await;
    assert_eq!(envelope.status, 404);
}

#[tokio::test]
async fn unconfigured_resource_is_method_not_allowed() {
    let (handlers, _store, _project_id, _) = setup().await;
    let req = request(
        "POST",
        "api/v1/gadgets",
        Some("tok-editor"),
        json!({"name": "x"}),
    );

    let envelope = handlers.mutate(&req, "gadgets", None).await;
    assert_eq!(envelope.status, 405);
    assert_eq!(
        envelope.body,
        json!({
            "error": true,
            "errors": ["Validation definition is missing for this resource."]
        })
    );
}

#[tokio::test]
async fn unmapped_methods_answer_method_not_allowed() {
    let (handlers, _store, _project_id, widget_id) = setup().await;

    // Admins skip the route gate, so the verb mapping answers.
    let req = request("BREW", "api/v1/widgets", Some("tok-admin"), json!(null));
    let envelope = handlers.mutate(&req, "widgets", None).await;
    assert_eq!(envelope.status, 405);
    assert_eq!(
        envelope.body,
        json!({ "error": true, "errors": ["Method not allowed."] })
    );

    // GET maps to Read, which is not a mutation.
    let req = request("GET", "api/v1/widgets", Some("tok-admin"), json!(null));
    let envelope = handlers.mutate(&req, "widgets", Some(widget_id)).await;
    assert_eq!(envelope.status, 405);
}
