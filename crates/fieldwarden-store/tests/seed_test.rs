//! Integration tests for seed loading and the seeded reservation flow.

use fieldwarden_core::{Caller, DefinitionCatalog, DocumentStore, PolicyError, RouteAclCatalog};
use fieldwarden_policy::{PolicyConfig, ReservationService};
use fieldwarden_store::{
    MemoryDefinitionCatalog, MemoryRouteAclCatalog, MemoryStore, SeedData, default_seed,
};
use serde_json::json;
use uuid::Uuid;

fn setup() -> (MemoryStore, MemoryDefinitionCatalog, MemoryRouteAclCatalog) {
    (
        MemoryStore::new(),
        MemoryDefinitionCatalog::new(),
        MemoryRouteAclCatalog::new(),
    )
}

#[tokio::test]
async fn default_seed_registers_the_standard_role() {
    let (store, definitions, route_acls) = setup();
    default_seed()
        .apply(&store, &definitions, &route_acls)
        .await
        .unwrap();

    let acl = route_acls.resolve("standard").await.unwrap().unwrap();
    assert!(acl.allows("GET", "api/v1/projects"));
    assert!(acl.allows("GET", "api/v1/projects/42"));
    assert!(acl.allows("GET", "api/v1/configuration"));
    assert!(acl.allows("PUT", "api/v1/profiles/changePassword"));
    assert!(acl.allows("PATCH", "api/v1/profiles/77"));
    assert!(!acl.allows("POST", "api/v1/projects"));
    assert!(!acl.allows("DELETE", "api/v1/projects/42"));
}

#[tokio::test]
async fn seed_bundle_loads_from_json() {
    let id = Uuid::new_v4();
    let raw = json!({
        "definitions": [{
            "resource": "widgets",
            "fields": { "name": "required|string|max:255" },
            "messages": { "name.required": "A widget needs a name." },
            "acl": {
                "editor": { "can_create": true, "editable": ["name"] }
            }
        }],
        "route_acls": [{
            "role": "editor",
            "allow": { "POST": ["api/v1/{resource}"] }
        }],
        "records": [{
            "collection": "projects",
            "document": { "id": id, "title": "Rollout" }
        }]
    })
    .to_string();

    let seed: SeedData = serde_json::from_str(&raw).unwrap();
    let (store, definitions, route_acls) = setup();
    seed.apply(&store, &definitions, &route_acls).await.unwrap();

    let definition = definitions.find("widgets").await.unwrap().unwrap();
    assert_eq!(
        definition.fields.get("name").map(String::as_str),
        Some("required|string|max:255")
    );
    assert!(definition.grants_for("editor").unwrap().can_create);

    let acl = route_acls.resolve("editor").await.unwrap().unwrap();
    assert!(acl.allows("POST", "api/v1/widgets"));

    let record = store.find("projects", id).await.unwrap().unwrap();
    assert_eq!(record.revision, 1);
    assert_eq!(record.get("title"), Some(&json!("Rollout")));
}

#[tokio::test]
async fn seed_with_malformed_definition_fails() {
    let raw = json!({
        "definitions": [{
            "resource": "widgets",
            "fields": { "name": "required|shouty" },
            "acl": {}
        }]
    })
    .to_string();

    let seed: SeedData = serde_json::from_str(&raw).unwrap();
    let (store, definitions, route_acls) = setup();
    let err = seed
        .apply(&store, &definitions, &route_acls)
        .await
        .unwrap_err();
    assert!(matches!(err, PolicyError::Store(_)));
}

#[tokio::test]
async fn reservation_flow_runs_over_the_memory_store() {
    let (store, definitions, route_acls) = setup();
    let id = Uuid::new_v4();
    let seed: SeedData = serde_json::from_str(
        &json!({
            "records": [{
                "collection": "projects",
                "document": { "id": id, "title": "Rollout" }
            }]
        })
        .to_string(),
    )
    .unwrap();
    seed.apply(&store, &definitions, &route_acls).await.unwrap();

    let service = ReservationService::new(store.clone(), PolicyConfig::default());
    let caller = Caller {
        id: Uuid::new_v4(),
        role: "standard".into(),
        is_admin: false,
    };

    let now = 1_700_000_000;
    let claimed = service.claim(&caller, id, now).await.unwrap();
    assert_eq!(claimed.revision, 2);

    let accepted = service.accept(&caller, id, now + 5).await.unwrap();
    assert_eq!(accepted.accepted_by(), Some(caller.id));
    assert_eq!(accepted.revision, 3);
    assert_eq!(accepted.get("title"), Some(&json!("Rollout")));
}
