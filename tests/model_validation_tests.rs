use chrono::Utc;
use serde_json::json;
use tenant_notes::{
    error::ErrorBody,
    models::{
        CreateNoteRequest, InviteUserRequest, Note, Plan, Role, Tenant, UpdateNoteRequest, User,
        UserCredentials,
    },
};
use uuid::Uuid;

// --- Enums ---

#[test]
fn test_plan_and_role_wire_names() {
    assert_eq!(serde_json::to_value(Plan::Free).unwrap(), "FREE");
    assert_eq!(serde_json::to_value(Plan::Pro).unwrap(), "PRO");
    assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "ADMIN");
    assert_eq!(serde_json::to_value(Role::Member).unwrap(), "MEMBER");

    assert_eq!(Plan::default(), Plan::Free);
    assert_eq!(Role::default(), Role::Member);
    assert!(serde_json::from_value::<Role>(json!("admin")).is_err());
}

// --- Entities ---

#[test]
fn test_note_uses_camel_case_keys() {
    let note = Note {
        id: Uuid::new_v4(),
        title: "Title".to_string(),
        content: "Body".to_string(),
        tenant_id: Uuid::new_v4(),
        owner_id: Uuid::new_v4(),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let value = serde_json::to_value(&note).unwrap();
    for key in ["id", "title", "content", "tenantId", "ownerId", "createdAt", "updatedAt"] {
        assert!(value.get(key).is_some(), "missing key {key}");
    }
    assert!(value.get("tenant_id").is_none());
}

#[test]
fn test_tenant_exposes_plan() {
    let tenant = Tenant {
        id: Uuid::new_v4(),
        slug: "acme".to_string(),
        name: "Acme".to_string(),
        plan: Plan::Pro,
    };
    let value = serde_json::to_value(&tenant).unwrap();
    assert_eq!(value["plan"], "PRO");
    assert_eq!(value["slug"], "acme");
}

#[test]
fn test_public_user_never_carries_password_hash() {
    let credentials = UserCredentials {
        id: Uuid::new_v4(),
        email: "admin@acme.test".to_string(),
        password_hash: "$argon2id$secret".to_string(),
        role: Role::Admin,
        tenant_id: Uuid::new_v4(),
    };

    let user = User::from(credentials.clone());
    let value = serde_json::to_value(&user).unwrap();

    assert_eq!(value["email"], "admin@acme.test");
    assert_eq!(value["role"], "ADMIN");
    assert_eq!(value["tenantId"], credentials.tenant_id.to_string());
    assert!(!value.to_string().contains("argon2"));
}

// --- Request Payloads ---

#[test]
fn test_create_note_content_is_optional() {
    let request: CreateNoteRequest = serde_json::from_value(json!({ "title": "Only title" })).unwrap();
    assert_eq!(request.title, "Only title");
    assert_eq!(request.content, "");

    assert!(serde_json::from_value::<CreateNoteRequest>(json!({ "content": "no title" })).is_err());
}

#[test]
fn test_update_note_omits_absent_fields() {
    let request = UpdateNoteRequest {
        title: None,
        content: Some("new body".to_string()),
    };
    assert_eq!(serde_json::to_value(&request).unwrap(), json!({ "content": "new body" }));

    let empty: UpdateNoteRequest = serde_json::from_value(json!({})).unwrap();
    assert!(empty.title.is_none() && empty.content.is_none());
}

#[test]
fn test_invite_role_defaults_to_member() {
    let request: InviteUserRequest =
        serde_json::from_value(json!({ "email": "a@b.test", "password": "12345678" })).unwrap();
    assert_eq!(request.role, Role::Member);

    let admin: InviteUserRequest = serde_json::from_value(
        json!({ "email": "a@b.test", "password": "12345678", "role": "ADMIN" }),
    )
    .unwrap();
    assert_eq!(admin.role, Role::Admin);
}

#[test]
fn test_error_body_shape() {
    let body = ErrorBody {
        error: "Not found".to_string(),
    };
    assert_eq!(serde_json::to_value(&body).unwrap(), json!({ "error": "Not found" }));
}
