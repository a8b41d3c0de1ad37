use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Enumerations ---

/// Plan
///
/// A tenant's subscription tier. Maps to the Postgres enum `tenant_plan`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "tenant_plan", rename_all = "UPPERCASE")]
pub enum Plan {
    #[default]
    Free,
    Pro,
}

/// Role
///
/// A user's role inside their tenant. Maps to the Postgres enum `user_role`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS, ToSchema, sqlx::Type, Default,
)]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "user_role", rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    #[default]
    Member,
}

// --- Core Schemas (Mapped to Database) ---

/// Tenant
///
/// An isolated customer organisation and the unit of data partitioning.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    pub id: Uuid,
    // Unique, URL-friendly identifier (e.g. "acme").
    pub slug: String,
    pub name: String,
    pub plan: Plan,
}

/// User
///
/// Public view of a user. The tenant reference is fixed at creation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub tenant_id: Uuid,
}

/// UserCredentials
///
/// Internal row used on the login path only. Never serialized.
#[derive(Debug, Clone, FromRow)]
pub struct UserCredentials {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub tenant_id: Uuid,
}

impl From<UserCredentials> for User {
    fn from(row: UserCredentials) -> Self {
        User {
            id: row.id,
            email: row.email,
            role: row.role,
            tenant_id: row.tenant_id,
        }
    }
}

/// Note
///
/// A note belongs to exactly one tenant and one owning user of that tenant.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default, PartialEq)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub tenant_id: Uuid,
    pub owner_id: Uuid,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    #[ts(type = "string")]
    pub updated_at: DateTime<Utc>,
}

// --- Request Payloads ---

/// LoginRequest
///
/// Input payload for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "admin@acme.test")]
    pub email: String,
    #[schema(example = "password")]
    pub password: String,
}

/// CreateNoteRequest
///
/// Input payload for `POST /notes`. Tenant and owner are taken from the session, never
/// from the body.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

/// UpdateNoteRequest
///
/// Partial update for `PUT /notes/{id}`; absent fields are left untouched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateNoteRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// InviteUserRequest
///
/// Input payload for the admin invite endpoint `POST /users`. The new user always
/// joins the inviting admin's tenant.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct InviteUserRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
}

// --- Persistence Inputs ---

/// NewNote
///
/// A validated note ready for insertion.
#[derive(Debug, Clone)]
pub struct NewNote {
    pub title: String,
    pub content: String,
}

/// NewUser
///
/// A user ready for insertion; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

// --- Response Payloads ---

/// LoginResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub token: String,
}

/// MeResponse
///
/// The caller's profile together with their tenant (including its current plan).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MeResponse {
    pub user: User,
    pub tenant: Tenant,
}

/// UpgradeResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UpgradeResponse {
    pub success: bool,
    pub tenant: Tenant,
}

/// DeleteNoteResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DeleteNoteResponse {
    pub success: bool,
}

/// HealthResponse
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct HealthResponse {
    pub status: String,
}
