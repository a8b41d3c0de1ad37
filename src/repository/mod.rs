use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    NewNote, NewUser, Note, Plan, Tenant, UpdateNoteRequest, User, UserCredentials,
};

mod memory;
mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

/// RepositoryError
///
/// Failures of the persistence layer. `Database` carries the driver error for the logs
/// and is surfaced to clients as a generic 500.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Conflict(String),
}

pub type RepoResult<T> = Result<T, RepositoryError>;

/// NoteCreation
///
/// Outcome of a quota-gated note insert.
#[derive(Debug, Clone, PartialEq)]
pub enum NoteCreation {
    Created(Note),
    /// The tenant's plan does not allow another note.
    QuotaExceeded { plan: Plan, current_count: i64 },
    /// The owner is not a member of the tenant (or the tenant does not exist).
    UnknownOwner,
}

/// Repository Trait
///
/// The tenant-scoped store facade. Every note and user operation takes the caller's
/// tenant id, which handlers must take from verified session claims and never from
/// client input, and every implementation filters on it. A row that exists under a
/// different tenant is reported exactly like a row that does not exist.
///
/// `Send + Sync + async_trait` make `Arc<dyn Repository>` shareable across Axum tasks.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Tenants ---
    async fn get_tenant(&self, tenant_id: Uuid) -> RepoResult<Option<Tenant>>;
    // Looks a tenant up by id when `key` parses as a UUID, otherwise by slug.
    async fn find_tenant(&self, key: &str) -> RepoResult<Option<Tenant>>;
    async fn set_tenant_plan(&self, tenant_id: Uuid, plan: Plan) -> RepoResult<Option<Tenant>>;
    // Seeding: returns the tenant with `slug`, creating it if absent. Existing rows are left as-is.
    async fn ensure_tenant(&self, slug: &str, name: &str, plan: Plan) -> RepoResult<Tenant>;

    // --- Users ---
    // Login lookup. Emails are globally unique, so this is the one unscoped read.
    async fn find_credentials(&self, email: &str) -> RepoResult<Option<UserCredentials>>;
    async fn get_user(&self, tenant_id: Uuid, user_id: Uuid) -> RepoResult<Option<User>>;
    async fn list_users(&self, tenant_id: Uuid) -> RepoResult<Vec<User>>;
    // Fails with `RepositoryError::Conflict` when the email is taken.
    async fn create_user(&self, tenant_id: Uuid, user: NewUser) -> RepoResult<User>;
    // Seeding: returns the user with this email, creating it if absent.
    async fn ensure_user(&self, tenant_id: Uuid, user: NewUser) -> RepoResult<User>;

    // --- Notes ---
    async fn list_notes(&self, tenant_id: Uuid) -> RepoResult<Vec<Note>>;
    async fn get_note(&self, tenant_id: Uuid, note_id: Uuid) -> RepoResult<Option<Note>>;
    async fn count_notes(&self, tenant_id: Uuid) -> RepoResult<i64>;
    /// Counts the tenant's notes, consults the plan quota and inserts, as one atomic step.
    async fn create_note(
        &self,
        tenant_id: Uuid,
        owner_id: Uuid,
        note: NewNote,
    ) -> RepoResult<NoteCreation>;
    // Partial update; `None` when the note is absent from this tenant.
    async fn update_note(
        &self,
        tenant_id: Uuid,
        note_id: Uuid,
        changes: UpdateNoteRequest,
    ) -> RepoResult<Option<Note>>;
    // `true` only if a row of this tenant was removed.
    async fn delete_note(&self, tenant_id: Uuid, note_id: Uuid) -> RepoResult<bool>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;
