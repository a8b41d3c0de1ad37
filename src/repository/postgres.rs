use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{NoteCreation, RepoResult, Repository, RepositoryError};
use crate::{
    models::{NewNote, NewUser, Note, Plan, Tenant, UpdateNoteRequest, User, UserCredentials},
    quota,
};

const NOTE_COLUMNS: &str = "id, title, content, tenant_id, owner_id, created_at, updated_at";

/// PostgresRepository
///
/// The `Repository` implementation backed by PostgreSQL. All note and user statements
/// carry a `tenant_id = $n` predicate.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn duplicate_email(err: sqlx::Error) -> RepositoryError {
    match err {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            RepositoryError::Conflict("A user with this email already exists".to_string())
        }
        other => RepositoryError::Database(other),
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_tenant(&self, tenant_id: Uuid) -> RepoResult<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "SELECT id, slug, name, plan FROM tenants WHERE id = $1",
        )
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn find_tenant(&self, key: &str) -> RepoResult<Option<Tenant>> {
        let tenant = match Uuid::parse_str(key) {
            Ok(id) => {
                sqlx::query_as::<_, Tenant>("SELECT id, slug, name, plan FROM tenants WHERE id = $1")
                    .bind(id)
                    .fetch_optional(&self.pool)
                    .await?
            }
            Err(_) => {
                sqlx::query_as::<_, Tenant>(
                    "SELECT id, slug, name, plan FROM tenants WHERE slug = $1",
                )
                .bind(key)
                .fetch_optional(&self.pool)
                .await?
            }
        };
        Ok(tenant)
    }

    async fn set_tenant_plan(&self, tenant_id: Uuid, plan: Plan) -> RepoResult<Option<Tenant>> {
        let tenant = sqlx::query_as::<_, Tenant>(
            "UPDATE tenants SET plan = $2 WHERE id = $1 RETURNING id, slug, name, plan",
        )
        .bind(tenant_id)
        .bind(plan)
        .fetch_optional(&self.pool)
        .await?;
        Ok(tenant)
    }

    /// ensure_tenant
    ///
    /// The no-op `DO UPDATE` makes `RETURNING` yield the existing row on conflict.
    async fn ensure_tenant(&self, slug: &str, name: &str, plan: Plan) -> RepoResult<Tenant> {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (id, slug, name, plan)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (slug) DO UPDATE SET slug = EXCLUDED.slug
            RETURNING id, slug, name, plan
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(slug)
        .bind(name)
        .bind(plan)
        .fetch_one(&self.pool)
        .await?;
        Ok(tenant)
    }

    async fn find_credentials(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        let row = sqlx::query_as::<_, UserCredentials>(
            "SELECT id, email, password_hash, role, tenant_id FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_user(&self, tenant_id: Uuid, user_id: Uuid) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, role, tenant_id FROM users WHERE id = $1 AND tenant_id = $2",
        )
        .bind(user_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_users(&self, tenant_id: Uuid) -> RepoResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, email, role, tenant_id FROM users WHERE tenant_id = $1 ORDER BY email",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(users)
    }

    async fn create_user(&self, tenant_id: Uuid, user: NewUser) -> RepoResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, role, tenant_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, email, role, tenant_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await
        .map_err(duplicate_email)
    }

    async fn ensure_user(&self, tenant_id: Uuid, user: NewUser) -> RepoResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash, role, tenant_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING id, email, role, tenant_id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role)
        .bind(tenant_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn list_notes(&self, tenant_id: Uuid) -> RepoResult<Vec<Note>> {
        let notes = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE tenant_id = $1 ORDER BY created_at DESC"
        ))
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(notes)
    }

    async fn get_note(&self, tenant_id: Uuid, note_id: Uuid) -> RepoResult<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(&format!(
            "SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1 AND tenant_id = $2"
        ))
        .bind(note_id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    async fn count_notes(&self, tenant_id: Uuid) -> RepoResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notes WHERE tenant_id = $1")
                .bind(tenant_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// create_note
    ///
    /// Locks the tenant row for the duration of the transaction, so concurrent creations
    /// for one tenant serialise on the count-and-insert and the plan limit holds exactly.
    async fn create_note(
        &self,
        tenant_id: Uuid,
        owner_id: Uuid,
        note: NewNote,
    ) -> RepoResult<NoteCreation> {
        let mut tx = self.pool.begin().await?;

        let plan = sqlx::query_scalar::<_, Plan>(
            "SELECT plan FROM tenants WHERE id = $1 FOR UPDATE",
        )
        .bind(tenant_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(plan) = plan else {
            tx.rollback().await?;
            return Ok(NoteCreation::UnknownOwner);
        };

        let owner_in_tenant = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND tenant_id = $2)",
        )
        .bind(owner_id)
        .bind(tenant_id)
        .fetch_one(&mut *tx)
        .await?;

        if !owner_in_tenant {
            tx.rollback().await?;
            return Ok(NoteCreation::UnknownOwner);
        }

        let current_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM notes WHERE tenant_id = $1")
                .bind(tenant_id)
                .fetch_one(&mut *tx)
                .await?;

        if !quota::can_create(plan, current_count) {
            tx.rollback().await?;
            return Ok(NoteCreation::QuotaExceeded {
                plan,
                current_count,
            });
        }

        let created = sqlx::query_as::<_, Note>(&format!(
            r#"
            INSERT INTO notes (id, title, content, tenant_id, owner_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW(), NOW())
            RETURNING {NOTE_COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(&note.title)
        .bind(&note.content)
        .bind(tenant_id)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(NoteCreation::Created(created))
    }

    async fn update_note(
        &self,
        tenant_id: Uuid,
        note_id: Uuid,
        changes: UpdateNoteRequest,
    ) -> RepoResult<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(&format!(
            r#"
            UPDATE notes
            SET title = COALESCE($3, title),
                content = COALESCE($4, content),
                updated_at = NOW()
            WHERE id = $1 AND tenant_id = $2
            RETURNING {NOTE_COLUMNS}
            "#
        ))
        .bind(note_id)
        .bind(tenant_id)
        .bind(changes.title)
        .bind(changes.content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(note)
    }

    async fn delete_note(&self, tenant_id: Uuid, note_id: Uuid) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1 AND tenant_id = $2")
            .bind(note_id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
