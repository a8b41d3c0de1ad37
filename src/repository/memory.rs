use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NoteCreation, RepoResult, Repository, RepositoryError};
use crate::{
    models::{NewNote, NewUser, Note, Plan, Tenant, UpdateNoteRequest, User, UserCredentials},
    quota,
};

#[derive(Default)]
struct Store {
    tenants: HashMap<Uuid, Tenant>,
    users: HashMap<Uuid, UserCredentials>,
    notes: HashMap<Uuid, Note>,
}

/// InMemoryRepository
///
/// A process-local `Repository` guarded by a single `RwLock`. It applies the same tenant
/// filters as the Postgres implementation and performs the quota check and the insert
/// under one write lock. Backs the test suite.
#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(notes: &mut [Note]) {
    notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn get_tenant(&self, tenant_id: Uuid) -> RepoResult<Option<Tenant>> {
        Ok(self.store.read().await.tenants.get(&tenant_id).cloned())
    }

    async fn find_tenant(&self, key: &str) -> RepoResult<Option<Tenant>> {
        let store = self.store.read().await;
        let tenant = match Uuid::parse_str(key) {
            Ok(id) => store.tenants.get(&id).cloned(),
            Err(_) => store.tenants.values().find(|t| t.slug == key).cloned(),
        };
        Ok(tenant)
    }

    async fn set_tenant_plan(&self, tenant_id: Uuid, plan: Plan) -> RepoResult<Option<Tenant>> {
        let mut store = self.store.write().await;
        Ok(store.tenants.get_mut(&tenant_id).map(|tenant| {
            tenant.plan = plan;
            tenant.clone()
        }))
    }

    async fn ensure_tenant(&self, slug: &str, name: &str, plan: Plan) -> RepoResult<Tenant> {
        let mut store = self.store.write().await;
        if let Some(existing) = store.tenants.values().find(|t| t.slug == slug) {
            return Ok(existing.clone());
        }
        let tenant = Tenant {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            name: name.to_string(),
            plan,
        };
        store.tenants.insert(tenant.id, tenant.clone());
        Ok(tenant)
    }

    async fn find_credentials(&self, email: &str) -> RepoResult<Option<UserCredentials>> {
        let store = self.store.read().await;
        Ok(store.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, tenant_id: Uuid, user_id: Uuid) -> RepoResult<Option<User>> {
        let store = self.store.read().await;
        Ok(store
            .users
            .get(&user_id)
            .filter(|u| u.tenant_id == tenant_id)
            .cloned()
            .map(User::from))
    }

    async fn list_users(&self, tenant_id: Uuid) -> RepoResult<Vec<User>> {
        let store = self.store.read().await;
        let mut users: Vec<User> = store
            .users
            .values()
            .filter(|u| u.tenant_id == tenant_id)
            .cloned()
            .map(User::from)
            .collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        Ok(users)
    }

    async fn create_user(&self, tenant_id: Uuid, user: NewUser) -> RepoResult<User> {
        let mut store = self.store.write().await;
        if store.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(
                "A user with this email already exists".to_string(),
            ));
        }
        let row = UserCredentials {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            tenant_id,
        };
        store.users.insert(row.id, row.clone());
        Ok(User::from(row))
    }

    async fn ensure_user(&self, tenant_id: Uuid, user: NewUser) -> RepoResult<User> {
        if let Some(existing) = self.find_credentials(&user.email).await? {
            return Ok(User::from(existing));
        }
        self.create_user(tenant_id, user).await
    }

    async fn list_notes(&self, tenant_id: Uuid) -> RepoResult<Vec<Note>> {
        let store = self.store.read().await;
        let mut notes: Vec<Note> = store
            .notes
            .values()
            .filter(|n| n.tenant_id == tenant_id)
            .cloned()
            .collect();
        newest_first(&mut notes);
        Ok(notes)
    }

    async fn get_note(&self, tenant_id: Uuid, note_id: Uuid) -> RepoResult<Option<Note>> {
        let store = self.store.read().await;
        Ok(store
            .notes
            .get(&note_id)
            .filter(|n| n.tenant_id == tenant_id)
            .cloned())
    }

    async fn count_notes(&self, tenant_id: Uuid) -> RepoResult<i64> {
        let store = self.store.read().await;
        Ok(store.notes.values().filter(|n| n.tenant_id == tenant_id).count() as i64)
    }

    async fn create_note(
        &self,
        tenant_id: Uuid,
        owner_id: Uuid,
        note: NewNote,
    ) -> RepoResult<NoteCreation> {
        let mut store = self.store.write().await;

        let Some(plan) = store.tenants.get(&tenant_id).map(|t| t.plan) else {
            return Ok(NoteCreation::UnknownOwner);
        };
        let owner_in_tenant = store
            .users
            .get(&owner_id)
            .is_some_and(|u| u.tenant_id == tenant_id);
        if !owner_in_tenant {
            return Ok(NoteCreation::UnknownOwner);
        }

        let current_count = store.notes.values().filter(|n| n.tenant_id == tenant_id).count() as i64;
        if !quota::can_create(plan, current_count) {
            return Ok(NoteCreation::QuotaExceeded {
                plan,
                current_count,
            });
        }

        let now = Utc::now();
        let created = Note {
            id: Uuid::new_v4(),
            title: note.title,
            content: note.content,
            tenant_id,
            owner_id,
            created_at: now,
            updated_at: now,
        };
        store.notes.insert(created.id, created.clone());
        Ok(NoteCreation::Created(created))
    }

    async fn update_note(
        &self,
        tenant_id: Uuid,
        note_id: Uuid,
        changes: UpdateNoteRequest,
    ) -> RepoResult<Option<Note>> {
        let mut store = self.store.write().await;
        let Some(note) = store
            .notes
            .get_mut(&note_id)
            .filter(|n| n.tenant_id == tenant_id)
        else {
            return Ok(None);
        };

        if let Some(title) = changes.title {
            note.title = title;
        }
        if let Some(content) = changes.content {
            note.content = content;
        }
        note.updated_at = Utc::now();
        Ok(Some(note.clone()))
    }

    async fn delete_note(&self, tenant_id: Uuid, note_id: Uuid) -> RepoResult<bool> {
        let mut store = self.store.write().await;
        let owned_by_tenant = store
            .notes
            .get(&note_id)
            .is_some_and(|n| n.tenant_id == tenant_id);
        if owned_by_tenant {
            store.notes.remove(&note_id);
        }
        Ok(owned_by_tenant)
    }
}
