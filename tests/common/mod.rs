#![allow(dead_code)]

use std::sync::Arc;

use chrono::Utc;
use tenant_notes::{
    AppState, InMemoryRepository,
    config::AppConfig,
    guard::AuthUser,
    models::{NewNote, NewUser, Note, Plan, Role, Tenant, User},
    repository::{NoteCreation, Repository, RepositoryState},
    token::{CLAIMS_VERSION, SessionClaims},
};

/// Two tenants with an admin and a member each, no notes.
pub struct Fixture {
    pub state: AppState,
    pub repo: Arc<InMemoryRepository>,
    pub acme: Tenant,
    pub globex: Tenant,
    pub acme_admin: User,
    pub acme_member: User,
    pub globex_admin: User,
    pub globex_member: User,
}

// Not a real Argon2 hash; handler tests never log in.
const UNUSED_HASH: &str = "not-a-real-hash";

async fn add_user(repo: &InMemoryRepository, tenant: &Tenant, email: &str, role: Role) -> User {
    repo.create_user(
        tenant.id,
        NewUser {
            email: email.to_string(),
            password_hash: UNUSED_HASH.to_string(),
            role,
        },
    )
    .await
    .unwrap()
}

pub async fn fixture() -> Fixture {
    let repo = Arc::new(InMemoryRepository::new());

    let acme = repo.ensure_tenant("acme", "Acme", Plan::Free).await.unwrap();
    let globex = repo.ensure_tenant("globex", "Globex", Plan::Free).await.unwrap();

    let acme_admin = add_user(&repo, &acme, "admin@acme.test", Role::Admin).await;
    let acme_member = add_user(&repo, &acme, "user@acme.test", Role::Member).await;
    let globex_admin = add_user(&repo, &globex, "admin@globex.test", Role::Admin).await;
    let globex_member = add_user(&repo, &globex, "user@globex.test", Role::Member).await;

    let state = AppState::new(AppConfig::default(), repo.clone() as RepositoryState);

    Fixture {
        state,
        repo,
        acme,
        globex,
        acme_admin,
        acme_member,
        globex_admin,
        globex_member,
    }
}

/// Claims as the token codec would produce them for `user`.
pub fn claims_for(user: &User) -> SessionClaims {
    let now = Utc::now().timestamp();
    SessionClaims {
        ver: CLAIMS_VERSION,
        user_id: user.id,
        role: user.role,
        tenant_id: user.tenant_id,
        iat: now,
        exp: now + 3600,
    }
}

pub fn auth(user: &User) -> AuthUser {
    AuthUser(claims_for(user))
}

pub async fn add_note(repo: &InMemoryRepository, owner: &User, title: &str) -> Note {
    match repo
        .create_note(
            owner.tenant_id,
            owner.id,
            NewNote {
                title: title.to_string(),
                content: format!("{title} body"),
            },
        )
        .await
        .unwrap()
    {
        NoteCreation::Created(note) => note,
        other => panic!("expected note to be created, got {other:?}"),
    }
}
