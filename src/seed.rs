//! Demo data: two FREE tenants, an admin and a member in each, and a welcome note per
//! tenant. Safe to run on every start.

use crate::{
    credentials,
    error::AppError,
    models::{NewNote, NewUser, Plan, Role},
    repository::{NoteCreation, Repository},
};

pub const DEMO_PASSWORD: &str = "password";

struct DemoTenant {
    slug: &'static str,
    name: &'static str,
    admin_email: &'static str,
    member_email: &'static str,
    welcome_title: &'static str,
}

const DEMO_TENANTS: [DemoTenant; 2] = [
    DemoTenant {
        slug: "acme",
        name: "Acme",
        admin_email: "admin@acme.test",
        member_email: "user@acme.test",
        welcome_title: "Welcome Acme",
    },
    DemoTenant {
        slug: "globex",
        name: "Globex",
        admin_email: "admin@globex.test",
        member_email: "user@globex.test",
        welcome_title: "Welcome Globex",
    },
];

/// seed_demo_data
///
/// Ensures the demo tenants and users exist. The welcome note is only added to a tenant
/// that has no notes yet, so reruns never eat into the FREE quota.
pub async fn seed_demo_data(repo: &dyn Repository) -> Result<(), AppError> {
    let password_hash = credentials::hash_password(DEMO_PASSWORD)?;

    for demo in &DEMO_TENANTS {
        let tenant = repo.ensure_tenant(demo.slug, demo.name, Plan::Free).await?;

        let admin = repo
            .ensure_user(
                tenant.id,
                NewUser {
                    email: demo.admin_email.to_string(),
                    password_hash: password_hash.clone(),
                    role: Role::Admin,
                },
            )
            .await?;

        repo.ensure_user(
            tenant.id,
            NewUser {
                email: demo.member_email.to_string(),
                password_hash: password_hash.clone(),
                role: Role::Member,
            },
        )
        .await?;

        if repo.count_notes(tenant.id).await? == 0 {
            let outcome = repo
                .create_note(
                    tenant.id,
                    admin.id,
                    NewNote {
                        title: demo.welcome_title.to_string(),
                        content: "First note".to_string(),
                    },
                )
                .await?;
            if !matches!(outcome, NoteCreation::Created(_)) {
                tracing::warn!(tenant = demo.slug, ?outcome, "welcome note was not created");
            }
        }

        tracing::info!(tenant = demo.slug, tenant_id = %tenant.id, "demo tenant ready");
    }

    Ok(())
}
