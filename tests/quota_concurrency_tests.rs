mod common;

use axum::extract::State;
use common::{add_note, auth, fixture};
use tenant_notes::{
    error::{AppError, AppJson},
    handlers,
    models::{CreateNoteRequest, NewNote, Plan},
    quota::{FREE_NOTE_LIMIT, can_create},
    repository::{NoteCreation, Repository},
};
use tokio::task::JoinSet;

#[test]
fn test_policy_table() {
    assert_eq!(Plan::Free.note_limit(), Some(FREE_NOTE_LIMIT));
    assert!(can_create(Plan::Free, FREE_NOTE_LIMIT - 1));
    assert!(!can_create(Plan::Free, FREE_NOTE_LIMIT));
    assert!(can_create(Plan::Pro, 1_000_000));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_creations_stay_within_bounds() {
    const RACERS: i64 = 16;

    let fx = fixture().await;
    add_note(&fx.repo, &fx.acme_admin, "one").await;
    add_note(&fx.repo, &fx.acme_admin, "two").await;

    let mut racers = JoinSet::new();
    for i in 0..RACERS {
        let state = fx.state.clone();
        let caller = auth(&fx.acme_member);
        racers.spawn(async move {
            handlers::create_note(
                caller,
                State(state),
                AppJson(CreateNoteRequest {
                    title: format!("racer {i}"),
                    content: String::new(),
                }),
            )
            .await
        });
    }

    let mut created = 0;
    let mut rejected = 0;
    while let Some(joined) = racers.join_next().await {
        match joined.unwrap() {
            Ok(_) => created += 1,
            Err(AppError::QuotaExceeded) => rejected += 1,
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    let final_count = fx.repo.count_notes(fx.acme.id).await.unwrap();
    assert!(final_count >= FREE_NOTE_LIMIT, "count {final_count} below the limit");
    assert!(final_count <= 2 + RACERS, "count {final_count} overshoots the bound");
    assert_eq!(final_count, 2 + created);
    assert_eq!(created + rejected, RACERS);
    // The in-memory store serialises count-and-insert, so the limit holds exactly.
    assert_eq!(final_count, FREE_NOTE_LIMIT);
}

#[tokio::test]
async fn test_pro_tenant_has_no_ceiling() {
    const NOTES: i64 = 1000;

    let fx = fixture().await;
    fx.repo.set_tenant_plan(fx.globex.id, Plan::Pro).await.unwrap();

    for i in 0..NOTES {
        let outcome = fx
            .repo
            .create_note(
                fx.globex.id,
                fx.globex_member.id,
                NewNote {
                    title: format!("note {i}"),
                    content: String::new(),
                },
            )
            .await
            .unwrap();
        assert!(matches!(outcome, NoteCreation::Created(_)), "note {i}: {outcome:?}");
    }

    assert_eq!(fx.repo.count_notes(fx.globex.id).await.unwrap(), NOTES);
    assert_eq!(fx.repo.count_notes(fx.acme.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_quota_rejection_reports_plan_and_count() {
    let fx = fixture().await;
    for title in ["one", "two", "three"] {
        add_note(&fx.repo, &fx.acme_admin, title).await;
    }

    let outcome = fx
        .repo
        .create_note(
            fx.acme.id,
            fx.acme_admin.id,
            NewNote {
                title: "four".to_string(),
                content: String::new(),
            },
        )
        .await
        .unwrap();

    assert_eq!(
        outcome,
        NoteCreation::QuotaExceeded {
            plan: Plan::Free,
            current_count: 3
        }
    );
}

#[tokio::test]
async fn test_owner_from_another_tenant_is_refused() {
    let fx = fixture().await;

    let outcome = fx
        .repo
        .create_note(
            fx.acme.id,
            fx.globex_admin.id,
            NewNote {
                title: "smuggled".to_string(),
                content: String::new(),
            },
        )
        .await
        .unwrap();

    assert_eq!(outcome, NoteCreation::UnknownOwner);
    assert_eq!(fx.repo.count_notes(fx.acme.id).await.unwrap(), 0);
}
