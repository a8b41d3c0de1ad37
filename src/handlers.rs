use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState, credentials,
    error::{AppError, AppJson, ErrorBody},
    guard::{AuthUser, require_role},
    models::{
        CreateNoteRequest, DeleteNoteResponse, HealthResponse, InviteUserRequest, LoginRequest,
        LoginResponse, MeResponse, NewNote, NewUser, Note, Plan, Role, UpdateNoteRequest,
        UpgradeResponse, User,
    },
    repository::NoteCreation,
    token::SessionIdentity,
};

const MAX_TITLE_CHARS: usize = 200;
const MIN_PASSWORD_CHARS: usize = 8;

// --- Input Validation ---

fn validate_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "Title must be at most {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

// Any id that is not a UUID cannot name a note of this tenant.
fn parse_note_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound)
}

// --- Public Handlers ---

/// health
///
/// [Public Route] Liveness probe.
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// login
///
/// [Public Route] Exchanges email + password for a session token.
///
/// An unknown email and a wrong password produce the same 401 body after the same
/// Argon2 work. The check runs on the blocking pool.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let email = normalize_email(&payload.email);

    let user = state.repo.find_credentials(&email).await?;

    // Unknown emails still pay for a verification.
    let password = payload.password;
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let valid = tokio::task::spawn_blocking(move || {
        credentials::verify_login(&password, stored_hash.as_deref())
    })
    .await
    .map_err(|e| AppError::Internal(format!("password verification task failed: {e}")))?;

    let Some(user) = user.filter(|_| valid) else {
        tracing::warn!("login rejected");
        return Err(AppError::InvalidCredentials);
    };

    let token = state.tokens.issue(SessionIdentity {
        user_id: user.id,
        role: user.role,
        tenant_id: user.tenant_id,
    })?;

    tracing::info!(user_id = %user.id, tenant_id = %user.tenant_id, "session issued");
    Ok(Json(LoginResponse { token }))
}

// --- Authenticated Handlers ---

/// get_me
///
/// [Authenticated Route] The caller's profile and tenant, looked up inside the caller's tenant.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = 200, description = "Profile", body = MeResponse),
        (status = 401, description = "Unauthenticated", body = ErrorBody)
    )
)]
pub async fn get_me(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, AppError> {
    let user = state.repo.get_user(claims.tenant_id, claims.user_id).await?;
    let tenant = state.repo.get_tenant(claims.tenant_id).await?;

    match (user, tenant) {
        (Some(user), Some(tenant)) => Ok(Json(MeResponse { user, tenant })),
        // The token outlived its user or tenant.
        _ => Err(AppError::Unauthenticated),
    }
}

/// list_notes
///
/// [Authenticated Route] Every note of the caller's tenant, newest first.
#[utoipa::path(
    get,
    path = "/notes",
    responses(
        (status = 200, description = "Tenant notes", body = [Note]),
        (status = 401, description = "Unauthenticated", body = ErrorBody)
    )
)]
pub async fn list_notes(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Note>>, AppError> {
    let notes = state.repo.list_notes(claims.tenant_id).await?;
    Ok(Json(notes))
}

/// create_note
///
/// [Authenticated Route] Creates a note owned by the caller under the caller's tenant.
/// The repository applies the plan quota atomically with the insert.
#[utoipa::path(
    post,
    path = "/notes",
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Created", body = Note),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 401, description = "Unauthenticated", body = ErrorBody),
        (status = 403, description = "Plan limit reached", body = ErrorBody)
    )
)]
pub async fn create_note(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let note = NewNote {
        title: validate_title(&payload.title)?,
        content: payload.content,
    };

    match state
        .repo
        .create_note(claims.tenant_id, claims.user_id, note)
        .await?
    {
        NoteCreation::Created(note) => Ok((StatusCode::CREATED, Json(note))),
        NoteCreation::QuotaExceeded {
            plan,
            current_count,
        } => {
            tracing::info!(
                tenant_id = %claims.tenant_id,
                ?plan,
                current_count,
                "note creation rejected by plan quota"
            );
            Err(AppError::QuotaExceeded)
        }
        NoteCreation::UnknownOwner => Err(AppError::Unauthenticated),
    }
}

/// get_note
///
/// [Authenticated Route] A single note. Notes of other tenants are reported as 404.
#[utoipa::path(
    get,
    path = "/notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Found", body = Note),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_note(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Note>, AppError> {
    let id = parse_note_id(&id)?;
    state
        .repo
        .get_note(claims.tenant_id, id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// update_note
///
/// [Authenticated Route] Partial update of a note of the caller's tenant.
#[utoipa::path(
    put,
    path = "/notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    request_body = UpdateNoteRequest,
    responses(
        (status = 200, description = "Updated", body = Note),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn update_note(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateNoteRequest>,
) -> Result<Json<Note>, AppError> {
    let id = parse_note_id(&id)?;
    let changes = UpdateNoteRequest {
        title: payload.title.as_deref().map(validate_title).transpose()?,
        content: payload.content,
    };

    state
        .repo
        .update_note(claims.tenant_id, id, changes)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// delete_note
///
/// [Authenticated Route] Deletes a note of the caller's tenant.
#[utoipa::path(
    delete,
    path = "/notes/{id}",
    params(("id" = Uuid, Path, description = "Note ID")),
    responses(
        (status = 200, description = "Deleted", body = DeleteNoteResponse),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn delete_note(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteNoteResponse>, AppError> {
    let id = parse_note_id(&id)?;
    if state.repo.delete_note(claims.tenant_id, id).await? {
        Ok(Json(DeleteNoteResponse { success: true }))
    } else {
        Err(AppError::NotFound)
    }
}

// --- Admin Handlers ---

/// upgrade_tenant
///
/// [Admin Route] Moves the caller's tenant to the PRO plan. `key` may be the tenant slug
/// or its id; naming any other tenant yields 404. Upgrading a PRO tenant is a no-op.
#[utoipa::path(
    post,
    path = "/tenants/{key}/upgrade",
    params(("key" = String, Path, description = "Tenant slug or ID")),
    responses(
        (status = 200, description = "Upgraded", body = UpgradeResponse),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn upgrade_tenant(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<UpgradeResponse>, AppError> {
    require_role(&claims, &[Role::Admin])?;

    let tenant = state
        .repo
        .find_tenant(&key)
        .await?
        .filter(|tenant| tenant.id == claims.tenant_id)
        .ok_or(AppError::NotFound)?;

    let tenant = state
        .repo
        .set_tenant_plan(tenant.id, Plan::Pro)
        .await?
        .ok_or(AppError::NotFound)?;

    tracing::info!(tenant_id = %tenant.id, slug = %tenant.slug, "tenant upgraded to PRO");
    Ok(Json(UpgradeResponse {
        success: true,
        tenant,
    }))
}

/// list_users
///
/// [Admin Route] Members of the caller's tenant.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Tenant users", body = [User]),
        (status = 403, description = "Not an admin", body = ErrorBody)
    )
)]
pub async fn list_users(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, AppError> {
    require_role(&claims, &[Role::Admin])?;
    Ok(Json(state.repo.list_users(claims.tenant_id).await?))
}

/// invite_user
///
/// [Admin Route] Creates a user in the caller's tenant.
#[utoipa::path(
    post,
    path = "/users",
    request_body = InviteUserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 403, description = "Not an admin", body = ErrorBody),
        (status = 409, description = "Email already in use", body = ErrorBody)
    )
)]
pub async fn invite_user(
    AuthUser(claims): AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<InviteUserRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    require_role(&claims, &[Role::Admin])?;

    let email = normalize_email(&payload.email);
    if !email.contains('@') || email.starts_with('@') || email.ends_with('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    if payload.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(AppError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_CHARS} characters"
        )));
    }

    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || credentials::hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("password hashing task failed: {e}")))??;

    let user = state
        .repo
        .create_user(
            claims.tenant_id,
            NewUser {
                email,
                password_hash,
                role: payload.role,
            },
        )
        .await?;

    tracing::info!(tenant_id = %claims.tenant_id, user_id = %user.id, "user invited");
    Ok((StatusCode::CREATED, Json(user)))
}
