//! Administrative views.
//!
//! Every handler re-reads the caller's role from the role store before asking
//! the gate; the role inside the token may predate a promotion or demotion.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use meetnotes_core::{AccessDenied, Operation, Role, UserRole};
use meetnotes_protocol::{
    AdminNote, AdminUpdateNoteRequest, MessageResponse, SetRoleRequest, note_path,
};
use tracing::info;

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_notes(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<Vec<AdminNote>>, ApiError> {
    let actor = ctx.current_actor(&state.roles).await?;
    state.gate.check(actor, Operation::ListAllNotes)?;

    let notes = state.notes.list_all().await?;
    Ok(Json(notes.into_iter().map(AdminNote::from).collect()))
}

pub async fn update_note(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(note_id): Path<String>,
    payload: Result<Json<AdminUpdateNoteRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let actor = ctx.current_actor(&state.roles).await?;
    state.gate.check(actor, Operation::AdminEditNote)?;

    let Json(body) = payload?;
    if let Some(path) = body.path.as_deref() {
        if path != note_path(&note_id) {
            return Err(ApiError::validation("Note path does not match note id"));
        }
    }
    let content = body.content.unwrap_or_default();

    let note = state
        .notes
        .update_existing(&note_id, &content, &ctx.email)
        .await?;
    info!(
        event_id = %note.event_id,
        editor = %ctx.email,
        owner = %note.owner(),
        "note updated by admin"
    );
    Ok(Json(MessageResponse::new("Note updated successfully")))
}

pub async fn list_users(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<Vec<UserRole>>, ApiError> {
    let actor = ctx.current_actor(&state.roles).await?;
    state.gate.check(actor, Operation::ListUsers)?;

    let mut users = state.roles.list_all().await?;
    users.sort_by(|a, b| a.email.cmp(&b.email));
    Ok(Json(users))
}

pub async fn set_role(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(email): Path<String>,
    payload: Result<Json<SetRoleRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let actor = ctx.current_actor(&state.roles).await?;
    let Json(body) = payload?;
    let requested = body.role.unwrap_or_default();

    match requested.parse::<Role>() {
        Ok(new_role) => state.gate.check(
            actor,
            Operation::ChangeRole {
                target: &email,
                new_role,
            },
        )?,
        // Only the owner learns that the name was bad.
        Err(_) if !actor.role.is_owner() => return Err(AccessDenied::OwnerRequired.into()),
        Err(e) => return Err(ApiError::validation(e.to_string())),
    }

    let record = state.roles.set_role(&email, &requested).await?;
    info!(email = %record.email, role = %record.role, by = %ctx.email, "role changed");
    Ok(Json(MessageResponse::new("User role updated successfully")))
}
