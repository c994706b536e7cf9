//! The caller's own notes.
//!
//! Ownership is decided by the access gate against the stored note. Writes
//! check it inside the repository's retry loop, so a note created by someone
//! else between read and write is still refused.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use meetnotes_core::{Note, Operation};
use meetnotes_protocol::{CreateNoteRequest, NoteResponse, NotesResponse, UpdateNoteRequest};
use tracing::debug;

use crate::auth::AuthContext;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    ctx: AuthContext,
) -> Result<Json<NotesResponse>, ApiError> {
    let notes = state.notes.list_by_owner(&ctx.email).await?;
    Ok(Json(NotesResponse::new(notes)))
}

pub async fn get(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(event_id): Path<String>,
) -> Result<Json<NoteResponse>, ApiError> {
    let note = state.notes.get(&event_id).await?;
    state.gate.check(
        ctx.actor(),
        Operation::ReadNote {
            owner: Some(note.owner()),
        },
    )?;
    Ok(Json(NoteResponse::new(note)))
}

pub async fn create(
    State(state): State<AppState>,
    ctx: AuthContext,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<Json<NoteResponse>, ApiError> {
    let Json(body) = payload?;
    let event_id = body.event_id.unwrap_or_default();
    let content = body.content.unwrap_or_default();
    upsert(&state, &ctx, &event_id, &content).await
}

pub async fn update(
    State(state): State<AppState>,
    ctx: AuthContext,
    Path(event_id): Path<String>,
    payload: Result<Json<UpdateNoteRequest>, JsonRejection>,
) -> Result<Json<NoteResponse>, ApiError> {
    let Json(body) = payload?;
    let content = body.content.unwrap_or_default();
    upsert(&state, &ctx, &event_id, &content).await
}

async fn upsert(
    state: &AppState,
    ctx: &AuthContext,
    event_id: &str,
    content: &str,
) -> Result<Json<NoteResponse>, ApiError> {
    let actor = ctx.actor();
    let note = state
        .notes
        .create_or_update_guarded(event_id, content, &ctx.email, |current| {
            state.gate.check(
                actor,
                Operation::WriteNote {
                    owner: current.map(Note::owner),
                },
            )
        })
        .await?;
    debug!(
        event_id = %note.event_id,
        email = %ctx.email,
        versions = note.versions().len(),
        "note saved"
    );
    Ok(Json(NoteResponse::new(note)))
}
