//! HTTP request and response bodies for the meetnotes API.
//!
//! Field names are camelCase on the wire. Note endpoints carry timestamps as
//! milliseconds since the Unix epoch; admin endpoints carry RFC 3339 strings.
//!
//! # Refreshed tokens
//!
//! Any authenticated response may carry [`NEW_TOKEN_HEADER`]. When present,
//! the caller must replace its stored bearer token with the header value.

mod types;

pub use types::{
    AdminNote, AdminUpdateNoteRequest, AuthUrlResponse, CalendarWindow, CreateNoteRequest,
    ErrorBody, HealthResponse, MessageResponse, NoteResponse, NotesResponse, SetRoleRequest,
    UpdateNoteRequest, UserProfile, VerifyResponse,
};

/// Response header carrying a re-minted session token.
pub const NEW_TOKEN_HEADER: &str = "x-new-token";

/// Store collection holding notes.
pub const NOTES_COLLECTION: &str = "notes";

/// Store collection holding role assignments.
pub const ROLES_COLLECTION: &str = "user_roles";

/// Returns the storage locator of the note for `event_id`.
pub fn note_path(event_id: &str) -> String {
    format!("{}/{}", NOTES_COLLECTION, event_id)
}
