//! Request and response bodies.

use chrono::{DateTime, Utc};
use meetnotes_core::{Note, NoteVersion};
use serde::{Deserialize, Serialize};

use crate::note_path;

/// Body of `POST /api/notes`.
///
/// Fields are optional so that a missing field surfaces as a validation
/// error rather than a body rejection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Body of `PUT /api/notes/:eventId`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateNoteRequest {
    #[serde(default)]
    pub content: Option<String>,
}

impl UpdateNoteRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
        }
    }
}

/// Body of `PUT /api/admin/notes/:noteId`.
///
/// `path` is accepted for compatibility with older clients. The server
/// derives the storage locator from the note id and only checks that a
/// supplied path agrees with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUpdateNoteRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Body of `PUT /api/admin/users/:email/role`.
///
/// The role stays a string here so that unknown names reach the role store
/// and fail there with a proper error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetRoleRequest {
    #[serde(default)]
    pub role: Option<String>,
}

/// Single-note response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteResponse {
    pub success: bool,
    pub note: Note,
}

impl NoteResponse {
    pub fn new(note: Note) -> Self {
        Self {
            success: true,
            note,
        }
    }
}

/// Note list response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotesResponse {
    pub success: bool,
    pub notes: Vec<Note>,
}

impl NotesResponse {
    pub fn new(notes: Vec<Note>) -> Self {
        Self {
            success: true,
            notes,
        }
    }
}

/// A note as shown in the admin view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminNote {
    /// Document id; equal to the event id.
    pub id: String,
    pub event_id: String,
    pub content: String,
    pub user_email: String,
    pub created_by: String,
    pub last_editor: String,
    /// Storage locator, informational only.
    pub path: String,
    pub versions: Vec<NoteVersion>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Note> for AdminNote {
    fn from(note: Note) -> Self {
        let versions = note.versions().to_vec();
        Self {
            id: note.event_id.clone(),
            path: note_path(&note.event_id),
            event_id: note.event_id,
            content: note.content,
            user_email: note.user_email,
            created_by: note.created_by,
            last_editor: note.last_editor,
            versions,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Generic acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    /// Short category, e.g. "Forbidden".
    pub error: String,
    /// Human-readable detail.
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Response of `GET /api/auth/google/url`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUrlResponse {
    pub url: String,
}

/// Public profile of the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

/// Response of `GET /api/auth/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub user: UserProfile,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Query of `GET /api/calendar/upcoming`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarWindow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_min: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_max: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    #[test]
    fn admin_note_carries_path_and_rfc3339_times() {
        let mut note = Note::new("evt1", "draft", "a@x.com", t(1_000));
        note.apply_edit("final", "a@x.com", t(2_000));

        insta::assert_json_snapshot!(AdminNote::from(note), @r#"
        {
          "id": "evt1",
          "eventId": "evt1",
          "content": "final",
          "userEmail": "a@x.com",
          "createdBy": "a@x.com",
          "lastEditor": "a@x.com",
          "path": "notes/evt1",
          "versions": [
            {
              "content": "draft",
              "timestamp": 1000,
              "editor": "a@x.com"
            }
          ],
          "createdAt": "1970-01-01T00:00:01Z",
          "updatedAt": "1970-01-01T00:00:02Z"
        }
        "#);
    }

    #[test]
    fn error_body_shape() {
        insta::assert_json_snapshot!(ErrorBody::new("Forbidden", "Cannot modify owner role"), @r#"
        {
          "success": false,
          "error": "Forbidden",
          "message": "Cannot modify owner role"
        }
        "#);
    }

    #[test]
    fn missing_fields_deserialize_as_none() {
        let req: UpdateNoteRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.content, None);

        let req: CreateNoteRequest = serde_json::from_str(r#"{"eventId":"e1"}"#).unwrap();
        assert_eq!(req.event_id.as_deref(), Some("e1"));
        assert_eq!(req.content, None);

        let req: AdminUpdateNoteRequest =
            serde_json::from_str(r#"{"content":"x","path":"notes/e1"}"#).unwrap();
        assert_eq!(req.path.as_deref(), Some("notes/e1"));
    }

    #[test]
    fn calendar_window_uses_camel_case() {
        let window: CalendarWindow =
            serde_json::from_str(r#"{"timeMin":"2024-05-01T10:00:00Z"}"#).unwrap();
        assert_eq!(
            window.time_min,
            Some(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap())
        );
        assert!(window.time_max.is_none());
    }
}
