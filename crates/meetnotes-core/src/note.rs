//! Meeting notes and their version history.
//!
//! A [`Note`] is attached to exactly one calendar event, identified by the
//! provider's opaque event id. Every edit pushes the pre-edit state onto the
//! note's history as a [`NoteVersion`]; the history is append-only and kept
//! in chronological order.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// An immutable snapshot of a note's content prior to an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteVersion {
    /// The content the note had before the edit.
    pub content: String,
    /// When that content was written (the note's `updatedAt` at the time).
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    /// Who wrote that content.
    pub editor: String,
}

/// A free-text note attached to a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// The calendar event this note belongs to.
    pub event_id: String,
    /// Current text.
    pub content: String,
    /// Owner of the note. Always equal to `created_by`.
    pub user_email: String,
    /// Identity that created the note; the single writer of record.
    pub created_by: String,
    /// Identity that wrote the current content.
    pub last_editor: String,
    /// Creation time.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// Time of the last edit. Strictly increasing across edits.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    versions: Vec<NoteVersion>,
}

impl Note {
    /// Creates a fresh note with an empty history.
    pub fn new(
        event_id: impl Into<String>,
        content: impl Into<String>,
        editor: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        let editor = editor.into();
        let now = truncate_to_millis(now);
        Self {
            event_id: event_id.into(),
            content: content.into(),
            user_email: editor.clone(),
            created_by: editor.clone(),
            last_editor: editor,
            created_at: now,
            updated_at: now,
            versions: Vec::new(),
        }
    }

    /// Returns the identity that owns this note.
    pub fn owner(&self) -> &str {
        &self.created_by
    }

    /// Returns true if `email` owns this note.
    pub fn is_owned_by(&self, email: &str) -> bool {
        self.created_by == email
    }

    /// Returns the version history, oldest first.
    pub fn versions(&self) -> &[NoteVersion] {
        &self.versions
    }

    /// Replaces the content, first recording the current state in the history.
    ///
    /// The recorded snapshot is `{content, updated_at, last_editor}` as they
    /// were before the call. `updated_at` moves to `now`, or to one millisecond
    /// past the previous value if the clock has not advanced.
    pub fn apply_edit(
        &mut self,
        content: impl Into<String>,
        editor: impl Into<String>,
        now: DateTime<Utc>,
    ) {
        self.versions.push(NoteVersion {
            content: std::mem::take(&mut self.content),
            timestamp: self.updated_at,
            editor: std::mem::take(&mut self.last_editor),
        });
        self.content = content.into();
        self.last_editor = editor.into();
        self.updated_at = next_update_time(self.updated_at, now);
    }
}

/// Computes the `updatedAt` for an edit so that it is strictly after `previous`.
pub fn next_update_time(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = truncate_to_millis(now);
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

/// Drops sub-millisecond precision so in-memory values equal their wire form.
pub fn truncate_to_millis(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(time.timestamp_millis()).unwrap_or(time)
}
