//! Note repository.
//!
//! Notes live in the `notes` collection keyed by event id. Every mutation is
//! a read followed by a revision-conditioned write; when another writer gets
//! in between, the mutation is recomputed from the fresh read, so no edit's
//! history entry is ever dropped.

use std::sync::Arc;

use chrono::Utc;
use meetnotes_core::{AccessDenied, Note};
use meetnotes_protocol::NOTES_COLLECTION;
use tracing::{debug, warn};

use crate::error::{RepositoryError, RepositoryResult};
use crate::store::{DocumentStore, MAX_WRITE_ATTEMPTS, Precondition, encode};

const NOT_FOUND: &str = "Note not found";

/// CRUD and versioning over notes.
#[derive(Clone)]
pub struct NoteRepository {
    store: Arc<dyn DocumentStore>,
}

impl NoteRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Fetches the note for `event_id`.
    pub async fn get(&self, event_id: &str) -> RepositoryResult<Note> {
        self.find(event_id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(NOT_FOUND))
    }

    /// Fetches the note for `event_id`, if any.
    pub async fn find(&self, event_id: &str) -> RepositoryResult<Option<Note>> {
        match self.store.get(NOTES_COLLECTION, event_id).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// Notes owned by `email`, most recently updated first.
    pub async fn list_by_owner(&self, email: &str) -> RepositoryResult<Vec<Note>> {
        let mut notes = self.list_all().await?;
        notes.retain(|note| note.is_owned_by(email));
        Ok(notes)
    }

    /// Every note, most recently updated first. Undecodable documents are
    /// logged and skipped.
    pub async fn list_all(&self) -> RepositoryResult<Vec<Note>> {
        let docs = self.store.list(NOTES_COLLECTION).await?;
        let mut notes: Vec<Note> = docs
            .iter()
            .filter_map(|doc| match doc.decode::<Note>() {
                Ok(note) => Some(note),
                Err(e) => {
                    warn!(event_id = %doc.id, error = %e, "skipping unreadable note");
                    None
                }
            })
            .collect();
        notes.sort_by(|a, b| {
            b.updated_at
                .cmp(&a.updated_at)
                .then_with(|| a.event_id.cmp(&b.event_id))
        });
        Ok(notes)
    }

    /// Creates the note or appends an edit to it.
    pub async fn create_or_update(
        &self,
        event_id: &str,
        content: &str,
        editor: &str,
    ) -> RepositoryResult<Note> {
        self.create_or_update_guarded(event_id, content, editor, |_| Ok(()))
            .await
    }

    /// Like [`create_or_update`](Self::create_or_update), but `guard` sees the
    /// current note (or `None`) on every attempt and may refuse the write.
    pub async fn create_or_update_guarded<F>(
        &self,
        event_id: &str,
        content: &str,
        editor: &str,
        guard: F,
    ) -> RepositoryResult<Note>
    where
        F: Fn(Option<&Note>) -> Result<(), AccessDenied>,
    {
        validate(event_id, content)?;
        self.mutate(event_id, content, editor, true, guard).await
    }

    /// Appends an edit to an existing note. Never creates.
    pub async fn update_existing(
        &self,
        event_id: &str,
        content: &str,
        editor: &str,
    ) -> RepositoryResult<Note> {
        validate(event_id, content)?;
        self.mutate(event_id, content, editor, false, |_| Ok(()))
            .await
    }

    async fn mutate<F>(
        &self,
        event_id: &str,
        content: &str,
        editor: &str,
        allow_create: bool,
        guard: F,
    ) -> RepositoryResult<Note>
    where
        F: Fn(Option<&Note>) -> Result<(), AccessDenied>,
    {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let doc = self.store.get(NOTES_COLLECTION, event_id).await?;
            let current: Option<Note> = doc.as_ref().map(|d| d.decode()).transpose()?;
            guard(current.as_ref())?;

            let note = match current {
                Some(mut note) => {
                    note.apply_edit(content, editor, Utc::now());
                    note
                }
                None if allow_create => Note::new(event_id, content, editor, Utc::now()),
                None => return Err(RepositoryError::not_found(NOT_FOUND)),
            };

            let precondition = Precondition::from_read(doc.map(|d| d.revision));
            match self
                .store
                .put(NOTES_COLLECTION, event_id, encode(&note)?, precondition)
                .await
            {
                Ok(revision) => {
                    debug!(
                        event_id = %event_id,
                        editor = %editor,
                        revision,
                        versions = note.versions().len(),
                        "saved note"
                    );
                    return Ok(note);
                }
                Err(e) if e.is_conflict() => {
                    debug!(event_id = %event_id, attempt, "note write conflict, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(event_id = %event_id, "giving up on note write after repeated conflicts");
        Err(RepositoryError::Conflict(format!(
            "Note {} was modified concurrently, please retry",
            event_id
        )))
    }
}

fn validate(event_id: &str, content: &str) -> RepositoryResult<()> {
    if event_id.trim().is_empty() {
        return Err(RepositoryError::validation("eventId is required"));
    }
    if content.is_empty() {
        return Err(RepositoryError::validation("content is required"));
    }
    Ok(())
}
