//! Keyed document storage.
//!
//! Documents are JSON values grouped in named collections and addressed by
//! id. Every successful write bumps the document's revision; writers that
//! read-modify-write pass the revision they read as a [`Precondition`] and
//! get [`StoreError::Conflict`] when someone else wrote in between.

mod file;
mod memory;

use std::io;

use meetnotes_providers::BoxFuture;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Attempts a read-modify-write makes before reporting a conflict.
pub const MAX_WRITE_ATTEMPTS: usize = 5;

/// Store-assigned write counter. The first write of a document yields 1.
pub type Revision = u64;

/// A stored document and the revision it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: serde_json::Value,
    pub revision: Revision,
}

impl Document {
    /// Deserializes the body.
    pub fn decode<T: DeserializeOwned>(&self) -> StoreResult<T> {
        serde_json::from_value(self.body.clone()).map_err(|source| StoreError::Decode {
            id: self.id.clone(),
            source,
        })
    }
}

/// Condition a write must satisfy to be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precondition {
    /// Unconditional write.
    None,
    /// The document must not exist yet.
    MustNotExist,
    /// The document must still be at this revision.
    Revision(Revision),
}

impl Precondition {
    /// Precondition matching what was read: `None` read means the document
    /// must still be absent.
    pub fn from_read(revision: Option<Revision>) -> Self {
        match revision {
            Some(revision) => Self::Revision(revision),
            None => Self::MustNotExist,
        }
    }

    fn holds(self, current: Option<Revision>) -> bool {
        match (self, current) {
            (Self::None, _) => true,
            (Self::MustNotExist, current) => current.is_none(),
            (Self::Revision(expected), Some(current)) => expected == current,
            (Self::Revision(_), None) => false,
        }
    }
}

/// Errors raised by a [`DocumentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("write conflict on {collection}/{id}")]
    Conflict { collection: String, id: String },

    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode document {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    pub fn conflict(collection: &str, id: &str) -> Self {
        Self::Conflict {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed JSON document storage with conditional writes.
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs ("file", "memory").
    fn kind(&self) -> &'static str;

    fn get<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<Document>>>;

    /// Returns every document of `collection`, in no particular order.
    fn list<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, StoreResult<Vec<Document>>>;

    /// Writes `body` if `precondition` holds and returns the new revision.
    fn put<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
        body: serde_json::Value,
        precondition: Precondition,
    ) -> BoxFuture<'a, StoreResult<Revision>>;
}

/// Serializes `value` for [`DocumentStore::put`].
pub fn encode<T: Serialize>(value: &T) -> StoreResult<serde_json::Value> {
    serde_json::to_value(value).map_err(StoreError::Encode)
}
