//! Durable document store on the local filesystem.
//!
//! Layout: `<root>/<collection>/<url-encoded id>.json`, each file holding
//! `{"revision": n, "body": ...}`. Writes go to a temp file that is then
//! renamed over the target, and are serialized by a process-wide lock so the
//! precondition check and the write are atomic with respect to each other.

use std::path::{Path, PathBuf};

use meetnotes_providers::BoxFuture;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::{Document, DocumentStore, Precondition, Revision, StoreError, StoreResult};

const EXTENSION: &str = "json";

#[derive(Debug, Serialize, Deserialize)]
struct Envelope {
    revision: Revision,
    body: serde_json::Value,
}

/// File-backed [`DocumentStore`].
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Opens (creating if needed) a store rooted at `root` and checks that it
    /// is writable.
    pub async fn open(root: impl Into<PathBuf>) -> StoreResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root).await?;

        let probe = root.join(".write-probe");
        fs::write(&probe, b"ok").await?;
        fs::remove_file(&probe).await?;

        debug!(root = %root.display(), "opened file store");
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn collection_dir(&self, collection: &str) -> PathBuf {
        self.root.join(urlencoding::encode(collection).as_ref())
    }

    fn document_path(&self, collection: &str, id: &str) -> PathBuf {
        self.collection_dir(collection)
            .join(format!("{}.{}", urlencoding::encode(id), EXTENSION))
    }

    async fn read_envelope(path: &Path) -> StoreResult<Option<Envelope>> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|source| StoreError::Decode {
                id: path.display().to_string(),
                source,
            })
    }

    async fn write_envelope(path: &Path, envelope: &Envelope) -> StoreResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_vec_pretty(envelope).map_err(StoreError::Encode)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content).await?;
        fs::rename(&temp_path, path).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            if let Err(e) = fs::set_permissions(path, perms).await {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to restrict document permissions"
                );
            }
        }

        Ok(())
    }

    async fn get_document(&self, collection: &str, id: &str) -> StoreResult<Option<Document>> {
        let path = self.document_path(collection, id);
        Ok(Self::read_envelope(&path).await?.map(|envelope| Document {
            id: id.to_string(),
            body: envelope.body,
            revision: envelope.revision,
        }))
    }

    async fn list_documents(&self, collection: &str) -> StoreResult<Vec<Document>> {
        let dir = self.collection_dir(collection);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut documents = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let id = match urlencoding::decode(stem) {
                Ok(id) => id.into_owned(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping undecodable document name");
                    continue;
                }
            };
            if let Some(envelope) = Self::read_envelope(&path).await? {
                documents.push(Document {
                    id,
                    body: envelope.body,
                    revision: envelope.revision,
                });
            }
        }
        Ok(documents)
    }

    async fn put_document(
        &self,
        collection: &str,
        id: &str,
        body: serde_json::Value,
        precondition: Precondition,
    ) -> StoreResult<Revision> {
        let _guard = self.write_lock.lock().await;

        let path = self.document_path(collection, id);
        let current = Self::read_envelope(&path).await?.map(|e| e.revision);
        if !precondition.holds(current) {
            return Err(StoreError::conflict(collection, id));
        }

        let revision = current.unwrap_or(0) + 1;
        Self::write_envelope(&path, &Envelope { revision, body }).await?;
        Ok(revision)
    }
}

impl DocumentStore for FileStore {
    fn kind(&self) -> &'static str {
        "file"
    }

    fn get<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<Document>>> {
        Box::pin(self.get_document(collection, id))
    }

    fn list<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, StoreResult<Vec<Document>>> {
        Box::pin(self.list_documents(collection))
    }

    fn put<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
        body: serde_json::Value,
        precondition: Precondition,
    ) -> BoxFuture<'a, StoreResult<Revision>> {
        Box::pin(self.put_document(collection, id, body, precondition))
    }
}
