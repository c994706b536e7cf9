//! In-process document store. Contents are lost on restart.

use std::collections::HashMap;

use meetnotes_providers::BoxFuture;
use tokio::sync::RwLock;

use super::{Document, DocumentStore, Precondition, Revision, StoreError, StoreResult};

type Collection = HashMap<String, (serde_json::Value, Revision)>;

/// Ephemeral [`DocumentStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn get<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
    ) -> BoxFuture<'a, StoreResult<Option<Document>>> {
        Box::pin(async move {
            let collections = self.collections.read().await;
            Ok(collections
                .get(collection)
                .and_then(|docs| docs.get(id))
                .map(|(body, revision)| Document {
                    id: id.to_string(),
                    body: body.clone(),
                    revision: *revision,
                }))
        })
    }

    fn list<'a>(&'a self, collection: &'a str) -> BoxFuture<'a, StoreResult<Vec<Document>>> {
        Box::pin(async move {
            let collections = self.collections.read().await;
            Ok(collections
                .get(collection)
                .map(|docs| {
                    docs.iter()
                        .map(|(id, (body, revision))| Document {
                            id: id.clone(),
                            body: body.clone(),
                            revision: *revision,
                        })
                        .collect()
                })
                .unwrap_or_default())
        })
    }

    fn put<'a>(
        &'a self,
        collection: &'a str,
        id: &'a str,
        body: serde_json::Value,
        precondition: Precondition,
    ) -> BoxFuture<'a, StoreResult<Revision>> {
        Box::pin(async move {
            let mut collections = self.collections.write().await;
            let docs = collections.entry(collection.to_string()).or_default();
            let current = docs.get(id).map(|(_, revision)| *revision);
            if !precondition.holds(current) {
                return Err(StoreError::conflict(collection, id));
            }
            let revision = current.unwrap_or(0) + 1;
            docs.insert(id.to_string(), (body, revision));
            Ok(revision)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::contract;

    #[tokio::test]
    async fn get_missing_is_none() {
        contract::get_missing_is_none(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn revisions_increase() {
        contract::revisions_increase(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn stale_writes_conflict() {
        contract::stale_writes_conflict(&MemoryStore::new()).await;
    }

    #[tokio::test]
    async fn collections_are_separate() {
        contract::collections_are_separate(&MemoryStore::new()).await;
    }
}
