//! Generic in-memory repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::RwLock;
use uuid::Uuid;

use courtside_core::storage::{
    DocumentId, Entity, EntityStream, Repository, RepositoryError, Result,
};

/// A stored document. Retired documents are superseded versions kept as
/// history; they are invisible to every read.
#[derive(Debug, Clone)]
struct Document<T> {
    entity: T,
    retired: bool,
}

#[derive(Debug)]
struct Collection<T> {
    documents: HashMap<DocumentId, Document<T>>,
    /// Live document id per domain uuid.
    live: HashMap<Uuid, DocumentId>,
}

impl<T: Entity> Collection<T> {
    /// Whether another live entity already holds `key`.
    fn key_taken(&self, key: &str, uuid: Uuid) -> bool {
        self.documents.values().any(|doc| {
            !doc.retired
                && doc.entity.uuid() != uuid
                && doc.entity.unique_key().as_deref() == Some(key)
        })
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            documents: HashMap::new(),
            live: HashMap::new(),
        }
    }
}

/// In-memory storage for one entity kind.
///
/// Saves are upserts by uuid. For versioned kinds every save retires the
/// current document and stores a new one under a fresh id. A save whose
/// [`Entity::unique_key`] is held by a different live entity fails with
/// [`RepositoryError::AlreadyExists`].
#[derive(Debug, Clone)]
pub struct InMemoryStore<T> {
    collection: Arc<RwLock<Collection<T>>>,
}

impl<T> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self {
            collection: Arc::new(RwLock::new(Collection::default())),
        }
    }
}

impl<T: Entity> InMemoryStore<T> {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored version of `uuid`, live or retired.
    #[cfg(test)]
    pub async fn versions(&self, uuid: Uuid) -> Vec<T> {
        let collection = self.collection.read().await;
        collection
            .documents
            .values()
            .filter(|doc| doc.entity.uuid() == uuid)
            .map(|doc| doc.entity.clone())
            .collect()
    }
}

#[async_trait]
impl<T: Entity> Repository<T> for InMemoryStore<T> {
    async fn find_all(&self) -> Result<EntityStream<T>> {
        let entities: Vec<T> = {
            let collection = self.collection.read().await;
            collection
                .documents
                .values()
                .filter(|doc| !doc.retired)
                .map(|doc| doc.entity.clone())
                .collect()
        };
        Ok(futures_util::stream::iter(entities.into_iter().map(Ok)).boxed())
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<T>> {
        let collection = self.collection.read().await;
        Ok(collection
            .documents
            .get(id)
            .filter(|doc| !doc.retired)
            .map(|doc| doc.entity.clone()))
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<T>> {
        let collection = self.collection.read().await;
        Ok(collection
            .live
            .get(&uuid)
            .and_then(|id| collection.documents.get(id))
            .map(|doc| doc.entity.clone()))
    }

    async fn save(&self, entity: &T) -> Result<T> {
        let mut collection = self.collection.write().await;
        let uuid = entity.uuid();

        if let Some(key) = entity.unique_key() {
            if collection.key_taken(&key, uuid) {
                tracing::debug!(kind = T::KIND, %uuid, "Unique key already taken");
                return Err(RepositoryError::AlreadyExists {
                    entity_type: T::KIND,
                    id: key,
                });
            }
        }

        let current = collection.live.get(&uuid).cloned();

        let id = match current {
            Some(previous) if T::VERSIONED => {
                if let Some(doc) = collection.documents.get_mut(&previous) {
                    doc.retired = true;
                }
                tracing::trace!(kind = T::KIND, %uuid, retired = %previous, "Retired previous version");
                DocumentId::generate()
            }
            Some(existing) => existing,
            None => entity.id().cloned().unwrap_or_else(DocumentId::generate),
        };

        let mut saved = entity.clone();
        saved.set_id(id.clone());
        collection.documents.insert(
            id.clone(),
            Document {
                entity: saved.clone(),
                retired: false,
            },
        );
        collection.live.insert(uuid, id);

        Ok(saved)
    }

    async fn delete(&self, id: &DocumentId) -> Result<Option<T>> {
        let mut collection = self.collection.write().await;
        match collection.documents.get(id) {
            Some(doc) if !doc.retired => {}
            _ => return Ok(None),
        }

        let removed = collection.documents.remove(id).map(|doc| doc.entity);
        if let Some(entity) = &removed {
            collection.live.remove(&entity.uuid());
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courtside_core::auth::Role;
    use courtside_core::shop::{Machine, MachineKind, User};
    use futures_util::TryStreamExt;

    fn machine() -> Machine {
        Machine::new("Baiardo", "Babolat", MachineKind::Stringing, "BB-0042")
    }

    fn user() -> User {
        User::new("Ana", "Ruiz", "ana@club.test", "hash", Role::Worker)
    }

    #[tokio::test]
    async fn test_save_assigns_storage_id() {
        let store = InMemoryStore::new();
        let saved = store.save(&machine()).await.unwrap();

        let id = saved.id().cloned().unwrap();
        assert_eq!(store.find_by_id(&id).await.unwrap(), Some(saved.clone()));
        assert_eq!(store.find_by_uuid(saved.uuid).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn test_save_is_upsert_by_uuid() {
        let store = InMemoryStore::new();
        let first = store.save(&machine()).await.unwrap();

        // Same uuid without a storage id still lands on the same document
        let update = Machine {
            id: None,
            active: false,
            ..first.clone()
        };
        let second = store.save(&update).await.unwrap();

        assert_eq!(second.id, first.id);
        assert!(!second.active);
        let all: Vec<Machine> = store.find_all().await.unwrap().try_collect().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_versioned_save_retires_previous() {
        let store = InMemoryStore::new();
        let first = store.save(&user()).await.unwrap();
        let second = store.save(&first.deactivated()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(store.find_by_id(first.id().unwrap()).await.unwrap(), None);
        let live = store.find_by_uuid(first.uuid).await.unwrap().unwrap();
        assert!(!live.active);
        assert_eq!(live.id, second.id);
        assert_eq!(store.versions(first.uuid).await.len(), 2);

        let all: Vec<User> = store.find_all().await.unwrap().try_collect().await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn test_save_rejects_taken_email() {
        let store = InMemoryStore::new();
        store.save(&user()).await.unwrap();

        let twin = User::new("Ana", "Ruiz", "ANA@club.test", "other", Role::Client);
        let err = store.save(&twin).await.unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::AlreadyExists { entity_type: "User", ref id } if id == "ana@club.test"
        ));
        assert_eq!(store.find_by_uuid(twin.uuid).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_resave_keeps_own_email() {
        let store = InMemoryStore::new();
        let first = store.save(&user()).await.unwrap();

        // A new version of the same account is not a duplicate
        let second = store.save(&first.deactivated()).await.unwrap();
        assert!(!second.active);
    }

    #[tokio::test]
    async fn test_email_frees_up_after_delete() {
        let store = InMemoryStore::new();
        let first = store.save(&user()).await.unwrap();
        store.delete(first.id().unwrap()).await.unwrap();

        let again = User::new("Ana", "Ruiz", "ana@club.test", "hash", Role::Client);
        assert!(store.save(&again).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_returns_entity() {
        let store = InMemoryStore::new();
        let saved = store.save(&machine()).await.unwrap();
        let id = saved.id().cloned().unwrap();

        assert_eq!(store.delete(&id).await.unwrap(), Some(saved.clone()));
        assert_eq!(store.delete(&id).await.unwrap(), None);
        assert_eq!(store.find_by_uuid(saved.uuid).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_unknown_id() {
        let store: InMemoryStore<Machine> = InMemoryStore::new();
        let result = store.delete(&DocumentId::from("missing")).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_find_all_restarts() {
        let store = InMemoryStore::new();
        store.save(&machine()).await.unwrap();
        store.save(&machine()).await.unwrap();

        for _ in 0..2 {
            let all: Vec<Machine> = store.find_all().await.unwrap().try_collect().await.unwrap();
            assert_eq!(all.len(), 2);
        }
    }
}
