use async_trait::async_trait;
use futures_util::stream::BoxStream;
use futures_util::TryStreamExt;
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::shop::User;

use super::{DocumentId, Result};

/// Lazy, finite sequence of stored entities.
///
/// Each call to [`Repository::find_all`] produces a fresh stream that starts
/// a new pass over the store.
pub type EntityStream<T> = BoxStream<'static, Result<T>>;

/// A document persisted by a [`Repository`] and cached by its domain uuid.
pub trait Entity:
    Clone + std::fmt::Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Entity name used in logs and errors.
    const KIND: &'static str;

    /// Whether every save creates a new document version instead of
    /// overwriting the current one.
    const VERSIONED: bool = false;

    /// Storage id, `None` until the entity has been saved once.
    fn id(&self) -> Option<&DocumentId>;

    /// Stamps the storage id assigned by the store.
    fn set_id(&mut self, id: DocumentId);

    /// Domain-stable identifier, used as the cache key.
    fn uuid(&self) -> Uuid;

    /// Natural key that at most one live entity may hold, checked by the
    /// store inside the write.
    fn unique_key(&self) -> Option<String> {
        None
    }
}

/// CRUD contract against the backing document store.
#[async_trait]
pub trait Repository<T: Entity>: Send + Sync {
    /// Streams every live entity.
    async fn find_all(&self) -> Result<EntityStream<T>>;

    /// Gets an entity by its storage id.
    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<T>>;

    /// Gets an entity by its domain uuid.
    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<T>>;

    /// Inserts or updates an entity, returning the persisted value.
    async fn save(&self, entity: &T) -> Result<T>;

    /// Deletes an entity by storage id, returning it if it existed.
    async fn delete(&self, id: &DocumentId) -> Result<Option<T>>;
}

/// User lookups the login flow needs beyond plain CRUD.
#[async_trait]
pub trait UserRepositoryExt: Repository<User> {
    /// Gets a user by email address, compared case-insensitively.
    ///
    /// Scans [`Repository::find_all`], so it never reads through a cache.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut users = self.find_all().await?;
        while let Some(user) = users.try_next().await? {
            if user.email.eq_ignore_ascii_case(email) {
                return Ok(Some(user));
            }
        }
        Ok(None)
    }
}

impl<R: Repository<User> + ?Sized> UserRepositoryExt for R {}
