//! Generic cache-aside repository decorator with an optional refresh job.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::TryStreamExt;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use courtside_core::cache::{CacheConfig, CacheError, RefreshJobConfig};
use courtside_core::storage::{DocumentId, Entity, EntityStream, Repository, Result};

use crate::cache::BoundedCache;

/// Cached repository decorator.
///
/// Implements the cache-aside pattern over a [`BoundedCache`] keyed by the
/// entity's domain uuid:
/// - **Reads**: `find_by_uuid` hits the cache first; a miss loads from the
///   repository and caches found values. `None` is never cached.
/// - **Writes**: `save` persists first and caches only the persisted value.
///   A failed write leaves the cache untouched.
/// - **Deletes**: invalidate the deleted entity's uuid.
/// - `find_all` always goes to the repository.
/// - **Refresh**: a snapshot is only swapped in when no write overlapped
///   the load, so a refresh never brings back a value a write replaced or
///   deleted.
///
/// # Type Parameters
///
/// * `R` - The underlying repository implementation
/// * `T` - The entity kind stored by `R`
pub struct CachedRepository<R, T>
where
    R: Repository<T>,
    T: Entity,
{
    repository: Arc<R>,
    cache: BoundedCache<Uuid, T>,
    refresh: RefreshJobConfig,
    /// Set while a snapshot load is running.
    refreshing: AtomicBool,
    /// Set while a spawned refresh job is alive.
    job_active: Arc<AtomicBool>,
    /// Bumped when a write starts and again when it finishes.
    writes_epoch: AtomicU64,
    writes_in_flight: AtomicUsize,
    _entity: PhantomData<fn() -> T>,
}

/// Clears the in-flight flag when a refresh finishes, fails, or is dropped.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Marks a write against the store and cache for its whole duration.
struct WriteGuard<'a> {
    epoch: &'a AtomicU64,
    in_flight: &'a AtomicUsize,
}

impl<'a> WriteGuard<'a> {
    fn enter(epoch: &'a AtomicU64, in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        epoch.fetch_add(1, Ordering::SeqCst);
        Self { epoch, in_flight }
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Frees the refresh job slot when the job task ends, including by panic or
/// abort.
struct JobSlot(Arc<AtomicBool>);

impl Drop for JobSlot {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R, T> CachedRepository<R, T>
where
    R: Repository<T>,
    T: Entity,
{
    /// Creates a new cached repository.
    ///
    /// # Arguments
    ///
    /// * `repository` - The underlying repository to cache
    /// * `cache` - Capacity and TTL of the cache
    /// * `refresh` - Whether [`Self::spawn_refresh_job`] starts a periodic reload
    pub fn new(
        repository: Arc<R>,
        cache: CacheConfig,
        refresh: RefreshJobConfig,
    ) -> std::result::Result<Self, CacheError> {
        Ok(Self {
            repository,
            cache: BoundedCache::new(cache)?,
            refresh,
            refreshing: AtomicBool::new(false),
            job_active: Arc::new(AtomicBool::new(false)),
            writes_epoch: AtomicU64::new(0),
            writes_in_flight: AtomicUsize::new(0),
            _entity: PhantomData,
        })
    }

    /// Number of live cached entries. Expired entries are swept first.
    pub async fn cache_len(&self) -> usize {
        let swept = self.cache.sweep_expired().await;
        if swept > 0 {
            tracing::trace!(kind = T::KIND, swept, "Swept expired cache entries");
        }
        self.cache.len().await
    }

    /// Reloads the full snapshot from the repository and swaps it into the
    /// cache.
    ///
    /// Returns the number of entities loaded, or `None` when the cycle was
    /// skipped: another refresh of this repository was already in flight, or
    /// a save or delete overlapped the load and the snapshot may be stale. A
    /// failed load keeps the previous snapshot.
    pub async fn refresh(&self) -> Result<Option<usize>> {
        if self.refreshing.swap(true, Ordering::AcqRel) {
            tracing::debug!(kind = T::KIND, "Refresh already in flight, skipping");
            return Ok(None);
        }
        let _guard = InFlight(&self.refreshing);

        let epoch = self.writes_epoch.load(Ordering::SeqCst);
        let snapshot: Vec<T> = self.repository.find_all().await?.try_collect().await?;
        let loaded = snapshot.len();

        let swapped = self
            .cache
            .replace_all_if(
                snapshot.into_iter().map(|entity| (entity.uuid(), entity)),
                || {
                    self.writes_in_flight.load(Ordering::SeqCst) == 0
                        && self.writes_epoch.load(Ordering::SeqCst) == epoch
                },
            )
            .await;

        if !swapped {
            tracing::debug!(kind = T::KIND, "Write overlapped refresh, discarding snapshot");
            return Ok(None);
        }

        tracing::debug!(kind = T::KIND, loaded, "Cache refreshed");
        Ok(Some(loaded))
    }
}

impl<R, T> CachedRepository<R, T>
where
    R: Repository<T> + 'static,
    T: Entity,
{
    /// Starts the periodic refresh job.
    ///
    /// Returns `Ok(None)` when refresh is disabled for this repository. The
    /// first tick is skipped, so the first reload happens one interval after
    /// the call. Cancelling `shutdown` stops the loop between cycles.
    ///
    /// # Errors
    ///
    /// - [`CacheError::ZeroRefreshInterval`] if the configured interval is zero
    /// - [`CacheError::RefreshJobAlreadyRunning`] if a job is already alive
    pub fn spawn_refresh_job(
        self: &Arc<Self>,
        shutdown: CancellationToken,
    ) -> std::result::Result<Option<JoinHandle<()>>, CacheError> {
        if !self.refresh.enabled {
            return Ok(None);
        }
        if self.refresh.interval.is_zero() {
            return Err(CacheError::ZeroRefreshInterval);
        }
        if self.job_active.swap(true, Ordering::AcqRel) {
            return Err(CacheError::RefreshJobAlreadyRunning(T::KIND));
        }

        let slot = JobSlot(Arc::clone(&self.job_active));
        let this = Arc::clone(self);
        let period = self.refresh.interval;

        Ok(Some(tokio::spawn(async move {
            let _slot = slot;
            tracing::info!(kind = T::KIND, interval = ?period, "Cache refresh job started");
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(err) = this.refresh().await {
                            tracing::warn!(kind = T::KIND, error = %err, "Cache refresh failed, keeping previous snapshot");
                        }
                    }
                }
            }

            tracing::info!(kind = T::KIND, "Cache refresh job stopped");
        })))
    }
}

#[async_trait]
impl<R, T> Repository<T> for CachedRepository<R, T>
where
    R: Repository<T> + 'static,
    T: Entity,
{
    async fn find_all(&self) -> Result<EntityStream<T>> {
        self.repository.find_all().await
    }

    async fn find_by_id(&self, id: &DocumentId) -> Result<Option<T>> {
        let entity = self.repository.find_by_id(id).await?;
        if let Some(ref e) = entity {
            self.cache.put(e.uuid(), e.clone()).await;
        }
        Ok(entity)
    }

    async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<T>> {
        // Check cache first
        if let Some(entity) = self.cache.get(&uuid).await {
            tracing::trace!(kind = T::KIND, %uuid, "Cache hit");
            return Ok(Some(entity));
        }

        // Cache miss - fetch from repository without holding the cache lock
        tracing::trace!(kind = T::KIND, %uuid, "Cache miss");
        let entity = self.repository.find_by_uuid(uuid).await?;

        if let Some(ref e) = entity {
            self.cache.put(uuid, e.clone()).await;
        }

        Ok(entity)
    }

    async fn save(&self, entity: &T) -> Result<T> {
        let _write = WriteGuard::enter(&self.writes_epoch, &self.writes_in_flight);

        // 1. Persist to storage
        let saved = self.repository.save(entity).await?;

        // 2. Cache what the store returned
        self.cache.put(saved.uuid(), saved.clone()).await;

        tracing::debug!(kind = T::KIND, uuid = %saved.uuid(), "Entity saved");
        Ok(saved)
    }

    async fn delete(&self, id: &DocumentId) -> Result<Option<T>> {
        let _write = WriteGuard::enter(&self.writes_epoch, &self.writes_in_flight);
        let deleted = self.repository.delete(id).await?;

        if let Some(ref e) = deleted {
            self.cache.invalidate(&e.uuid()).await;
            tracing::debug!(kind = T::KIND, uuid = %e.uuid(), "Entity deleted");
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use courtside_core::shop::{Product, ProductCategory};
    use courtside_core::storage::RepositoryError;
    use futures_util::StreamExt;
    use tokio::sync::RwLock;

    // Mock repository that tracks calls
    struct MockProductRepository {
        products: RwLock<HashMap<Uuid, Product>>,
        find_calls: AtomicUsize,
        find_all_calls: AtomicUsize,
        fail_writes: AtomicBool,
        fail_reads: AtomicBool,
        /// Delay before each streamed item, after the snapshot was read.
        stream_delay_ms: AtomicU64,
    }

    impl MockProductRepository {
        fn new() -> Self {
            Self {
                products: RwLock::new(HashMap::new()),
                find_calls: AtomicUsize::new(0),
                find_all_calls: AtomicUsize::new(0),
                fail_writes: AtomicBool::new(false),
                fail_reads: AtomicBool::new(false),
                stream_delay_ms: AtomicU64::new(0),
            }
        }

        async fn insert(&self, mut product: Product) -> Product {
            product.id = Some(DocumentId::generate());
            self.products
                .write()
                .await
                .insert(product.uuid, product.clone());
            product
        }
    }

    #[async_trait]
    impl Repository<Product> for MockProductRepository {
        async fn find_all(&self) -> Result<EntityStream<Product>> {
            self.find_all_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_reads.load(Ordering::SeqCst) {
                return Err(RepositoryError::ConnectionFailed("store offline".into()));
            }
            let products: Vec<Product> = self.products.read().await.values().cloned().collect();
            let delay = Duration::from_millis(self.stream_delay_ms.load(Ordering::SeqCst));
            Ok(futures_util::stream::iter(products)
                .then(move |product| async move {
                    tokio::time::sleep(delay).await;
                    Ok(product)
                })
                .boxed())
        }

        async fn find_by_id(&self, id: &DocumentId) -> Result<Option<Product>> {
            let products = self.products.read().await;
            Ok(products.values().find(|p| p.id.as_ref() == Some(id)).cloned())
        }

        async fn find_by_uuid(&self, uuid: Uuid) -> Result<Option<Product>> {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.products.read().await.get(&uuid).cloned())
        }

        async fn save(&self, entity: &Product) -> Result<Product> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(RepositoryError::QueryFailed("write rejected".into()));
            }
            let mut saved = entity.clone();
            // The store normalizes names so tests can tell persisted values apart
            saved.name = saved.name.trim().to_string();
            if saved.id.is_none() {
                saved.id = Some(DocumentId::generate());
            }
            self.products
                .write()
                .await
                .insert(saved.uuid, saved.clone());
            Ok(saved)
        }

        async fn delete(&self, id: &DocumentId) -> Result<Option<Product>> {
            let mut products = self.products.write().await;
            let uuid = products
                .values()
                .find(|p| p.id.as_ref() == Some(id))
                .map(|p| p.uuid);
            Ok(uuid.and_then(|uuid| products.remove(&uuid)))
        }
    }

    fn product(name: &str) -> Product {
        Product::new(name, "Wilson", ProductCategory::Racket, 19_900, 3)
    }

    fn cached(
        repo: Arc<MockProductRepository>,
    ) -> CachedRepository<MockProductRepository, Product> {
        CachedRepository::new(repo, CacheConfig::default(), RefreshJobConfig::disabled()).unwrap()
    }

    #[tokio::test]
    async fn test_find_by_uuid_cache_aside() {
        let repo = Arc::new(MockProductRepository::new());
        let stored = repo.insert(product("Pro Staff 97")).await;
        let cached = cached(repo.clone());

        // First read is a miss and goes to the repository
        let first = cached.find_by_uuid(stored.uuid).await.unwrap();
        assert_eq!(first, Some(stored.clone()));
        assert_eq!(repo.find_calls.load(Ordering::SeqCst), 1);

        // Second read is served from the cache
        let second = cached.find_by_uuid(stored.uuid).await.unwrap();
        assert_eq!(second, Some(stored));
        assert_eq!(repo.find_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_entity_is_not_cached() {
        let repo = Arc::new(MockProductRepository::new());
        let cached = cached(repo.clone());
        let uuid = Uuid::new_v4();

        assert!(cached.find_by_uuid(uuid).await.unwrap().is_none());
        assert!(cached.find_by_uuid(uuid).await.unwrap().is_none());
        assert_eq!(repo.find_calls.load(Ordering::SeqCst), 2);
        assert_eq!(cached.cache_len().await, 0);
    }

    #[tokio::test]
    async fn test_save_caches_persisted_value() {
        let repo = Arc::new(MockProductRepository::new());
        let cached = cached(repo.clone());

        let saved = cached.save(&product("  Blade 98  ")).await.unwrap();
        assert_eq!(saved.name, "Blade 98");
        assert!(saved.id.is_some());

        let read = cached.find_by_uuid(saved.uuid).await.unwrap().unwrap();
        assert_eq!(read, saved);
        assert_eq!(repo.find_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_save_leaves_cache_untouched() {
        let repo = Arc::new(MockProductRepository::new());
        let cached = cached(repo.clone());
        let saved = cached.save(&product("Pure Aero")).await.unwrap();

        repo.fail_writes.store(true, Ordering::SeqCst);
        let update = Product {
            price_cents: 1,
            ..saved.clone()
        };
        let result = cached.save(&update).await;
        assert!(matches!(result, Err(RepositoryError::QueryFailed(_))));

        let read = cached.find_by_uuid(saved.uuid).await.unwrap().unwrap();
        assert_eq!(read.price_cents, saved.price_cents);
    }

    #[tokio::test]
    async fn test_delete_invalidates_cache() {
        let repo = Arc::new(MockProductRepository::new());
        let cached = cached(repo.clone());
        let saved = cached.save(&product("Ezone 100")).await.unwrap();
        let id = saved.id.clone().unwrap();

        let deleted = cached.delete(&id).await.unwrap();
        assert_eq!(deleted, Some(saved.clone()));
        assert_eq!(cached.cache_len().await, 0);

        assert!(cached.find_by_uuid(saved.uuid).await.unwrap().is_none());
        assert_eq!(repo.find_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_none() {
        let repo = Arc::new(MockProductRepository::new());
        let cached = cached(repo);
        let deleted = cached.delete(&DocumentId::from("missing")).await.unwrap();
        assert!(deleted.is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_warms_cache() {
        let repo = Arc::new(MockProductRepository::new());
        let stored = repo.insert(product("Speed MP")).await;
        let cached = cached(repo.clone());

        let found = cached.find_by_id(stored.id.as_ref().unwrap()).await.unwrap();
        assert_eq!(found, Some(stored.clone()));

        cached.find_by_uuid(stored.uuid).await.unwrap();
        assert_eq!(repo.find_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_find_all_bypasses_cache() {
        let repo = Arc::new(MockProductRepository::new());
        repo.insert(product("Radical")).await;
        let cached = cached(repo.clone());

        let all: Vec<Product> = cached.find_all().await.unwrap().try_collect().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(repo.find_all_calls.load(Ordering::SeqCst), 1);
        assert_eq!(cached.cache_len().await, 0);
    }

    #[tokio::test]
    async fn test_cache_entry_expires_after_ttl() {
        let repo = Arc::new(MockProductRepository::new());
        let stored = repo.insert(product("Gravity")).await;
        let cached = CachedRepository::new(
            repo.clone(),
            CacheConfig {
                max_entries: 50,
                ttl: Duration::from_millis(50),
            },
            RefreshJobConfig::disabled(),
        )
        .unwrap();

        cached.find_by_uuid(stored.uuid).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        cached.find_by_uuid(stored.uuid).await.unwrap();

        assert_eq!(repo.find_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_refresh_is_idempotent() {
        let repo = Arc::new(MockProductRepository::new());
        let a = repo.insert(product("Vcore 98")).await;
        let b = repo.insert(product("Percept 97")).await;
        let cached = cached(repo.clone());

        assert_eq!(cached.refresh().await.unwrap(), Some(2));
        assert_eq!(cached.refresh().await.unwrap(), Some(2));
        assert_eq!(cached.cache_len().await, 2);

        assert_eq!(cached.find_by_uuid(a.uuid).await.unwrap(), Some(a));
        assert_eq!(cached.find_by_uuid(b.uuid).await.unwrap(), Some(b));
        assert_eq!(repo.find_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let repo = Arc::new(MockProductRepository::new());
        let stored = repo.insert(product("Prestige")).await;
        let cached = cached(repo.clone());
        cached.refresh().await.unwrap();

        repo.fail_reads.store(true, Ordering::SeqCst);
        assert!(cached.refresh().await.is_err());

        assert_eq!(cached.cache_len().await, 1);
        assert_eq!(cached.find_by_uuid(stored.uuid).await.unwrap(), Some(stored));

        // The in-flight flag was released by the failed attempt
        repo.fail_reads.store(false, Ordering::SeqCst);
        assert_eq!(cached.refresh().await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_refresh_job_disabled_returns_none() {
        let repo = Arc::new(MockProductRepository::new());
        let cached = Arc::new(cached(repo));
        let job = cached.spawn_refresh_job(CancellationToken::new()).unwrap();
        assert!(job.is_none());
    }

    #[tokio::test]
    async fn test_refresh_job_rejects_zero_interval() {
        let repo = Arc::new(MockProductRepository::new());
        let cached = Arc::new(
            CachedRepository::new(
                repo,
                CacheConfig::default(),
                RefreshJobConfig::every(Duration::ZERO),
            )
            .unwrap(),
        );
        let result = cached.spawn_refresh_job(CancellationToken::new());
        assert_eq!(result.unwrap_err(), CacheError::ZeroRefreshInterval);
    }

    #[tokio::test]
    async fn test_refresh_job_reloads_and_stops_on_cancel() {
        let repo = Arc::new(MockProductRepository::new());
        let stored = repo.insert(product("Clash 100")).await;
        let cached = Arc::new(
            CachedRepository::new(
                repo.clone(),
                CacheConfig::default(),
                RefreshJobConfig::every(Duration::from_millis(30)),
            )
            .unwrap(),
        );

        let shutdown = CancellationToken::new();
        let job = cached
            .spawn_refresh_job(shutdown.clone())
            .unwrap()
            .unwrap();

        // A second job for the same repository is refused
        let second = cached.spawn_refresh_job(shutdown.clone());
        assert_eq!(
            second.unwrap_err(),
            CacheError::RefreshJobAlreadyRunning("Product")
        );

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(repo.find_all_calls.load(Ordering::SeqCst) >= 1);
        assert_eq!(cached.find_by_uuid(stored.uuid).await.unwrap(), Some(stored));
        assert_eq!(repo.find_calls.load(Ordering::SeqCst), 0);

        shutdown.cancel();
        job.await.unwrap();

        // Once stopped, a new job may be started
        let restarted = cached.spawn_refresh_job(CancellationToken::new()).unwrap();
        assert!(restarted.is_some());
    }

    /// Starts a refresh whose load stays open for 50ms after reading the store.
    fn slow_refresh(
        repo: &MockProductRepository,
        cached: &Arc<CachedRepository<MockProductRepository, Product>>,
    ) -> JoinHandle<Result<Option<usize>>> {
        repo.stream_delay_ms.store(50, Ordering::SeqCst);
        let cached = Arc::clone(cached);
        tokio::spawn(async move { cached.refresh().await })
    }

    #[tokio::test]
    async fn test_refresh_does_not_resurrect_deleted_entity() {
        let repo = Arc::new(MockProductRepository::new());
        let stored = repo.insert(product("Tour 95")).await;
        let cached = Arc::new(cached(repo.clone()));

        let refresh = slow_refresh(&repo, &cached);
        tokio::time::sleep(Duration::from_millis(10)).await;
        cached.delete(stored.id.as_ref().unwrap()).await.unwrap();

        assert_eq!(refresh.await.unwrap().unwrap(), None);
        assert_eq!(cached.find_by_uuid(stored.uuid).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_refresh_does_not_overwrite_newer_save() {
        let repo = Arc::new(MockProductRepository::new());
        let stored = repo.insert(product("Tour 95")).await;
        let cached = Arc::new(cached(repo.clone()));

        let refresh = slow_refresh(&repo, &cached);
        tokio::time::sleep(Duration::from_millis(10)).await;
        let repriced = Product {
            price_cents: 999,
            ..stored.clone()
        };
        cached.save(&repriced).await.unwrap();

        assert_eq!(refresh.await.unwrap().unwrap(), None);
        let read = cached.find_by_uuid(stored.uuid).await.unwrap().unwrap();
        assert_eq!(read.price_cents, 999);
    }

    #[tokio::test]
    async fn test_refresh_after_writes_settle_swaps() {
        let repo = Arc::new(MockProductRepository::new());
        let cached = cached(repo.clone());
        cached.save(&product("Ultra 100")).await.unwrap();
        cached.save(&product("Blade 104")).await.unwrap();

        assert_eq!(cached.refresh().await.unwrap(), Some(2));
        assert_eq!(cached.cache_len().await, 2);
    }

    #[tokio::test]
    async fn test_aborted_refresh_job_frees_its_slot() {
        let repo = Arc::new(MockProductRepository::new());
        let cached = Arc::new(
            CachedRepository::new(
                repo,
                CacheConfig::default(),
                RefreshJobConfig::every(Duration::from_secs(300)),
            )
            .unwrap(),
        );

        let job = cached
            .spawn_refresh_job(CancellationToken::new())
            .unwrap()
            .unwrap();
        job.abort();
        assert!(job.await.unwrap_err().is_cancelled());

        let restarted = cached.spawn_refresh_job(CancellationToken::new()).unwrap();
        assert!(restarted.is_some());
    }
}
