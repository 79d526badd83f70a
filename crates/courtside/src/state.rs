//! Application state with cached repositories.
//!
//! Every entity kind gets its own in-memory store wrapped in a
//! [`CachedRepository`]. The state is built once at startup and shared with
//! all handlers by cloning the `Arc`s.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use courtside_auth::{hash_password, AuthState};
use courtside_core::auth::Role;
use courtside_core::cache::CacheError;
use courtside_core::shop::{Machine, Order, Product, Shift, Task, User};
use courtside_core::storage::{Entity, Repository, UserRepositoryExt};

use crate::config::{Config, SeedAdmin};
use crate::storage::{CachedRepository, InMemoryStore};

/// Cached repository over the in-memory store for one entity kind.
pub type Cached<T> = CachedRepository<InMemoryStore<T>, T>;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub products: Arc<Cached<Product>>,
    pub machines: Arc<Cached<Machine>>,
    pub orders: Arc<Cached<Order>>,
    pub tasks: Arc<Cached<Task>>,
    pub shifts: Arc<Cached<Shift>>,
    pub users: Arc<Cached<User>>,
    /// Token service and gate; its user repository is `users`.
    pub auth: AuthState,
}

fn cached<T: Entity>(config: &Config) -> Result<Arc<Cached<T>>, CacheError> {
    let store = Arc::new(InMemoryStore::new());
    Ok(Arc::new(CachedRepository::new(
        store,
        config.cache,
        config.refresh,
    )?))
}

impl AppState {
    /// Creates the repositories and their caches.
    pub fn new(config: &Config) -> Result<Self, CacheError> {
        let users = cached::<User>(config)?;
        let auth = AuthState::new(users.clone(), &config.auth);

        Ok(Self {
            products: cached(config)?,
            machines: cached(config)?,
            orders: cached(config)?,
            tasks: cached(config)?,
            shifts: cached(config)?,
            users,
            auth,
        })
    }

    /// Starts the refresh job of every repository.
    ///
    /// Returns no handles when refresh is disabled.
    pub fn spawn_refresh_jobs(
        &self,
        shutdown: &CancellationToken,
    ) -> Result<Vec<JoinHandle<()>>, CacheError> {
        let jobs = [
            self.products.spawn_refresh_job(shutdown.child_token())?,
            self.machines.spawn_refresh_job(shutdown.child_token())?,
            self.orders.spawn_refresh_job(shutdown.child_token())?,
            self.tasks.spawn_refresh_job(shutdown.child_token())?,
            self.shifts.spawn_refresh_job(shutdown.child_token())?,
            self.users.spawn_refresh_job(shutdown.child_token())?,
        ];

        Ok(jobs.into_iter().flatten().collect())
    }

    /// Current number of cached entries per entity kind.
    pub async fn cache_sizes(&self) -> BTreeMap<&'static str, usize> {
        BTreeMap::from([
            (Product::KIND, self.products.cache_len().await),
            (Machine::KIND, self.machines.cache_len().await),
            (Order::KIND, self.orders.cache_len().await),
            (Task::KIND, self.tasks.cache_len().await),
            (Shift::KIND, self.shifts.cache_len().await),
            (User::KIND, self.users.cache_len().await),
        ])
    }

    /// Creates the bootstrap administrator unless the email is already taken.
    ///
    /// Returns whether a user was created.
    pub async fn seed_admin(&self, seed: &SeedAdmin) -> anyhow::Result<bool> {
        if self.users.find_by_email(&seed.email).await?.is_some() {
            tracing::debug!(email = %seed.email, "Seed admin already present");
            return Ok(false);
        }

        let password_hash = hash_password(&seed.password)?;
        let admin = User::new("Admin", "Courtside", &seed.email, password_hash, Role::Admin);
        let saved = self.users.save(&admin).await?;

        tracing::info!(user_uuid = %saved.uuid, email = %saved.email, "Seeded admin user");
        Ok(true)
    }
}

impl AsRef<AuthState> for AppState {
    fn as_ref(&self) -> &AuthState {
        &self.auth
    }
}

// ============================================================================
// Test support - provides Default implementation for unit tests
// ============================================================================
