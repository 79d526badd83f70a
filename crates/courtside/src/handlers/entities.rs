//! Generic CRUD handlers shared by every shop entity.
//!
//! Each route checks the bearer token against the entity's read or write
//! role, and that its account is still active, before touching the
//! repository.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use futures_util::TryStreamExt;
use uuid::Uuid;

use courtside_auth::BearerToken;
use courtside_core::auth::Role;
use courtside_core::shop::{Machine, Order, Product, Shift, Task, User, Validate};
use courtside_core::storage::{Entity, Repository, RepositoryError};

use crate::handlers::AppError;
use crate::state::{AppState, Cached};

/// An entity exposed over the API.
pub trait Resource: Entity + Validate {
    /// Path segment under `/api`.
    const COLLECTION: &'static str;
    /// Minimum role for `GET`.
    const READ_ROLE: Role;
    /// Minimum role for `POST` and `DELETE`.
    const WRITE_ROLE: Role;
    /// Whether `POST /{collection}` upserts are routed.
    const UPSERT: bool = true;

    fn repository(state: &AppState) -> &Arc<Cached<Self>>;
}

macro_rules! impl_resource {
    ($ty:ty, $collection:literal, $field:ident, read = $read:ident, write = $write:ident) => {
        impl_resource!($ty, $collection, $field, read = $read, write = $write, upsert = true);
    };
    ($ty:ty, $collection:literal, $field:ident, read = $read:ident, write = $write:ident, upsert = $upsert:literal) => {
        impl Resource for $ty {
            const COLLECTION: &'static str = $collection;
            const READ_ROLE: Role = Role::$read;
            const WRITE_ROLE: Role = Role::$write;
            const UPSERT: bool = $upsert;

            fn repository(state: &AppState) -> &Arc<Cached<Self>> {
                &state.$field
            }
        }
    };
}

impl_resource!(Product, "products", products, read = Client, write = Worker);
impl_resource!(Machine, "machines", machines, read = Worker, write = Admin);
impl_resource!(Order, "orders", orders, read = Client, write = Worker);
impl_resource!(Task, "tasks", tasks, read = Worker, write = Worker);
impl_resource!(Shift, "shifts", shifts, read = Worker, write = Admin);
// Users are created through registration and changed through deactivation
impl_resource!(User, "users", users, read = Admin, write = Admin, upsert = false);

fn not_found<T: Resource>(uuid: Uuid) -> RepositoryError {
    RepositoryError::NotFound {
        entity_type: T::KIND,
        id: uuid.to_string(),
    }
}

/// Routes for `T`: list, get, delete and, unless disabled, upsert.
pub fn entity_routes<T: Resource>() -> Router<AppState> {
    let mut collection = get(list::<T>);
    if T::UPSERT {
        collection = collection.post(upsert::<T>);
    }

    Router::new()
        .route(&format!("/{}", T::COLLECTION), collection)
        .route(
            &format!("/{}/{{uuid}}", T::COLLECTION),
            get(fetch::<T>).delete(remove::<T>),
        )
}

/// GET /api/{collection} - List every entity of the kind.
pub async fn list<T: Resource>(
    State(state): State<AppState>,
    token: BearerToken,
) -> Result<Json<Vec<T>>, AppError> {
    state.auth.check(token.as_deref(), T::READ_ROLE).await?;

    let entities: Vec<T> = T::repository(&state)
        .find_all()
        .await?
        .try_collect()
        .await?;

    Ok(Json(entities))
}

/// GET /api/{collection}/{uuid} - Get one entity, served from the cache
/// when possible.
pub async fn fetch<T: Resource>(
    State(state): State<AppState>,
    token: BearerToken,
    Path(uuid): Path<Uuid>,
) -> Result<Json<T>, AppError> {
    state.auth.check(token.as_deref(), T::READ_ROLE).await?;

    let entity = T::repository(&state)
        .find_by_uuid(uuid)
        .await?
        .ok_or_else(|| not_found::<T>(uuid))?;

    Ok(Json(entity))
}

/// POST /api/{collection} - Insert or update by uuid.
///
/// An entity whose uuid already exists keeps its storage id. Returns 201 on
/// insert and 200 on update.
pub async fn upsert<T: Resource>(
    State(state): State<AppState>,
    token: BearerToken,
    Json(mut entity): Json<T>,
) -> Result<(StatusCode, Json<T>), AppError> {
    let claims = state.auth.check(token.as_deref(), T::WRITE_ROLE).await?;
    entity.validate()?;

    let repository = T::repository(&state);
    let existing = repository.find_by_uuid(entity.uuid()).await?;
    let status = match existing.as_ref().and_then(|e| e.id()) {
        Some(id) => {
            entity.set_id(id.clone());
            StatusCode::OK
        }
        None => StatusCode::CREATED,
    };

    let saved = repository.save(&entity).await?;
    tracing::debug!(
        kind = T::KIND,
        uuid = %saved.uuid(),
        by = %claims.id,
        "Entity upserted"
    );

    Ok((status, Json(saved)))
}

/// DELETE /api/{collection}/{uuid} - Delete and return the entity.
pub async fn remove<T: Resource>(
    State(state): State<AppState>,
    token: BearerToken,
    Path(uuid): Path<Uuid>,
) -> Result<Json<T>, AppError> {
    let claims = state.auth.check(token.as_deref(), T::WRITE_ROLE).await?;

    let repository = T::repository(&state);
    let id = repository
        .find_by_uuid(uuid)
        .await?
        .and_then(|entity| entity.id().cloned())
        .ok_or_else(|| not_found::<T>(uuid))?;

    let deleted = repository
        .delete(&id)
        .await?
        .ok_or_else(|| not_found::<T>(uuid))?;

    tracing::info!(kind = T::KIND, %uuid, by = %claims.id, "Entity deleted");
    Ok(Json(deleted))
}
