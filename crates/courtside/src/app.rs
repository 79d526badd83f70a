use std::time::Duration;

use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use courtside_auth::auth_routes;
use courtside_core::shop::{Machine, Order, Product, Shift, Task, User};

use crate::{
    handlers::{
        entities::entity_routes,
        health::{healthz, livez},
        users::deactivate_user,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    // API routes with CORS
    let api_routes = Router::new()
        .merge(entity_routes::<Product>())
        .merge(entity_routes::<Machine>())
        .merge(entity_routes::<Order>())
        .merge(entity_routes::<Task>())
        .merge(entity_routes::<Shift>())
        .merge(entity_routes::<User>())
        .route("/users/{uuid}/deactivate", post(deactivate_user))
        .merge(auth_routes().with_state(state.auth.clone()))
        .layer(cors);

    // Main application router
    Router::new()
        .route("/livez", get(livez))
        .route("/healthz", get(healthz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(10),
        ))
        .with_state(state)
}
