//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for the portal's form-heavy CRUD screens
//! - Bearer-token auth middleware (tokens issued by the identity provider)
//! - Request/response types (dollar strings at the edge, cents inside)

pub mod middleware;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use bursar_shared::{NotificationService, TokenVerifier};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// Verifier for provider-issued tokens.
    pub verifier: Arc<TokenVerifier>,
    /// Email service for status-change notifications.
    pub notifier: Arc<NotificationService>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
