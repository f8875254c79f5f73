//! claimdesk - insurance claims tracking service
//!
//! Stores claim records in SQLite, serves a JSON browse/search/filter API
//! with notes, review flagging, per-claim CSV reports, and a staff
//! dashboard, and bulk-imports claims from pipe-delimited files (HTTP
//! upload or the `import-claims` batch binary).

use axum::{middleware, Router};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod import;
pub mod money;

pub use error::{Error, Result};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    // Staff-only routes
    let staff = Router::new()
        .route("/admin-dashboard", get(api::admin_dashboard))
        .route("/upload-csv", get(api::upload_form).post(api::upload_csv))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_staff,
        ));

    // Routes requiring any authenticated user
    let authenticated = Router::new()
        .route("/:id/add-note", post(api::add_note))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            api::require_user,
        ));

    // Public routes
    let public = Router::new()
        .route("/", get(api::claim_list))
        .route("/search", get(api::claim_search))
        .route("/:id", get(api::claim_detail))
        .route("/:id/flag", post(api::flag_for_review))
        .route("/:id/report", get(api::claim_report))
        .merge(api::health_routes());

    Router::new()
        .merge(staff)
        .merge(authenticated)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
