//! labeler-server library - REST API for image labeling
//!
//! Serves the image catalog and image bytes from a data directory and
//! persists absolute labels and pairwise comparisons in SQLite.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod api;
pub mod catalog;
pub mod db;
pub mod net;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Label database connection pool
    pub db: SqlitePool,
    /// Directory scanned for images
    pub data_dir: Arc<PathBuf>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, data_dir: PathBuf) -> Self {
        Self {
            db,
            data_dir: Arc::new(data_dir),
        }
    }
}

/// Build application router
///
/// Static segments (`export`) are registered next to the wildcard label
/// routes; the router prefers the static match.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get};

    let api = Router::new()
        .route("/api/images", get(api::list_images))
        .route("/api/images/*path", get(api::serve_image))
        .route("/api/labels", get(api::list_labels).post(api::save_label))
        .route("/api/labels/export", get(api::export_labels))
        .route(
            "/api/labels/*path",
            get(api::get_label).delete(api::delete_label),
        )
        .route(
            "/api/pairwise",
            get(api::list_comparisons).post(api::create_comparison),
        )
        .route("/api/pairwise/export", get(api::export_comparisons))
        .route("/api/pairwise/:id", delete(api::delete_comparison));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
