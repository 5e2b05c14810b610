//! Application router setup.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::app::handlers;
use crate::config::WatermarkConfig;
use crate::render::Watermarker;
use crate::storage::ObjectStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ObjectStore>,
    pub watermarker: Arc<dyn Watermarker>,
    pub watermark: WatermarkConfig,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        watermarker: Arc<dyn Watermarker>,
        watermark: WatermarkConfig,
    ) -> Self {
        Self {
            store,
            watermarker,
            watermark,
        }
    }
}

/// Build the Axum router with all routes and middleware layers.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/files/{*key}",
            get(handlers::get_file)
                .put(handlers::put_file)
                .delete(handlers::delete_file),
        )
        .route("/copies", post(handlers::create_copy))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
