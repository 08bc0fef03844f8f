use axum::{routing::get, Router};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{handlers, repository::GridRepository};

/// Create the main application router with all API endpoints
pub fn create_router(repo: Arc<dyn GridRepository>, static_dir: Option<PathBuf>) -> Router {
    // Create CORS layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build the router
    let router = Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Grid data
        .route("/api/data", get(handlers::get_data))
        // Add shared state
        .with_state(repo);

    // Viewer assets
    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    // Add middleware
    router.layer(cors).layer(TraceLayer::new_for_http())
}
