use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;

use crate::{repository::GridRepository, Result};

pub type RepositoryState = Arc<dyn GridRepository>;

/// GET /api/data
/// Returns the aggregated holdings grid, re-read from disk
pub async fn get_data(State(repo): State<RepositoryState>) -> Result<impl IntoResponse> {
    let view = repo.fetch_portfolio().await?;
    Ok(Json(view))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "portfolio-grid-api"
    }))
}
