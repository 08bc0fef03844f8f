use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{repository::GridRepository, router::create_router};

/// Run the API server
pub async fn run_server(
    repo: Arc<dyn GridRepository>,
    host: &str,
    port: u16,
    static_dir: Option<PathBuf>,
) -> anyhow::Result<()> {
    logger::init("backend_api=debug,tower_http=debug");

    if let Some(dir) = &static_dir {
        tracing::info!("Serving viewer assets from {}", dir.display());
    }
    let app = create_router(repo, static_dir);

    let addr = format!("{}:{}", host, port).parse::<SocketAddr>()?;
    tracing::info!("Starting server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
