use axum::{
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::config::{ensure_db_dir, Settings};
use crate::github::GitHubClient;
use crate::storage::RepoStore;

pub mod routes;

/// Server state
pub struct AppState {
    pub store: RepoStore,
    pub github: GitHubClient,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/search", get(routes::search))
        .route("/repos", get(routes::list_repos))
        .route("/health", get(routes::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(settings: Settings) -> anyhow::Result<()> {
    let store = RepoStore::new();
    let connected = ensure_db_dir(&settings.database)
        .and_then(|_| Ok(store.connect(&settings.database)?));
    match connected {
        Ok(()) => tracing::info!("Database connected at {:?}", settings.database),
        // Keep serving: /health reports the state and /search still proxies
        Err(e) => tracing::error!("Database connection failed: {}", e),
    }

    let github = GitHubClient::new(settings.api_url.clone(), settings.token.clone())?;
    if !github.has_token() {
        tracing::info!("GITHUB_TOKEN not set, using unauthenticated rate limits");
    }

    let state = Arc::new(AppState { store, github });
    let app = router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!("Starting server on {}", addr);
    println!("🌍 Server running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.store.close()?;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
