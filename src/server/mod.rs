//! HTTP server wiring: shared state, router, and graceful shutdown

pub mod handlers;

use crate::catalog::TaskCatalogScanner;
use crate::config::{CourseConfigStore, Settings};
use crate::render::DocumentSynthesizer;
use crate::workspace::PathResolver;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;

/// State shared by every handler.
///
/// Holds no file content: every request re-reads from disk, so the overlay
/// and source tree are always observed fresh.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub resolver: PathResolver,
    pub synthesizer: DocumentSynthesizer,
    pub scanner: Arc<TaskCatalogScanner>,
    pub course: Arc<CourseConfigStore>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let resolver = PathResolver::new(&settings);
        let synthesizer = DocumentSynthesizer::new(settings.preview.clone());
        let scanner = Arc::new(TaskCatalogScanner::new(&settings.catalog.task_markers));
        let course_root = settings
            .workspace_root
            .clone()
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        Self {
            settings: Arc::new(settings),
            resolver,
            synthesizer,
            scanner,
            course: Arc::new(CourseConfigStore::new(&course_root)),
        }
    }
}

/// Build the application router
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/api/preview", get(handlers::preview))
        .route(
            "/api/playground",
            get(handlers::playground_get)
                .put(handlers::playground_save)
                .post(handlers::playground_copy)
                .delete(handlers::playground_reset),
        )
        .route("/api/tasks", get(handlers::tasks))
        .route("/api/task-files", get(handlers::task_files))
        .route("/api/solution", get(handlers::solution))
        .route("/api/readme", get(handlers::readme))
        .route("/api/editor", axum::routing::post(handlers::editor_open))
        .route(
            "/api/config",
            get(handlers::course_config).post(handlers::course_config_reload),
        )
        .route("/health", get(handlers::health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn serve(settings: Settings, bind_override: Option<String>) -> anyhow::Result<()> {
    let bind = bind_override.unwrap_or_else(|| settings.server.bind.clone());
    let state = AppState::new(settings);

    // Make sure the overlay root exists before the first request
    state.resolver.playground().ensure_root().await?;

    let router = app(state);

    let ct = CancellationToken::new();
    let shutdown_ct = ct.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received shutdown signal");
            shutdown_ct.cancel();
        }
    });

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(addr = %bind, "exercise playground server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { ct.cancelled().await })
        .await?;

    tracing::info!("server shut down gracefully");
    Ok(())
}
