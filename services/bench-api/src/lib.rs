//! Benchmark API service.
//!
//! Proxies `tools/list` and `tools/call` to MCP servers chosen by the
//! caller, runs timed experiments, persists them, and serves the browser UI.

pub mod error;
pub mod handlers;
pub mod state;

use std::path::Path;
use std::sync::Arc;

use axum::{
    extract::Extension,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeDir, trace::TraceLayer,
};

pub use error::ApiError;
pub use state::ServerState;

/// Build the service router.
///
/// When `static_dir` is given, any path not matched by an API route is
/// served from it, with `/` resolving to `index.html`.
pub fn create_router(state: Arc<ServerState>, static_dir: Option<&Path>) -> Router {
    let mut router = Router::new()
        .route("/api/tools", post(handlers::tools_handler))
        .route("/api/run", post(handlers::run_handler))
        .route("/api/experiments", get(handlers::list_experiments_handler))
        .route(
            "/api/experiments/:id",
            get(handlers::get_experiment_handler).delete(handlers::delete_experiment_handler),
        )
        .route("/health", get(handlers::health_handler))
        .route("/metrics", get(handlers::metrics_handler));

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}
