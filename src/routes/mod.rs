// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::assembler::SnapshotAssembler;
use crate::config::AppConfig;
use crate::sysinfo_repo::CounterSource;

pub use http::ApiError;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) assembler: SnapshotAssembler,
    pub(crate) source: Arc<dyn CounterSource>,
    pub(crate) config: AppConfig,
}

pub fn app(
    assembler: SnapshotAssembler,
    source: Arc<dyn CounterSource>,
    config: AppConfig,
) -> Router {
    let state = AppState {
        assembler,
        source,
        config,
    };
    Router::new()
        .route("/", get(|| async { "sysmetrics is running" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/metrics/", get(http::snapshot_handler)) // GET /metrics/
        .route("/metrics", get(http::snapshot_handler))
        .route("/metrics/processes/", get(http::processes_handler)) // GET /metrics/processes/
        .route("/metrics/processes", get(http::processes_handler))
        .route("/metrics/gpu/", get(http::gpu_handler)) // GET /metrics/gpu/
        .route("/metrics/gpu", get(http::gpu_handler))
        .route("/metrics/disk/", get(http::disk_handler)) // GET /metrics/disk/
        .route("/metrics/disk", get(http::disk_handler))
        .route("/metrics/network/", get(http::network_handler)) // GET /metrics/network/
        .route("/metrics/network", get(http::network_handler))
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}
