// GET handlers: version, snapshot, and the per-domain detail lists

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::time::Duration;

use super::AppState;
use crate::error::CollectError;
use crate::models::{GpuDescriptor, InterfaceCounters, PartitionUsage, ProcessEntry, Snapshot};
use crate::process_ranker;

/// Request-level failure: a fundamental counter could not be read. Rendered as 500 + `{"error": ...}`.
#[derive(Debug)]
pub struct ApiError(CollectError);

impl From<CollectError> for ApiError {
    fn from(e: CollectError) -> Self {
        Self(e)
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self(CollectError::Join(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.0, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

/// GET /version: service name and version, baked in from Cargo.toml at build time.
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /metrics/: full snapshot; blocks a pool thread for the CPU window.
pub(super) async fn snapshot_handler(
    State(state): State<AppState>,
) -> Result<Json<Snapshot>, ApiError> {
    Ok(Json(state.assembler.assemble().await?))
}

/// GET /metrics/processes/
pub(super) async fn processes_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProcessEntry>>, ApiError> {
    let window = Duration::from_millis(state.config.sampling.process_sample_window_ms);
    let ranked = process_ranker::top_processes(
        state.source.clone(),
        window,
        state.config.sampling.top_processes,
    )
    .await?;
    Ok(Json(ranked))
}

/// GET /metrics/gpu/: empty list when there is no GPU or driver.
pub(super) async fn gpu_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<GpuDescriptor>>, ApiError> {
    let source = state.source.clone();
    let gpus = tokio::task::spawn_blocking(move || source.read_gpus()).await?;
    Ok(Json(gpus))
}

/// GET /metrics/disk/
pub(super) async fn disk_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<PartitionUsage>>, ApiError> {
    let source = state.source.clone();
    let partitions = tokio::task::spawn_blocking(move || source.read_partitions()).await??;
    Ok(Json(
        partitions.into_iter().map(PartitionUsage::from).collect(),
    ))
}

/// GET /metrics/network/
pub(super) async fn network_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<InterfaceCounters>>, ApiError> {
    let source = state.source.clone();
    let interfaces = tokio::task::spawn_blocking(move || source.read_interfaces()).await??;
    Ok(Json(
        interfaces.into_iter().map(InterfaceCounters::from).collect(),
    ))
}
