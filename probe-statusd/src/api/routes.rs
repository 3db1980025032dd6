use std::sync::Arc;
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use shared::types::Snapshot;
use crate::cache::hash;
use crate::config::{CacheConfig, ProbeConfig};
use crate::presenter::{self, Format};
use crate::snapshot::SnapshotBuilder;

#[derive(Clone)]
pub struct AppState {
    pub builder: Arc<SnapshotBuilder>,
    pub probe: Arc<ProbeConfig>,
    pub cache: Arc<CacheConfig>,
}

#[derive(Serialize)]
pub struct ConfigResponse {
    pub destinations_path: String,
    pub timeout_ms: u64,
    pub concurrency: usize,
    pub cache_ttl_ms: u64,
    pub persisted: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_status_page))
        .route("/v1/status", get(get_status))
        .route("/v1/status/hash", get(get_hash))
        .route("/v1/config", get(get_config))
        .with_state(state)
}

async fn get_status_page(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> impl IntoResponse {
    // First `format` wins; repeated or unknown keys never reject the request
    let format = Format::from_param(
        params
            .iter()
            .find(|(key, _)| key == "format")
            .map(|(_, value)| value.as_str()),
    );
    let snapshot = state.builder.get_snapshot().await;

    (
        [(header::CONTENT_TYPE, format.content_type())],
        presenter::render(&snapshot, format),
    )
}

async fn get_status(State(state): State<AppState>) -> Json<Snapshot> {
    let snapshot = state.builder.get_snapshot().await;
    Json(Snapshot::clone(&snapshot))
}

async fn get_hash(State(state): State<AppState>) -> String {
    let snapshot = state.builder.get_snapshot().await;
    hash::compute_hash(&snapshot)
}

async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        destinations_path: state.builder.registry().path().display().to_string(),
        timeout_ms: state.probe.timeout_ms,
        concurrency: state.probe.concurrency,
        cache_ttl_ms: state.cache.ttl_ms,
        persisted: state.cache.db_path.is_some(),
    })
}
