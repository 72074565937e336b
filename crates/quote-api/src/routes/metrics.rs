//! 캐시/업스트림 통계 endpoint.
//!
//! `GET /metrics`는 JSON 통계를, `GET /metrics/prometheus`(main에서 마운트)는
//! Prometheus 텍스트 형식의 HTTP 메트릭을 제공합니다.

use axum::{extract::State, routing::get, Json, Router};
use quote_data::{CacheStats, UpstreamStats};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

/// 통계 응답.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[schema(value_type = Object)]
    pub cache: CacheStats,
    #[schema(value_type = Object)]
    pub upstream: UpstreamStats,
    pub uptime_secs: i64,
    pub timestamp: i64,
}

/// 캐시 및 업스트림 통계 조회.
#[utoipa::path(
    get,
    path = "/metrics",
    responses(
        (status = 200, description = "캐시 크기, 적중률, 업스트림 호출 수", body = StatsResponse)
    ),
    tag = "monitoring"
)]
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    Json(StatsResponse {
        cache: state.cache.stats().await,
        upstream: state.manager.upstream_stats(),
        uptime_secs: state.uptime_secs(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}

pub fn stats_router() -> Router<Arc<AppState>> {
    Router::new().route("/metrics", get(get_stats))
}
