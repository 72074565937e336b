//! 헬스 체크 endpoint.
//!
//! 서버 상태 확인을 위한 엔드포인트를 제공합니다.
//! 로드밸런서나 워크플로 도구의 연결 확인에 사용됩니다.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

/// 서비스 배너 (`GET /`).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ServiceBanner {
    pub message: String,
    pub status: String,
    pub version: String,
}

/// 헬스 체크 응답 구조체.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// 전체 서비스 상태 ("healthy")
    pub status: String,

    /// API 버전
    pub version: String,

    /// 서버 업타임(초)
    pub uptime_secs: i64,

    /// 캐시 엔트리 수
    pub cache_size: usize,

    /// 현재 시간 (ISO 8601)
    pub timestamp: String,
}

/// 연결 확인 응답 (`GET /test`).
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LivenessResponse {
    pub status: String,
    pub message: String,
}

/// 서비스 배너.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "서비스 정보", body = ServiceBanner)
    ),
    tag = "health"
)]
pub async fn root(State(state): State<Arc<AppState>>) -> Json<ServiceBanner> {
    Json(ServiceBanner {
        message: "Indian Stock Market API".to_string(),
        status: "running".to_string(),
        version: state.version.clone(),
    })
}

/// 헬스 체크.
///
/// 업스트림을 호출하지 않고 프로세스 상태와 캐시 크기만 보고합니다.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "서버 정상", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
        cache_size: state.cache.len().await,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// 연결 확인 (liveness probe용).
#[utoipa::path(
    get,
    path = "/test",
    responses(
        (status = 200, description = "응답 가능", body = LivenessResponse)
    ),
    tag = "health"
)]
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse {
        status: "ok".to_string(),
        message: "API is reachable".to_string(),
    })
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/test", get(liveness))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::get_json;
    use crate::state::create_test_state;
    use axum::http::StatusCode;

    fn app() -> Router {
        health_router().with_state(Arc::new(create_test_state("http://127.0.0.1:1")))
    }

    #[tokio::test]
    async fn test_health_returns_json() {
        let (status, json) = get_json(app(), "/health").await;
        assert_eq!(status, StatusCode::OK);

        let health: HealthResponse = serde_json::from_value(json).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.cache_size, 0);
        assert!(!health.version.is_empty());
    }

    #[tokio::test]
    async fn test_liveness_and_banner() {
        let (status, json) = get_json(app(), "/test").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");

        let (status, json) = get_json(app(), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "running");
    }
}
