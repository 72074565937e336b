//! HTTP 요청 metrics middleware.

use axum::{extract::Request, middleware::Next, response::Response};
use std::time::Instant;
use tracing::warn;

use crate::metrics::{
    normalize_path, record_http_duration, record_http_request, record_http_response,
};

/// HTTP 메트릭을 수집하는 미들웨어 레이어.
///
/// 각 요청에 대해 다음 메트릭을 기록합니다:
/// - `http_requests_total`: 총 요청 수 (method, path 라벨)
/// - `http_responses_total`: 총 응답 수 (method, path, status 라벨)
/// - `http_request_duration_seconds`: 요청 처리 시간 히스토그램
///
/// 심볼 경로는 `{symbol}`로 정규화되어 라벨 수가 심볼 수에 비례하지 않습니다.
/// 업스트림 장애(5xx)는 경고 로그로도 남깁니다.
pub async fn metrics_layer(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let raw_path = request.uri().path().to_string();
    let path = normalize_path(&raw_path);

    record_http_request(&method, &path);

    let response = next.run(request).await;

    let status = response.status();
    let duration = start.elapsed().as_secs_f64();
    record_http_response(&method, &path, status.as_u16());
    record_http_duration(&method, &path, duration);

    if status.is_server_error() {
        warn!(
            method = %method,
            path = %raw_path,
            status = status.as_u16(),
            duration_ms = (duration * 1000.0) as u64,
            "Request failed"
        );
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Method, Request, StatusCode},
        middleware,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn ok_handler() -> &'static str {
        "OK"
    }

    async fn failing_handler() -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    fn app() -> Router {
        Router::new()
            .route("/price/{symbol}", get(ok_handler))
            .route("/batch/price", get(failing_handler))
            .layer(middleware::from_fn(metrics_layer))
    }

    async fn status_of(uri: &str) -> StatusCode {
        let request = Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_metrics_middleware_passes_through() {
        assert_eq!(status_of("/price/RELIANCE.NS").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_metrics_middleware_keeps_error_status() {
        assert_eq!(status_of("/batch/price").await, StatusCode::BAD_GATEWAY);
        assert_eq!(status_of("/unknown").await, StatusCode::NOT_FOUND);
    }
}
