//! Prometheus 메트릭 설정 및 유틸리티.
//!
//! HTTP 요청 메트릭과 캐시/업스트림 게이지를 수집하고
//! `/metrics/prometheus` 엔드포인트로 노출합니다.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use quote_data::{CacheStats, UpstreamStats};

/// 심볼을 경로 파라미터로 받는 라우트 접두사.
const SYMBOL_ROUTES: &[&str] = &["stock", "price", "summary"];

/// Prometheus 메트릭 레코더를 설정하고 핸들을 반환합니다.
///
/// 레코더가 이미 설치되어 있으면 에러를 반환합니다.
pub fn setup_metrics_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new()
        // HTTP 요청 지속 시간 히스토그램 버킷 설정
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0],
        )?
        .install_recorder()
}

// ============================================================================
// HTTP 메트릭 헬퍼 함수
// ============================================================================

/// HTTP 요청 카운터 증가.
pub fn record_http_request(method: &str, path: &str) {
    counter!("http_requests_total", "method" => method.to_string(), "path" => path.to_string())
        .increment(1);
}

/// HTTP 응답 카운터 증가.
pub fn record_http_response(method: &str, path: &str, status: u16) {
    counter!(
        "http_responses_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// HTTP 요청 지속 시간 기록.
pub fn record_http_duration(method: &str, path: &str, duration_secs: f64) {
    histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(duration_secs);
}

// ============================================================================
// 캐시/업스트림 게이지
// ============================================================================

/// 캐시 및 업스트림 통계를 게이지로 기록합니다.
///
/// 스크레이프 직전에 호출되어 현재 값을 반영합니다.
pub fn record_quote_stats(cache: &CacheStats, upstream: &UpstreamStats) {
    gauge!("quote_cache_entries", "kind" => "price").set(cache.price_entries as f64);
    gauge!("quote_cache_entries", "kind" => "fundamentals")
        .set(cache.fundamentals_entries as f64);
    gauge!("quote_cache_hits").set(cache.hits as f64);
    gauge!("quote_cache_misses").set(cache.misses as f64);
    gauge!("quote_cache_evictions").set(cache.evictions as f64);
    gauge!("quote_cache_hit_ratio").set(cache.hit_ratio);
    gauge!("quote_upstream_fetches").set(upstream.fetches as f64);
    gauge!("quote_upstream_failures").set(upstream.failures as f64);
    gauge!("quote_upstream_timeouts").set(upstream.timeouts as f64);
}

// ============================================================================
// 경로 정규화 유틸리티
// ============================================================================

/// 경로에서 심볼 파라미터를 정규화합니다.
///
/// 예: `/price/RELIANCE.NS` → `/price/{symbol}`
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').collect();
    segments
        .iter()
        .enumerate()
        .map(|(i, segment)| {
            let after_symbol_route = i == 2 && SYMBOL_ROUTES.contains(&segments[1]);
            if after_symbol_route && !segment.is_empty() {
                "{symbol}"
            } else {
                *segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}
