//! NSE 시세 API 서버.
//!
//! Axum 기반 REST API 서버를 시작합니다.
//! 단일/배치 시세, 워치리스트, 헬스 체크, 메트릭 엔드포인트를 제공합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, middleware, routing::get, Router};
use metrics_exporter_prometheus::PrometheusHandle;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use quote_api::metrics::{record_quote_stats, setup_metrics_recorder};
use quote_api::middleware::metrics_layer;
use quote_api::openapi::swagger_ui_router;
use quote_api::routes::create_api_router;
use quote_api::state::AppState;
use quote_core::{init_logging, AppConfig, LogConfig};

/// CORS 레이어 생성.
///
/// 기본적으로 모든 origin을 허용합니다 (워크플로 도구, 브라우저 대시보드).
///
/// - `CORS_ORIGINS`: 쉼표로 구분된 허용 origin 목록 (설정 시 해당 origin만 허용)
fn cors_layer() -> CorsLayer {
    let allow_origin = match std::env::var("CORS_ORIGINS") {
        Ok(origins) if !origins.is_empty() => {
            let origins: Vec<_> = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();

            if origins.is_empty() {
                warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
                AllowOrigin::any()
            } else {
                info!("CORS configured with {} allowed origins", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => AllowOrigin::any(),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        // preflight 요청 캐시 시간
        .max_age(Duration::from_secs(3600))
}

/// /metrics/prometheus 엔드포인트 핸들러.
///
/// 렌더링 직전에 캐시/업스트림 게이지를 갱신합니다.
async fn prometheus_handler(
    State((handle, state)): State<(PrometheusHandle, Arc<AppState>)>,
) -> String {
    let cache = state.cache.stats().await;
    record_quote_stats(&cache, &state.manager.upstream_stats());
    handle.render()
}

/// 전체 라우터 생성.
fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    request_timeout: Duration,
) -> Router {
    // Prometheus 라우터 (별도 상태)
    let prometheus_router = Router::new()
        .route("/metrics/prometheus", get(prometheus_handler))
        .with_state((metrics_handle, state.clone()));

    Router::new()
        .merge(prometheus_router)
        .merge(create_api_router().with_state(state))
        // OpenAPI 문서 및 Swagger UI
        .merge(swagger_ui_router())
        // 메트릭 미들웨어 (모든 요청에 적용)
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(cors_layer())
}

/// OpenAPI 스펙 내보내기 처리.
///
/// `--export-openapi` 플래그 또는 `EXPORT_OPENAPI` 환경변수가 설정된 경우
/// OpenAPI JSON 스펙을 stdout으로 출력하고 종료합니다.
fn handle_export_openapi() -> Result<(), Box<dyn std::error::Error>> {
    use quote_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    let export_flag = std::env::args().any(|arg| arg == "--export-openapi");
    let export_env = std::env::var("EXPORT_OPENAPI")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    if export_flag || export_env {
        let json = serde_json::to_string_pretty(&ApiDoc::openapi())?;
        println!("{}", json);
        std::process::exit(0);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env 파일 로드 (있는 경우)
    let _ = dotenvy::dotenv();

    // OpenAPI 내보내기 처리 (서버 시작 전)
    handle_export_openapi()?;

    // 설정 로드: 기본값 → config/default.toml → QUOTE__* 환경변수
    let config = AppConfig::load_default()?;

    init_logging(LogConfig::from_settings(&config.logging)?)?;
    info!("Starting Quote API server...");

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let addr: SocketAddr = config.bind_address().parse().map_err(|e| {
        error!(
            host = %config.server.host,
            port = config.server.port,
            error = %e,
            "소켓 주소 설정이 유효하지 않습니다. QUOTE__SERVER__HOST, PORT 환경변수를 확인하세요."
        );
        e
    })?;

    let request_timeout = Duration::from_secs(config.server.request_timeout_secs);
    let sweep_interval = config.cache.sweep_interval();

    info!(
        price_ttl_secs = config.cache.price_ttl_secs,
        fundamentals_ttl_secs = config.cache.fundamentals_ttl_secs,
        max_entries = config.cache.max_entries,
        batch_concurrency = config.fetch.batch_concurrency,
        upstream_timeout_secs = config.fetch.upstream_timeout_secs,
        "Quote cache configured"
    );

    let state = Arc::new(AppState::new(config)?);
    info!(version = %state.version, "Application state initialized");

    // 전역 종료 토큰 (graceful shutdown용, 백그라운드 태스크에서 사용)
    let shutdown_token = CancellationToken::new();

    // 만료 엔트리 정리 작업 시작
    let sweeper = state
        .cache
        .clone()
        .spawn_sweeper(sweep_interval, shutdown_token.clone());

    let app = create_router(state, metrics_handle, request_timeout);

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);
    info!("Metrics available at http://{}/metrics/prometheus", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, cleaning up...");

    // 종료 토큰 취소 (백그라운드 태스크에 종료 시그널 전파)
    shutdown_token.cancel();

    // 정리 작업에 최대 10초 대기
    match tokio::time::timeout(Duration::from_secs(10), sweeper).await {
        Ok(Ok(())) => info!("Cache sweeper stopped"),
        Ok(Err(e)) => warn!(error = %e, "Cache sweeper task failed"),
        Err(_) => warn!("Cleanup timeout, forcing shutdown"),
    }

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
/// 핸들러 설치에 실패한 시그널은 무시하고 나머지 시그널을 기다립니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
