//! OpenAPI 문서화 설정.
//!
//! utoipa를 사용하여 REST API의 OpenAPI 3.0 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가
//!
//! quote-data의 통계 타입처럼 스키마가 없는 외부 타입은
//! `#[schema(value_type = Object)]`로 JSON 객체로 처리합니다.

use axum::Router;
use quote_core::{
    FundamentalsSnapshot, PriceRecord, PriceSnapshot, QuoteDetail, QuoteRecord, StockRecord,
    SummaryRecord, Symbol,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{
    BatchResponse, BatchSlot, HealthResponse, LivenessResponse, PopularStocksResponse,
    ServiceBanner, SlotError, SlotStatus, StatsResponse,
};

/// Quote API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Indian Stock Market API",
        description = r#"
# NSE 시세 게이트웨이 REST API

Yahoo Finance 시세를 단순화된 JSON 스키마로 제공합니다.

## 캐시

- 가격 데이터: 30초 TTL
- 펀더멘털 데이터: 1시간 TTL

응답의 `cached` 필드로 캐시 적중 여부를 확인할 수 있습니다.

## 심볼

거래소 접미사가 없으면 `.NS`(NSE)가 붙습니다. `TCS`와 `TCS.NS`는 같은 심볼입니다.
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:8000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크 - 서버 상태 확인"),
        (name = "quotes", description = "시세 - 단일 심볼 조회"),
        (name = "batch", description = "배치 - 다중 심볼 조회"),
        (name = "monitoring", description = "모니터링 - 캐시/업스트림 통계")
    ),
    components(
        schemas(
            // ===== Common =====
            ApiErrorResponse,
            Symbol,

            // ===== Quotes =====
            PriceSnapshot,
            FundamentalsSnapshot,
            PriceRecord,
            StockRecord,
            SummaryRecord,
            QuoteRecord,
            QuoteDetail,
            PopularStocksResponse,

            // ===== Batch =====
            BatchResponse,
            BatchSlot,
            SlotStatus,
            SlotError,

            // ===== Health / Monitoring =====
            ServiceBanner,
            HealthResponse,
            LivenessResponse,
            StatsResponse,
        )
    ),
    paths(
        crate::routes::health::root,
        crate::routes::health::health_check,
        crate::routes::health::liveness,
        crate::routes::quotes::get_stock,
        crate::routes::quotes::get_price,
        crate::routes::quotes::get_summary,
        crate::routes::batch::batch_prices,
        crate::routes::batch::watchlist,
        crate::routes::popular::popular_indian,
        crate::routes::metrics::get_stats,
    )
)]
pub struct ApiDoc;

/// Swagger UI 라우터 생성.
///
/// 다음 경로에 문서 UI를 마운트합니다:
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}
