//! 단일 심볼 시세 endpoint.
//!
//! - `GET /stock/{symbol}` - 가격 + 펀더멘털 전체
//! - `GET /price/{symbol}` - 가격만 (짧은 TTL)
//! - `GET /summary/{symbol}` - 주요 지표 요약

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use quote_core::{PriceRecord, StockRecord, SummaryRecord};
use std::sync::Arc;

use crate::error::{ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 전체 시세 조회.
#[utoipa::path(
    get,
    path = "/stock/{symbol}",
    params(
        ("symbol" = String, Path, description = "티커 (예: TCS, RELIANCE.NS)")
    ),
    responses(
        (status = 200, description = "전체 레코드", body = StockRecord),
        (status = 400, description = "잘못된 심볼", body = ApiErrorResponse),
        (status = 404, description = "데이터 없음", body = ApiErrorResponse),
        (status = 502, description = "업스트림 에러", body = ApiErrorResponse),
        (status = 504, description = "업스트림 타임아웃", body = ApiErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn get_stock(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<StockRecord>> {
    let symbol = state.manager.normalize(&symbol)?;
    Ok(Json(state.manager.stock(&symbol).await?))
}

/// 가격 조회.
#[utoipa::path(
    get,
    path = "/price/{symbol}",
    params(
        ("symbol" = String, Path, description = "티커 (예: TCS, RELIANCE.NS)")
    ),
    responses(
        (status = 200, description = "가격 레코드", body = PriceRecord),
        (status = 400, description = "잘못된 심볼", body = ApiErrorResponse),
        (status = 404, description = "데이터 없음", body = ApiErrorResponse),
        (status = 502, description = "업스트림 에러", body = ApiErrorResponse),
        (status = 504, description = "업스트림 타임아웃", body = ApiErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn get_price(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<PriceRecord>> {
    let symbol = state.manager.normalize(&symbol)?;
    Ok(Json(state.manager.price(&symbol).await?))
}

/// 요약 조회.
#[utoipa::path(
    get,
    path = "/summary/{symbol}",
    params(
        ("symbol" = String, Path, description = "티커 (예: TCS, RELIANCE.NS)")
    ),
    responses(
        (status = 200, description = "요약 레코드", body = SummaryRecord),
        (status = 400, description = "잘못된 심볼", body = ApiErrorResponse),
        (status = 404, description = "데이터 없음", body = ApiErrorResponse),
        (status = 502, description = "업스트림 에러", body = ApiErrorResponse),
        (status = 504, description = "업스트림 타임아웃", body = ApiErrorResponse)
    ),
    tag = "quotes"
)]
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<SummaryRecord>> {
    let symbol = state.manager.normalize(&symbol)?;
    Ok(Json(state.manager.summary(&symbol).await?))
}

/// 단일 시세 라우터 생성.
pub fn quotes_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stock/{symbol}", get(get_stock))
        .route("/price/{symbol}", get(get_price))
        .route("/summary/{symbol}", get(get_summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::testing::{get_json, summary_body};
    use crate::state::create_test_state;
    use axum::http::StatusCode;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn test_price_second_request_served_from_cache() {
        let mut server = Server::new_async().await;
        let quote = server
            .mock("GET", "/v10/finance/quoteSummary/RELIANCE.NS")
            .match_query(Matcher::UrlEncoded("modules".into(), "price".into()))
            .with_status(200)
            .with_body(summary_body("RELIANCE.NS", "Reliance Industries Limited", 2950.5))
            .expect(1)
            .create_async()
            .await;

        let app = quotes_router().with_state(Arc::new(create_test_state(&server.url())));

        let (status, first) = get_json(app.clone(), "/price/RELIANCE").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["symbol"], "RELIANCE.NS");
        assert_eq!(first["currentPrice"], 2950.5);
        assert_eq!(first["cached"], false);

        let (status, second) = get_json(app, "/price/reliance.ns").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["cached"], true);

        quote.assert_async().await;
    }

    #[tokio::test]
    async fn test_stock_returns_full_record() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v10/finance/quoteSummary/TCS.NS")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(summary_body("TCS.NS", "Tata Consultancy Services Limited", 3900.0))
            .create_async()
            .await;

        let app = quotes_router().with_state(Arc::new(create_test_state(&server.url())));
        let (status, json) = get_json(app, "/stock/tcs").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["symbol"], "TCS.NS");
        assert_eq!(json["name"], "Tata Consultancy Services Limited");
        assert_eq!(json["peRatio"], 29.4);
        assert_eq!(json["fiftyTwoWeekHigh"], 4500.0);
        // 제공자가 값을 주지 않은 필드는 null
        assert!(json["beta"].is_null());
    }

    #[tokio::test]
    async fn test_summary_fields() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v10/finance/quoteSummary/INFY.NS")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(summary_body("INFY.NS", "Infosys Limited", 1500.0))
            .create_async()
            .await;

        let app = quotes_router().with_state(Arc::new(create_test_state(&server.url())));
        let (status, json) = get_json(app, "/summary/INFY").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["symbol"], "INFY.NS");
        assert_eq!(json["currentPrice"], 1500.0);
        assert_eq!(json["change"], 10.0);
        assert!(json.get("open").is_none());
        assert!(json.get("website").is_none());
    }

    #[tokio::test]
    async fn test_invalid_symbol_is_bad_request() {
        let app = quotes_router().with_state(Arc::new(create_test_state("http://127.0.0.1:1")));
        let (status, json) = get_json(app, "/price/$$").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "INVALID_SYMBOL");
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v10/finance/quoteSummary/BOGUS.NS")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(
                r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found","description":"Quote not found for symbol: BOGUS.NS"}}}"#,
            )
            .create_async()
            .await;

        let app = quotes_router().with_state(Arc::new(create_test_state(&server.url())));
        let (status, json) = get_json(app, "/stock/bogus").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["code"], "DATA_UNAVAILABLE");
        assert_eq!(json["symbol"], "BOGUS.NS");
    }

    #[tokio::test]
    async fn test_upstream_failure_is_bad_gateway() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v10/finance/quoteSummary/TCS.NS")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("Service Unavailable")
            .create_async()
            .await;

        let app = quotes_router().with_state(Arc::new(create_test_state(&server.url())));
        let (status, json) = get_json(app, "/price/TCS").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["code"], "UPSTREAM_ERROR");
    }
}
