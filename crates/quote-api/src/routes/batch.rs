//! 다중 심볼 시세 endpoint.
//!
//! - `GET /batch/price?symbols=A,B,C` - 가격 배치 조회 (최대 20개)
//! - `GET /watchlist?symbols=A,B&type=summary` - 워치리스트 조회 (최대 15개)
//!
//! 심볼별 실패는 해당 슬롯에만 기록되며 요청 전체는 200으로 응답합니다.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use quote_core::{BatchRequest, QuoteDetail, QuoteError, QuoteRecord};
use quote_data::BatchOutcome;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;

use crate::error::{ApiError, ApiErrorResponse, ApiResult};
use crate::state::AppState;

/// 배치 조회 쿼리.
#[derive(Debug, Deserialize)]
pub struct BatchQuery {
    /// 쉼표로 구분된 심볼 목록
    pub symbols: Option<String>,
}

/// 워치리스트 조회 쿼리.
#[derive(Debug, Deserialize)]
pub struct WatchlistQuery {
    pub symbols: Option<String>,
    /// 상세 수준 (price, summary, full)
    #[serde(rename = "type")]
    pub detail: Option<String>,
}

/// 슬롯 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    Ok,
    Error,
}

/// 슬롯 에러 정보.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlotError {
    pub code: String,
    pub message: String,
}

impl From<&QuoteError> for SlotError {
    fn from(err: &QuoteError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// 심볼별 결과 슬롯.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchSlot {
    /// 정규화된 심볼 (정규화 실패 시 원본 입력)
    pub symbol: String,
    pub status: SlotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<QuoteRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<SlotError>,
}

/// 배치/워치리스트 응답.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BatchResponse {
    /// 워치리스트 상세 수준 (배치 가격 조회에는 없음)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub detail: Option<QuoteDetail>,
    pub count: usize,
    pub successful: usize,
    pub failed: usize,
    /// 최대 심볼 수 초과로 잘렸는지 여부
    pub truncated: bool,
    /// 입력 순서를 따르는 결과
    pub results: Vec<BatchSlot>,
    pub timestamp: i64,
}

impl BatchResponse {
    fn from_outcomes<T>(
        outcomes: Vec<BatchOutcome<T>>,
        truncated: bool,
        detail: Option<QuoteDetail>,
        into_record: impl Fn(T) -> QuoteRecord,
    ) -> Self {
        let results: Vec<BatchSlot> = outcomes
            .into_iter()
            .map(|outcome| match outcome.result {
                Ok(value) => BatchSlot {
                    symbol: outcome.symbol,
                    status: SlotStatus::Ok,
                    data: Some(into_record(value)),
                    error: None,
                },
                Err(e) => BatchSlot {
                    symbol: outcome.symbol,
                    status: SlotStatus::Error,
                    data: None,
                    error: Some(SlotError::from(&e)),
                },
            })
            .collect();

        let successful = results
            .iter()
            .filter(|slot| slot.status == SlotStatus::Ok)
            .count();

        Self {
            detail,
            count: results.len(),
            successful,
            failed: results.len() - successful,
            truncated,
            results,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// 쿼리의 심볼 목록을 파싱하고 비어 있으면 400을 반환합니다.
fn parse_symbols(
    raw: Option<&str>,
    parse: impl FnOnce(&str) -> BatchRequest,
) -> ApiResult<BatchRequest> {
    let request = parse(raw.unwrap_or_default());
    if request.is_empty() {
        return Err(ApiError::bad_request(
            "MISSING_SYMBOLS",
            "symbols 파라미터에 하나 이상의 심볼이 필요합니다",
        ));
    }
    Ok(request)
}

/// 배치 가격 조회.
#[utoipa::path(
    get,
    path = "/batch/price",
    params(
        ("symbols" = String, Query, description = "쉼표로 구분된 심볼 (최대 20개, 예: TCS,RELIANCE,INFY)")
    ),
    responses(
        (status = 200, description = "심볼별 결과", body = BatchResponse),
        (status = 400, description = "심볼 누락", body = ApiErrorResponse)
    ),
    tag = "batch"
)]
pub async fn batch_prices(
    State(state): State<Arc<AppState>>,
    Query(query): Query<BatchQuery>,
) -> ApiResult<Json<BatchResponse>> {
    let request = parse_symbols(query.symbols.as_deref(), |raw| {
        state.manager.batch_request(raw)
    })?;

    let outcomes = state.manager.batch_prices(&request).await;
    let response =
        BatchResponse::from_outcomes(outcomes, request.truncated(), None, QuoteRecord::Price);

    info!(
        count = response.count,
        failed = response.failed,
        truncated = response.truncated,
        "Batch price request completed"
    );
    Ok(Json(response))
}

/// 워치리스트 조회.
#[utoipa::path(
    get,
    path = "/watchlist",
    params(
        ("symbols" = String, Query, description = "쉼표로 구분된 심볼 (최대 15개)"),
        ("type" = Option<String>, Query, description = "상세 수준: summary (기본), full, price")
    ),
    responses(
        (status = 200, description = "심볼별 결과", body = BatchResponse),
        (status = 400, description = "심볼 누락 또는 알 수 없는 type", body = ApiErrorResponse)
    ),
    tag = "batch"
)]
pub async fn watchlist(
    State(state): State<Arc<AppState>>,
    Query(query): Query<WatchlistQuery>,
) -> ApiResult<Json<BatchResponse>> {
    let detail = match query.detail.as_deref() {
        None => QuoteDetail::default(),
        Some(raw) => raw
            .parse::<QuoteDetail>()
            .map_err(|e| ApiError::bad_request("INVALID_TYPE", e))?,
    };

    let request = parse_symbols(query.symbols.as_deref(), |raw| {
        state.manager.watchlist_request(raw)
    })?;

    let outcomes = state.manager.watchlist(&request, detail).await;
    let response =
        BatchResponse::from_outcomes(outcomes, request.truncated(), Some(detail), |r| r);

    info!(
        count = response.count,
        failed = response.failed,
        detail = %detail,
        "Watchlist request completed"
    );
    Ok(Json(response))
}

/// 다중 심볼 라우터 생성.
pub fn batch_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/batch/price", get(batch_prices))
        .route("/watchlist", get(watchlist))
}
