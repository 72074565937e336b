//! 통합 API 에러 응답 타입.
//!
//! 모든 엔드포인트에서 일관된 에러 형식을 제공합니다.
//! `QuoteError`는 이 모듈에서 HTTP 상태 코드로 변환됩니다.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quote_core::QuoteError;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 통합 API 에러 응답.
///
/// # 예시
///
/// ```json
/// {
///   "code": "DATA_UNAVAILABLE",
///   "message": "데이터 없음 (BOGUS.NS): Quote not found for symbol: BOGUS.NS",
///   "symbol": "BOGUS.NS",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "INVALID_SYMBOL", "UPSTREAM_TIMEOUT")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 관련 심볼 (선택적)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol: Option<String>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    pub timestamp: i64,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    ///
    /// ```
    /// use quote_api::error::ApiErrorResponse;
    ///
    /// let error = ApiErrorResponse::new("MISSING_SYMBOLS", "symbols is required");
    /// assert!(error.symbol.is_none());
    /// ```
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            symbol: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

impl From<&QuoteError> for ApiErrorResponse {
    fn from(err: &QuoteError) -> Self {
        let response = Self::new(err.code(), err.to_string());
        match err.symbol() {
            Some(symbol) => response.with_symbol(symbol),
            None => response,
        }
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// 핸들러 에러 (상태 코드 + 응답 본문).
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, body: ApiErrorResponse) -> Self {
        Self { status, body }
    }

    /// 400 Bad Request.
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, ApiErrorResponse::new(code, message))
    }
}

/// `QuoteError`에 대응하는 HTTP 상태 코드.
pub fn status_for(err: &QuoteError) -> StatusCode {
    match err {
        QuoteError::InvalidSymbol { .. } => StatusCode::BAD_REQUEST,
        QuoteError::DataUnavailable { .. } => StatusCode::NOT_FOUND,
        QuoteError::UpstreamTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        QuoteError::UpstreamError { .. } => StatusCode::BAD_GATEWAY,
        QuoteError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<QuoteError> for ApiError {
    fn from(err: QuoteError) -> Self {
        Self::new(status_for(&err), ApiErrorResponse::from(&err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, ApiError>;
