//! 데이터 제공자 오류 타입.

use quote_core::{QuoteError, Symbol};
use thiserror::Error;

/// 업스트림 제공자 호출 오류.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// 제공자가 심볼을 알지 못함
    #[error("Symbol not found: {0}")]
    NotFound(String),

    /// 전송 계층 오류 (연결 실패, TLS, 바디 읽기 등)
    #[error("HTTP error: {0}")]
    Http(String),

    /// 예상하지 못한 HTTP 상태 코드
    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// 응답 파싱 오류
    #[error("Parse error: {0}")]
    Parse(String),

    /// 세션 crumb가 거부됨 (401/403)
    #[error("Unauthorized: session crumb rejected")]
    Unauthorized,
}

impl ProviderError {
    /// 요청 경계에서 사용하는 `QuoteError`로 변환합니다.
    pub fn into_quote_error(self, symbol: &Symbol) -> QuoteError {
        match self {
            ProviderError::NotFound(reason) => QuoteError::data_unavailable(symbol.as_str(), reason),
            other => QuoteError::upstream(symbol.as_str(), other.to_string()),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProviderError>;
