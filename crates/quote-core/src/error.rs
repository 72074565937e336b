//! 시세 게이트웨이의 에러 타입.
//!
//! 요청 경계(HTTP 핸들러)에서 상태 코드로 변환되는 에러를 정의합니다.

use thiserror::Error;

/// 시세 조회 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuoteError {
    /// 잘못된 심볼 입력 (빈 문자열, 허용되지 않는 문자 등)
    #[error("잘못된 심볼 '{input}': {reason}")]
    InvalidSymbol { input: String, reason: String },

    /// 제공자가 데이터를 반환하지 않았거나 알 수 없는 심볼
    #[error("데이터 없음 ({symbol}): {reason}")]
    DataUnavailable { symbol: String, reason: String },

    /// 업스트림 호출 타임아웃
    #[error("업스트림 타임아웃 ({symbol}): {timeout_secs}초 초과")]
    UpstreamTimeout { symbol: String, timeout_secs: u64 },

    /// 업스트림 전송/파싱 에러
    #[error("업스트림 에러 ({symbol}): {message}")]
    UpstreamError { symbol: String, message: String },

    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),
}

/// 시세 작업을 위한 Result 타입.
pub type QuoteResult<T> = Result<T, QuoteError>;

impl QuoteError {
    /// 잘못된 심볼 에러 생성.
    pub fn invalid_symbol(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSymbol {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// 데이터 없음 에러 생성.
    pub fn data_unavailable(symbol: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            symbol: symbol.into(),
            reason: reason.into(),
        }
    }

    /// 업스트림 에러 생성.
    pub fn upstream(symbol: impl Into<String>, message: impl Into<String>) -> Self {
        Self::UpstreamError {
            symbol: symbol.into(),
            message: message.into(),
        }
    }

    /// 응답에 사용되는 에러 코드.
    pub fn code(&self) -> &'static str {
        match self {
            QuoteError::InvalidSymbol { .. } => "INVALID_SYMBOL",
            QuoteError::DataUnavailable { .. } => "DATA_UNAVAILABLE",
            QuoteError::UpstreamTimeout { .. } => "UPSTREAM_TIMEOUT",
            QuoteError::UpstreamError { .. } => "UPSTREAM_ERROR",
            QuoteError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// 에러와 관련된 심볼 (입력 에러는 원본 입력).
    pub fn symbol(&self) -> Option<&str> {
        match self {
            QuoteError::InvalidSymbol { input, .. } => Some(input),
            QuoteError::DataUnavailable { symbol, .. }
            | QuoteError::UpstreamTimeout { symbol, .. }
            | QuoteError::UpstreamError { symbol, .. } => Some(symbol),
            QuoteError::Config(_) => None,
        }
    }

    /// 업스트림 제공자 장애로 인한 에러인지 확인합니다.
    pub fn is_upstream_failure(&self) -> bool {
        matches!(
            self,
            QuoteError::UpstreamTimeout { .. } | QuoteError::UpstreamError { .. }
        )
    }
}

impl From<config::ConfigError> for QuoteError {
    fn from(err: config::ConfigError) -> Self {
        QuoteError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            QuoteError::invalid_symbol("", "empty").code(),
            "INVALID_SYMBOL"
        );
        assert_eq!(
            QuoteError::data_unavailable("BOGUS.NS", "no data").code(),
            "DATA_UNAVAILABLE"
        );
        let timeout = QuoteError::UpstreamTimeout {
            symbol: "TCS.NS".to_string(),
            timeout_secs: 10,
        };
        assert_eq!(timeout.code(), "UPSTREAM_TIMEOUT");
        assert_eq!(timeout.symbol(), Some("TCS.NS"));
    }

    #[test]
    fn test_error_classification() {
        assert!(QuoteError::upstream("TCS.NS", "502 Bad Gateway").is_upstream_failure());
        assert!(!QuoteError::invalid_symbol("$$", "bad chars").is_upstream_failure());
        assert!(!QuoteError::data_unavailable("BOGUS.NS", "no data").is_upstream_failure());
    }
}
