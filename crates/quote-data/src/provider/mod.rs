//! 시세 데이터 Provider 모듈.
//!
//! 외부 금융 데이터 소스에서 원본 레코드를 가져오는 Provider를 정의합니다.
//!
//! ## Yahoo Finance
//! - `YahooQuoteProvider`: quoteSummary / chart API 클라이언트
//! - 세션 쿠키와 crumb 토큰을 자동으로 발급받아 재사용

pub mod yahoo;

use async_trait::async_trait;
use quote_core::Symbol;
use serde::{Deserialize, Serialize};

pub use crate::error::ProviderError;
pub use yahoo::YahooQuoteProvider;

/// 조회 범위.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteScope {
    /// 가격 모듈만
    Price,
    /// 가격 + 펀더멘털 + 기업 정보
    Full,
}

impl QuoteScope {
    /// quoteSummary `modules` 파라미터 값.
    pub fn modules(&self) -> &'static str {
        match self {
            QuoteScope::Price => "price",
            QuoteScope::Full => {
                "price,summaryDetail,defaultKeyStatistics,financialData,assetProfile"
            }
        }
    }
}

/// 1년 일봉에서 계산한 52주 고가/저가.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearRange {
    pub high: f64,
    pub low: f64,
}

/// 시세 데이터 제공자.
///
/// 구현체는 제공자 고유 형식의 레코드를 반환하며, 안정된 스키마로의 변환은
/// `mapper` 모듈이 담당합니다.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// 제공자 이름 (로그용).
    fn name(&self) -> &str;

    /// 심볼의 원본 레코드를 조회합니다.
    ///
    /// 반환 값은 모듈 이름을 키로 갖는 객체입니다 (예: `{"price": {...}}`).
    async fn fetch_quote(
        &self,
        symbol: &Symbol,
        scope: QuoteScope,
    ) -> Result<serde_json::Value, ProviderError>;

    /// 1년 일봉 데이터로 52주 고가/저가를 계산합니다.
    ///
    /// 데이터가 없으면 `Ok(None)`.
    async fn fetch_year_range(&self, symbol: &Symbol) -> Result<Option<YearRange>, ProviderError>;
}
