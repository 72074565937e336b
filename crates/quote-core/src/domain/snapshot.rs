//! 시세 스냅샷 타입.
//!
//! 이 모듈은 캐시에 저장되는 스냅샷을 정의합니다:
//! - `PriceSnapshot` - 변동성이 큰 가격 데이터 (짧은 TTL)
//! - `FundamentalsSnapshot` - 천천히 변하는 기업 정보 (긴 TTL)
//! - `Snapshot` - 캐시 값 (두 스냅샷 중 하나)
//!
//! 모든 수치 필드는 `Option`이며, 제공자가 값을 주지 않은 경우
//! JSON `null`로 직렬화됩니다. `0`과 "알 수 없음"은 구분됩니다.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Symbol;

/// 캐시 데이터 종류 (TTL 클래스).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    /// 가격 데이터 (짧은 TTL)
    Price,
    /// 펀더멘털 데이터 (긴 TTL)
    Fundamentals,
}

impl fmt::Display for CacheKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKind::Price => write!(f, "price"),
            CacheKind::Fundamentals => write!(f, "fundamentals"),
        }
    }
}

/// 가격 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    /// 정규화된 심볼
    pub symbol: Symbol,
    /// 현재가
    pub current_price: Option<f64>,
    /// 전일 대비 변동액
    pub change: Option<f64>,
    /// 전일 대비 변동률 (%)
    pub change_percent: Option<f64>,
    /// 시가
    pub open: Option<f64>,
    /// 당일 고가
    pub day_high: Option<f64>,
    /// 당일 저가
    pub day_low: Option<f64>,
    /// 전일 종가
    pub previous_close: Option<f64>,
    /// 거래량
    pub volume: Option<u64>,
    /// 통화 코드 (예: INR)
    pub currency: Option<String>,
    /// 거래소 마지막 갱신 시각 (Unix timestamp)
    pub last_market_update: Option<i64>,
    /// 수집 시각 (Unix timestamp)
    pub timestamp: i64,
}

impl PriceSnapshot {
    /// 모든 필드가 비어 있는 스냅샷 생성.
    pub fn empty(symbol: Symbol, timestamp: i64) -> Self {
        Self {
            symbol,
            current_price: None,
            change: None,
            change_percent: None,
            open: None,
            day_high: None,
            day_low: None,
            previous_close: None,
            volume: None,
            currency: None,
            last_market_update: None,
            timestamp,
        }
    }
}

/// 펀더멘털 스냅샷.
///
/// 심볼과 수집 시각은 함께 응답되는 `PriceSnapshot`이 제공하므로
/// 직렬화하지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct FundamentalsSnapshot {
    /// 회사명
    pub name: Option<String>,

    // 시장 데이터
    pub market_cap: Option<f64>,
    pub average_volume: Option<u64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    /// 52주 변동률 (%)
    pub fifty_two_week_change: Option<f64>,
    pub fifty_day_average: Option<f64>,
    pub two_hundred_day_average: Option<f64>,

    // 밸류에이션
    pub pe_ratio: Option<f64>,
    pub peg_ratio: Option<f64>,
    pub price_to_book: Option<f64>,
    pub price_to_sales: Option<f64>,
    pub enterprise_value: Option<f64>,
    pub ev_to_revenue: Option<f64>,
    pub ev_to_ebitda: Option<f64>,

    // 재무 지표
    pub eps: Option<f64>,
    pub beta: Option<f64>,
    pub book_value: Option<f64>,
    /// 순이익률 (%)
    pub profit_margins: Option<f64>,
    /// ROA (%)
    pub return_on_assets: Option<f64>,
    /// ROE (%)
    pub roe: Option<f64>,
    pub total_cash: Option<f64>,
    pub total_debt: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub quick_ratio: Option<f64>,
    /// 매출총이익률 (%)
    pub gross_margins: Option<f64>,
    /// 영업이익률 (%)
    pub operating_margins: Option<f64>,
    pub total_revenue: Option<f64>,
    pub revenue_per_share: Option<f64>,
    /// 매출 성장률 (%)
    pub revenue_growth: Option<f64>,
    /// 이익 성장률 (%)
    pub earnings_growth: Option<f64>,

    // 배당
    /// 배당수익률 (%)
    pub dividend_yield: Option<f64>,
    pub dividend_rate: Option<f64>,
    /// 배당락일 (Unix timestamp)
    pub ex_dividend_date: Option<i64>,
    /// 배당성향 (%)
    pub payout_ratio: Option<f64>,
    /// 5년 평균 배당수익률 (%)
    pub five_year_avg_dividend_yield: Option<f64>,

    // 기업 정보
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub country: Option<String>,
    pub exchange: Option<String>,
    pub quote_type: Option<String>,
    pub website: Option<String>,
    pub employees: Option<u64>,

    // 애널리스트 의견
    pub recommendation_mean: Option<f64>,
    pub recommendation_key: Option<String>,
    pub number_of_analyst_opinions: Option<u64>,
    pub target_high_price: Option<f64>,
    pub target_low_price: Option<f64>,
    pub target_mean_price: Option<f64>,

    // 주식 구조
    pub shares_outstanding: Option<u64>,
    pub float_shares: Option<u64>,
    /// 내부자 보유 비율 (%)
    pub held_percent_insiders: Option<f64>,
    /// 기관 보유 비율 (%)
    pub held_percent_institutions: Option<f64>,
    pub short_ratio: Option<f64>,
    /// 유동주식 대비 공매도 비율 (%)
    pub short_percent_of_float: Option<f64>,

    /// 수집 시각 (Unix timestamp)
    #[serde(skip)]
    pub fetched_at: i64,
}

/// 캐시에 저장되는 값.
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    Price(PriceSnapshot),
    Fundamentals(FundamentalsSnapshot),
}

impl Snapshot {
    /// 스냅샷의 TTL 클래스.
    pub fn kind(&self) -> CacheKind {
        match self {
            Snapshot::Price(_) => CacheKind::Price,
            Snapshot::Fundamentals(_) => CacheKind::Fundamentals,
        }
    }

    pub fn into_price(self) -> Option<PriceSnapshot> {
        match self {
            Snapshot::Price(price) => Some(price),
            Snapshot::Fundamentals(_) => None,
        }
    }

    pub fn into_fundamentals(self) -> Option<FundamentalsSnapshot> {
        match self {
            Snapshot::Fundamentals(fundamentals) => Some(fundamentals),
            Snapshot::Price(_) => None,
        }
    }
}

impl From<PriceSnapshot> for Snapshot {
    fn from(price: PriceSnapshot) -> Self {
        Snapshot::Price(price)
    }
}

impl From<FundamentalsSnapshot> for Snapshot {
    fn from(fundamentals: FundamentalsSnapshot) -> Self {
        Snapshot::Fundamentals(fundamentals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_kind() {
        let symbol = Symbol::normalize("tcs").unwrap();
        let price: Snapshot = PriceSnapshot::empty(symbol, 0).into();
        assert_eq!(price.kind(), CacheKind::Price);

        let fundamentals: Snapshot = FundamentalsSnapshot::default().into();
        assert_eq!(fundamentals.kind(), CacheKind::Fundamentals);
        assert!(fundamentals.into_price().is_none());
    }

    #[test]
    fn test_missing_fields_serialize_as_null() {
        let fundamentals = FundamentalsSnapshot {
            eps: Some(0.0),
            ..Default::default()
        };
        let json = serde_json::to_value(&fundamentals).unwrap();

        assert!(json["peRatio"].is_null());
        assert_eq!(json["eps"], serde_json::json!(0.0));
        assert!(json.get("fetchedAt").is_none());
    }

    #[test]
    fn test_price_snapshot_field_names() {
        let symbol = Symbol::normalize("reliance").unwrap();
        let mut price = PriceSnapshot::empty(symbol, 1_700_000_000);
        price.current_price = Some(2950.5);
        let json = serde_json::to_value(&price).unwrap();

        assert_eq!(json["symbol"], "RELIANCE.NS");
        assert_eq!(json["currentPrice"], 2950.5);
        assert!(json["changePercent"].is_null());
        assert_eq!(json["timestamp"], 1_700_000_000);
    }
}
