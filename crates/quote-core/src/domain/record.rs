//! 응답 레코드 타입.
//!
//! 캐시된 스냅샷을 조합하여 API가 반환하는 레코드를 만듭니다.
//! 모든 레코드는 캐시에서 제공되었는지 여부(`cached`)를 포함합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::snapshot::{FundamentalsSnapshot, PriceSnapshot};
use crate::types::Symbol;

/// 가격 전용 레코드 (`/price/{symbol}`, `/batch/price`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct PriceRecord {
    #[serde(flatten)]
    pub price: PriceSnapshot,
    /// 캐시에서 제공되었는지 여부
    pub cached: bool,
}

/// 전체 레코드 (`/stock/{symbol}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct StockRecord {
    #[serde(flatten)]
    pub price: PriceSnapshot,
    #[serde(flatten)]
    pub fundamentals: FundamentalsSnapshot,
    /// 가격과 펀더멘털이 모두 캐시에서 제공되었는지 여부
    pub cached: bool,
}

/// 요약 레코드 (`/summary/{symbol}`).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct SummaryRecord {
    pub symbol: Symbol,
    pub name: Option<String>,
    pub current_price: Option<f64>,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub price_to_book: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub roe: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub book_value: Option<f64>,
    pub beta: Option<f64>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub volume: Option<u64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub timestamp: i64,
    pub cached: bool,
}

impl From<StockRecord> for SummaryRecord {
    fn from(record: StockRecord) -> Self {
        let StockRecord {
            price,
            fundamentals: f,
            cached,
        } = record;

        Self {
            symbol: price.symbol,
            name: f.name,
            current_price: price.current_price,
            change: price.change,
            change_percent: price.change_percent,
            pe_ratio: f.pe_ratio,
            eps: f.eps,
            price_to_book: f.price_to_book,
            dividend_yield: f.dividend_yield,
            roe: f.roe,
            debt_to_equity: f.debt_to_equity,
            book_value: f.book_value,
            beta: f.beta,
            sector: f.sector,
            industry: f.industry,
            market_cap: f.market_cap,
            volume: price.volume,
            fifty_two_week_high: f.fifty_two_week_high,
            fifty_two_week_low: f.fifty_two_week_low,
            timestamp: price.timestamp,
            cached,
        }
    }
}

/// 워치리스트 상세 수준.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum QuoteDetail {
    /// 가격만
    Price,
    /// 주요 지표 요약
    #[default]
    Summary,
    /// 전체 데이터
    Full,
}

impl fmt::Display for QuoteDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteDetail::Price => write!(f, "price"),
            QuoteDetail::Summary => write!(f, "summary"),
            QuoteDetail::Full => write!(f, "full"),
        }
    }
}

impl FromStr for QuoteDetail {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "price" => Ok(Self::Price),
            "summary" => Ok(Self::Summary),
            "full" => Ok(Self::Full),
            _ => Err(format!("Unknown detail level: {}", s)),
        }
    }
}

/// 상세 수준에 따른 워치리스트 레코드.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum QuoteRecord {
    Price(PriceRecord),
    Summary(SummaryRecord),
    Full(StockRecord),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_stock() -> StockRecord {
        let symbol = Symbol::normalize("tcs").unwrap();
        let mut price = PriceSnapshot::empty(symbol, 1_700_000_000);
        price.current_price = Some(3900.0);
        price.volume = Some(1_250_000);

        StockRecord {
            price,
            fundamentals: FundamentalsSnapshot {
                name: Some("Tata Consultancy Services Limited".to_string()),
                pe_ratio: Some(29.4),
                sector: Some("Technology".to_string()),
                ..Default::default()
            },
            cached: false,
        }
    }

    #[test]
    fn test_stock_record_flattens_without_duplicate_keys() {
        let json = serde_json::to_value(sample_stock()).unwrap();
        assert_eq!(json["symbol"], "TCS.NS");
        assert_eq!(json["name"], "Tata Consultancy Services Limited");
        assert_eq!(json["peRatio"], 29.4);
        assert!(json["beta"].is_null());
        assert_eq!(json["cached"], false);
    }

    #[test]
    fn test_summary_from_stock() {
        let summary = SummaryRecord::from(sample_stock());
        assert_eq!(summary.symbol.as_str(), "TCS.NS");
        assert_eq!(summary.current_price, Some(3900.0));
        assert_eq!(summary.pe_ratio, Some(29.4));
        assert_eq!(summary.volume, Some(1_250_000));
        assert_eq!(summary.roe, None);
    }

    #[test]
    fn test_quote_detail_from_str() {
        assert_eq!("price".parse::<QuoteDetail>().unwrap(), QuoteDetail::Price);
        assert_eq!("SUMMARY".parse::<QuoteDetail>().unwrap(), QuoteDetail::Summary);
        assert_eq!("full".parse::<QuoteDetail>().unwrap(), QuoteDetail::Full);
        assert!("chart".parse::<QuoteDetail>().is_err());
        assert_eq!(QuoteDetail::default(), QuoteDetail::Summary);
    }
}
