//! 인기 인도 종목 목록.

use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

const NIFTY50_TOP10: &[&str] = &[
    "RELIANCE.NS",
    "TCS.NS",
    "HDFCBANK.NS",
    "INFY.NS",
    "HINDUNILVR.NS",
    "ICICIBANK.NS",
    "SBIN.NS",
    "BHARTIARTL.NS",
    "ITC.NS",
    "KOTAKBANK.NS",
];

const SECTORS: &[(&str, &[&str])] = &[
    ("IT", &["TCS.NS", "INFY.NS", "HCLTECH.NS", "WIPRO.NS"]),
    (
        "Banking",
        &["HDFCBANK.NS", "ICICIBANK.NS", "SBIN.NS", "KOTAKBANK.NS"],
    ),
    ("Energy", &["RELIANCE.NS", "ONGC.NS", "NTPC.NS"]),
    ("Auto", &["MARUTI.NS", "TATAMOTORS.NS", "BAJAJ-AUTO.NS"]),
];

/// 인기 종목 응답.
#[derive(Debug, Serialize, ToSchema)]
pub struct PopularStocksResponse {
    pub nifty50_top10: Vec<String>,
    /// 섹터명 → 심볼 목록
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl PopularStocksResponse {
    fn curated() -> Self {
        fn owned(symbols: &[&str]) -> Vec<String> {
            symbols.iter().map(|s| s.to_string()).collect()
        }

        Self {
            nifty50_top10: owned(NIFTY50_TOP10),
            sectors: SECTORS
                .iter()
                .map(|(sector, symbols)| (sector.to_string(), owned(symbols)))
                .collect(),
        }
    }
}

/// 인기 인도 종목 목록 조회.
#[utoipa::path(
    get,
    path = "/popular/indian",
    responses(
        (status = 200, description = "큐레이션된 종목 목록", body = PopularStocksResponse)
    ),
    tag = "quotes"
)]
pub async fn popular_indian() -> Json<PopularStocksResponse> {
    Json(PopularStocksResponse::curated())
}

pub fn popular_router() -> Router<Arc<AppState>> {
    Router::new().route("/popular/indian", get(popular_indian))
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote_core::Symbol;

    #[test]
    fn test_curated_symbols_are_normalized() {
        let popular = PopularStocksResponse::curated();
        assert_eq!(popular.nifty50_top10.len(), 10);
        assert_eq!(popular.sectors.len(), 4);

        let all = popular
            .nifty50_top10
            .iter()
            .chain(popular.sectors.values().flatten());
        for symbol in all {
            assert_eq!(Symbol::normalize(symbol).unwrap().as_str(), symbol);
        }
    }

    #[tokio::test]
    async fn test_popular_route() {
        use crate::routes::testing::get_json;
        use crate::state::create_test_state;

        let app = popular_router().with_state(Arc::new(create_test_state("http://127.0.0.1:1")));
        let (status, json) = get_json(app, "/popular/indian").await;

        assert_eq!(status, axum::http::StatusCode::OK);
        assert_eq!(json["nifty50_top10"][0], "RELIANCE.NS");
        assert_eq!(json["sectors"]["IT"][3], "WIPRO.NS");
    }
}
