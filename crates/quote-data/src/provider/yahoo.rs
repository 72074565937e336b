//! Yahoo Finance 시세 제공자.
//!
//! quoteSummary API(`/v10/finance/quoteSummary/{symbol}`)로 가격과 펀더멘털을,
//! chart API(`/v8/finance/chart/{symbol}`)로 1년 일봉을 조회합니다.
//!
//! # 인증
//!
//! quoteSummary는 세션 쿠키와 crumb 토큰을 요구합니다. 첫 호출 시 쿠키 URL과
//! crumb URL을 차례로 호출해 crumb를 발급받고 재사용합니다. 401/403 응답을 받으면
//! crumb를 폐기하고 한 번만 재시도합니다.
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use quote_core::{ProviderConfig, Symbol};
//! use quote_data::provider::{QuoteProvider, QuoteScope, YahooQuoteProvider};
//!
//! let provider = YahooQuoteProvider::new(ProviderConfig::default())?;
//! let symbol = Symbol::normalize("tcs")?;
//! let record = provider.fetch_quote(&symbol, QuoteScope::Full).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use quote_core::{ProviderConfig, Symbol};
use reqwest::StatusCode;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{QuoteProvider, QuoteScope, YearRange};
use crate::error::{ProviderError, Result};

/// 에러 메시지에 포함할 응답 본문 최대 길이.
const MAX_ERROR_BODY: usize = 200;

/// Yahoo Finance 제공자.
pub struct YahooQuoteProvider {
    client: reqwest::Client,
    config: ProviderConfig,
    crumb: RwLock<Option<String>>,
}

impl YahooQuoteProvider {
    /// 새 제공자 생성.
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .user_agent(config.user_agent.as_str())
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            crumb: RwLock::new(None),
        })
    }

    /// 이미 발급받은 crumb를 지정합니다.
    pub fn with_crumb(self, crumb: impl Into<String>) -> Self {
        Self {
            crumb: RwLock::new(Some(crumb.into())),
            ..self
        }
    }

    /// 캐시된 crumb를 반환하거나 새로 발급받습니다.
    async fn crumb(&self) -> Result<String> {
        if let Some(crumb) = self.crumb.read().await.clone() {
            return Ok(crumb);
        }

        let mut guard = self.crumb.write().await;
        // 다른 작업이 먼저 발급받았을 수 있음
        if let Some(crumb) = guard.clone() {
            return Ok(crumb);
        }

        // 쿠키 발급 응답은 404여도 쿠키가 설정되므로 상태를 확인하지 않음
        if let Err(e) = self.client.get(&self.config.cookie_url).send().await {
            debug!(error = %e, "Cookie request failed, requesting crumb anyway");
        }

        let response = self.client.get(&self.config.crumb_url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let crumb = body.trim().to_string();
        if crumb.is_empty() || crumb.contains(char::is_whitespace) || crumb.contains('<') {
            return Err(ProviderError::Parse(format!(
                "invalid crumb response: {}",
                truncate(&crumb)
            )));
        }

        debug!("Obtained new Yahoo session crumb");
        *guard = Some(crumb.clone());
        Ok(crumb)
    }

    async fn invalidate_crumb(&self) {
        *self.crumb.write().await = None;
    }

    async fn request_summary(
        &self,
        symbol: &Symbol,
        scope: QuoteScope,
        crumb: &str,
    ) -> Result<Value> {
        let url = format!(
            "{}/v10/finance/quoteSummary/{}",
            self.config.quote_base_url.trim_end_matches('/'),
            symbol
        );

        let response = self
            .client
            .get(&url)
            .query(&[("modules", scope.modules()), ("crumb", crumb)])
            .send()
            .await?;

        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ProviderError::Unauthorized)
            }
            StatusCode::NOT_FOUND => {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::NotFound(
                    error_description(&body)
                        .unwrap_or_else(|| format!("Quote not found for symbol: {}", symbol)),
                ));
            }
            s if !s.is_success() => {
                let body = response.text().await.unwrap_or_default();
                return Err(ProviderError::Status {
                    status: s.as_u16(),
                    body: truncate(&body),
                });
            }
            _ => {}
        }

        let body: Value = response.json().await?;
        summary_result(symbol, body)
    }
}

#[async_trait]
impl QuoteProvider for YahooQuoteProvider {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch_quote(&self, symbol: &Symbol, scope: QuoteScope) -> Result<Value> {
        let crumb = self.crumb().await?;
        match self.request_summary(symbol, scope, &crumb).await {
            Err(ProviderError::Unauthorized) => {
                warn!(symbol = %symbol, "Yahoo rejected session crumb, refreshing once");
                self.invalidate_crumb().await;
                let crumb = self.crumb().await?;
                self.request_summary(symbol, scope, &crumb).await
            }
            other => other,
        }
    }

    async fn fetch_year_range(&self, symbol: &Symbol) -> Result<Option<YearRange>> {
        let url = format!(
            "{}/v8/finance/chart/{}",
            self.config.chart_base_url.trim_end_matches('/'),
            symbol
        );

        let response = self
            .client
            .get(&url)
            .query(&[("range", "1y"), ("interval", "1d")])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ProviderError::NotFound(format!(
                "No chart data for symbol: {}",
                symbol
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        let body: Value = response.json().await?;
        year_range_from_chart(&body)
    }
}

/// quoteSummary 응답에서 첫 번째 결과를 꺼냅니다.
fn summary_result(symbol: &Symbol, body: Value) -> Result<Value> {
    let summary = body
        .get("quoteSummary")
        .ok_or_else(|| ProviderError::Parse("missing quoteSummary".to_string()))?;

    if let Some(error) = summary.get("error").filter(|e| !e.is_null()) {
        let description = error
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return match error.get("code").and_then(Value::as_str) {
            Some("Not Found") => Err(ProviderError::NotFound(description)),
            _ => Err(ProviderError::Parse(description)),
        };
    }

    summary
        .get("result")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .cloned()
        .ok_or_else(|| ProviderError::NotFound(format!("Quote not found for symbol: {}", symbol)))
}

/// chart 응답에서 고가 최대값/저가 최소값을 계산합니다.
///
/// 캔들이 없으면 `meta`의 52주 값으로 대체합니다.
fn year_range_from_chart(body: &Value) -> Result<Option<YearRange>> {
    let chart = body
        .get("chart")
        .ok_or_else(|| ProviderError::Parse("missing chart".to_string()))?;

    if let Some(error) = chart.get("error").filter(|e| !e.is_null()) {
        let description = error
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        return Err(ProviderError::NotFound(description));
    }

    let Some(result) = chart
        .get("result")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
    else {
        return Ok(None);
    };

    let quote = result.pointer("/indicators/quote/0");
    let series = |name: &str| -> Vec<f64> {
        quote
            .and_then(|q| q.get(name))
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_f64)
                    .filter(|v| v.is_finite())
                    .collect()
            })
            .unwrap_or_default()
    };

    let high = series("high").into_iter().reduce(f64::max);
    let low = series("low").into_iter().reduce(f64::min);
    if let (Some(high), Some(low)) = (high, low) {
        return Ok(Some(YearRange { high, low }));
    }

    let meta = result.get("meta");
    let meta_value = |key: &str| meta.and_then(|m| m.get(key)).and_then(Value::as_f64);
    match (meta_value("fiftyTwoWeekHigh"), meta_value("fiftyTwoWeekLow")) {
        (Some(high), Some(low)) => Ok(Some(YearRange { high, low })),
        _ => Ok(None),
    }
}

fn error_description(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value
        .pointer("/quoteSummary/error/description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn truncate(body: &str) -> String {
    body.chars().take(MAX_ERROR_BODY).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server, ServerGuard};
    use serde_json::json;

    fn provider_for(server: &ServerGuard) -> YahooQuoteProvider {
        let url = server.url();
        YahooQuoteProvider::new(ProviderConfig {
            quote_base_url: url.clone(),
            chart_base_url: url.clone(),
            cookie_url: format!("{}/cookie", url),
            crumb_url: format!("{}/v1/test/getcrumb", url),
            ..Default::default()
        })
        .unwrap()
    }

    fn summary_body() -> String {
        json!({
            "quoteSummary": {
                "result": [{
                    "price": {
                        "symbol": "TCS.NS",
                        "longName": "Tata Consultancy Services Limited",
                        "regularMarketPrice": {"raw": 3900.5, "fmt": "3,900.50"}
                    }
                }],
                "error": null
            }
        })
        .to_string()
    }

    fn tcs() -> Symbol {
        Symbol::normalize("tcs").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_quote_obtains_and_reuses_crumb() {
        let mut server = Server::new_async().await;
        let crumb = server
            .mock("GET", "/v1/test/getcrumb")
            .with_body("abc123")
            .expect(1)
            .create_async()
            .await;
        let quote = server
            .mock("GET", "/v10/finance/quoteSummary/TCS.NS")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("modules".into(), "price".into()),
                Matcher::UrlEncoded("crumb".into(), "abc123".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(summary_body())
            .expect(2)
            .create_async()
            .await;

        let provider = provider_for(&server);
        for _ in 0..2 {
            let record = provider.fetch_quote(&tcs(), QuoteScope::Price).await.unwrap();
            assert_eq!(record["price"]["symbol"], "TCS.NS");
        }

        crumb.assert_async().await;
        quote.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_refreshes_crumb_once() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v1/test/getcrumb")
            .with_body("fresh")
            .create_async()
            .await;
        let stale = server
            .mock("GET", "/v10/finance/quoteSummary/TCS.NS")
            .match_query(Matcher::UrlEncoded("crumb".into(), "stale".into()))
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let fresh = server
            .mock("GET", "/v10/finance/quoteSummary/TCS.NS")
            .match_query(Matcher::UrlEncoded("crumb".into(), "fresh".into()))
            .with_body(summary_body())
            .expect(1)
            .create_async()
            .await;

        let provider = provider_for(&server).with_crumb("stale");
        let record = provider.fetch_quote(&tcs(), QuoteScope::Price).await.unwrap();
        assert_eq!(record["price"]["longName"], "Tata Consultancy Services Limited");

        stale.assert_async().await;
        fresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v10/finance/quoteSummary/BOGUS.NS")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(
                json!({
                    "quoteSummary": {
                        "result": null,
                        "error": {"code": "Not Found", "description": "Quote not found for symbol: BOGUS.NS"}
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = provider_for(&server).with_crumb("abc");
        let symbol = Symbol::normalize("bogus").unwrap();
        let err = provider
            .fetch_quote(&symbol, QuoteScope::Full)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(ref d) if d.contains("BOGUS.NS")));
    }

    #[tokio::test]
    async fn test_server_error_is_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v10/finance/quoteSummary/TCS.NS")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream down")
            .create_async()
            .await;

        let provider = provider_for(&server).with_crumb("abc");
        let err = provider
            .fetch_quote(&tcs(), QuoteScope::Price)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_year_range_from_candles() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/v8/finance/chart/TCS.NS")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("range".into(), "1y".into()),
                Matcher::UrlEncoded("interval".into(), "1d".into()),
            ]))
            .with_body(
                json!({
                    "chart": {
                        "result": [{
                            "meta": {"symbol": "TCS.NS"},
                            "indicators": {"quote": [{
                                "high": [3500.0, null, 4100.25, 3900.0],
                                "low": [3100.0, 3050.5, null, 3300.0]
                            }]}
                        }],
                        "error": null
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = provider_for(&server);
        let range = provider.fetch_year_range(&tcs()).await.unwrap();
        assert_eq!(
            range,
            Some(YearRange {
                high: 4100.25,
                low: 3050.5
            })
        );
    }

    #[test]
    fn test_year_range_falls_back_to_meta() {
        let body = json!({
            "chart": {
                "result": [{
                    "meta": {"fiftyTwoWeekHigh": 120.0, "fiftyTwoWeekLow": 80.0},
                    "indicators": {"quote": [{}]}
                }],
                "error": null
            }
        });
        assert_eq!(
            year_range_from_chart(&body).unwrap(),
            Some(YearRange {
                high: 120.0,
                low: 80.0
            })
        );
    }

    #[test]
    fn test_empty_summary_result_is_not_found() {
        let body = json!({"quoteSummary": {"result": [], "error": null}});
        assert!(matches!(
            summary_result(&tcs(), body),
            Err(ProviderError::NotFound(_))
        ));
    }
}
