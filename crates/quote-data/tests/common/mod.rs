//! 통합 테스트용 스크립트 제공자.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quote_core::{AppConfig, Symbol};
use quote_data::{ProviderError, QuoteCache, QuoteManager, QuoteProvider, QuoteScope, YearRange};
use serde_json::{json, Value};

/// 심볼별 응답 스크립트.
#[derive(Clone)]
pub enum Reply {
    Quote(Value),
    Slow(Duration, Value),
    Fail(u16),
}

/// 미리 정해진 응답을 돌려주고 호출을 기록하는 제공자.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: HashMap<String, Reply>,
    year_range: Option<YearRange>,
    range_delay: Option<Duration>,
    calls: Mutex<Vec<(String, QuoteScope)>>,
    range_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(mut self, symbol: &str, reply: Reply) -> Self {
        self.replies.insert(symbol.to_string(), reply);
        self
    }

    pub fn with_year_range(mut self, high: f64, low: f64) -> Self {
        self.year_range = Some(YearRange { high, low });
        self
    }

    pub fn with_range_delay(mut self, delay: Duration) -> Self {
        self.range_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<(String, QuoteScope)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn range_calls(&self) -> usize {
        self.range_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

/// 취소(타임아웃) 시에도 진행 중 카운트를 되돌리는 가드.
struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl QuoteProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_quote(&self, symbol: &Symbol, scope: QuoteScope) -> Result<Value, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((symbol.to_string(), scope));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlight(&self.in_flight);

        match self.replies.get(symbol.as_str()) {
            Some(Reply::Quote(value)) => Ok(value.clone()),
            Some(Reply::Slow(delay, value)) => {
                tokio::time::sleep(*delay).await;
                Ok(value.clone())
            }
            Some(Reply::Fail(status)) => Err(ProviderError::Status {
                status: *status,
                body: "scripted failure".to_string(),
            }),
            None => Err(ProviderError::NotFound(format!(
                "Quote not found for symbol: {}",
                symbol
            ))),
        }
    }

    async fn fetch_year_range(&self, _symbol: &Symbol) -> Result<Option<YearRange>, ProviderError> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.range_delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.year_range)
    }
}

/// quoteSummary 형식의 레코드.
pub fn quote_record(name: &str, price: f64) -> Value {
    json!({
        "price": {
            "longName": name,
            "regularMarketPrice": {"raw": price, "fmt": price.to_string()},
            "regularMarketPreviousClose": {"raw": price - 10.0, "fmt": ""},
            "currency": "INR"
        },
        "summaryDetail": {
            "trailingPE": {"raw": 25.0, "fmt": "25.00"},
            "fiftyTwoWeekHigh": {"raw": price * 1.2, "fmt": ""},
            "fiftyTwoWeekLow": {"raw": price * 0.8, "fmt": ""}
        },
        "defaultKeyStatistics": {
            "trailingEps": {"raw": 100.0, "fmt": "100.00"}
        }
    })
}

/// 52주 범위가 없는 레코드 (차트 보완 조회 유도).
pub fn record_without_range(name: &str, price: f64) -> Value {
    json!({
        "price": {
            "longName": name,
            "regularMarketPrice": {"raw": price, "fmt": price.to_string()}
        },
        "summaryDetail": {"trailingPE": {"raw": 20.0, "fmt": "20.00"}}
    })
}

/// 기본 설정으로 매니저 생성.
pub fn manager_with(provider: Arc<ScriptedProvider>) -> QuoteManager {
    let config = AppConfig::default();
    let cache = Arc::new(QuoteCache::from_config(&config.cache));
    QuoteManager::new(provider, cache, config.fetch)
}
