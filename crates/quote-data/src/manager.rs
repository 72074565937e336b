//! 시세 조회 매니저.
//!
//! 캐시와 업스트림 제공자 사이를 조정합니다:
//! 심볼별로 캐시를 먼저 확인하고, 미스인 경우에만 제공자를 호출한 뒤 결과를
//! 데이터 종류의 TTL로 저장합니다. 다중 심볼 요청은 동시 실행 한도 내에서
//! 병렬로 조회하며 입력 순서를 유지합니다.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use quote_core::{
    BatchItem, BatchRequest, CacheKind, FetchConfig, FundamentalsSnapshot, PriceRecord, PriceSnapshot,
    QuoteDetail, QuoteError, QuoteRecord, QuoteResult, StockRecord, SummaryRecord, Symbol,
};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, warn, Instrument};

use crate::cache::QuoteCache;
use crate::error::ProviderError;
use crate::mapper;
use crate::provider::{QuoteProvider, QuoteScope};

/// 배치 요청의 심볼별 결과.
#[derive(Debug, Clone)]
pub struct BatchOutcome<T> {
    /// 정규화된 심볼 (정규화 실패 시 원본 입력)
    pub symbol: String,
    pub result: QuoteResult<T>,
}

/// 업스트림 호출 통계.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpstreamStats {
    pub fetches: u64,
    pub failures: u64,
    pub timeouts: u64,
}

#[derive(Debug, Default)]
struct UpstreamCounters {
    fetches: AtomicU64,
    failures: AtomicU64,
    timeouts: AtomicU64,
}

/// 캐시와 제공자를 조정하는 시세 매니저.
pub struct QuoteManager {
    provider: Arc<dyn QuoteProvider>,
    cache: Arc<QuoteCache>,
    config: FetchConfig,
    counters: UpstreamCounters,
}

impl QuoteManager {
    pub fn new(
        provider: Arc<dyn QuoteProvider>,
        cache: Arc<QuoteCache>,
        config: FetchConfig,
    ) -> Self {
        Self {
            provider,
            cache,
            config,
            counters: UpstreamCounters::default(),
        }
    }

    pub fn cache(&self) -> &Arc<QuoteCache> {
        &self.cache
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// 설정된 기본 접미사로 입력을 정규화합니다.
    pub fn normalize(&self, input: &str) -> QuoteResult<Symbol> {
        Symbol::normalize_with_suffix(input, &self.config.default_suffix)
    }

    /// 배치 가격 요청을 파싱합니다 (`batch_max_symbols` 적용).
    pub fn batch_request(&self, raw: &str) -> BatchRequest {
        BatchRequest::parse(raw, &self.config.default_suffix, self.config.batch_max_symbols)
    }

    /// 워치리스트 요청을 파싱합니다 (`watchlist_max_symbols` 적용).
    pub fn watchlist_request(&self, raw: &str) -> BatchRequest {
        BatchRequest::parse(
            raw,
            &self.config.default_suffix,
            self.config.watchlist_max_symbols,
        )
    }

    pub fn upstream_stats(&self) -> UpstreamStats {
        UpstreamStats {
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            timeouts: self.counters.timeouts.load(Ordering::Relaxed),
        }
    }

    /// 가격 레코드 조회.
    pub async fn price(&self, symbol: &Symbol) -> QuoteResult<PriceRecord> {
        if let Some(price) = self.cache.get_price(symbol).await {
            debug!(symbol = %symbol, "Price served from cache");
            return Ok(PriceRecord { price, cached: true });
        }

        let price = self.fetch_price(symbol).await?;
        Ok(PriceRecord {
            price,
            cached: false,
        })
    }

    /// 펀더멘털 스냅샷 조회.
    pub async fn fundamentals(&self, symbol: &Symbol) -> QuoteResult<FundamentalsSnapshot> {
        if let Some(fundamentals) = self.cache.get_fundamentals(symbol).await {
            debug!(symbol = %symbol, "Fundamentals served from cache");
            return Ok(fundamentals);
        }

        let (_, fundamentals) = self.fetch_full(symbol).await?;
        Ok(fundamentals)
    }

    /// 전체 레코드 조회.
    ///
    /// 가격과 펀더멘털이 모두 캐시에 있으면 업스트림을 호출하지 않고,
    /// 그렇지 않으면 전체 범위 조회를 한 번 수행해 둘 다 갱신합니다.
    pub async fn stock(&self, symbol: &Symbol) -> QuoteResult<StockRecord> {
        let price = self.cache.get_price(symbol).await;
        let fundamentals = self.cache.get_fundamentals(symbol).await;

        if let (Some(price), Some(fundamentals)) = (price, fundamentals) {
            debug!(symbol = %symbol, "Stock record served from cache");
            return Ok(StockRecord {
                price,
                fundamentals,
                cached: true,
            });
        }

        let (price, fundamentals) = self.fetch_full(symbol).await?;
        Ok(StockRecord {
            price,
            fundamentals,
            cached: false,
        })
    }

    /// 요약 레코드 조회.
    pub async fn summary(&self, symbol: &Symbol) -> QuoteResult<SummaryRecord> {
        self.stock(symbol).await.map(SummaryRecord::from)
    }

    /// 상세 수준에 따른 레코드 조회.
    pub async fn quote(&self, symbol: &Symbol, detail: QuoteDetail) -> QuoteResult<QuoteRecord> {
        match detail {
            QuoteDetail::Price => self.price(symbol).await.map(QuoteRecord::Price),
            QuoteDetail::Summary => self.summary(symbol).await.map(QuoteRecord::Summary),
            QuoteDetail::Full => self.stock(symbol).await.map(QuoteRecord::Full),
        }
    }

    /// 여러 심볼의 가격을 조회합니다.
    ///
    /// 최대 `batch_concurrency`개를 동시에 조회하며, 결과는 입력 순서를 따릅니다.
    /// 한 심볼의 실패는 해당 슬롯에만 영향을 줍니다.
    pub async fn batch_prices(&self, request: &BatchRequest) -> Vec<BatchOutcome<PriceRecord>> {
        let slots: Vec<_> = request
            .items()
            .iter()
            .map(|item| self.price_slot(item))
            .collect();

        stream::iter(slots)
            .buffered(self.config.batch_concurrency)
            .collect::<Vec<_>>()
            .await
    }

    /// 워치리스트 조회 (최대 `watchlist_concurrency`개 동시 실행).
    pub async fn watchlist(
        &self,
        request: &BatchRequest,
        detail: QuoteDetail,
    ) -> Vec<BatchOutcome<QuoteRecord>> {
        let slots: Vec<_> = request
            .items()
            .iter()
            .map(|item| self.quote_slot(item, detail))
            .collect();

        stream::iter(slots)
            .buffered(self.config.watchlist_concurrency)
            .collect::<Vec<_>>()
            .await
    }

    async fn price_slot(&self, item: &BatchItem) -> BatchOutcome<PriceRecord> {
        let result = match &item.symbol {
            Ok(symbol) => self.price(symbol).await,
            Err(e) => Err(e.clone()),
        };
        BatchOutcome {
            symbol: item.label(),
            result,
        }
    }

    async fn quote_slot(&self, item: &BatchItem, detail: QuoteDetail) -> BatchOutcome<QuoteRecord> {
        let result = match &item.symbol {
            Ok(symbol) => self.quote(symbol, detail).await,
            Err(e) => Err(e.clone()),
        };
        BatchOutcome {
            symbol: item.label(),
            result,
        }
    }

    /// 가격 범위 조회 후 캐시에 저장.
    async fn fetch_price(&self, symbol: &Symbol) -> QuoteResult<PriceSnapshot> {
        let record = self
            .call_upstream(
                symbol,
                CacheKind::Price,
                self.config.upstream_timeout(),
                self.provider.fetch_quote(symbol, QuoteScope::Price),
            )
            .await?;

        let price = mapper::map_price(symbol, &record, now())?;
        self.cache.put(symbol, price.clone()).await;
        Ok(price)
    }

    /// 전체 범위 조회 후 가격과 펀더멘털을 모두 캐시에 저장.
    ///
    /// 52주 범위 보완 조회까지 포함해 `upstream_timeout` 하나의 예산 안에서 끝납니다.
    /// 예산이 남지 않으면 보완 조회를 건너뜁니다.
    async fn fetch_full(
        &self,
        symbol: &Symbol,
    ) -> QuoteResult<(PriceSnapshot, FundamentalsSnapshot)> {
        let deadline = Instant::now() + self.config.upstream_timeout();
        let record = self
            .call_upstream(
                symbol,
                CacheKind::Fundamentals,
                self.config.upstream_timeout(),
                self.provider.fetch_quote(symbol, QuoteScope::Full),
            )
            .await?;

        let (price, mut fundamentals) = mapper::map_full(symbol, &record, now())?;

        let missing_range = fundamentals.fifty_two_week_high.is_none()
            || fundamentals.fifty_two_week_low.is_none();
        let remaining = deadline.saturating_duration_since(Instant::now());
        if missing_range && remaining.is_zero() {
            debug!(symbol = %symbol, "No time left for 52-week range fallback");
        } else if missing_range {
            match self
                .call_upstream(
                    symbol,
                    CacheKind::Fundamentals,
                    remaining,
                    self.provider.fetch_year_range(symbol),
                )
                .await
            {
                Ok(Some(range)) => {
                    fundamentals.fifty_two_week_high.get_or_insert(range.high);
                    fundamentals.fifty_two_week_low.get_or_insert(range.low);
                }
                Ok(None) => debug!(symbol = %symbol, "No candles for 52-week range"),
                Err(e) => debug!(symbol = %symbol, error = %e, "52-week range fallback failed"),
            }
        }

        self.cache.put(symbol, price.clone()).await;
        self.cache.put(symbol, fundamentals.clone()).await;
        Ok((price, fundamentals))
    }

    /// 업스트림 호출에 타임아웃과 통계를 적용합니다.
    async fn call_upstream<T, F>(
        &self,
        symbol: &Symbol,
        kind: CacheKind,
        budget: Duration,
        call: F,
    ) -> QuoteResult<T>
    where
        F: Future<Output = Result<T, ProviderError>>,
    {
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);
        let span = quote_core::quote_span!("upstream_fetch", symbol, kind);

        let err = match tokio::time::timeout(budget, call.instrument(span)).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => e.into_quote_error(symbol),
            Err(_) => {
                self.counters.timeouts.fetch_add(1, Ordering::Relaxed);
                QuoteError::UpstreamTimeout {
                    symbol: symbol.to_string(),
                    timeout_secs: self.config.upstream_timeout_secs,
                }
            }
        };

        self.counters.failures.fetch_add(1, Ordering::Relaxed);
        if err.is_upstream_failure() {
            warn!(
                symbol = %symbol,
                provider = self.provider.name(),
                error = %err,
                "Upstream fetch failed"
            );
        } else {
            // 알 수 없는 심볼 등 데이터 없음
            debug!(symbol = %symbol, error = %err, "Upstream returned no data");
        }
        Err(err)
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}
