//! TTL 기반 인메모리 시세 캐시.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use quote_core::{CacheConfig, CacheKind, FundamentalsSnapshot, PriceSnapshot, Snapshot, Symbol};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::stats::{CacheStats, Counters};

type CacheKey = (Symbol, CacheKind);

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: Snapshot,
    created_at: Instant,
}

/// (심볼, 데이터 종류)별 스냅샷 캐시.
///
/// 엔트리는 `now - created_at < ttl(kind)`인 동안만 유효하며, 만료된 엔트리는
/// 물리적으로 남아 있어도 반환되지 않습니다. 만료 엔트리는 읽기 시점에 제거되고,
/// `spawn_sweeper`가 주기적으로 정리합니다. 엔트리 수가 `max_entries`에 도달하면
/// 새 키를 넣기 전에 가장 오래된 엔트리를 제거합니다.
#[derive(Debug)]
pub struct QuoteCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    price_ttl: Duration,
    fundamentals_ttl: Duration,
    max_entries: usize,
    counters: Counters,
}

impl QuoteCache {
    /// 새 캐시 생성.
    pub fn new(price_ttl: Duration, fundamentals_ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            price_ttl,
            fundamentals_ttl,
            max_entries: max_entries.max(1),
            counters: Counters::default(),
        }
    }

    /// 설정에서 캐시 생성.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(
            config.price_ttl(),
            config.fundamentals_ttl(),
            config.max_entries,
        )
    }

    /// 데이터 종류별 TTL.
    pub fn ttl(&self, kind: CacheKind) -> Duration {
        match kind {
            CacheKind::Price => self.price_ttl,
            CacheKind::Fundamentals => self.fundamentals_ttl,
        }
    }

    fn is_fresh(&self, kind: CacheKind, entry: &CacheEntry, now: Instant) -> bool {
        now.duration_since(entry.created_at) < self.ttl(kind)
    }

    /// 유효한 엔트리가 있으면 스냅샷을 반환합니다.
    pub async fn get(&self, symbol: &Symbol, kind: CacheKind) -> Option<Snapshot> {
        let key = (symbol.clone(), kind);
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                Some(entry) if self.is_fresh(kind, entry, now) => {
                    self.counters.hit();
                    return Some(entry.snapshot.clone());
                }
                Some(_) => {}
                None => {
                    self.counters.miss();
                    return None;
                }
            }
        }

        // 만료된 엔트리: 쓰기 잠금을 잡은 뒤 다시 확인하고 제거
        let mut entries = self.entries.write().await;
        let still_expired = entries
            .get(&key)
            .is_some_and(|entry| !self.is_fresh(kind, entry, Instant::now()));
        if still_expired {
            entries.remove(&key);
            self.counters.expired(1);
            debug!(symbol = %symbol, kind = %kind, "Expired cache entry removed on read");
        }
        self.counters.miss();
        None
    }

    /// 가격 스냅샷 조회.
    pub async fn get_price(&self, symbol: &Symbol) -> Option<PriceSnapshot> {
        self.get(symbol, CacheKind::Price)
            .await
            .and_then(Snapshot::into_price)
    }

    /// 펀더멘털 스냅샷 조회.
    pub async fn get_fundamentals(&self, symbol: &Symbol) -> Option<FundamentalsSnapshot> {
        self.get(symbol, CacheKind::Fundamentals)
            .await
            .and_then(Snapshot::into_fundamentals)
    }

    /// 스냅샷을 저장합니다. TTL 클래스는 스냅샷 종류에서 결정됩니다.
    ///
    /// 같은 키에 다시 쓰면 만료 시각이 초기화됩니다.
    pub async fn put(&self, symbol: &Symbol, snapshot: impl Into<Snapshot>) {
        let snapshot = snapshot.into();
        let key = (symbol.clone(), snapshot.kind());
        let mut entries = self.entries.write().await;

        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.created_at)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                self.counters.evicted();
                debug!(symbol = %oldest.0, kind = %oldest.1, "Cache full, evicted oldest entry");
            }
        }

        entries.insert(
            key,
            CacheEntry {
                snapshot,
                created_at: Instant::now(),
            },
        );
    }

    /// 만료된 엔트리를 모두 제거하고 제거한 개수를 반환합니다.
    pub async fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|(_, kind), entry| self.is_fresh(*kind, entry, now));
        let removed = before - entries.len();
        self.counters.expired(removed);
        removed
    }

    /// 주기적으로 `sweep`을 실행하는 백그라운드 작업을 시작합니다.
    ///
    /// 토큰이 취소되면 종료합니다.
    pub fn spawn_sweeper(
        self: Arc<Self>,
        interval: Duration,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // 첫 tick은 즉시 완료되므로 건너뜀
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("Cache sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let removed = self.sweep().await;
                        if removed > 0 {
                            debug!(removed, "Swept expired cache entries");
                        }
                    }
                }
            }
        })
    }

    /// 저장된 엔트리 수 (만료되었지만 아직 제거되지 않은 엔트리 포함).
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// 캐시 통계.
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let price_entries = entries
            .keys()
            .filter(|(_, kind)| *kind == CacheKind::Price)
            .count();
        let fundamentals_entries = entries.len() - price_entries;
        self.counters.snapshot(price_entries, fundamentals_entries)
    }
}
