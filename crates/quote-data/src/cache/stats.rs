//! 캐시 통계.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// 캐시 통계 스냅샷.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// 현재 저장된 엔트리 수 (만료되었지만 아직 제거되지 않은 엔트리 포함)
    pub entries: usize,
    pub price_entries: usize,
    pub fundamentals_entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// 크기 제한으로 제거된 엔트리 수
    pub evictions: u64,
    /// 만료로 제거된 엔트리 수 (읽기 시 또는 정리 작업)
    pub expirations: u64,
    /// 적중률 (0.0 ~ 1.0)
    pub hit_ratio: f64,
}

/// 잠금 없이 갱신되는 카운터.
#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
    pub expirations: AtomicU64,
}

impl Counters {
    pub fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn evicted(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn expired(&self, count: usize) {
        self.expirations.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// 엔트리 수와 합쳐 통계를 만듭니다.
    pub fn snapshot(&self, price_entries: usize, fundamentals_entries: usize) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;

        CacheStats {
            entries: price_entries + fundamentals_entries,
            price_entries,
            fundamentals_entries,
            hits,
            misses,
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            hit_ratio: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
        }
    }
}
