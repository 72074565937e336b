//! 시세 데이터 조회 및 캐싱.
//!
//! 이 crate는 다음을 제공합니다:
//! - TTL 기반 인메모리 시세 캐시
//! - Yahoo Finance 시세 제공자
//! - 제공자 응답 → 안정된 스키마 변환
//! - 캐시 우선 조회와 동시 실행 한도가 있는 배치 조회를 담당하는 매니저

pub mod cache;
pub mod error;
pub mod manager;
pub mod mapper;
pub mod provider;

pub use cache::{CacheStats, QuoteCache};
pub use error::{ProviderError, Result};
pub use manager::*;
pub use provider::{QuoteProvider, QuoteScope, YahooQuoteProvider, YearRange};
