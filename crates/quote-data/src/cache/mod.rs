//! 인메모리 캐시 모듈.
//!
//! - `QuoteCache`: (심볼, 종류)별 TTL 캐시 (가격 30초, 펀더멘털 1시간 기본값)
//! - `CacheStats`: 적중/미스/제거 통계

mod stats;
mod store;

pub use stats::CacheStats;
pub use store::QuoteCache;
