//! API 라우트.
//!
//! 모든 REST API 엔드포인트를 정의하고 라우터를 구성합니다.
//!
//! # 라우트 구조
//!
//! - `/` - 서비스 배너
//! - `/stock/{symbol}`, `/price/{symbol}`, `/summary/{symbol}` - 단일 심볼 시세
//! - `/batch/price`, `/watchlist` - 다중 심볼 시세
//! - `/popular/indian` - 인기 종목 목록
//! - `/health`, `/test` - 헬스 체크
//! - `/metrics` - 캐시/업스트림 통계

pub mod batch;
pub mod health;
pub mod metrics;
pub mod popular;
pub mod quotes;

pub use batch::{batch_router, BatchResponse, BatchSlot, SlotError, SlotStatus};
pub use health::{health_router, HealthResponse, LivenessResponse, ServiceBanner};
pub use self::metrics::{stats_router, StatsResponse};
pub use popular::{popular_router, PopularStocksResponse};
pub use quotes::quotes_router;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 모든 서브 라우터를 조합하여 하나의 라우터로 반환합니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health_router())
        .merge(quotes_router())
        .merge(batch_router())
        .merge(popular_router())
        .merge(stats_router())
}
