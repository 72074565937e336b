//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! AppState는 프로세스 시작 시 한 번 생성되어 Arc로 공유됩니다.
//! 캐시는 전역 변수가 아니라 상태를 통해 주입됩니다.

use std::sync::Arc;

use quote_core::{AppConfig, QuoteError, QuoteResult};
use quote_data::{QuoteCache, QuoteManager, QuoteProvider, YahooQuoteProvider};

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 핸들러에 주입됩니다.
#[derive(Clone)]
pub struct AppState {
    /// 시세 매니저 - 캐시 우선 조회, 배치 조회
    pub manager: Arc<QuoteManager>,

    /// 시세 캐시 (매니저와 공유, 스위퍼가 주기적으로 정리)
    pub cache: Arc<QuoteCache>,

    /// 로드된 설정
    pub config: Arc<AppConfig>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// Yahoo Finance 제공자로 상태 생성.
    pub fn new(config: AppConfig) -> QuoteResult<Self> {
        let provider = YahooQuoteProvider::new(config.provider.clone())
            .map_err(|e| QuoteError::Config(format!("HTTP 클라이언트 생성 실패: {}", e)))?;
        Ok(Self::with_provider(config, Arc::new(provider)))
    }

    /// 지정한 제공자로 상태 생성.
    pub fn with_provider(config: AppConfig, provider: Arc<dyn QuoteProvider>) -> Self {
        let cache = Arc::new(QuoteCache::from_config(&config.cache));
        let manager = QuoteManager::new(provider, cache.clone(), config.fetch.clone());

        Self {
            manager: Arc::new(manager),
            cache,
            config: Arc::new(config),
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (chrono::Utc::now() - self.started_at).num_seconds()
    }
}

/// 테스트용 상태 생성.
///
/// 모든 업스트림 URL을 `base_url`(mockito 서버)로 돌리고
/// crumb을 미리 설정하여 쿠키/crumb 요청을 생략합니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state(base_url: &str) -> AppState {
    let mut config = AppConfig::default();
    config.provider.quote_base_url = base_url.to_string();
    config.provider.chart_base_url = base_url.to_string();
    config.provider.cookie_url = format!("{}/cookie", base_url);
    config.provider.crumb_url = format!("{}/v1/test/getcrumb", base_url);

    let provider = YahooQuoteProvider::new(config.provider.clone())
        .expect("Failed to create provider for test")
        .with_crumb("test-crumb");

    AppState::with_provider(config, Arc::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_state_shares_cache_with_manager() {
        let state = create_test_state("http://127.0.0.1:1");
        assert!(Arc::ptr_eq(&state.cache, state.manager.cache()));
        assert!(state.cache.is_empty().await);
        assert!(state.uptime_secs() >= 0);
        assert!(!state.version.is_empty());
    }

    #[test]
    fn test_new_with_default_config() {
        let state = AppState::new(AppConfig::default()).unwrap();
        assert_eq!(state.manager.config().batch_max_symbols, 20);
        assert_eq!(state.config.server.port, 8000);
    }
}
