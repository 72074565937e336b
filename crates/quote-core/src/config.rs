//! 설정 관리.
//!
//! 이 모듈은 애플리케이션 설정을 정의하고 관리합니다.
//! 로드 순서: 기본값 → 설정 파일(선택) → `QUOTE__` 접두사 환경 변수.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::QuoteError;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// 캐시 설정
    pub cache: CacheConfig,
    /// 업스트림 조회 설정
    pub fetch: FetchConfig,
    /// 데이터 제공자 설정
    pub provider: ProviderConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 요청 전체 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_secs: 30,
        }
    }
}

/// 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 가격 데이터 TTL (초)
    pub price_ttl_secs: u64,
    /// 펀더멘털 데이터 TTL (초)
    pub fundamentals_ttl_secs: u64,
    /// 최대 엔트리 수 (초과 시 가장 오래된 엔트리 제거)
    pub max_entries: usize,
    /// 만료 엔트리 정리 주기 (초)
    pub sweep_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            price_ttl_secs: 30,
            fundamentals_ttl_secs: 3600,
            max_entries: 1000,
            sweep_interval_secs: 60,
        }
    }
}

impl CacheConfig {
    pub fn price_ttl(&self) -> Duration {
        Duration::from_secs(self.price_ttl_secs)
    }

    pub fn fundamentals_ttl(&self) -> Duration {
        Duration::from_secs(self.fundamentals_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// 업스트림 조회 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// 업스트림 호출당 타임아웃 (초)
    pub upstream_timeout_secs: u64,
    /// 배치 가격 조회 최대 심볼 수
    pub batch_max_symbols: usize,
    /// 배치 가격 조회 동시 실행 한도
    pub batch_concurrency: usize,
    /// 워치리스트 최대 심볼 수
    pub watchlist_max_symbols: usize,
    /// 워치리스트 동시 실행 한도
    pub watchlist_concurrency: usize,
    /// 접미사가 없는 심볼에 붙일 기본 거래소 접미사
    pub default_suffix: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            upstream_timeout_secs: 10,
            batch_max_symbols: 20,
            batch_concurrency: 10,
            watchlist_max_symbols: 15,
            watchlist_concurrency: 8,
            default_suffix: crate::types::DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl FetchConfig {
    pub fn upstream_timeout(&self) -> Duration {
        Duration::from_secs(self.upstream_timeout_secs)
    }

    /// 배치/워치리스트 요청 하나가 걸릴 수 있는 최대 시간 (초).
    ///
    /// 심볼 하나는 `upstream_timeout_secs` 안에 끝나므로
    /// 동시 실행 한도로 나눈 묶음 수에 타임아웃을 곱한 값이 상한입니다.
    pub fn worst_case_batch_secs(&self) -> u64 {
        let rounds = |max: usize, concurrency: usize| max.div_ceil(concurrency.max(1)) as u64;
        let worst_rounds = rounds(self.batch_max_symbols, self.batch_concurrency).max(rounds(
            self.watchlist_max_symbols,
            self.watchlist_concurrency,
        ));
        worst_rounds * self.upstream_timeout_secs
    }
}

/// Yahoo Finance 제공자 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// quoteSummary API 기본 URL
    pub quote_base_url: String,
    /// chart API 기본 URL
    pub chart_base_url: String,
    /// 세션 쿠키 발급 URL
    pub cookie_url: String,
    /// crumb 토큰 발급 URL
    pub crumb_url: String,
    /// User-Agent 헤더
    pub user_agent: String,
    /// 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            quote_base_url: "https://query2.finance.yahoo.com".to_string(),
            chart_base_url: "https://query1.finance.yahoo.com".to_string(),
            cookie_url: "https://fc.yahoo.com".to_string(),
            crumb_url: "https://query1.finance.yahoo.com/v1/test/getcrumb".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            connect_timeout_secs: 5,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// span 진입/종료 이벤트 출력 여부
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            span_events: false,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    /// 환경 변수 예: `QUOTE__CACHE__PRICE_TTL_SECS=15`, `QUOTE__LOGGING__LEVEL=debug`.
    /// 호스팅 환경 호환을 위해 `PORT`도 포트로 인식합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, QuoteError> {
        let builder = config::Config::builder()
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("QUOTE")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;

        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.server.port = port;
        }

        config.validate()?;
        Ok(config)
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, QuoteError> {
        Self::load("config/default.toml")
    }

    /// 설정 값의 유효성을 검사합니다.
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.cache.price_ttl_secs == 0 || self.cache.fundamentals_ttl_secs == 0 {
            return Err(QuoteError::Config("캐시 TTL은 0보다 커야 합니다".to_string()));
        }
        if self.cache.sweep_interval_secs == 0 {
            return Err(QuoteError::Config(
                "cache.sweep_interval_secs는 0보다 커야 합니다".to_string(),
            ));
        }
        if self.cache.max_entries == 0 {
            return Err(QuoteError::Config("cache.max_entries는 0보다 커야 합니다".to_string()));
        }
        if self.fetch.upstream_timeout_secs == 0 {
            return Err(QuoteError::Config(
                "fetch.upstream_timeout_secs는 0보다 커야 합니다".to_string(),
            ));
        }
        let limits = [
            self.fetch.batch_max_symbols,
            self.fetch.batch_concurrency,
            self.fetch.watchlist_max_symbols,
            self.fetch.watchlist_concurrency,
        ];
        if limits.contains(&0) {
            return Err(QuoteError::Config(
                "배치/워치리스트 한도는 0보다 커야 합니다".to_string(),
            ));
        }
        // 느린 업스트림이 요청 전체 타임아웃(408)으로 번지지 않도록
        let worst_case = self.fetch.worst_case_batch_secs();
        if self.server.request_timeout_secs <= worst_case {
            return Err(QuoteError::Config(format!(
                "server.request_timeout_secs({})는 배치 최대 소요 시간({}초)보다 커야 합니다",
                self.server.request_timeout_secs, worst_case
            )));
        }
        self.logging.format.parse::<crate::logging::LogFormat>()?;
        if self.fetch.default_suffix.trim_matches(|c: char| c == '.' || c.is_whitespace()).is_empty() {
            return Err(QuoteError::Config("fetch.default_suffix가 비어 있습니다".to_string()));
        }
        Ok(())
    }

    /// 바인딩 주소 문자열 (`host:port`).
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
