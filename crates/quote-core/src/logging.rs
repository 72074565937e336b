//! tracing 기반 로깅 초기화.
//!
//! `[logging]` 설정 섹션에서 필터 레벨과 출력 형식(pretty, json, compact)을 읽습니다.
//! `RUST_LOG`가 설정되어 있으면 설정 파일의 레벨보다 우선합니다.

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;
use crate::error::QuoteError;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 개발용
    Pretty,
    /// 로그 수집기용
    Json,
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(QuoteError::Config(format!(
                "알 수 없는 logging.format '{}' (pretty, json, compact 중 하나)",
                s
            ))),
        }
    }
}

/// 검증된 로깅 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// 필터 지시문 (예: "info", "quote_data=debug,info")
    pub level: String,
    pub format: LogFormat,
    /// span 진입/종료 이벤트 출력 여부
    pub span_events: bool,
}

impl LogConfig {
    /// `[logging]` 섹션을 검증하여 생성합니다.
    pub fn from_settings(settings: &LoggingConfig) -> Result<Self, QuoteError> {
        Ok(Self {
            level: settings.level.clone(),
            format: settings.format.parse()?,
            span_events: settings.span_events,
        })
    }
}

/// 전역 tracing 구독자를 설치합니다.
///
/// ```no_run
/// use quote_core::{init_logging, AppConfig, LogConfig};
///
/// let config = AppConfig::default();
/// init_logging(LogConfig::from_settings(&config.logging)?)?;
/// # Ok::<(), quote_core::QuoteError>(())
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), QuoteError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            QuoteError::Config(format!("logging.level '{}': {}", config.level, e))
        })?,
    };

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
        .with_span_events(span_events);
    let fmt_layer = match config.format {
        LogFormat::Pretty => base.pretty().boxed(),
        LogFormat::Json => base.json().boxed(),
        LogFormat::Compact => base.compact().boxed(),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| QuoteError::Config(format!("로깅 초기화 실패: {}", e)))?;

    tracing::info!(
        format = ?config.format,
        level = %config.level,
        "Logging initialized"
    );

    Ok(())
}

/// 업스트림 조회 span (심볼, 데이터 종류 필드 포함).
#[macro_export]
macro_rules! quote_span {
    ($name:expr, $symbol:expr, $kind:expr) => {
        tracing::info_span!($name, symbol = %$symbol, kind = %$kind)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Compact ".parse::<LogFormat>().unwrap(), LogFormat::Compact);
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(QuoteError::Config(_))
        ));
    }

    #[test]
    fn test_from_settings() {
        let settings = LoggingConfig {
            level: "quote_data=debug,info".to_string(),
            format: "json".to_string(),
            span_events: true,
        };
        let config = LogConfig::from_settings(&settings).unwrap();
        assert_eq!(config.level, "quote_data=debug,info");
        assert_eq!(config.format, LogFormat::Json);
        assert!(config.span_events);
    }

    #[test]
    fn test_from_settings_rejects_unknown_format() {
        let settings = LoggingConfig {
            format: "xml".to_string(),
            ..LoggingConfig::default()
        };
        assert!(LogConfig::from_settings(&settings).is_err());
    }
}
