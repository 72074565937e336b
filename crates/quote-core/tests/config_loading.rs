//! 설정 파일 로딩 통합 테스트.

use std::time::Duration;

use quote_core::{AppConfig, BatchRequest, QuoteError};

fn write_config(name: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!("quote-core-{}-{}.toml", name, std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_missing_file_uses_defaults() {
    let config = AppConfig::load("does/not/exist.toml").unwrap();
    assert_eq!(config.cache.price_ttl(), Duration::from_secs(30));
    assert_eq!(config.fetch.watchlist_max_symbols, 15);
}

#[test]
fn test_file_overrides_defaults() {
    let path = write_config(
        "override",
        r#"
[cache]
price_ttl_secs = 15
max_entries = 50

[fetch]
batch_max_symbols = 5
default_suffix = ".BO"
"#,
    );

    let config = AppConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(config.cache.price_ttl(), Duration::from_secs(15));
    assert_eq!(config.cache.fundamentals_ttl(), Duration::from_secs(3600));
    assert_eq!(config.cache.max_entries, 50);

    // 로드된 설정으로 배치 요청 파싱
    let request = BatchRequest::parse(
        "tcs,infy,sbin,itc,wipro,hcltech",
        &config.fetch.default_suffix,
        config.fetch.batch_max_symbols,
    );
    assert!(request.truncated());
    assert_eq!(request.len(), 5);
    assert_eq!(request.items()[0].label(), "TCS.BO");
}

#[test]
fn test_invalid_file_values_are_rejected() {
    let path = write_config(
        "invalid",
        r#"
[cache]
price_ttl_secs = 0
"#,
    );

    let result = AppConfig::load(&path);
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(QuoteError::Config(_))));
}

#[test]
fn test_zero_sweep_interval_is_rejected() {
    let path = write_config(
        "zero-sweep",
        r#"
[cache]
sweep_interval_secs = 0
"#,
    );

    let result = AppConfig::load(&path);
    std::fs::remove_file(&path).ok();

    assert!(matches!(result, Err(QuoteError::Config(_))));
}

#[test]
fn test_request_timeout_must_cover_batch_latency() {
    let path = write_config(
        "short-request-timeout",
        r#"
[server]
request_timeout_secs = 20

[fetch]
upstream_timeout_secs = 10
"#,
    );

    let result = AppConfig::load(&path);
    std::fs::remove_file(&path).ok();

    // 2회차 × 10초 = 20초이므로 20초 요청 타임아웃은 부족함
    assert!(matches!(result, Err(QuoteError::Config(_))));
}
