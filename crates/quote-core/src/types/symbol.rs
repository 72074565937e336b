//! 심볼 및 거래소 정의.
//!
//! 이 모듈은 시세 조회용 심볼 타입을 정의합니다:
//! - `Exchange` - 인도 거래소 (NSE, BSE)
//! - `Symbol` - 거래소 접미사가 붙은 정규화된 티커

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuoteError;

/// 기본 거래소 접미사 (NSE).
pub const DEFAULT_SUFFIX: &str = ".NS";

/// 심볼 최대 길이 (접미사 포함).
const MAX_SYMBOL_LEN: usize = 32;

/// 인도 거래소.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exchange {
    /// National Stock Exchange
    Nse,
    /// Bombay Stock Exchange
    Bse,
}

impl Exchange {
    /// 인식되는 모든 거래소.
    pub const ALL: [Exchange; 2] = [Exchange::Nse, Exchange::Bse];

    /// Yahoo Finance 심볼 접미사.
    pub fn suffix(&self) -> &'static str {
        match self {
            Exchange::Nse => ".NS",
            Exchange::Bse => ".BO",
        }
    }
}

/// 정규화된 티커 심볼.
///
/// 항상 대문자이며 거래소 접미사로 끝납니다 (예: `TCS.NS`, `RELIANCE.BO`).
/// 캐시 키와 업스트림 요청에 그대로 사용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "utoipa-support", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// 기본 접미사(`.NS`)로 사용자 입력을 정규화합니다.
    ///
    /// ```
    /// use quote_core::Symbol;
    ///
    /// let a = Symbol::normalize("tcs").unwrap();
    /// let b = Symbol::normalize("TCS.NS").unwrap();
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str(), "TCS.NS");
    /// ```
    pub fn normalize(input: &str) -> Result<Self, QuoteError> {
        Self::normalize_with_suffix(input, DEFAULT_SUFFIX)
    }

    /// 지정한 기본 접미사로 사용자 입력을 정규화합니다.
    ///
    /// 입력을 trim 후 대문자로 바꾸고, 인식되는 거래소 접미사(`.NS`, `.BO`)로
    /// 끝나지 않으면 `default_suffix`를 붙입니다.
    pub fn normalize_with_suffix(input: &str, default_suffix: &str) -> Result<Self, QuoteError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(QuoteError::invalid_symbol(input, "심볼이 비어 있습니다"));
        }

        let upper = trimmed.to_ascii_uppercase();
        if let Some(bad) = upper
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '&')))
        {
            return Err(QuoteError::invalid_symbol(
                input,
                format!("허용되지 않는 문자 '{}'", bad),
            ));
        }

        let body = match Self::recognized_suffix(&upper) {
            Some(exchange) => &upper[..upper.len() - exchange.suffix().len()],
            None => upper.as_str(),
        };
        if body.trim_matches('.').is_empty() {
            return Err(QuoteError::invalid_symbol(input, "티커 본문이 비어 있습니다"));
        }

        let canonical = if Self::recognized_suffix(&upper).is_some() {
            upper
        } else {
            let suffix = default_suffix.trim().to_ascii_uppercase();
            if suffix.starts_with('.') {
                format!("{}{}", upper, suffix)
            } else {
                format!("{}.{}", upper, suffix)
            }
        };

        if canonical.len() > MAX_SYMBOL_LEN {
            return Err(QuoteError::invalid_symbol(
                input,
                format!("심볼이 너무 깁니다 (최대 {}자)", MAX_SYMBOL_LEN),
            ));
        }

        Ok(Self(canonical))
    }

    /// 인식되는 거래소 접미사로 끝나면 해당 거래소 반환.
    fn recognized_suffix(upper: &str) -> Option<Exchange> {
        Exchange::ALL
            .into_iter()
            .find(|exchange| upper.ends_with(exchange.suffix()))
    }

    /// 정규화된 심볼 문자열.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Symbol {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::normalize(s)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 쉼표로 구분된 심볼 목록을 파싱합니다.
///
/// 빈 항목은 건너뛰고, 입력 순서를 유지하며 중복을 제거합니다.
/// 각 항목은 원본 입력과 정규화 결과의 쌍으로 반환되므로
/// 잘못된 항목도 해당 위치에서 보고할 수 있습니다.
pub fn parse_symbol_list(
    raw: &str,
    default_suffix: &str,
) -> Vec<(String, Result<Symbol, QuoteError>)> {
    let mut seen = std::collections::HashSet::new();
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .filter_map(|item| {
            let parsed = Symbol::normalize_with_suffix(item, default_suffix);
            let key = match &parsed {
                Ok(symbol) => symbol.as_str().to_string(),
                Err(_) => item.to_ascii_uppercase(),
            };
            seen.insert(key).then(|| (item.to_string(), parsed))
        })
        .collect()
}
