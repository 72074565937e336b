//! 다중 심볼 요청.

use super::symbol::{parse_symbol_list, Symbol};
use crate::error::QuoteError;

/// 배치 요청의 단일 항목.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    /// 사용자가 입력한 원본 문자열
    pub input: String,
    /// 정규화 결과
    pub symbol: Result<Symbol, QuoteError>,
}

impl BatchItem {
    /// 응답에 표시할 심볼 (정규화 실패 시 원본 입력).
    pub fn label(&self) -> String {
        match &self.symbol {
            Ok(symbol) => symbol.to_string(),
            Err(_) => self.input.clone(),
        }
    }
}

/// 순서가 유지되고 중복이 제거된 심볼 목록.
///
/// 최대 개수를 넘는 항목은 버려지고 `truncated`가 설정됩니다.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRequest {
    items: Vec<BatchItem>,
    truncated: bool,
}

impl BatchRequest {
    /// 쉼표로 구분된 목록을 파싱합니다.
    pub fn parse(raw: &str, default_suffix: &str, max_symbols: usize) -> Self {
        let mut items: Vec<BatchItem> = parse_symbol_list(raw, default_suffix)
            .into_iter()
            .map(|(input, symbol)| BatchItem { input, symbol })
            .collect();

        let truncated = items.len() > max_symbols;
        items.truncate(max_symbols);

        Self { items, truncated }
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    /// 최대 개수를 넘어 일부 항목이 버려졌는지 여부.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DEFAULT_SUFFIX;

    #[test]
    fn test_truncates_surplus_symbols() {
        let raw = (0..25).map(|i| format!("S{}", i)).collect::<Vec<_>>().join(",");
        let request = BatchRequest::parse(&raw, DEFAULT_SUFFIX, 20);

        assert_eq!(request.len(), 20);
        assert!(request.truncated());
        assert_eq!(request.items()[0].label(), "S0.NS");
        assert_eq!(request.items()[19].label(), "S19.NS");
    }

    #[test]
    fn test_duplicates_do_not_count_toward_limit() {
        let request = BatchRequest::parse("tcs,TCS.NS,infy", DEFAULT_SUFFIX, 2);
        assert_eq!(request.len(), 2);
        assert!(!request.truncated());
    }

    #[test]
    fn test_invalid_item_keeps_raw_label() {
        let request = BatchRequest::parse("tcs,$$$", DEFAULT_SUFFIX, 20);
        assert_eq!(request.items()[1].label(), "$$$");
        assert!(request.items()[1].symbol.is_err());
    }

    #[test]
    fn test_blank_input_is_empty() {
        assert!(BatchRequest::parse(" , ,", DEFAULT_SUFFIX, 20).is_empty());
    }
}
