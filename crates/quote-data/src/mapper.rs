//! Yahoo quoteSummary 레코드를 안정된 스키마로 변환.
//!
//! Yahoo는 대부분의 수치를 `{"raw": 0.0123, "fmt": "1.23%"}` 형태로 감싸고,
//! 값이 없을 때는 빈 객체 `{}`를 반환합니다. 이 모듈은:
//! - 래퍼를 풀어 `raw` 값을 사용하고, 빈 객체와 유한하지 않은 값은 "알 수 없음"으로 처리
//! - 중복 제공되는 필드는 정해진 순서로 대체 (예: `regularMarketPrice` → `currentPrice`)
//! - 분수로 제공되는 비율은 퍼센트로 변환 (0.0123 → 1.23)
//!
//! 누락된 값은 `None`(JSON `null`)으로 남기며 0으로 채우지 않습니다.

use quote_core::{FundamentalsSnapshot, PriceSnapshot, QuoteError, Symbol};
use serde_json::Value;

static NULL: Value = Value::Null;

/// quoteSummary 결과의 모듈 묶음.
struct Modules<'a> {
    price: &'a Value,
    summary_detail: &'a Value,
    key_stats: &'a Value,
    financial: &'a Value,
    profile: &'a Value,
}

impl<'a> Modules<'a> {
    fn new(record: &'a Value) -> Self {
        let module = |name: &str| record.get(name).unwrap_or(&NULL);
        Self {
            price: module("price"),
            summary_detail: module("summaryDetail"),
            key_stats: module("defaultKeyStatistics"),
            financial: module("financialData"),
            profile: module("assetProfile"),
        }
    }
}

/// 수치 값을 꺼냅니다. `{raw, fmt}` 래퍼를 풀고 유한한 값만 허용합니다.
fn number(module: &Value, key: &str) -> Option<f64> {
    let value = module.get(key)?;
    let raw = match value {
        Value::Object(map) => map.get("raw")?,
        other => other,
    };
    raw.as_f64().filter(|v| v.is_finite())
}

fn integer(module: &Value, key: &str) -> Option<u64> {
    number(module, key)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u64)
}

fn timestamp(module: &Value, key: &str) -> Option<i64> {
    number(module, key).map(|v| v as i64)
}

fn text(module: &Value, key: &str) -> Option<String> {
    module
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// 분수 비율을 퍼센트로 변환 (소수점 2자리).
fn percent(fraction: Option<f64>) -> Option<f64> {
    fraction.map(|f| round2(f * 100.0))
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn company_name(m: &Modules<'_>) -> Option<String> {
    text(m.price, "longName").or_else(|| text(m.price, "shortName"))
}

fn build_price(symbol: &Symbol, m: &Modules<'_>, fetched_at: i64) -> PriceSnapshot {
    // 가격 전용 조회는 price 모듈만 받으므로 price 모듈을 우선
    let current_price =
        number(m.price, "regularMarketPrice").or_else(|| number(m.financial, "currentPrice"));
    let previous_close = number(m.price, "regularMarketPreviousClose")
        .or_else(|| number(m.summary_detail, "previousClose"))
        .or_else(|| number(m.summary_detail, "regularMarketPreviousClose"));

    let change = number(m.price, "regularMarketChange").or_else(|| {
        match (current_price, previous_close) {
            (Some(current), Some(previous)) => Some(current - previous),
            _ => None,
        }
    });
    let change_percent = percent(number(m.price, "regularMarketChangePercent")).or_else(|| {
        match (change, previous_close) {
            (Some(change), Some(previous)) if previous != 0.0 => {
                Some(round2(change / previous * 100.0))
            }
            _ => None,
        }
    });

    PriceSnapshot {
        symbol: symbol.clone(),
        current_price,
        change,
        change_percent,
        open: number(m.price, "regularMarketOpen").or_else(|| number(m.summary_detail, "open")),
        day_high: number(m.price, "regularMarketDayHigh")
            .or_else(|| number(m.summary_detail, "dayHigh")),
        day_low: number(m.price, "regularMarketDayLow")
            .or_else(|| number(m.summary_detail, "dayLow")),
        previous_close,
        volume: integer(m.price, "regularMarketVolume")
            .or_else(|| integer(m.summary_detail, "volume")),
        currency: text(m.price, "currency").or_else(|| text(m.summary_detail, "currency")),
        last_market_update: timestamp(m.price, "regularMarketTime"),
        timestamp: fetched_at,
    }
}

fn build_fundamentals(m: &Modules<'_>, fetched_at: i64) -> FundamentalsSnapshot {
    let (sd, ks, fd, profile) = (m.summary_detail, m.key_stats, m.financial, m.profile);

    FundamentalsSnapshot {
        name: company_name(m),

        market_cap: number(m.price, "marketCap").or_else(|| number(sd, "marketCap")),
        average_volume: integer(sd, "averageVolume")
            .or_else(|| integer(m.price, "averageDailyVolume3Month")),
        fifty_two_week_high: number(sd, "fiftyTwoWeekHigh"),
        fifty_two_week_low: number(sd, "fiftyTwoWeekLow"),
        fifty_two_week_change: percent(number(ks, "52WeekChange")),
        fifty_day_average: number(sd, "fiftyDayAverage"),
        two_hundred_day_average: number(sd, "twoHundredDayAverage"),

        pe_ratio: number(sd, "trailingPE")
            .or_else(|| number(sd, "forwardPE"))
            .or_else(|| number(ks, "forwardPE")),
        peg_ratio: number(ks, "pegRatio"),
        price_to_book: number(ks, "priceToBook"),
        price_to_sales: number(sd, "priceToSalesTrailing12Months"),
        enterprise_value: number(ks, "enterpriseValue"),
        ev_to_revenue: number(ks, "enterpriseToRevenue"),
        ev_to_ebitda: number(ks, "enterpriseToEbitda"),

        eps: number(ks, "trailingEps").or_else(|| number(ks, "forwardEps")),
        beta: number(sd, "beta").or_else(|| number(ks, "beta")),
        book_value: number(ks, "bookValue"),
        profit_margins: percent(number(fd, "profitMargins").or_else(|| number(ks, "profitMargins"))),
        return_on_assets: percent(number(fd, "returnOnAssets")),
        roe: percent(number(fd, "returnOnEquity")),
        total_cash: number(fd, "totalCash"),
        total_debt: number(fd, "totalDebt"),
        debt_to_equity: number(fd, "debtToEquity"),
        current_ratio: number(fd, "currentRatio"),
        quick_ratio: number(fd, "quickRatio"),
        gross_margins: percent(number(fd, "grossMargins")),
        operating_margins: percent(number(fd, "operatingMargins")),
        total_revenue: number(fd, "totalRevenue"),
        revenue_per_share: number(fd, "revenuePerShare"),
        revenue_growth: percent(number(fd, "revenueGrowth")),
        earnings_growth: percent(number(fd, "earningsGrowth")),

        dividend_yield: percent(
            number(sd, "dividendYield").or_else(|| number(sd, "trailingAnnualDividendYield")),
        ),
        dividend_rate: number(sd, "dividendRate")
            .or_else(|| number(sd, "trailingAnnualDividendRate")),
        ex_dividend_date: timestamp(sd, "exDividendDate"),
        payout_ratio: percent(number(sd, "payoutRatio")),
        // 이미 퍼센트 단위로 제공됨
        five_year_avg_dividend_yield: number(sd, "fiveYearAvgDividendYield"),

        sector: text(profile, "sector"),
        industry: text(profile, "industry"),
        country: text(profile, "country"),
        exchange: text(m.price, "exchangeName").or_else(|| text(m.price, "exchange")),
        quote_type: text(m.price, "quoteType"),
        website: text(profile, "website"),
        employees: integer(profile, "fullTimeEmployees"),

        recommendation_mean: number(fd, "recommendationMean"),
        recommendation_key: text(fd, "recommendationKey").filter(|k| k != "none"),
        number_of_analyst_opinions: integer(fd, "numberOfAnalystOpinions"),
        target_high_price: number(fd, "targetHighPrice"),
        target_low_price: number(fd, "targetLowPrice"),
        target_mean_price: number(fd, "targetMeanPrice"),

        shares_outstanding: integer(ks, "sharesOutstanding"),
        float_shares: integer(ks, "floatShares"),
        held_percent_insiders: percent(number(ks, "heldPercentInsiders")),
        held_percent_institutions: percent(number(ks, "heldPercentInstitutions")),
        short_ratio: number(ks, "shortRatio"),
        short_percent_of_float: percent(number(ks, "shortPercentOfFloat")),

        fetched_at,
    }
}

fn ensure_available(
    symbol: &Symbol,
    price: &PriceSnapshot,
    name: Option<&str>,
) -> Result<(), QuoteError> {
    if price.current_price.is_none() && name.is_none() {
        return Err(QuoteError::data_unavailable(
            symbol.as_str(),
            "제공자 응답에 가격과 회사명이 없습니다",
        ));
    }
    Ok(())
}

/// 가격 모듈만으로 가격 스냅샷을 만듭니다.
///
/// 현재가가 없으면 회사명이 있어도 `DataUnavailable`입니다.
pub fn map_price(
    symbol: &Symbol,
    record: &Value,
    fetched_at: i64,
) -> Result<PriceSnapshot, QuoteError> {
    let modules = Modules::new(record);
    let price = build_price(symbol, &modules, fetched_at);
    if price.current_price.is_none() {
        return Err(QuoteError::data_unavailable(
            symbol.as_str(),
            "제공자 응답에 현재가가 없습니다",
        ));
    }
    Ok(price)
}

/// 전체 레코드에서 가격과 펀더멘털 스냅샷을 함께 만듭니다.
pub fn map_full(
    symbol: &Symbol,
    record: &Value,
    fetched_at: i64,
) -> Result<(PriceSnapshot, FundamentalsSnapshot), QuoteError> {
    let modules = Modules::new(record);
    let price = build_price(symbol, &modules, fetched_at);
    let fundamentals = build_fundamentals(&modules, fetched_at);
    ensure_available(symbol, &price, fundamentals.name.as_deref())?;
    Ok((price, fundamentals))
}
