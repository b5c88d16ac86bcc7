//! US English date and currency formatting.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};

/// Rendered in place of dates that cannot be parsed.
pub const INVALID_DATE: &str = "Invalid Date";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];

/// Parse the calendar date out of a provider date string.
///
/// Offsets are not applied: the date is the one written in the string.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        })
}

/// Format a date string as a long-form date, e.g. `January 15, 2024`.
pub fn format_long_date(value: &str) -> String {
    match parse_date(value) {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => INVALID_DATE.to_string(),
    }
}

/// Symbol and fraction digits used by en-US for a currency code.
fn currency_style(code: &str) -> (Option<&'static str>, u32) {
    match code {
        "USD" => (Some("$"), 2),
        "EUR" => (Some("€"), 2),
        "GBP" => (Some("£"), 2),
        "JPY" => (Some("¥"), 0),
        "KRW" => (Some("₩"), 0),
        "INR" => (Some("₹"), 2),
        "CAD" => (Some("CA$"), 2),
        "AUD" => (Some("A$"), 2),
        "NZD" => (Some("NZ$"), 2),
        "HKD" => (Some("HK$"), 2),
        "MXN" => (Some("MX$"), 2),
        "CNY" => (Some("CN¥"), 2),
        "BRL" => (Some("R$"), 2),
        "ILS" => (Some("₪"), 2),
        _ => (None, 2),
    }
}

/// Format an amount in en-US currency style, e.g. `$1,234.50`.
///
/// An empty currency code formats as USD. Codes without a known symbol
/// are written out in front of the amount (`PLN 1,234.50`).
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let code = currency.trim().to_uppercase();
    let code = if code.is_empty() { "USD".to_string() } else { code };
    let (symbol, digits) = currency_style(&code);

    let mut rounded = amount.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(digits);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();

    let text = rounded.abs().to_string();
    let (integer, fraction) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    match symbol {
        Some(symbol) => out.push_str(symbol),
        None => {
            out.push_str(&code);
            out.push(' ');
        }
    }
    out.push_str(&group_thousands(integer));
    if let Some(fraction) = fraction {
        out.push('.');
        out.push_str(fraction);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
