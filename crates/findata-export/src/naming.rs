//! Output file names and currency display.

use chrono::NaiveDateTime;

/// Longest company-name fragment kept in a file name.
const MAX_NAME_CHARS: usize = 30;

const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("CNY", "¥"),
    ("CNH", "¥"),
    ("RMB", "¥"),
    ("HKD", "HK$"),
    ("CHF", "CHF "),
    ("CAD", "C$"),
    ("AUD", "A$"),
    ("INR", "₹"),
    ("KRW", "₩"),
    ("SGD", "S$"),
    ("TWD", "NT$"),
    ("BRL", "R$"),
    ("MXN", "MX$"),
    ("SEK", "kr "),
    ("NOK", "kr "),
    ("DKK", "kr "),
    ("PLN", "zł "),
    ("THB", "฿"),
    ("IDR", "Rp "),
    ("MYR", "RM "),
    ("PHP", "₱"),
    ("ZAR", "R "),
    ("RUB", "₽"),
    ("TRY", "₺"),
    ("ILS", "₪"),
    ("AED", "AED "),
    ("SAR", "SAR "),
];

/// Prefix used in number formats for `code`.
///
/// Unknown codes are shown as the code followed by a space; an empty code is `$`.
#[must_use]
pub fn currency_symbol(code: &str) -> String {
    let code = code.trim().to_uppercase();
    if code.is_empty() {
        return "$".to_string();
    }
    CURRENCY_SYMBOLS
        .iter()
        .find(|(c, _)| *c == code)
        .map_or_else(|| format!("{code} "), |(_, symbol)| (*symbol).to_string())
}

/// Company name reduced to characters safe in a file name.
fn safe_name(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    kept.trim().chars().take(MAX_NAME_CHARS).collect()
}

/// `TICKER_Company Name_YYYYmmdd_HHMMSS.xlsx`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use findata_export::output_file_name;
///
/// let at = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(9, 30, 0).unwrap();
/// assert_eq!(output_file_name("aapl", "Apple Inc.", at), "AAPL_Apple Inc_20240501_093000.xlsx");
/// ```
#[must_use]
pub fn output_file_name(ticker: &str, company_name: &str, at: NaiveDateTime) -> String {
    format!(
        "{}_{}_{}.xlsx",
        ticker.to_uppercase(),
        safe_name(company_name),
        at.format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_currency_symbols() {
        assert_eq!(currency_symbol("usd"), "$");
        assert_eq!(currency_symbol("HKD"), "HK$");
        assert_eq!(currency_symbol("XYZ"), "XYZ ");
        assert_eq!(currency_symbol(""), "$");
    }

    #[test]
    fn test_safe_name() {
        assert_eq!(safe_name("AT&T Inc."), "ATT Inc");
        assert_eq!(safe_name("  Tencent/Holdings  "), "TencentHoldings");
        assert_eq!(
            safe_name("A Very Long Company Name Holdings Group Limited").chars().count(),
            30
        );
    }

    #[test]
    fn test_output_file_name() {
        let at = NaiveDate::from_ymd_opt(2025, 12, 31)
            .unwrap()
            .and_hms_opt(23, 59, 1)
            .unwrap();
        assert_eq!(
            output_file_name("0700", "Tencent Holdings Ltd", at),
            "0700_Tencent Holdings Ltd_20251231_235901.xlsx"
        );
    }
}
