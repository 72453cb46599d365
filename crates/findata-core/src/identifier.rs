//! Listing identifier normalization.
//!
//! Maps user-facing tickers and company names onto the forms the site and
//! the company directory index use.

/// Exchange slugs whose site convention drops leading zeros from numeric tickers.
const ZERO_STRIPPING_EXCHANGES: &[&str] = &["hkex", "hong kong"];

/// Corporate suffix tokens removed from company names before matching.
const CORPORATE_TOKENS: &[&str] = &[
    "inc.",
    "inc",
    "corp.",
    "corp",
    "corporation",
    "company",
    "co.",
    "co",
    "ltd.",
    "ltd",
    "limited",
    "plc",
    "llc",
    "s.a.",
    "sa",
    "ag",
    "se",
    "n.v.",
    "nv",
    "holdings",
    "holding",
    "group",
    "the",
    "&",
];

/// Normalizes a ticker to the site's URL form.
///
/// Trims whitespace and lower-cases. On Hong Kong listings leading zeros are
/// stripped, keeping at least one digit (`"0000"` becomes `"0"`).
///
/// # Example
///
/// ```
/// use findata_core::identifier::normalize_ticker;
///
/// assert_eq!(normalize_ticker("0700", "hkex"), "700");
/// assert_eq!(normalize_ticker(" AAPL ", "nasdaq"), "aapl");
/// ```
#[must_use]
pub fn normalize_ticker(ticker: &str, exchange: &str) -> String {
    let ticker = ticker.trim();
    let exchange = exchange.trim().to_lowercase();

    if ZERO_STRIPPING_EXCHANGES.contains(&exchange.as_str()) {
        let stripped = ticker.trim_start_matches('0');
        if stripped.is_empty() && !ticker.is_empty() {
            return "0".to_string();
        }
        return stripped.to_lowercase();
    }

    ticker.to_lowercase()
}

/// Returns `ticker` without leading zeros, if that differs and is not empty.
#[must_use]
pub fn strip_leading_zeros(ticker: &str) -> Option<&str> {
    let stripped = ticker.trim_start_matches('0');
    (!stripped.is_empty() && stripped != ticker).then_some(stripped)
}

/// Normalizes a company name into a join key for the directory index.
///
/// Lower-cases, drops corporate suffix tokens as whole words, removes anything
/// outside `[a-z0-9]` and whitespace, and collapses runs of whitespace.
/// Distinct companies can collide on the same key.
///
/// # Example
///
/// ```
/// use findata_core::identifier::normalize_company_name;
///
/// assert_eq!(normalize_company_name("The Coca-Cola Company"), "cocacola");
/// assert_eq!(normalize_company_name("Tencent Holdings Ltd."), "tencent");
/// ```
#[must_use]
pub fn normalize_company_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();

    let kept: Vec<&str> = lowered
        .split_whitespace()
        .filter(|token| {
            let token = token.trim_end_matches(',');
            !CORPORATE_TOKENS.contains(&token)
        })
        .collect();

    let cleaned: String = kept
        .join(" ")
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c.is_whitespace())
        .collect();

    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hong_kong_zero_stripping() {
        assert_eq!(normalize_ticker("0700", "hkex"), "700");
        assert_eq!(normalize_ticker("0000", "hkex"), "0");
        assert_eq!(normalize_ticker("0005", "Hong Kong"), "5");
        assert_eq!(normalize_ticker("9988", "HKEX"), "9988");
    }

    #[test]
    fn test_other_exchanges_only_lowercase() {
        assert_eq!(normalize_ticker("AAPL", "nasdaq"), "aapl");
        assert_eq!(normalize_ticker("0700", "nyse"), "0700");
        assert_eq!(normalize_ticker("  BRK.B ", "nyse"), "brk.b");
    }

    #[test]
    fn test_strip_leading_zeros() {
        assert_eq!(strip_leading_zeros("0700"), Some("700"));
        assert_eq!(strip_leading_zeros("700"), None);
        assert_eq!(strip_leading_zeros("0000"), None);
        assert_eq!(strip_leading_zeros(""), None);
    }

    #[test]
    fn test_company_name_suffixes() {
        assert_eq!(normalize_company_name("Apple Inc."), "apple");
        assert_eq!(normalize_company_name("APPLE INC"), "apple");
        assert_eq!(normalize_company_name("Alibaba Group Holding Limited"), "alibaba");
        assert_eq!(normalize_company_name("Johnson & Johnson"), "johnson johnson");
        assert_eq!(normalize_company_name("Siemens AG"), "siemens");
    }

    #[test]
    fn test_company_name_whole_words_only() {
        // "sa" and "co" inside words must survive.
        assert_eq!(normalize_company_name("Samsung Electronics Co., Ltd."), "samsung electronics");
        assert_eq!(normalize_company_name("Costco Wholesale Corp"), "costco wholesale");
        assert_eq!(normalize_company_name("AT&T Inc."), "att");
    }

    #[test]
    fn test_company_name_empty() {
        assert_eq!(normalize_company_name(""), "");
        assert_eq!(normalize_company_name("  The  "), "");
    }
}
