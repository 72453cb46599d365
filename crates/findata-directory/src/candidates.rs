//! Listing candidate generation.

use std::collections::HashSet;

use findata_core::{ListingCandidate, normalize_ticker, strip_leading_zeros};
use tracing::debug;

use crate::exchange::exchange_priority;
use crate::index::AlternateIndex;

/// Builds the ordered list of listings to probe for a selected company.
///
/// Order: the selected ticker on `exchange` in its site form (see
/// [`normalize_ticker`]), the same ticker without leading zeros, then every alternate listing of the company sorted by exchange
/// priority (each followed by its own zero-stripped form). Candidates are
/// unique by lower-cased ticker; the first occurrence wins. The caller caps
/// how many of them are probed.
///
/// # Example
///
/// ```
/// use findata_directory::{AlternateIndex, generate_candidates};
///
/// let candidates = generate_candidates("0700", "Tencent", &AlternateIndex::new(), "hkex");
/// let tickers: Vec<&str> = candidates.iter().map(|c| c.ticker.as_str()).collect();
/// assert_eq!(tickers, vec!["700"]);
///
/// let candidates = generate_candidates("0005", "HSBC", &AlternateIndex::new(), "nyse");
/// let tickers: Vec<&str> = candidates.iter().map(|c| c.ticker.as_str()).collect();
/// assert_eq!(tickers, vec!["0005", "5"]);
/// ```
#[must_use]
pub fn generate_candidates(
    ticker: &str,
    company_name: &str,
    alternates: &AlternateIndex,
    exchange: &str,
) -> Vec<ListingCandidate> {
    let mut candidates = CandidateList::default();

    let ticker = normalize_ticker(ticker, exchange);
    candidates.push_with_stripped(&ticker, exchange);

    let mut listings: Vec<_> = alternates.alternates(company_name).iter().collect();
    listings.sort_by_key(|l| exchange_priority(&l.exchange));
    for listing in listings {
        let symbol = normalize_ticker(&listing.symbol, &listing.exchange);
        candidates.push_with_stripped(&symbol, &listing.exchange);
    }

    debug!(
        ticker = %ticker,
        company = company_name,
        count = candidates.items.len(),
        "Generated listing candidates"
    );
    candidates.items
}

#[derive(Default)]
struct CandidateList {
    seen: HashSet<String>,
    items: Vec<ListingCandidate>,
}

impl CandidateList {
    fn push(&mut self, ticker: &str, exchange: &str) {
        let candidate = ListingCandidate::new(ticker, exchange);
        if candidate.ticker.is_empty() || !self.seen.insert(candidate.ticker.clone()) {
            return;
        }
        self.items.push(candidate);
    }

    fn push_with_stripped(&mut self, ticker: &str, exchange: &str) {
        self.push(ticker, exchange);
        if let Some(stripped) = strip_leading_zeros(ticker) {
            self.push(stripped, exchange);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::AlternateListing;

    fn listing(symbol: &str, exchange: &str) -> AlternateListing {
        AlternateListing {
            symbol: symbol.to_string(),
            exchange: exchange.to_string(),
        }
    }

    #[test]
    fn test_without_alternates() {
        let index = AlternateIndex::new();
        assert_eq!(
            generate_candidates("AAPL", "Apple Inc.", &index, "nyse"),
            vec![ListingCandidate::new("aapl", "nyse")]
        );
        assert_eq!(
            generate_candidates("0005", "HSBC", &index, "nyse"),
            vec![
                ListingCandidate::new("0005", "nyse"),
                ListingCandidate::new("5", "nyse"),
            ]
        );
    }

    #[test]
    fn test_alternates_sorted_by_priority() {
        let mut index = AlternateIndex::new();
        index.insert("Tencent Holdings Ltd.", listing("TCEHY", "otc"));
        index.insert("Tencent Holdings Limited", listing("0700", "hkex"));
        index.insert("Tencent Holdings", listing("NNND", "xetra"));
        index.insert("Tencent Holdings", listing("TCTZF", "asx"));

        let candidates = generate_candidates("TCEHY", "Tencent Holdings Ltd.", &index, "otc");
        assert_eq!(
            candidates,
            vec![
                ListingCandidate::new("tcehy", "otc"),
                ListingCandidate::new("700", "hkex"),
                ListingCandidate::new("nnnd", "xetra"),
                ListingCandidate::new("tctzf", "asx"),
            ]
        );
    }

    #[test]
    fn test_hong_kong_ticker_uses_site_form() {
        let index = AlternateIndex::new();
        assert_eq!(
            generate_candidates("0700", "Tencent", &index, "hkex"),
            vec![ListingCandidate::new("700", "hkex")]
        );
        assert_eq!(
            generate_candidates(" 0000 ", "Zero", &index, "hkex"),
            vec![ListingCandidate::new("0", "hkex")]
        );
    }

    #[test]
    fn test_duplicates_are_case_insensitive() {
        let mut index = AlternateIndex::new();
        index.insert("Apple Inc.", listing("aapl", "nasdaq"));
        index.insert("Apple Inc.", listing("AAPL", "otc"));
        index.insert("Apple Inc.", listing("APC", "xetra"));

        let candidates = generate_candidates("AAPL", "Apple Inc.", &index, "nasdaq");
        let tickers: Vec<&str> = candidates.iter().map(|c| c.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["aapl", "apc"]);
        assert_eq!(candidates[0].exchange, "nasdaq");
    }

    #[test]
    fn test_ordering_is_stable() {
        let mut index = AlternateIndex::new();
        index.insert("Acme", listing("ACM1", "bse"));
        index.insert("Acme", listing("ACM2", "tsx"));
        index.insert("Acme", listing("ACM3", "asx"));

        let first = generate_candidates("ACM", "Acme", &index, "nyse");
        let second = generate_candidates("ACM", "Acme", &index, "nyse");
        assert_eq!(first, second);
        let tickers: Vec<&str> = first.iter().map(|c| c.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["acm", "acm1", "acm2", "acm3"]);
    }
}
