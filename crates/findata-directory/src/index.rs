//! In-memory company directory.
//!
//! The directory is built once from loaded rows and is read-only afterwards,
//! so it can be shared between jobs behind an `Arc`.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use findata_core::normalize_company_name;

use crate::exchange::{exchange_priority, site_exchange};

/// Maximum number of search results.
pub const MAX_SEARCH_RESULTS: usize = 50;

/// Number of entries returned for an empty search query.
const BROWSE_RESULTS: usize = 10;

/// One listing row of the company directory.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Trading symbol as listed.
    pub symbol: String,
    /// Company name as listed.
    pub name: String,
    /// Exchange code as listed, used for display and filtering.
    pub exchange_code: String,
    /// The site's exchange slug for this listing.
    pub site_exchange: String,
}

impl DirectoryEntry {
    /// Creates an entry, deriving the site exchange slug from `exchange_code`.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        exchange_code: impl Into<String>,
    ) -> Self {
        let exchange_code = exchange_code.into().trim().to_string();
        Self {
            symbol: symbol.into().trim().to_string(),
            name: name.into().trim().to_string(),
            site_exchange: site_exchange(&exchange_code),
            exchange_code,
        }
    }
}

/// Another listing of the same company on some exchange.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlternateListing {
    /// Symbol as listed.
    pub symbol: String,
    /// Site exchange slug.
    pub exchange: String,
}

/// Normalized company name to every listing of that name.
///
/// Names are normalized with [`normalize_company_name`]; unrelated companies
/// whose names normalize identically share one bucket.
#[derive(Clone, Debug, Default)]
pub struct AlternateIndex {
    by_name: HashMap<String, Vec<AlternateListing>>,
}

impl AlternateIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listing under `company_name`. Names that normalize to nothing are ignored.
    pub fn insert(&mut self, company_name: &str, listing: AlternateListing) {
        let key = normalize_company_name(company_name);
        if key.is_empty() {
            return;
        }
        self.by_name.entry(key).or_default().push(listing);
    }

    /// Listings of the company named `company_name`, in load order.
    #[must_use]
    pub fn alternates(&self, company_name: &str) -> &[AlternateListing] {
        let key = normalize_company_name(company_name);
        self.by_name
            .get(&key)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of distinct normalized names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Returns true if the index holds no names.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

/// All known listings with symbol lookup, search and the alternate index.
#[derive(Clone, Debug, Default)]
pub struct CompanyDirectory {
    entries: Vec<DirectoryEntry>,
    by_symbol: HashMap<String, usize>,
    alternates: AlternateIndex,
}

impl CompanyDirectory {
    /// Builds a directory from loaded rows.
    ///
    /// When a symbol is listed more than once, symbol lookup returns the
    /// listing on the highest-priority exchange.
    #[must_use]
    pub fn from_entries(entries: Vec<DirectoryEntry>) -> Self {
        let mut by_symbol: HashMap<String, usize> = HashMap::with_capacity(entries.len());
        let mut alternates = AlternateIndex::new();

        for (idx, entry) in entries.iter().enumerate() {
            alternates.insert(
                &entry.name,
                AlternateListing {
                    symbol: entry.symbol.clone(),
                    exchange: entry.site_exchange.clone(),
                },
            );

            let key = entry.symbol.to_uppercase();
            let priority = exchange_priority(&entry.site_exchange);
            let replace = by_symbol.get(&key).is_none_or(|&existing| {
                exchange_priority(&entries[existing].site_exchange) > priority
            });
            if replace {
                by_symbol.insert(key, idx);
            }
        }

        Self {
            entries,
            by_symbol,
            alternates,
        }
    }

    /// Number of listings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the directory has no listings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All listings in load order.
    #[must_use]
    pub fn entries(&self) -> &[DirectoryEntry] {
        &self.entries
    }

    /// The alternate listing index.
    #[must_use]
    pub const fn alternates(&self) -> &AlternateIndex {
        &self.alternates
    }

    /// Looks up a listing by symbol, case-insensitively.
    #[must_use]
    pub fn lookup(&self, symbol: &str) -> Option<&DirectoryEntry> {
        self.by_symbol
            .get(&symbol.trim().to_uppercase())
            .map(|&idx| &self.entries[idx])
    }

    /// Distinct exchange codes in load order.
    #[must_use]
    pub fn exchange_codes(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .map(|e| e.exchange_code.as_str())
            .filter(|code| !code.is_empty() && seen.insert(*code))
            .collect()
    }

    /// Searches by symbol and name.
    ///
    /// Results rank exact symbol matches first, then symbol prefixes, then
    /// names containing the query, each symbol at most once and capped at
    /// [`MAX_SEARCH_RESULTS`]. `exchange` filters on the listed exchange code.
    /// An empty query returns the first few listings.
    #[must_use]
    pub fn search(&self, query: &str, exchange: Option<&str>) -> Vec<&DirectoryEntry> {
        let query = query.trim().to_uppercase();
        let filtered = self
            .entries
            .iter()
            .filter(|e| exchange.is_none_or(|code| e.exchange_code == code));

        if query.is_empty() {
            return filtered.take(BROWSE_RESULTS).collect();
        }

        let mut exact = Vec::new();
        let mut prefix = Vec::new();
        let mut by_name = Vec::new();
        for entry in filtered {
            let symbol = entry.symbol.to_uppercase();
            if symbol == query {
                exact.push(entry);
            } else if symbol.starts_with(&query) {
                prefix.push(entry);
            } else if entry.name.to_uppercase().contains(&query) {
                by_name.push(entry);
            }
        }

        let mut seen = HashSet::new();
        exact
            .into_iter()
            .chain(prefix)
            .chain(by_name)
            .filter(|e| seen.insert(e.symbol.to_uppercase()))
            .take(MAX_SEARCH_RESULTS)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> CompanyDirectory {
        CompanyDirectory::from_entries(vec![
            DirectoryEntry::new("TCEHY", "Tencent Holdings Ltd.", "US OTC"),
            DirectoryEntry::new("0700", "Tencent Holdings Limited", "HKEX"),
            DirectoryEntry::new("AAPL", "Apple Inc.", "NASDAQ"),
            DirectoryEntry::new("APC", "Apple Inc", "FRA"),
            DirectoryEntry::new("AAPL", "Apple Inc.", "US OTC"),
            DirectoryEntry::new("MAPL", "Maple Leaf Foods", "TSX"),
        ])
    }

    #[test]
    fn test_alternates_grouped_by_normalized_name() {
        let dir = directory();
        let tencent = dir.alternates().alternates("TENCENT HOLDINGS");
        assert_eq!(tencent.len(), 2);
        assert_eq!(tencent[0].exchange, "otc");
        assert_eq!(tencent[1].symbol, "0700");
        assert_eq!(tencent[1].exchange, "hkex");

        assert!(dir.alternates().alternates("Unknown Corp").is_empty());
    }

    #[test]
    fn test_lookup_prefers_major_exchange() {
        let dir = directory();
        let apple = dir.lookup("aapl").unwrap();
        assert_eq!(apple.site_exchange, "nasdaq");
        assert!(dir.lookup("ZZZZ").is_none());
    }

    #[test]
    fn test_search_ranking() {
        let dir = directory();
        let results: Vec<&str> = dir
            .search("ap", None)
            .iter()
            .map(|e| e.symbol.as_str())
            .collect();
        assert_eq!(results, vec!["APC", "AAPL", "MAPL"]);

        let results: Vec<&str> = dir
            .search("aapl", None)
            .iter()
            .map(|e| e.symbol.as_str())
            .collect();
        assert_eq!(results, vec!["AAPL"]);

        let results: Vec<&str> = dir
            .search("maple", None)
            .iter()
            .map(|e| e.symbol.as_str())
            .collect();
        assert_eq!(results, vec!["MAPL"]);
    }

    #[test]
    fn test_search_exchange_filter_and_browse() {
        let dir = directory();
        let results = dir.search("", Some("US OTC"));
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|e| e.site_exchange == "otc"));

        assert_eq!(dir.search("", None).len(), 6);
    }

    #[test]
    fn test_exchange_codes() {
        let dir = directory();
        assert_eq!(
            dir.exchange_codes(),
            vec!["US OTC", "HKEX", "NASDAQ", "FRA", "TSX"]
        );
    }
}
