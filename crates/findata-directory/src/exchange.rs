//! Exchange code mapping.
//!
//! Directory rows carry exchange codes or long exchange names; the site
//! identifies exchanges by its own lower-case slugs.

/// Slug used when a listing carries no exchange at all.
pub const DEFAULT_SITE_EXCHANGE: &str = "nyse";

/// Priority of exchanges that are not ranked explicitly.
pub const DEFAULT_PRIORITY: u8 = 50;

/// Directory exchange codes and names with a site slug that differs from the lower-cased code.
const SITE_EXCHANGES: &[(&str, &str)] = &[
    ("NYSE", "nyse"),
    ("NASDAQ", "nasdaq"),
    ("OTC", "otc"),
    ("US OTC", "otc"),
    ("FRA", "xetra"),
    ("Frankfurt Stock Exchange", "xetra"),
    ("TYO", "tse"),
    ("Tokyo Stock Exchange", "tse"),
    ("HKEX", "hkex"),
    ("Hong Kong Stock Exchange", "hkex"),
    ("BOM", "bse"),
    ("Bombay Stock Exchange", "bse"),
    ("LSE", "lse"),
    ("London Stock Exchange", "lse"),
    ("TSX", "tsx"),
    ("ASX", "asx"),
];

/// Site slugs ranked for candidate ordering; lower is tried first.
const PRIORITIES: &[(&str, u8)] = &[
    ("nyse", 1),
    ("nasdaq", 2),
    ("lse", 3),
    ("hkex", 4),
    ("tse", 5),
    ("xetra", 6),
    ("otc", 99),
];

/// Maps a directory exchange code or name to the site's slug.
///
/// Unknown codes are lower-cased; an empty code maps to [`DEFAULT_SITE_EXCHANGE`].
///
/// # Example
///
/// ```
/// use findata_directory::site_exchange;
///
/// assert_eq!(site_exchange("FRA"), "xetra");
/// assert_eq!(site_exchange("Tokyo Stock Exchange"), "tse");
/// assert_eq!(site_exchange("SIX"), "six");
/// assert_eq!(site_exchange(""), "nyse");
/// ```
#[must_use]
pub fn site_exchange(code: &str) -> String {
    let code = code.trim();
    if code.is_empty() {
        return DEFAULT_SITE_EXCHANGE.to_string();
    }

    SITE_EXCHANGES
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, slug)| (*slug).to_string())
        .unwrap_or_else(|| code.to_lowercase())
}

/// Candidate ordering priority of a site exchange slug.
#[must_use]
pub fn exchange_priority(slug: &str) -> u8 {
    PRIORITIES
        .iter()
        .find(|(known, _)| *known == slug)
        .map_or(DEFAULT_PRIORITY, |(_, priority)| *priority)
}
