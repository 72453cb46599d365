//! Listing resolution.

use tracing::{debug, info, instrument};

use findata_core::{
    FinDataError, ListingCandidate, Locator, ProgressObserver, ResolvedListing, Result,
    ScrapeConfig, StatementKind, Surface,
};

/// Probes candidates in order until one serves an income statement.
///
/// At most `config.max_candidates` candidates are tried, each with a
/// `config.probe_timeout` bound on the statement marker. The first hit is
/// returned without probing the rest. A failed navigation counts as a miss.
///
/// # Errors
///
/// Returns [`FinDataError::Resolution`] naming every probed candidate when none responds.
#[instrument(skip_all, fields(ticker = %ticker, candidates = candidates.len()))]
pub fn resolve_listing<S: Surface>(
    surface: &mut S,
    ticker: &str,
    candidates: &[ListingCandidate],
    config: &ScrapeConfig,
    observer: &dyn ProgressObserver,
) -> Result<ResolvedListing> {
    let probed = &candidates[..candidates.len().min(config.max_candidates)];
    let marker = Locator::css(StatementKind::IncomeStatement.marker_selector());

    for (idx, candidate) in probed.iter().enumerate() {
        observer.progress(
            &format!(
                "Trying {} on {}... ({}/{})",
                candidate.ticker.to_uppercase(),
                candidate.exchange.to_uppercase(),
                idx + 1,
                probed.len()
            ),
            10 + idx.min(19) as u8,
        );

        let listing = ResolvedListing::from(candidate.clone());
        let url = listing.statement_url(&config.base_url, StatementKind::IncomeStatement);
        if let Err(e) = surface.navigate(&url) {
            debug!(candidate = %candidate, error = %e, "Probe navigation failed");
            continue;
        }

        if surface.wait_for(&marker, config.probe_timeout) {
            info!(candidate = %candidate, "Resolved listing");
            return Ok(listing);
        }
        debug!(candidate = %candidate, "No statement rendered");
    }

    Err(FinDataError::Resolution {
        ticker: ticker.to_string(),
        tried: probed.to_vec(),
    })
}
