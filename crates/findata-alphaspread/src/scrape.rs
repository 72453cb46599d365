//! End-to-end scrape of one ticker.

use tracing::{info, instrument};

use findata_core::{
    BrowserSession, FinDataError, JobResult, ListingCandidate, ProgressObserver, Result,
    ScrapeConfig,
};

use crate::coordinator::FetchCoordinator;
use crate::guard::OpenSurface;
use crate::resolver::resolve_listing;

/// Resolves `ticker` among `candidates` and fetches all of its data.
///
/// The resolver's probe surface is closed before the statement surfaces are
/// opened, so at most one surface per statement is open at a time.
///
/// # Errors
///
/// - [`FinDataError::Resolution`] if no candidate serves a statement.
/// - [`FinDataError::NoData`] if the listing resolved but no table was fetched.
/// - [`FinDataError::Browser`] if surfaces cannot be opened at all.
#[instrument(skip_all, fields(ticker = %ticker))]
pub fn scrape_listing<B: BrowserSession>(
    session: &B,
    ticker: &str,
    candidates: &[ListingCandidate],
    config: &ScrapeConfig,
    observer: &dyn ProgressObserver,
) -> Result<JobResult> {
    let probed = candidates.len().min(config.max_candidates);
    observer.progress(
        &format!("Searching across {probed} exchange listings..."),
        10,
    );

    let listing = {
        let mut probe = OpenSurface::new(session.open_surface()?);
        resolve_listing(&mut *probe, ticker, candidates, config, observer)?
    };
    observer.progress(&format!("Found {listing}"), 30);

    let result = FetchCoordinator::new(session, config, observer).fetch(listing)?;
    if result.tables.is_empty() {
        return Err(FinDataError::NoData {
            ticker: ticker.to_string(),
        });
    }

    info!(
        listing = %result.listing,
        tables = result.tables.len(),
        "Scrape finished"
    );
    Ok(result)
}
