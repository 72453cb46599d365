//! Multi-surface statement fetching.
//!
//! One surface is opened per statement. Periods are fetched in waves: the
//! period control is triggered on every surface that still needs the period,
//! a single settle delay covers the re-render of all of them, then each
//! surface is read. Failures on one surface or period never abort the others.

use tracing::{debug, info, instrument, warn};

use findata_core::{
    Attempt, BrowserSession, FinDataError, JobResult, Locator, PeriodKind, ProgressObserver,
    RawPeriodPayload, ResolvedListing, Result, ScrapeConfig, SheetKey, SheetPeriod,
    StatementKind, Surface,
};

use crate::breakdown::fetch_breakdown;
use crate::extract::{PeriodSwitch, read_company_info, read_payload, select_period};
use crate::guard::OpenSurface;
use crate::normalize::normalize;

type StatementSurface<S> = (StatementKind, OpenSurface<S>);

/// Fetches every statement × period table and the revenue breakdown of a listing.
#[derive(Debug)]
pub struct FetchCoordinator<'a, B: BrowserSession> {
    session: &'a B,
    config: &'a ScrapeConfig,
    observer: &'a dyn ProgressObserver,
}

impl<'a, B: BrowserSession> FetchCoordinator<'a, B> {
    /// Creates a coordinator that opens its surfaces in `session`.
    #[must_use]
    pub const fn new(
        session: &'a B,
        config: &'a ScrapeConfig,
        observer: &'a dyn ProgressObserver,
    ) -> Self {
        Self {
            session,
            config,
            observer,
        }
    }

    /// Fetches all data for `listing`.
    ///
    /// The result may be partial: any table whose fetch failed is simply
    /// missing. All surfaces are closed before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`FinDataError::Browser`] only if no surface could be opened.
    #[instrument(skip_all, fields(listing = %listing))]
    pub fn fetch(&self, listing: ResolvedListing) -> Result<JobResult> {
        self.observer.progress("Opening statement tabs...", 35);
        let mut surfaces = self.open_surfaces(&listing);
        if surfaces.is_empty() {
            return Err(FinDataError::Browser(
                "Could not open any statement surface".to_string(),
            ));
        }

        for (statement, surface) in &surfaces {
            let marker = Locator::css(statement.marker_selector());
            if !surface.wait_for(&marker, self.config.marker_timeout) {
                warn!(statement = %statement, "Statement did not render in time");
            }
        }

        let company = read_company_info(&*surfaces[0].1, listing.ticker());
        let mut result = JobResult::new(listing.clone(), company);

        self.observer
            .progress("Fetching default periods from all statements...", 40);
        self.seed(&surfaces, &mut result);

        for (wave, period) in PeriodKind::ALL.into_iter().enumerate() {
            self.observer.progress(
                &format!("Fetching {period} data from all statements..."),
                45 + 15 * wave as u8,
            );
            self.fetch_wave(&surfaces, period, &mut result);
        }

        self.observer.progress("Fetching Revenue Breakdown...", 85);
        let breakdown = fetch_breakdown(&mut *surfaces[0].1, &listing, self.config);
        result.breakdown = breakdown;

        info!(
            tables = result.tables.len(),
            breakdown_sections = result.breakdown.sections.len(),
            "Fetched listing"
        );
        Ok(result)
    }

    fn open_surfaces(&self, listing: &ResolvedListing) -> Vec<StatementSurface<B::Surface>> {
        let mut surfaces = Vec::with_capacity(StatementKind::ALL.len());
        for statement in StatementKind::ALL {
            let mut surface = match self.session.open_surface() {
                Ok(surface) => OpenSurface::new(surface),
                Err(e) => {
                    warn!(statement = %statement, error = %e, "Could not open surface");
                    continue;
                }
            };

            let url = listing.statement_url(&self.config.base_url, statement);
            if let Err(e) = surface.navigate(&url) {
                warn!(statement = %statement, url = %url, error = %e, "Statement page failed to load");
            }
            surface.pause(self.config.open_pause);
            surfaces.push((statement, surface));
        }
        surfaces
    }

    /// Stores the period each surface shows after loading.
    fn seed(&self, surfaces: &[StatementSurface<B::Surface>], result: &mut JobResult) {
        for (statement, surface) in surfaces {
            match read_payload(&**surface, *statement) {
                Attempt::Success(payload) => match payload.selected_period.clone() {
                    Some(period) => {
                        self.store(result, *statement, period, &payload);
                    }
                    None => warn!(statement = %statement, "Default view does not report its period"),
                },
                Attempt::Timeout | Attempt::Empty => {
                    warn!(statement = %statement, "No data in default view");
                }
            }
        }
    }

    /// Switches every surface still missing `period`, settles once, then reads them.
    fn fetch_wave(
        &self,
        surfaces: &[StatementSurface<B::Surface>],
        period: PeriodKind,
        result: &mut JobResult,
    ) {
        let switched: Vec<&StatementSurface<B::Surface>> = surfaces
            .iter()
            .filter(|(statement, _)| {
                statement.supports(period)
                    && !result.tables.contains(&SheetKey::new(*statement, period))
            })
            .filter(|(statement, surface)| {
                select_period(&**surface, *statement, period, self.config) == PeriodSwitch::Switched
            })
            .collect();

        let Some((_, first)) = switched.first() else {
            debug!(period = %period, "Nothing to fetch in this wave");
            return;
        };
        first.pause(self.config.settle_delay);

        for (statement, surface) in switched {
            match read_payload(&**surface, *statement) {
                Attempt::Success(payload) => {
                    let reported = payload
                        .selected_period
                        .clone()
                        .unwrap_or(SheetPeriod::Standard(period));
                    if reported.kind() != Some(period) {
                        warn!(
                            statement = %statement,
                            expected = %period,
                            reported = %reported,
                            "Statement shows a different period than requested"
                        );
                    }
                    self.store(result, *statement, reported, &payload);
                }
                Attempt::Timeout | Attempt::Empty => {
                    warn!(statement = %statement, period = %period, "No data after period switch");
                }
            }
        }

        info!(period = %period, tables = result.tables.len(), "Finished period wave");
    }

    /// Normalizes and stores a payload unless the key is unsupported or already filled.
    ///
    /// A period label outside [`PeriodKind`] is stored under its own key.
    fn store(
        &self,
        result: &mut JobResult,
        statement: StatementKind,
        period: SheetPeriod,
        payload: &RawPeriodPayload,
    ) -> bool {
        if period.kind().is_some_and(|kind| !statement.supports(kind)) {
            debug!(statement = %statement, period = %period, "Ignoring unsupported period");
            return false;
        }

        // Only annual data gets fiscal-year column labels.
        let labels = period.kind().unwrap_or(PeriodKind::Quarterly);
        let key = SheetKey { statement, period };
        if result.tables.contains(&key) {
            debug!(sheet = %key, "Already populated");
            return false;
        }

        let table = normalize(payload, labels);
        if table.is_empty() {
            return false;
        }
        debug!(sheet = %key, rows = table.rows.len(), columns = table.columns.len(), "Stored table");
        result.tables.insert(key, table)
    }
}
