#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/findata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the findata statement scraper.
//!
//! This crate provides the abstractions shared by every stage of a job:
//!
//! - [`Surface`](surface::Surface) / [`BrowserSession`](surface::BrowserSession) - Browser tabs the scraper drives
//! - [`NormalizedTable`](types::NormalizedTable) - A statement flattened to fields × periods
//! - [`JobResult`](types::JobResult) - Everything a job collected
//! - [`JobStatus`](status::JobStatus) - Progress record read by frontends
//! - [`ScrapeConfig`](config::ScrapeConfig) - Timeouts and probing limits

/// Scraper configuration.
pub mod config;
/// Error types for findata operations.
pub mod error;
/// Ticker and company name normalization.
pub mod identifier;
/// Statement and period kind definitions.
pub mod period;
/// Job status reporting.
pub mod status;
/// Browser surface traits.
pub mod surface;
/// Core data types (listings, payloads, tables, breakdowns).
pub mod types;

// Re-export commonly used items at crate root
pub use config::ScrapeConfig;
pub use error::{FinDataError, Result};
pub use identifier::{normalize_company_name, normalize_ticker, strip_leading_zeros};
pub use period::{PeriodKind, SheetKey, SheetPeriod, StatementKind};
pub use status::{JobStatus, NoProgress, ProgressObserver};
pub use surface::{Attempt, BrowserSession, Locator, Surface};
pub use types::{
    BreakdownItem, BreakdownSection, CompanyInfo, FieldEntry, FieldGroup, JobResult,
    ListingCandidate, NormalizedTable, RawPeriodPayload, ResolvedListing, RevenueBreakdown,
    RowKind, StatementTables, TableRow, Unit,
};
