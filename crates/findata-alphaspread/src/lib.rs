#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/findata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! AlphaSpread scraper.
//!
//! This crate drives a [`BrowserSession`](findata_core::BrowserSession) through
//! the AlphaSpread site to collect a company's financial statements.
//!
//! # Features
//!
//! - Listing resolution over ranked exchange candidates
//! - Parallel statement surfaces with one settle delay per period wave
//! - Live component state with rendered initial data as fallback
//! - Revenue breakdown by segment and geography
//! - Headless Chrome backend (`chrome` feature, on by default)

/// Revenue breakdown parsing and fetching.
pub mod breakdown;
/// Headless Chrome implementation of the browser traits.
#[cfg(feature = "chrome")]
pub mod chrome;
/// Statement fetching across surfaces.
pub mod coordinator;
/// Payload, company info and period control access on a loaded page.
pub mod extract;
/// Raw payload to table normalization.
pub mod normalize;
/// Candidate probing.
pub mod resolver;
/// Full scrape of one ticker.
pub mod scrape;

#[cfg(test)]
mod fake;
mod guard;

pub use breakdown::{fetch_breakdown, parse_breakdown};
#[cfg(feature = "chrome")]
pub use chrome::{ChromeOptions, ChromeSession, ChromeSurface, PageLoad};
pub use coordinator::FetchCoordinator;
pub use normalize::{normalize, period_label};
pub use resolver::resolve_listing;
pub use scrape::scrape_listing;
