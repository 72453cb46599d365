//! Error types for findata operations.
//!
//! This module defines [`FinDataError`] which covers the fatal error cases of a
//! job: listing resolution, browser and network failures, parse failures,
//! export failures and configuration problems. Non-fatal per-attempt outcomes
//! (timeouts, empty extractions, failed period switches) are not errors; see
//! [`Attempt`](crate::surface::Attempt).

use thiserror::Error;

use crate::types::ListingCandidate;

/// Errors that can occur during a findata job.
#[derive(Error, Debug)]
pub enum FinDataError {
    /// The browser session or one of its surfaces failed.
    #[error("Browser error: {0}")]
    Browser(String),

    /// Network-related errors (connection failures, HTTP status, etc.).
    #[error("Network error: {0}")]
    Network(String),

    /// No candidate listing served a statement page.
    #[error(
        "Could not find financial data for {ticker} on any exchange. Tried: {}",
        format_tried(.tried)
    )]
    Resolution {
        /// The ticker the user selected.
        ticker: String,
        /// Every candidate that was probed, in probe order.
        tried: Vec<ListingCandidate>,
    },

    /// Every fetch attempt finished without producing a single table.
    #[error("No financial data could be extracted for {ticker}")]
    NoData {
        /// The resolved ticker.
        ticker: String,
    },

    /// Error parsing data scraped from the site or read from a file.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The spreadsheet writer failed.
    #[error("Export error: {0}")]
    Export(String),

    /// The company directory could not be loaded.
    #[error("Directory error: {0}")]
    Directory(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A job was launched while another one is still running.
    #[error("A job is already running")]
    JobAlreadyRunning,

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

fn format_tried(tried: &[ListingCandidate]) -> String {
    tried
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias using [`FinDataError`].
pub type Result<T> = std::result::Result<T, FinDataError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_message_lists_every_candidate() {
        let err = FinDataError::Resolution {
            ticker: "0700".to_string(),
            tried: vec![
                ListingCandidate::new("0700", "nyse"),
                ListingCandidate::new("700", "nyse"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.contains("0700@nyse"));
        assert!(msg.contains("700@nyse"));
    }
}
