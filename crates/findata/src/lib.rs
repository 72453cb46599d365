#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/findata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Financial statement downloads from AlphaSpread.
//!
//! This crate ties the findata crates together: it re-exports their public
//! types and provides the [`JobLauncher`] that runs one download at a time
//! and publishes its [`JobStatus`].
//!
//! # Features
//!
//! - `chrome` - Headless Chrome browser sessions
//! - `xlsx` - Excel workbook output
//!
//! # Example
//!
//! ```rust,ignore
//! use findata::{ChromeOptions, ChromeSession, CompanyDirectory, JobLauncher, JobRequest, XlsxWriter};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> findata::Result<()> {
//!     let options = ChromeOptions::default();
//!     let launcher = JobLauncher::new(
//!         move || ChromeSession::launch(&options),
//!         Arc::new(CompanyDirectory::from_entries(Vec::new())),
//!         Arc::new(XlsxWriter::new()),
//!     );
//!
//!     let outcome = launcher.launch(JobRequest::new("AAPL", "."))?.await.unwrap()?;
//!     println!("Saved {}", outcome.output_path.display());
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use findata_core::*;

// Listing directory
pub use findata_directory::{
    CompanyDirectory, DirectoryEntry, DirectoryLoader, LocalCsvSource, RemoteCsvSource,
    generate_candidates,
};

// Scraper
#[cfg(feature = "chrome")]
pub use findata_alphaspread::{ChromeOptions, ChromeSession, PageLoad};
pub use findata_alphaspread::{FetchCoordinator, resolve_listing, scrape_listing};

// Export
pub use findata_export::{ExportPlan, SpreadsheetWriter, assemble, export, output_file_name};
#[cfg(feature = "xlsx")]
pub use findata_export::XlsxWriter;

mod job;
mod timer;
pub use job::{JobLauncher, JobOutcome, JobRequest, StatusHandle};
pub use timer::StageTimer;
