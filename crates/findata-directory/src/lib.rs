#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/findata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Company directory and listing candidates.
//!
//! - [`DirectoryLoader`] - Loads listings from remote or local CSV with fallback
//! - [`CompanyDirectory`] - Symbol lookup, search and the [`AlternateIndex`]
//! - [`generate_candidates`] - Ordered (ticker, exchange) pairs to probe

/// Listing candidate generation.
pub mod candidates;
/// Exchange code to site slug mapping.
pub mod exchange;
/// In-memory company directory.
pub mod index;
/// Directory sources and the fallback loader.
pub mod source;

pub use candidates::generate_candidates;
pub use exchange::{DEFAULT_SITE_EXCHANGE, exchange_priority, site_exchange};
pub use index::{AlternateIndex, AlternateListing, CompanyDirectory, DirectoryEntry};
pub use source::{
    DEFAULT_DIRECTORY_URL, DirectoryLoader, DirectorySource, LocalCsvSource, RemoteCsvSource,
    parse_directory_csv,
};
