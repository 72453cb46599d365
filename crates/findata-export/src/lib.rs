#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/findata/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Spreadsheet export for scraped statements.
//!
//! - [`assemble`] plans the workbook: sheet order, aggregate formulas, ratios
//! - [`SpreadsheetWriter`] renders a plan; [`XlsxWriter`] writes Excel files (`xlsx` feature)
//! - [`export`] names the output file and drives a writer

/// Sheet planning.
pub mod assembler;
/// Aggregate row definitions.
pub mod formulas;
/// Output file naming and currency symbols.
pub mod naming;
/// Ratio row definitions.
pub mod ratios;
/// Writer trait and export entry point.
pub mod writer;
/// Excel writer.
#[cfg(feature = "xlsx")]
pub mod xlsx;

pub use assembler::{CANONICAL_ORDER, ExportPlan, SheetPlan, assemble};
pub use naming::{currency_symbol, output_file_name};
pub use writer::{SpreadsheetWriter, export};
#[cfg(feature = "xlsx")]
pub use xlsx::XlsxWriter;
