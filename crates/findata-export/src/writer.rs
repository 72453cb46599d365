//! Writer abstraction and the export entry point.

use chrono::NaiveDateTime;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use findata_core::{FinDataError, JobResult, Result};

use crate::assembler::{ExportPlan, assemble};
use crate::naming::output_file_name;

/// Renders an [`ExportPlan`] to a file.
pub trait SpreadsheetWriter: Send + Sync + Debug {
    /// Writer name for logging.
    fn name(&self) -> &'static str;

    /// Writes the workbook to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`FinDataError::Export`] if the workbook cannot be produced or saved.
    fn write(&self, plan: &ExportPlan<'_>, path: &Path) -> Result<()>;
}

/// Writes `result` into `dir` under a timestamped name and returns the file path.
///
/// # Errors
///
/// - [`FinDataError::NoData`] if the result holds no tables.
/// - [`FinDataError::Export`] if the directory or the file cannot be written.
#[instrument(skip_all, fields(writer = writer.name(), listing = %result.listing))]
pub fn export<W: SpreadsheetWriter + ?Sized>(
    writer: &W,
    result: &JobResult,
    dir: &Path,
    at: NaiveDateTime,
) -> Result<PathBuf> {
    if result.tables.is_empty() {
        return Err(FinDataError::NoData {
            ticker: result.listing.ticker().to_string(),
        });
    }

    std::fs::create_dir_all(dir).map_err(|e| FinDataError::Export(e.to_string()))?;

    let plan = assemble(result);
    let path = dir.join(output_file_name(
        &plan.ticker,
        &result.company.display_name,
        at,
    ));
    writer.write(&plan, &path)?;

    info!(path = %path.display(), sheets = plan.sheet_count(), "Saved workbook");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use findata_core::{
        CompanyInfo, ListingCandidate, NormalizedTable, PeriodKind, ResolvedListing, RowKind,
        SheetKey, StatementKind, TableRow,
    };
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct RecordingWriter {
        sheets: Mutex<Vec<String>>,
    }

    impl SpreadsheetWriter for RecordingWriter {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn write(&self, plan: &ExportPlan<'_>, path: &Path) -> Result<()> {
            *self.sheets.lock().unwrap() = plan.sheets.iter().map(|s| s.name.clone()).collect();
            std::fs::write(path, b"ok").map_err(|e| FinDataError::Export(e.to_string()))
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    fn job() -> JobResult {
        JobResult::new(
            ResolvedListing::from(ListingCandidate::new("msft", "nasdaq")),
            CompanyInfo::new("Microsoft Corp", "USD"),
        )
    }

    #[test]
    fn test_export_names_file_and_creates_dir() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let mut result = job();
        result.tables.insert(
            SheetKey::new(StatementKind::CashFlowStatement, PeriodKind::Annual),
            NormalizedTable {
                columns: vec!["FY2023".to_string()],
                rows: vec![TableRow {
                    field: "Free Cash Flow".to_string(),
                    row_kind: RowKind::Important,
                    values: vec![1.0],
                }],
            },
        );

        let writer = RecordingWriter::default();
        let path = export(&writer, &result, &out, at()).unwrap();

        assert_eq!(path, out.join("MSFT_Microsoft Corp_20240102_030405.xlsx"));
        assert!(path.exists());
        assert_eq!(
            *writer.sheets.lock().unwrap(),
            vec!["Cash Flow Statement (Annual)".to_string()]
        );
    }

    #[test]
    fn test_empty_result_is_not_exported() {
        let dir = tempfile::tempdir().unwrap();
        let writer = RecordingWriter::default();
        let err = export(&writer, &job(), dir.path(), at()).unwrap_err();
        assert!(matches!(err, FinDataError::NoData { .. }));
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
