//! Sheet planning.
//!
//! Turns a [`JobResult`] into an ordered list of sheets, each carrying the
//! row positions its aggregate formulas and ratios refer to. Writers only
//! render a plan; they make no decisions about order or formulas.

use findata_core::{
    CompanyInfo, JobResult, NormalizedTable, PeriodKind, RevenueBreakdown, SheetKey,
    StatementKind,
};

use crate::formulas::{Sign, formulas_for};
use crate::ratios::{RatioKind, ratios_for};

/// Zero-based row of the column header line; rows above it hold the title block.
pub const HEADER_ROW: u32 = 4;

/// Longest sheet name spreadsheet applications accept.
pub const MAX_SHEET_NAME: usize = 31;

/// Sheet order of a full job.
pub static CANONICAL_ORDER: [SheetKey; 8] = [
    SheetKey::new(StatementKind::IncomeStatement, PeriodKind::Annual),
    SheetKey::new(StatementKind::BalanceSheet, PeriodKind::Annual),
    SheetKey::new(StatementKind::CashFlowStatement, PeriodKind::Annual),
    SheetKey::new(StatementKind::IncomeStatement, PeriodKind::Quarterly),
    SheetKey::new(StatementKind::BalanceSheet, PeriodKind::Quarterly),
    SheetKey::new(StatementKind::CashFlowStatement, PeriodKind::Quarterly),
    SheetKey::new(StatementKind::IncomeStatement, PeriodKind::Ttm),
    SheetKey::new(StatementKind::CashFlowStatement, PeriodKind::Ttm),
];

/// Spreadsheet column letters for a zero-based column index (`0` is `A`, `26` is `AA`).
#[must_use]
pub fn column_name(col: u16) -> String {
    let mut name = Vec::new();
    let mut n = u32::from(col) + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

/// Zero-based worksheet row of the table row at `idx`.
#[must_use]
pub const fn data_row(idx: usize) -> u32 {
    HEADER_ROW + 1 + idx as u32
}

/// `A1`-style reference to the table row at `idx` in column `col`.
fn cell(idx: usize, col: u16) -> String {
    format!("{}{}", column_name(col), data_row(idx) + 1)
}

/// An aggregate row with its sources resolved to table rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedFormula {
    /// Table row of the aggregate.
    pub row: usize,
    /// Table rows of the sources present in the table.
    pub terms: Vec<(usize, Sign)>,
}

impl ResolvedFormula {
    /// Formula text for period column `col`.
    #[must_use]
    pub fn render(&self, col: u16) -> String {
        let terms: Vec<String> = self
            .terms
            .iter()
            .map(|(row, sign)| match sign {
                Sign::Plus => cell(*row, col),
                Sign::Minus => format!("-{}", cell(*row, col)),
            })
            .collect();
        format!("=SUM({})", terms.join(","))
    }
}

/// A ratio row with its inputs resolved to table rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedRatio {
    /// Quotient of two rows.
    Quotient {
        /// Row label.
        label: &'static str,
        /// Numerator row.
        numerator: usize,
        /// Denominator row.
        denominator: usize,
        /// Take the absolute value of the numerator.
        absolute: bool,
    },
    /// Period-over-period growth of one row.
    Growth {
        /// Row label.
        label: &'static str,
        /// Measured row.
        row: usize,
    },
    /// An input row is missing from the table.
    Unavailable {
        /// Row label.
        label: &'static str,
    },
}

impl ResolvedRatio {
    /// Row label.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Quotient { label, .. } | Self::Growth { label, .. } | Self::Unavailable { label } => {
                *label
            }
        }
    }

    /// Formula text for period column `col`, or `None` where the ratio is not defined.
    ///
    /// Period columns start at `1`; growth has no value in the first one.
    #[must_use]
    pub fn render(&self, col: u16) -> Option<String> {
        match self {
            Self::Quotient {
                numerator,
                denominator,
                absolute,
                ..
            } => {
                let num = cell(*numerator, col);
                let den = cell(*denominator, col);
                Some(if *absolute {
                    format!("=ABS({num})/{den}")
                } else {
                    format!("={num}/{den}")
                })
            }
            Self::Growth { row, .. } if col >= 2 => {
                let current = cell(*row, col);
                let previous = cell(*row, col - 1);
                Some(format!("=({current}-{previous})/{previous}"))
            }
            Self::Growth { .. } | Self::Unavailable { .. } => None,
        }
    }
}

/// One statement sheet.
#[derive(Clone, Debug)]
pub struct SheetPlan<'a> {
    /// Statement and period shown.
    pub key: SheetKey,
    /// Sheet name, at most [`MAX_SHEET_NAME`] characters.
    pub name: String,
    /// Table data.
    pub table: &'a NormalizedTable,
    /// Aggregate rows present in the table.
    pub formulas: Vec<ResolvedFormula>,
    /// Ratio rows, empty for sheets without a ratio block.
    pub ratios: Vec<ResolvedRatio>,
}

impl SheetPlan<'_> {
    /// Formula for the table row at `idx`, if it is an aggregate.
    #[must_use]
    pub fn formula(&self, idx: usize) -> Option<&ResolvedFormula> {
        self.formulas.iter().find(|f| f.row == idx)
    }

    /// Zero-based row of the ratio block heading.
    #[must_use]
    pub const fn ratio_header_row(&self) -> u32 {
        data_row(self.table.rows.len()) + 2
    }
}

/// Everything a writer needs for one workbook.
#[derive(Clone, Debug)]
pub struct ExportPlan<'a> {
    /// Upper-cased ticker.
    pub ticker: String,
    /// Company name and currency.
    pub company: &'a CompanyInfo,
    /// Statement sheets in output order.
    pub sheets: Vec<SheetPlan<'a>>,
    /// Revenue breakdown, written as its own sheet when not empty.
    pub breakdown: &'a RevenueBreakdown,
}

impl ExportPlan<'_> {
    /// `TICKER - Company Name`, or just the ticker when the name is the ticker.
    #[must_use]
    pub fn company_display(&self) -> String {
        let name = self.company.display_name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case(&self.ticker) {
            self.ticker.clone()
        } else {
            format!("{} - {name}", self.ticker)
        }
    }

    /// Number of sheets the workbook will contain.
    #[must_use]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len() + usize::from(!self.breakdown.is_empty())
    }
}

fn sheet_name(key: &SheetKey) -> String {
    key.to_string().chars().take(MAX_SHEET_NAME).collect()
}

fn resolve_formulas(key: &SheetKey, table: &NormalizedTable) -> Vec<ResolvedFormula> {
    formulas_for(key.statement)
        .iter()
        .filter_map(|spec| {
            let row = table.row_index(spec.target)?;
            let terms: Vec<(usize, Sign)> = spec
                .sources
                .iter()
                .filter_map(|(source, sign)| table.row_index(source).map(|idx| (idx, *sign)))
                .collect();
            (!terms.is_empty()).then_some(ResolvedFormula { row, terms })
        })
        .collect()
}

fn resolve_ratios(key: &SheetKey, table: &NormalizedTable) -> Vec<ResolvedRatio> {
    ratios_for(key)
        .iter()
        .map(|spec| match spec.kind {
            RatioKind::Quotient {
                numerator,
                denominator,
                absolute,
            } => match (table.row_index(numerator), table.row_index(denominator)) {
                (Some(numerator), Some(denominator)) => ResolvedRatio::Quotient {
                    label: spec.label,
                    numerator,
                    denominator,
                    absolute,
                },
                _ => ResolvedRatio::Unavailable { label: spec.label },
            },
            RatioKind::Growth { field } => match table.row_index(field) {
                Some(row) => ResolvedRatio::Growth {
                    label: spec.label,
                    row,
                },
                None => ResolvedRatio::Unavailable { label: spec.label },
            },
        })
        .collect()
}

fn plan_sheet(key: SheetKey, table: &NormalizedTable) -> SheetPlan<'_> {
    SheetPlan {
        name: sheet_name(&key),
        formulas: resolve_formulas(&key, table),
        ratios: resolve_ratios(&key, table),
        key,
        table,
    }
}

/// Plans the workbook for `result`.
///
/// Sheets follow [`CANONICAL_ORDER`]; any other populated key is appended in
/// the order it was fetched.
#[must_use]
pub fn assemble(result: &JobResult) -> ExportPlan<'_> {
    let canonical = CANONICAL_ORDER
        .iter()
        .filter_map(|key| result.tables.get(key).map(|table| (key, table)));
    let extras = result
        .tables
        .iter()
        .filter(|(key, _)| !CANONICAL_ORDER.contains(*key));

    ExportPlan {
        ticker: result.listing.ticker().to_uppercase(),
        company: &result.company,
        sheets: canonical
            .chain(extras)
            .map(|(key, table)| plan_sheet(key.clone(), table))
            .collect(),
        breakdown: &result.breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use findata_core::{ListingCandidate, ResolvedListing, RowKind, TableRow};

    fn table(fields: &[&str]) -> NormalizedTable {
        NormalizedTable {
            columns: vec!["FY2022".to_string(), "FY2023".to_string()],
            rows: fields
                .iter()
                .map(|f| TableRow {
                    field: (*f).to_string(),
                    row_kind: RowKind::Normal,
                    values: vec![1.0, 2.0],
                })
                .collect(),
        }
    }

    fn job() -> JobResult {
        JobResult::new(
            ResolvedListing::from(ListingCandidate::new("aapl", "nasdaq")),
            CompanyInfo::new("Apple Inc.", "USD"),
        )
    }

    #[test]
    fn test_column_names() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(1), "B");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(701), "ZZ");
        assert_eq!(column_name(702), "AAA");
    }

    #[test]
    fn test_canonical_order() {
        let mut result = job();
        let income_ttm = SheetKey::new(StatementKind::IncomeStatement, PeriodKind::Ttm);
        let balance_annual = SheetKey::new(StatementKind::BalanceSheet, PeriodKind::Annual);
        let income_annual = SheetKey::new(StatementKind::IncomeStatement, PeriodKind::Annual);
        let cash_semi = SheetKey::other(StatementKind::CashFlowStatement, "Semi-Annual");
        result.tables.insert(income_ttm.clone(), table(&["Revenue"]));
        result.tables.insert(cash_semi.clone(), table(&["Net Change in Cash"]));
        result.tables.insert(balance_annual.clone(), table(&["Inventory"]));
        result.tables.insert(income_annual.clone(), table(&["Revenue"]));

        let plan = assemble(&result);
        let keys: Vec<SheetKey> = plan.sheets.iter().map(|s| s.key.clone()).collect();
        assert_eq!(keys, vec![income_annual, balance_annual, income_ttm, cash_semi]);
        assert_eq!(plan.sheets[0].name, "Income Statement (Annual)");
        assert_eq!(plan.sheets[3].name, "Cash Flow Statement (Semi-Annua");
        assert_eq!(plan.sheet_count(), 4);
        assert_eq!(plan.company_display(), "AAPL - Apple Inc.");
    }

    #[test]
    fn test_formula_sources_resolve_to_rows() {
        let t = table(&["Revenue", "Cost of Revenue", "Gross Profit", "Operating Income"]);
        let key = SheetKey::new(StatementKind::IncomeStatement, PeriodKind::Annual);
        let sheet = plan_sheet(key, &t);

        let gross = sheet.formula(2).unwrap();
        assert_eq!(gross.terms, vec![(0, Sign::Plus), (1, Sign::Plus)]);
        // Table row 0 sits on worksheet row 6 (1-based).
        assert_eq!(gross.render(1), "=SUM(B6,B7)");

        // Operating Expenses is absent, so only Gross Profit is summed.
        assert_eq!(sheet.formula(3).unwrap().render(2), "=SUM(C8)");
        assert!(sheet.formula(0).is_none());
    }

    #[test]
    fn test_aggregate_without_sources_has_no_formula() {
        let t = table(&["Net Change in Cash"]);
        let key = SheetKey::new(StatementKind::CashFlowStatement, PeriodKind::Ttm);
        assert!(plan_sheet(key, &t).formulas.is_empty());
    }

    #[test]
    fn test_ratios() {
        let t = table(&["Revenue", "Gross Profit", "Research & Development"]);
        let key = SheetKey::new(StatementKind::IncomeStatement, PeriodKind::Quarterly);
        let sheet = plan_sheet(key, &t);
        assert_eq!(sheet.ratios.len(), 6);

        assert_eq!(sheet.ratios[0].render(1).as_deref(), Some("=B7/B6"));
        assert_eq!(sheet.ratios[1], ResolvedRatio::Unavailable { label: "Operating Profit Margin" });
        assert_eq!(sheet.ratios[3].render(2).as_deref(), Some("=ABS(C8)/C6"));

        let growth = &sheet.ratios[5];
        assert_eq!(growth.label(), "Revenue Y/Y Growth");
        assert_eq!(growth.render(1), None);
        assert_eq!(growth.render(2).as_deref(), Some("=(C6-B6)/B6"));

        assert_eq!(sheet.ratio_header_row(), 10);
    }

    #[test]
    fn test_ttm_income_has_no_ratios() {
        let t = table(&["Revenue"]);
        let key = SheetKey::new(StatementKind::IncomeStatement, PeriodKind::Ttm);
        assert!(plan_sheet(key, &t).ratios.is_empty());
    }

    #[test]
    fn test_company_display_falls_back_to_ticker() {
        let mut result = job();
        result.company = CompanyInfo::new("AAPL", "USD");
        assert_eq!(assemble(&result).company_display(), "AAPL");
    }
}
