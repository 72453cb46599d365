//! Statement and period kind definitions.
//!
//! This module defines [`StatementKind`] for the three statements served by the
//! site, [`PeriodKind`] for the reporting granularities, and [`SheetKey`] which
//! pairs a statement with a [`SheetPeriod`] into the `"<Statement> (<Period>)"`
//! table key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FinDataError;

/// Reporting period granularity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodKind {
    /// Annual reporting period.
    #[default]
    Annual,
    /// Quarterly reporting period.
    Quarterly,
    /// Trailing twelve months, anchored on a quarter end.
    #[serde(rename = "TTM")]
    Ttm,
}

impl PeriodKind {
    /// All periods in the order they are requested from the site.
    pub const ALL: [Self; 3] = [Self::Annual, Self::Quarterly, Self::Ttm];

    /// Returns the label the site uses for this period.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Annual => "Annual",
            Self::Quarterly => "Quarterly",
            Self::Ttm => "TTM",
        }
    }
}

impl fmt::Display for PeriodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PeriodKind {
    type Err = FinDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "annual" => Ok(Self::Annual),
            "quarterly" => Ok(Self::Quarterly),
            "ttm" => Ok(Self::Ttm),
            other => Err(FinDataError::Parse(format!("Unknown period: {other}"))),
        }
    }
}

/// The three statements a listing exposes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatementKind {
    /// Income statement.
    IncomeStatement,
    /// Balance sheet.
    BalanceSheet,
    /// Cash flow statement.
    CashFlowStatement,
}

impl StatementKind {
    /// All statements in surface order.
    pub const ALL: [Self; 3] = [
        Self::IncomeStatement,
        Self::BalanceSheet,
        Self::CashFlowStatement,
    ];

    /// URL slug, also used as the CSS class of the statement element.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "income-statement",
            Self::BalanceSheet => "balance-sheet",
            Self::CashFlowStatement => "cash-flow-statement",
        }
    }

    /// Human readable name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::IncomeStatement => "Income Statement",
            Self::BalanceSheet => "Balance Sheet",
            Self::CashFlowStatement => "Cash Flow Statement",
        }
    }

    /// Periods the site offers for this statement.
    ///
    /// A balance sheet is a point-in-time snapshot, so it has no TTM view.
    #[must_use]
    pub const fn supported_periods(&self) -> &'static [PeriodKind] {
        match self {
            Self::BalanceSheet => &[PeriodKind::Annual, PeriodKind::Quarterly],
            Self::IncomeStatement | Self::CashFlowStatement => &PeriodKind::ALL,
        }
    }

    /// Returns true if the site offers `period` for this statement.
    #[must_use]
    pub fn supports(&self, period: PeriodKind) -> bool {
        self.supported_periods().contains(&period)
    }

    /// CSS selector of the rendered statement element.
    #[must_use]
    pub fn marker_selector(&self) -> String {
        format!(".{}.statement", self.slug())
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Period part of a [`SheetKey`].
///
/// The site occasionally reports a period outside [`PeriodKind`]; such a
/// table keeps the label the site used.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SheetPeriod {
    /// One of the periods the scraper requests.
    Standard(PeriodKind),
    /// Any other label reported by the site.
    Other(String),
}

impl SheetPeriod {
    /// Reads a period label as reported by the site; `None` for a blank label.
    #[must_use]
    pub fn from_site(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.is_empty() {
            return None;
        }
        Some(
            label
                .parse()
                .map_or_else(|_| Self::Other(label.to_string()), Self::Standard),
        )
    }

    /// Returns the standard period, if this is one.
    #[must_use]
    pub const fn kind(&self) -> Option<PeriodKind> {
        match self {
            Self::Standard(kind) => Some(*kind),
            Self::Other(_) => None,
        }
    }
}

impl From<PeriodKind> for SheetPeriod {
    fn from(kind: PeriodKind) -> Self {
        Self::Standard(kind)
    }
}

impl fmt::Display for SheetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Standard(kind) => f.write_str(kind.label()),
            Self::Other(label) => f.write_str(label),
        }
    }
}

/// Key of one statement table, e.g. `Income Statement (Annual)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SheetKey {
    /// Statement kind.
    pub statement: StatementKind,
    /// Period shown.
    pub period: SheetPeriod,
}

impl SheetKey {
    /// Creates a key for a standard period.
    #[must_use]
    pub const fn new(statement: StatementKind, period: PeriodKind) -> Self {
        Self {
            statement,
            period: SheetPeriod::Standard(period),
        }
    }

    /// Creates a key for a period label outside [`PeriodKind`].
    #[must_use]
    pub fn other(statement: StatementKind, label: impl Into<String>) -> Self {
        Self {
            statement,
            period: SheetPeriod::Other(label.into()),
        }
    }

    /// Returns the standard period of this key, if it has one.
    #[must_use]
    pub const fn period_kind(&self) -> Option<PeriodKind> {
        self.period.kind()
    }
}

impl fmt::Display for SheetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.statement, self.period)
    }
}
