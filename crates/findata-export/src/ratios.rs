//! Ratio rows appended below income statements.

use findata_core::{PeriodKind, SheetKey, StatementKind};

/// How a ratio is computed from table rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RatioKind {
    /// `numerator / denominator` in each period column.
    Quotient {
        /// Numerator field.
        numerator: &'static str,
        /// Denominator field.
        denominator: &'static str,
        /// Use the absolute value of the numerator, for cost rows reported negative.
        absolute: bool,
    },
    /// Change of `field` against the previous period column.
    Growth {
        /// Field whose growth is measured.
        field: &'static str,
    },
}

/// A labelled ratio row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RatioSpec {
    /// Row label.
    pub label: &'static str,
    /// Computation.
    pub kind: RatioKind,
}

const fn margin(label: &'static str, numerator: &'static str) -> RatioSpec {
    RatioSpec {
        label,
        kind: RatioKind::Quotient {
            numerator,
            denominator: "Revenue",
            absolute: false,
        },
    }
}

const fn cost_share(label: &'static str, numerator: &'static str) -> RatioSpec {
    RatioSpec {
        label,
        kind: RatioKind::Quotient {
            numerator,
            denominator: "Revenue",
            absolute: true,
        },
    }
}

/// Ratios in row order.
pub const INCOME_RATIOS: &[RatioSpec] = &[
    margin("Gross Profit Margin", "Gross Profit"),
    margin("Operating Profit Margin", "Operating Income"),
    margin("Net Profit Margin", "Net Income (Common)"),
    cost_share("R&D as % of Revenue", "Research & Development"),
    cost_share("SG&A as % of Revenue", "Selling, General & Administrative"),
    RatioSpec {
        label: "Revenue Y/Y Growth",
        kind: RatioKind::Growth { field: "Revenue" },
    },
];

/// Ratios shown on the sheet for `key`; only annual and quarterly income statements get any.
#[must_use]
pub fn ratios_for(key: &SheetKey) -> &'static [RatioSpec] {
    match (key.statement, key.period_kind()) {
        (StatementKind::IncomeStatement, Some(PeriodKind::Annual | PeriodKind::Quarterly)) => {
            INCOME_RATIOS
        }
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_sheets() {
        let income = |p| SheetKey::new(StatementKind::IncomeStatement, p);
        assert_eq!(ratios_for(&income(PeriodKind::Annual)).len(), 6);
        assert_eq!(ratios_for(&income(PeriodKind::Quarterly)).len(), 6);
        assert!(ratios_for(&income(PeriodKind::Ttm)).is_empty());
        assert!(
            ratios_for(&SheetKey::new(StatementKind::CashFlowStatement, PeriodKind::Annual))
                .is_empty()
        );
        assert!(
            ratios_for(&SheetKey::other(StatementKind::IncomeStatement, "Semi-Annual")).is_empty()
        );
    }
}
