//! Aggregate rows and the rows they are computed from.
//!
//! Source names are the field names the site uses, spelling included.

use findata_core::StatementKind;

/// How a source row contributes to an aggregate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    /// Added.
    Plus,
    /// Subtracted.
    Minus,
}

/// An aggregate row defined as the signed sum of other rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormulaSpec {
    /// Field name of the aggregate row.
    pub target: &'static str,
    /// Source field names with their signs.
    pub sources: &'static [(&'static str, Sign)],
}

use Sign::Plus;

const INCOME_STATEMENT: &[FormulaSpec] = &[
    FormulaSpec {
        target: "Gross Profit",
        sources: &[("Revenue", Plus), ("Cost of Revenue", Plus)],
    },
    FormulaSpec {
        target: "Operating Income",
        sources: &[("Gross Profit", Plus), ("Operating Expenses", Plus)],
    },
    FormulaSpec {
        target: "Pre-Tax Income",
        sources: &[
            ("Operating Income", Plus),
            ("Interest Income Expense", Plus),
            ("Non-Reccuring Items", Plus),
            ("Total Other Income", Plus),
        ],
    },
    FormulaSpec {
        target: "Income from Continuing Operations",
        sources: &[("Pre-Tax Income", Plus), ("Tax Provision", Plus)],
    },
    FormulaSpec {
        target: "Net Income (Common)",
        sources: &[
            ("Income from Continuing Operations", Plus),
            ("Income to Minority Interest", Plus),
            ("Equity Earnings Affiliates", Plus),
        ],
    },
];

const BALANCE_SHEET: &[FormulaSpec] = &[
    FormulaSpec {
        target: "Total Current Assets",
        sources: &[
            ("Cash & Cash Equivalents", Plus),
            ("Short-Term Investments", Plus),
            ("Total Receivables", Plus),
            ("Inventory", Plus),
            ("Other Current Assets", Plus),
        ],
    },
    FormulaSpec {
        target: "Total Assets",
        sources: &[
            ("Total Current Assets", Plus),
            ("PP&E Net", Plus),
            ("Intangible Assets", Plus),
            ("Goodwill", Plus),
            ("Long-Term Investments", Plus),
            ("Other Long-Term Assets", Plus),
        ],
    },
    FormulaSpec {
        target: "Total Current Liabilities",
        sources: &[
            ("Accounts Payable", Plus),
            ("Accrued Liabilities", Plus),
            ("Short-Term Debt", Plus),
            ("Current Portion of Long-Term Debt", Plus),
            ("Other Current Liabilities", Plus),
        ],
    },
    FormulaSpec {
        target: "Total Liabilities",
        sources: &[
            ("Total Current Liabilities", Plus),
            ("Long-Term Debt", Plus),
            ("Deferred Income Tax", Plus),
            ("Minority Interest", Plus),
            ("Other Liabilities", Plus),
        ],
    },
    FormulaSpec {
        target: "Total Equity",
        sources: &[
            ("Common Stock", Plus),
            ("Retained Earnings", Plus),
            ("Additional Paid In Capital", Plus),
            ("Unrealized Security Profit/Loss", Plus),
            ("Treasury Stock", Plus),
            ("Other Equity", Plus),
        ],
    },
    FormulaSpec {
        target: "Total Liabilities & Equity",
        sources: &[("Total Liabilities", Plus), ("Total Equity", Plus)],
    },
];

const CASH_FLOW: &[FormulaSpec] = &[
    FormulaSpec {
        target: "Cash from Operating Activities",
        sources: &[
            ("Net Income", Plus),
            ("Depreciation & Amortization", Plus),
            ("Change in Deffered Taxes", Plus),
            ("Other Non-Cash Items", Plus),
            ("Change in Working Capital", Plus),
        ],
    },
    FormulaSpec {
        target: "Cash from Investing Activities",
        sources: &[("Capital Expenditures", Plus), ("Other Items", Plus)],
    },
    FormulaSpec {
        target: "Cash from Financing Activities",
        sources: &[
            ("Net Issuance of Common Stock", Plus),
            ("Net Issuance of Debt", Plus),
            ("Cash Paid for Dividends", Plus),
            ("Other", Plus),
        ],
    },
    FormulaSpec {
        target: "Net Change in Cash",
        sources: &[
            ("Cash from Operating Activities", Plus),
            ("Cash from Investing Activities", Plus),
            ("Cash from Financing Activities", Plus),
            ("Effect of Foreign Exchange Rates", Plus),
        ],
    },
    FormulaSpec {
        target: "Free Cash Flow",
        sources: &[("Cash from Operating Activities", Plus), ("Capital Expenditures", Plus)],
    },
];

/// Aggregate definitions for a statement.
///
/// Costs are reported as negative values, so every source is added.
#[must_use]
pub const fn formulas_for(statement: StatementKind) -> &'static [FormulaSpec] {
    match statement {
        StatementKind::IncomeStatement => INCOME_STATEMENT,
        StatementKind::BalanceSheet => BALANCE_SHEET,
        StatementKind::CashFlowStatement => CASH_FLOW,
    }
}
