//! Statement normalization.
//!
//! Flattens a [`RawPeriodPayload`] into a [`NormalizedTable`]: one row per
//! field in site order, one column per period in chronological order, currency
//! amounts in millions.

use chrono::{Datelike, NaiveDate};

use findata_core::{
    FieldEntry, NormalizedTable, PeriodKind, RawPeriodPayload, TableRow, Unit,
};

/// Divisor from base currency units to millions.
const MILLIONS: f64 = 1_000_000.0;

/// Column label of a period end date.
///
/// Annual periods are labelled `FY<year>`; quarterly and TTM periods by the
/// quarter the date falls in, `Q<1-4>/<year>`. Only the first ten characters
/// are parsed, so timestamps are accepted. Returns the raw string and `None`
/// when the date cannot be parsed.
///
/// # Example
///
/// ```
/// use findata_alphaspread::normalize::period_label;
/// use findata_core::PeriodKind;
///
/// assert_eq!(period_label("2023-06-15", PeriodKind::Annual).0, "FY2023");
/// assert_eq!(period_label("2024-09-30T00:00:00", PeriodKind::Ttm).0, "Q3/2024");
/// ```
#[must_use]
pub fn period_label(raw: &str, period: PeriodKind) -> (String, Option<NaiveDate>) {
    let head: String = raw.chars().take(10).collect();
    match NaiveDate::parse_from_str(&head, "%Y-%m-%d") {
        Ok(date) => {
            let label = match period {
                PeriodKind::Annual => format!("FY{}", date.year()),
                PeriodKind::Quarterly | PeriodKind::Ttm => {
                    format!("Q{}/{}", date.month0() / 3 + 1, date.year())
                }
            };
            (label, Some(date))
        }
        Err(_) => (head, None),
    }
}

/// Returns true if values of `field` are kept in base units.
fn is_per_share(field: &FieldEntry) -> bool {
    field.unit == Unit::UsdPerShare || field.name.contains("EPS")
}

/// Normalizes `payload` as a table of `period` data.
///
/// Columns are sorted by parsed date; unparsable dates sort last in input
/// order. Dates that map to the same label share one column, keeping the
/// first position and the last value. Values beyond the last date are
/// ignored and missing values become `0`.
#[must_use]
pub fn normalize(payload: &RawPeriodPayload, period: PeriodKind) -> NormalizedTable {
    let mut columns: Vec<(String, Option<NaiveDate>)> = Vec::new();
    let mut date_to_column = Vec::with_capacity(payload.dates.len());
    for raw in &payload.dates {
        let (label, date) = period_label(raw, period);
        let idx = match columns.iter().position(|(l, _)| *l == label) {
            Some(idx) => idx,
            None => {
                columns.push((label, date));
                columns.len() - 1
            }
        };
        date_to_column.push(idx);
    }

    let mut order: Vec<usize> = (0..columns.len()).collect();
    order.sort_by_key(|&idx| {
        let date = columns[idx].1;
        (date.is_none(), date)
    });
    let mut position = vec![0; columns.len()];
    for (pos, &idx) in order.iter().enumerate() {
        position[idx] = pos;
    }

    let rows = payload
        .fields()
        .map(|field| {
            let scale = if is_per_share(field) { 1.0 } else { MILLIONS };
            let mut values = vec![0.0; columns.len()];
            for (value, &col) in field.values.iter().zip(&date_to_column) {
                values[position[col]] = value.map_or(0.0, |v| v / scale);
            }
            TableRow {
                field: field.name.clone(),
                row_kind: field.row_kind,
                values,
            }
        })
        .collect();

    NormalizedTable {
        columns: order.into_iter().map(|idx| columns[idx].0.clone()).collect(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use findata_core::RowKind;

    fn payload(json: &str) -> RawPeriodPayload {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_revenue_scaled_to_millions() {
        let table = normalize(
            &payload(
                r#"{"dates": ["2023-06-15"], "fieldsData": {"Revenue": [
                    {"name": "Revenue", "unit": "usd", "values": [{"value": 5000000}]}
                ]}, "selectedPeriod": "Annual"}"#,
            ),
            PeriodKind::Annual,
        );
        assert_eq!(table.columns, vec!["FY2023"]);
        assert_eq!(table.rows[0].values, vec![5.0]);
    }

    #[test]
    fn test_eps_and_per_share_not_scaled() {
        let table = normalize(
            &payload(
                r#"{"dates": ["2023-06-15"], "fieldsData": {"Per Share": [
                    {"name": "EPS Diluted", "unit": "usd", "values": [{"value": 1.23}]},
                    {"name": "Dividends", "unit": "usd_per_share", "values": [{"value": 0.5}]}
                ]}}"#,
            ),
            PeriodKind::Annual,
        );
        assert_eq!(table.rows[0].values, vec![1.23]);
        assert_eq!(table.rows[1].values, vec![0.5]);
    }

    #[test]
    fn test_columns_are_chronological() {
        let table = normalize(
            &payload(
                r#"{"dates": ["2023-01-01", "2022-01-01"], "fieldsData": {"Revenue": [
                    {"name": "Revenue", "values": [{"value": 2000000}, {"value": 1000000}]}
                ]}}"#,
            ),
            PeriodKind::Annual,
        );
        assert_eq!(table.columns, vec!["FY2022", "FY2023"]);
        assert_eq!(table.rows[0].values, vec![1.0, 2.0]);
    }

    #[test]
    fn test_quarter_labels() {
        let table = normalize(
            &payload(
                r#"{"dates": ["2024-03-31", "2024-12-31", "2024-06-30"], "fieldsData": {"Revenue": [
                    {"name": "Revenue", "values": [1, 3, 2]}
                ]}}"#,
            ),
            PeriodKind::Quarterly,
        );
        assert_eq!(table.columns, vec!["Q1/2024", "Q2/2024", "Q4/2024"]);
    }

    #[test]
    fn test_unparsable_dates_sort_last_in_input_order() {
        let table = normalize(
            &payload(
                r#"{"dates": ["LTM", "2023-01-01", "n/a", "2021-01-01"], "fieldsData": {"Revenue": [
                    {"name": "Revenue", "values": [4000000, 3000000, 5000000, 1000000]}
                ]}}"#,
            ),
            PeriodKind::Annual,
        );
        assert_eq!(table.columns, vec!["FY2021", "FY2023", "LTM", "n/a"]);
        assert_eq!(table.rows[0].values, vec![1.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_rows_keep_site_order_and_kind() {
        let table = normalize(
            &payload(
                r#"{"dates": ["2023-01-01"], "fieldsData": {
                    "Revenue": [
                        {"name": "Revenue", "ingroupType": "important", "values": [null]},
                        {"name": "Cost of Revenue", "ingroupType": "level-1", "values": []}
                    ],
                    "Operating Income": [
                        {"name": "Gross Profit", "ingroupType": "group-total", "values": [{"value": null}]}
                    ]
                }}"#,
            ),
            PeriodKind::Annual,
        );
        let fields: Vec<&str> = table.rows.iter().map(|r| r.field.as_str()).collect();
        assert_eq!(fields, vec!["Revenue", "Cost of Revenue", "Gross Profit"]);
        assert_eq!(table.rows[0].row_kind, RowKind::Important);
        assert_eq!(table.rows[2].row_kind, RowKind::GroupTotal);
        assert!(table.rows.iter().all(|r| r.values == vec![0.0]));
    }

    #[test]
    fn test_duplicate_labels_share_a_column() {
        let table = normalize(
            &payload(
                r#"{"dates": ["2023-03-31", "2023-12-31"], "fieldsData": {"Revenue": [
                    {"name": "Revenue", "values": [1000000, 2000000]}
                ]}}"#,
            ),
            PeriodKind::Annual,
        );
        assert_eq!(table.columns, vec!["FY2023"]);
        assert_eq!(table.rows[0].values, vec![2.0]);
    }
}
