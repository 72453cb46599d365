//! Core data types for scraped financial statements.
//!
//! This module defines the data structures that flow through a job:
//!
//! - [`ListingCandidate`] / [`ResolvedListing`] - A (ticker, exchange) pair on the site
//! - [`RawPeriodPayload`] - One statement period as the site's components hold it
//! - [`NormalizedTable`] - A flat field × period table in millions
//! - [`RevenueBreakdown`] - Segment and geography revenue sections
//! - [`CompanyInfo`] - Display name and reporting currency
//! - [`JobResult`] - Everything one job collected, possibly partial

use polars::prelude::{Column, DataFrame, PlSmallStr};
use serde::de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{FinDataError, Result};
use crate::period::{SheetKey, SheetPeriod, StatementKind};

/// A (ticker, exchange) pair to try against the site.
///
/// Both parts are stored lower-cased, which is the form the site uses in URLs.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListingCandidate {
    /// Site-normalized ticker.
    pub ticker: String,
    /// Site exchange slug.
    pub exchange: String,
}

impl ListingCandidate {
    /// Creates a new candidate, lower-casing both parts.
    #[must_use]
    pub fn new(ticker: impl Into<String>, exchange: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into().trim().to_lowercase(),
            exchange: exchange.into().trim().to_lowercase(),
        }
    }
}

impl fmt::Display for ListingCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.ticker, self.exchange)
    }
}

/// The first candidate confirmed to serve statement data.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedListing {
    ticker: String,
    exchange: String,
}

impl ResolvedListing {
    /// Returns the site ticker.
    #[must_use]
    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    /// Returns the site exchange slug.
    #[must_use]
    pub fn exchange(&self) -> &str {
        &self.exchange
    }

    /// Base URL of the listing's financials section.
    #[must_use]
    pub fn financials_url(&self, base_url: &str) -> String {
        format!(
            "{}/security/{}/{}/financials",
            base_url.trim_end_matches('/'),
            self.exchange,
            self.ticker
        )
    }

    /// URL of one statement page.
    #[must_use]
    pub fn statement_url(&self, base_url: &str, statement: StatementKind) -> String {
        format!("{}/{}", self.financials_url(base_url), statement.slug())
    }

    /// URL of the revenue breakdown page.
    #[must_use]
    pub fn breakdown_url(&self, base_url: &str) -> String {
        format!("{}/revenue-breakdown", self.financials_url(base_url))
    }
}

impl From<ListingCandidate> for ResolvedListing {
    fn from(candidate: ListingCandidate) -> Self {
        Self {
            ticker: candidate.ticker,
            exchange: candidate.exchange,
        }
    }
}

impl fmt::Display for ResolvedListing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} on {}",
            self.ticker.to_uppercase(),
            self.exchange.to_uppercase()
        )
    }
}

/// Presentation hint the site attaches to each statement row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowKind {
    /// Plain row.
    #[default]
    Normal,
    /// Indented sub-item.
    Level1,
    /// Subtotal of a group.
    GroupTotal,
    /// Highlighted key line.
    Important,
}

impl RowKind {
    /// Parses the site's `ingroupType` value; anything unknown is [`RowKind::Normal`].
    #[must_use]
    pub fn from_site(value: &str) -> Self {
        match value {
            "level-1" => Self::Level1,
            "group-total" => Self::GroupTotal,
            "important" => Self::Important,
            _ => Self::Normal,
        }
    }

    /// The site's spelling of this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Level1 => "level-1",
            Self::GroupTotal => "group-total",
            Self::Important => "important",
        }
    }

    /// Group totals and important rows are rendered with emphasis.
    #[must_use]
    pub const fn is_emphasized(&self) -> bool {
        matches!(self, Self::GroupTotal | Self::Important)
    }
}

/// Unit of a statement row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Currency amount in base units.
    #[default]
    Usd,
    /// Currency amount per share.
    UsdPerShare,
    /// Anything else (counts, ratios).
    Other,
}

impl Unit {
    /// Parses the site's `unit` value.
    #[must_use]
    pub fn from_site(value: &str) -> Self {
        match value {
            "usd" => Self::Usd,
            "usd_per_share" => Self::UsdPerShare,
            _ => Self::Other,
        }
    }
}

/// One statement row as the site delivers it.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct FieldEntry {
    /// Row label.
    #[serde(default)]
    pub name: String,
    /// Presentation hint.
    #[serde(rename = "ingroupType", default, deserialize_with = "lenient_row_kind")]
    pub row_kind: RowKind,
    /// Unit of the values.
    #[serde(default, deserialize_with = "lenient_unit")]
    pub unit: Unit,
    /// Values aligned 1:1 with the payload's dates; `None` where the site has no number.
    #[serde(default, deserialize_with = "cell_values")]
    pub values: Vec<Option<f64>>,
}

/// A named group of rows, e.g. "Revenue" or "Operating Expenses".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldGroup {
    /// Group name.
    pub name: String,
    /// Rows in display order.
    pub fields: Vec<FieldEntry>,
}

/// One statement period as held by the site's reactive component.
///
/// Deserializes from `{dates, fieldsData, selectedPeriod}`. Field groups keep
/// the order the site sent them in, which fixes the row order of the table.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct RawPeriodPayload {
    /// Period end dates, as date-like strings.
    #[serde(default, deserialize_with = "date_strings")]
    pub dates: Vec<String>,
    /// Field groups in site order.
    #[serde(rename = "fieldsData", default, deserialize_with = "ordered_groups")]
    pub field_groups: Vec<FieldGroup>,
    /// The period the component reports as selected; `None` if it reports none.
    #[serde(rename = "selectedPeriod", default, deserialize_with = "lenient_period")]
    pub selected_period: Option<SheetPeriod>,
}

impl RawPeriodPayload {
    /// Returns true if the payload carries no dates or no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.field_groups.iter().all(|g| g.fields.is_empty())
    }

    /// Iterates rows across all groups in order.
    pub fn fields(&self) -> impl Iterator<Item = &FieldEntry> {
        self.field_groups.iter().flat_map(|g| g.fields.iter())
    }
}

fn lenient_row_kind<'de, D>(deserializer: D) -> std::result::Result<RowKind, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().map(RowKind::from_site).unwrap_or_default())
}

fn lenient_unit<'de, D>(deserializer: D) -> std::result::Result<Unit, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().map(Unit::from_site).unwrap_or_default())
}

fn lenient_period<'de, D>(deserializer: D) -> std::result::Result<Option<SheetPeriod>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.as_deref().and_then(SheetPeriod::from_site))
}

fn date_strings<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|v| match v {
            Value::String(s) => s,
            Value::Object(mut map) => match map.remove("date") {
                Some(Value::String(s)) => s,
                Some(other) => other.to_string(),
                None => String::new(),
            },
            other => other.to_string(),
        })
        .collect())
}

fn cell_values<'de, D>(deserializer: D) -> std::result::Result<Vec<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    fn number(value: &Value) -> Option<f64> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            Value::Object(map) => map.get("value").and_then(number),
            _ => None,
        }
    }

    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.iter().map(number).collect())
}

fn ordered_groups<'de, D>(deserializer: D) -> std::result::Result<Vec<FieldGroup>, D::Error>
where
    D: Deserializer<'de>,
{
    struct GroupsVisitor;

    impl<'de> Visitor<'de> for GroupsVisitor {
        type Value = Vec<FieldGroup>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of field groups")
        }

        fn visit_map<A>(self, mut map: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut groups = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, fields)) = map.next_entry::<String, Vec<FieldEntry>>()? {
                groups.push(FieldGroup { name, fields });
            }
            Ok(groups)
        }

        // An empty group map is serialized as `[]` by the site's backend.
        fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            if seq.next_element::<IgnoredAny>()?.is_some() {
                return Err(de::Error::custom("expected an empty list of field groups"));
            }
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(GroupsVisitor)
}

/// One row of a [`NormalizedTable`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label.
    pub field: String,
    /// Presentation hint carried over from the site.
    pub row_kind: RowKind,
    /// Values aligned with the table's columns, in millions (per-share rows unscaled).
    pub values: Vec<f64>,
}

/// A statement flattened to one row per field and one column per period.
///
/// Columns are period labels (`FY2023`, `Q3/2024`) in chronological order.
/// Row order is the site's order and is relied on for formula lookups.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTable {
    /// Period labels, oldest first.
    pub columns: Vec<String>,
    /// Rows in site order.
    pub rows: Vec<TableRow>,
}

impl NormalizedTable {
    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of the first row named `field`.
    #[must_use]
    pub fn row_index(&self, field: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.field == field)
    }

    /// Value of `field` in the column labelled `label`.
    #[must_use]
    pub fn value(&self, field: &str, label: &str) -> Option<f64> {
        let col = self.columns.iter().position(|c| c == label)?;
        let row = &self.rows[self.row_index(field)?];
        row.values.get(col).copied()
    }

    /// Renders the table as a DataFrame with `Field`, `_Type` and one column per period.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let mut columns = Vec::with_capacity(self.columns.len() + 2);
        columns.push(Column::new(
            PlSmallStr::from("Field"),
            self.rows.iter().map(|r| r.field.as_str()).collect::<Vec<_>>(),
        ));
        columns.push(Column::new(
            PlSmallStr::from("_Type"),
            self.rows
                .iter()
                .map(|r| r.row_kind.as_str())
                .collect::<Vec<_>>(),
        ));
        for (idx, label) in self.columns.iter().enumerate() {
            let values: Vec<f64> = self
                .rows
                .iter()
                .map(|r| r.values.get(idx).copied().unwrap_or(0.0))
                .collect();
            columns.push(Column::new(PlSmallStr::from(label.as_str()), values));
        }

        DataFrame::new(columns).map_err(|e| FinDataError::Other(e.to_string()))
    }
}

/// One line of a revenue breakdown section.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BreakdownItem {
    /// Segment or region name.
    pub name: String,
    /// Revenue in millions.
    pub value: f64,
}

/// A "Breakdown by ..." section of the revenue breakdown page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BreakdownSection {
    /// Section name, e.g. `Segments` or `Geography`.
    pub name: String,
    /// Total revenue in millions.
    pub total: f64,
    /// Items in page order.
    pub items: Vec<BreakdownItem>,
}

impl BreakdownSection {
    /// Fraction of the section total contributed by `item`; 0 when the total is not positive.
    #[must_use]
    pub fn share(&self, item: &BreakdownItem) -> f64 {
        if self.total > 0.0 {
            item.value / self.total
        } else {
            0.0
        }
    }
}

/// All revenue breakdown sections found on the page, in page order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueBreakdown {
    /// Sections in page order.
    pub sections: Vec<BreakdownSection>,
}

impl RevenueBreakdown {
    /// Returns true if no section was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Looks up a section by name.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&BreakdownSection> {
        self.sections.iter().find(|s| s.name == name)
    }
}

/// Company display name and reporting currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyInfo {
    /// Name shown in the page header.
    pub display_name: String,
    /// ISO currency code.
    pub currency_code: String,
}

impl CompanyInfo {
    /// Creates new company info.
    #[must_use]
    pub fn new(display_name: impl Into<String>, currency_code: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            currency_code: currency_code.into(),
        }
    }
}

/// Statement tables keyed by [`SheetKey`], in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatementTables {
    entries: Vec<(SheetKey, NormalizedTable)>,
}

impl StatementTables {
    /// Creates an empty collection.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Inserts `table` under `key` unless the key is already populated.
    ///
    /// Returns true if the table was stored.
    pub fn insert(&mut self, key: SheetKey, table: NormalizedTable) -> bool {
        if self.contains(&key) {
            return false;
        }
        self.entries.push((key, table));
        true
    }

    /// Returns true if `key` is populated.
    #[must_use]
    pub fn contains(&self, key: &SheetKey) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Looks up a table.
    #[must_use]
    pub fn get(&self, key: &SheetKey) -> Option<&NormalizedTable> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, t)| t)
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no tables.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates tables in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&SheetKey, &NormalizedTable)> {
        self.entries.iter().map(|(k, t)| (k, t))
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &SheetKey> {
        self.entries.iter().map(|(k, _)| k)
    }
}

/// Everything one job collected.
///
/// Built incrementally by the fetch coordinator; any statement × period cell
/// may be missing if its fetch failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    /// The listing the data was fetched from.
    pub listing: ResolvedListing,
    /// Company name and currency.
    pub company: CompanyInfo,
    /// Statement tables.
    pub tables: StatementTables,
    /// Revenue breakdown sections.
    pub breakdown: RevenueBreakdown,
}

impl JobResult {
    /// Creates an empty result for `listing`.
    #[must_use]
    pub fn new(listing: ResolvedListing, company: CompanyInfo) -> Self {
        Self {
            listing,
            company,
            tables: StatementTables::new(),
            breakdown: RevenueBreakdown::default(),
        }
    }
}
