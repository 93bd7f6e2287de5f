#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Budget table, line, section, and yearly record types.
//!
//! A budget document moves through three shapes:
//!
//! 1. [`RawTable`]: cells exactly as the extractor produced them, with an
//!    inferred header row and possibly missing cells.
//! 2. [`TextRow`]: the fixed four-column schema, still textual. Row-split
//!    repairs happen on this shape.
//! 3. [`NormalizedRow`]: typed `ID`/`VALUE` fields, ready to be sliced
//!    into the revenue ([`Section::Esoda`]) and expenditure
//!    ([`Section::Eksoda`]) halves of a [`YearBudget`].

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// A table as returned by the extraction step.
///
/// `rows` do not include the header row. A row may be shorter than
/// `header`; missing trailing cells are treated as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTable {
    /// Inferred header cell text, one entry per column.
    pub header: Vec<String>,
    /// Body rows in physical (top-to-bottom) order.
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    /// Creates a table from a header and body rows.
    #[must_use]
    pub const fn new(header: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { header, rows }
    }

    /// Number of columns, taken from the header.
    #[must_use]
    pub const fn column_count(&self) -> usize {
        self.header.len()
    }

    /// Returns the cell at (`row`, `col`), or `None` if absent.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .and_then(Option::as_deref)
    }
}

/// One of the four fixed columns of a schema-assigned budget table.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Field {
    /// Free-text revenue/expenditure category label.
    Revenue,
    /// Budget-line identifier.
    Id,
    /// Budget-line description.
    Bill,
    /// Monetary amount.
    Value,
}

impl Field {
    /// All fields in schema order.
    pub const ALL: [Self; 4] = [Self::Revenue, Self::Id, Self::Bill, Self::Value];
}

/// A schema-assigned row whose cells are still text.
///
/// An empty string means the cell was missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TextRow {
    /// Category label.
    pub revenue: String,
    /// Identifier text.
    pub id: String,
    /// Description text.
    pub bill: String,
    /// Amount text in the document's locale convention.
    pub value: String,
}

impl TextRow {
    /// Creates a row from its four cells in schema order.
    #[must_use]
    pub fn new(revenue: &str, id: &str, bill: &str, value: &str) -> Self {
        Self {
            revenue: revenue.to_owned(),
            id: id.to_owned(),
            bill: bill.to_owned(),
            value: value.to_owned(),
        }
    }

    /// Returns the text of `field`.
    #[must_use]
    pub fn cell(&self, field: Field) -> &str {
        match field {
            Field::Revenue => &self.revenue,
            Field::Id => &self.id,
            Field::Bill => &self.bill,
            Field::Value => &self.value,
        }
    }

    /// Returns a mutable reference to the text of `field`.
    pub const fn cell_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Revenue => &mut self.revenue,
            Field::Id => &mut self.id,
            Field::Bill => &mut self.bill,
            Field::Value => &mut self.value,
        }
    }
}

/// A schema-assigned table: one [`TextRow`] per physical row.
pub type Table4 = Vec<TextRow>;

/// A fully typed budget row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct NormalizedRow {
    /// Category label (dropped once the table is split into sections).
    pub revenue: String,
    /// Budget-line identifier, `0` when the source cell was not numeric.
    pub id: i64,
    /// Budget-line description.
    pub bill: String,
    /// Amount, `0.0` when the source cell was not numeric.
    pub value: f64,
}

impl NormalizedRow {
    /// Projects this row onto the persisted `{ID, BILL, VALUE}` shape.
    #[must_use]
    pub fn to_line(&self) -> BudgetLine {
        BudgetLine {
            id: self.id,
            bill: self.bill.clone(),
            value: self.value,
        }
    }
}

/// A single persisted budget line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct BudgetLine {
    /// Budget-line identifier.
    pub id: i64,
    /// Budget-line description.
    pub bill: String,
    /// Amount.
    pub value: f64,
}

/// Ordered budget lines for one side of one fiscal year.
///
/// Order matches the printed document and is preserved end to end.
pub type BudgetSection = Vec<BudgetLine>;

/// Which half of a yearly budget a section belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Section {
    /// Revenue lines.
    Esoda,
    /// Expenditure lines.
    Eksoda,
}

/// An inclusive range of physical rows that hold one logical row.
///
/// Written as a two-element array (`[start, stop]`) in layout files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct MergeRange {
    /// First physical row; receives the merged text.
    pub start: usize,
    /// Last physical row (inclusive).
    pub stop: usize,
}

impl MergeRange {
    /// Creates an inclusive range `start..=stop`.
    #[must_use]
    pub const fn new(start: usize, stop: usize) -> Self {
        Self { start, stop }
    }

    /// Whether the two inclusive ranges share a row.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start <= other.stop && other.start <= self.stop
    }
}

impl From<(usize, usize)> for MergeRange {
    fn from((start, stop): (usize, usize)) -> Self {
        Self { start, stop }
    }
}

impl From<MergeRange> for (usize, usize) {
    fn from(range: MergeRange) -> Self {
        (range.start, range.stop)
    }
}

impl std::fmt::Display for MergeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..={}", self.start, self.stop)
    }
}

/// A half-open window of rows, `start..end`, where a missing `end` runs
/// to the last row of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowRange {
    /// First row of the window.
    pub start: usize,
    /// One past the last row, or `None` for "until the end".
    #[serde(default)]
    pub end: Option<usize>,
}

impl RowRange {
    /// Creates the window `start..end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Creates the window `start..`.
    #[must_use]
    pub const fn open(start: usize) -> Self {
        Self { start, end: None }
    }

    /// Whether `start <= end`.
    #[must_use]
    pub const fn is_well_formed(&self) -> bool {
        match self.end {
            Some(end) => self.start <= end,
            None => true,
        }
    }

    /// Whether the window contains no rows regardless of table length.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.end, Some(end) if end <= self.start)
    }

    /// Whether the two windows share a row.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let self_before_other = match self.end {
            Some(end) => end <= other.start,
            None => false,
        };
        let other_before_self = match other.end {
            Some(end) => end <= self.start,
            None => false,
        };
        !self_before_other && !other_before_self
    }

    /// Resolves the window against a table of `len` rows.
    ///
    /// Returns `None` if the window reaches past the table.
    #[must_use]
    pub fn resolve(&self, len: usize) -> Option<std::ops::Range<usize>> {
        let end = self.end.unwrap_or(len);
        (self.start <= end && end <= len).then_some(self.start..end)
    }
}

impl std::fmt::Display for RowRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}..{end}", self.start),
            None => write!(f, "{}..", self.start),
        }
    }
}

/// Both sections of one fiscal year, as stored under the year key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearBudget {
    /// Revenue lines.
    pub esoda: BudgetSection,
    /// Expenditure lines.
    pub eksoda: BudgetSection,
}

impl YearBudget {
    /// Returns the lines of `section`.
    #[must_use]
    pub fn section(&self, section: Section) -> &[BudgetLine] {
        match section {
            Section::Esoda => &self.esoda,
            Section::Eksoda => &self.eksoda,
        }
    }

    /// Sum of `VALUE` over the lines of `section`.
    #[must_use]
    pub fn total(&self, section: Section) -> f64 {
        self.section(section).iter().map(|l| l.value).sum()
    }
}
