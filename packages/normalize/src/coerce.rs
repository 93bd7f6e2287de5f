//! Typed coercion of `ID` and `VALUE` cells.
//!
//! Extraction noise on a few cells must not cost a whole document, so
//! coercion never fails: a cell that does not parse becomes `0` / `0.0`.
//! That policy lives only in [`coerce_id`] and [`coerce_value`]. The strict
//! parsers ([`parse_id`], [`parse_value`]) are public so a stricter caller
//! can map failures to something else.
//!
//! Amounts use `.` as a thousands separator. Separators are removed
//! *before* parsing; parsing first would read `1.234` as one point two
//! three four. No other number format is recognised, so a `,` makes the
//! cell unparseable.

use gov_budget_models::{Field, NormalizedRow, TextRow};

/// The currency symbol that may prefix or suffix an amount.
const CURRENCY_SYMBOL: char = '€';

/// Strictly parses an identifier cell.
///
/// Integer text parses directly. Decimal text parses and truncates toward
/// zero. Empty, non-numeric, or non-finite text yields `None`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn parse_id(raw: &str) -> Option<i64> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite() && *v >= i64::MIN as f64 && *v < i64::MAX as f64)
            .map(|v| v.trunc() as i64)
    })
}

/// Strictly parses an amount cell.
///
/// Removes the currency symbol and every `.` thousands separator, then
/// parses what is left. Empty, non-numeric, or non-finite text yields
/// `None`.
#[must_use]
pub fn parse_value(raw: &str) -> Option<f64> {
    let stripped: String = raw
        .chars()
        .filter(|&c| c != '.' && c != CURRENCY_SYMBOL)
        .collect();
    let text = stripped.trim();
    if text.is_empty() {
        return None;
    }

    text.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerces an identifier cell, defaulting to `0`.
#[must_use]
pub fn coerce_id(raw: &str) -> i64 {
    parse_id(raw).unwrap_or(0)
}

/// Coerces an amount cell, defaulting to `0.0`.
#[must_use]
pub fn coerce_value(raw: &str) -> f64 {
    parse_value(raw).unwrap_or(0.0)
}

/// How many cells of one field fell back to the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldFallbacks {
    /// Cells that were empty.
    pub empty: usize,
    /// Cells that had text which did not parse.
    pub unparseable: usize,
}

impl FieldFallbacks {
    /// Total cells that took the default.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.empty + self.unparseable
    }
}

/// Summary of the defaults taken while coercing a table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoercionReport {
    /// Rows coerced.
    pub rows: usize,
    /// Fallbacks in the `ID` column.
    pub id: FieldFallbacks,
    /// Fallbacks in the `VALUE` column.
    pub value: FieldFallbacks,
}

impl CoercionReport {
    /// Total cells across both numeric columns that took the default.
    #[must_use]
    pub const fn defaulted(&self) -> usize {
        self.id.total() + self.value.total()
    }
}

fn record_fallback(row: usize, field: Field, raw: &str, fallbacks: &mut FieldFallbacks) {
    if raw.trim().is_empty() {
        fallbacks.empty += 1;
        log::trace!("Row {row}: empty {field}, using default");
    } else {
        fallbacks.unparseable += 1;
        log::warn!("Row {row}: {field} {raw:?} is not numeric, using default");
    }
}

/// Converts a schema-assigned table into typed rows.
///
/// Never fails; see the module docs for the default policy.
#[must_use]
pub fn coerce_types(table: &[TextRow]) -> (Vec<NormalizedRow>, CoercionReport) {
    let mut report = CoercionReport {
        rows: table.len(),
        ..CoercionReport::default()
    };

    let rows = table
        .iter()
        .enumerate()
        .map(|(i, row)| {
            if parse_id(&row.id).is_none() {
                record_fallback(i, Field::Id, &row.id, &mut report.id);
            }
            if parse_value(&row.value).is_none() {
                record_fallback(i, Field::Value, &row.value, &mut report.value);
            }

            NormalizedRow {
                revenue: row.revenue.clone(),
                id: coerce_id(&row.id),
                bill: row.bill.clone(),
                value: coerce_value(&row.value),
            }
        })
        .collect();

    (rows, report)
}
