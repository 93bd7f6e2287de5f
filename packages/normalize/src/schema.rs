//! Positional assignment of the four-column budget schema.
//!
//! Extracted header text is unreliable (merged or garbled cells), so
//! columns are identified by position only. The one exception is the
//! currency-label column some layouts print next to the amounts, which is
//! recognised by its header and dropped.

use gov_budget_models::{RawTable, Table4, TextRow};

use crate::NormalizeError;

/// Number of columns in the budget schema.
pub const SCHEMA_WIDTH: usize = 4;

/// Maps the first four retained columns of `raw` to
/// `REVENUE, ID, BILL, VALUE`.
///
/// Columns whose trimmed header equals any entry of `drop_headers` are
/// discarded first. Absent cells become empty strings and present cells are
/// trimmed.
///
/// # Errors
///
/// Returns [`NormalizeError::TooFewColumns`] if fewer than four columns
/// remain.
pub fn assign_schema(raw: &RawTable, drop_headers: &[String]) -> Result<Table4, NormalizeError> {
    let kept: Vec<usize> = raw
        .header
        .iter()
        .enumerate()
        .filter(|(_, header)| !drop_headers.iter().any(|d| d == header.trim()))
        .map(|(i, _)| i)
        .collect();

    let dropped = raw.column_count() - kept.len();
    if dropped > 0 {
        log::debug!("Dropped {dropped} currency-label column(s)");
    }

    let &[revenue, id, bill, value, ..] = kept.as_slice() else {
        return Err(NormalizeError::TooFewColumns { found: kept.len() });
    };

    if kept.len() > SCHEMA_WIDTH {
        log::debug!(
            "Ignoring {} column(s) beyond the schema: {:?}",
            kept.len() - SCHEMA_WIDTH,
            kept[SCHEMA_WIDTH..]
                .iter()
                .map(|&i| raw.header[i].as_str())
                .collect::<Vec<_>>()
        );
    }

    let cell = |row: usize, col: usize| raw.cell(row, col).map_or("", str::trim);

    Ok((0..raw.rows.len())
        .map(|r| TextRow::new(cell(r, revenue), cell(r, id), cell(r, bill), cell(r, value)))
        .collect())
}
