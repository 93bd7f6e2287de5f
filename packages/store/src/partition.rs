//! Splitting a normalized table into revenue and expenditure sections.
//!
//! Section boundaries are explicit row windows from the layout; nothing is
//! inferred from the category labels. The `REVENUE` label column only helps
//! a human locate the windows and is dropped here.

use gov_budget_models::{BudgetSection, NormalizedRow, RowRange};

use crate::StoreError;

fn slice(rows: &[NormalizedRow], range: RowRange) -> Result<BudgetSection, StoreError> {
    let window = range
        .resolve(rows.len())
        .ok_or_else(|| StoreError::RangeOutOfBounds {
            range: range.to_string(),
            len: rows.len(),
        })?;

    Ok(rows[window].iter().map(NormalizedRow::to_line).collect())
}

/// Selects the revenue and expenditure rows of a normalized table.
///
/// Both windows are half-open; an open `end` runs to the last row.
///
/// # Errors
///
/// Returns [`StoreError::OverlappingRanges`] if the windows share a row,
/// or [`StoreError::RangeOutOfBounds`] if either window does not fit the
/// table.
pub fn partition_sections(
    rows: &[NormalizedRow],
    revenue: RowRange,
    expenditure: RowRange,
) -> Result<(BudgetSection, BudgetSection), StoreError> {
    if revenue.overlaps(&expenditure) {
        return Err(StoreError::OverlappingRanges {
            revenue: revenue.to_string(),
            expenditure: expenditure.to_string(),
        });
    }

    let esoda = slice(rows, revenue)?;
    let eksoda = slice(rows, expenditure)?;

    log::debug!(
        "Partitioned {} row(s): {} revenue ({revenue}), {} expenditure ({expenditure})",
        rows.len(),
        esoda.len(),
        eksoda.len()
    );

    Ok((esoda, eksoda))
}
