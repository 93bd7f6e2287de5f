//! Repair of known row-split artifacts.
//!
//! Multi-line cell text makes the extractor emit one logical row as several
//! physical rows. Where that happens is a property of the document layout,
//! so the split locations come from configuration as inclusive
//! [`MergeRange`]s rather than being detected.

use gov_budget_models::{Field, MergeRange, Table4, TextRow};

use crate::NormalizeError;

/// Collapses rows `start..=stop` of `table` into row `start`.
///
/// Each column of the merged row is the space-joined non-empty text of that
/// column across the range, in physical order. Rows after `stop` shift up
/// so the table stays contiguous. `start == stop` returns the table
/// unchanged.
///
/// # Errors
///
/// Returns [`NormalizeError::RangeOutOfBounds`] if `start > stop` or
/// `stop` is not a row of `table`.
pub fn merge_row_range(
    mut table: Table4,
    start: usize,
    stop: usize,
) -> Result<Table4, NormalizeError> {
    check_bounds(MergeRange::new(start, stop), table.len())?;

    if start == stop {
        return Ok(table);
    }

    let parts: Vec<TextRow> = table.drain(start..=stop).collect();

    let mut merged = TextRow::default();
    for field in Field::ALL {
        *merged.cell_mut(field) = parts
            .iter()
            .map(|row| row.cell(field))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
    }

    log::trace!("Merged rows {start}..={stop} into {merged:?}");

    table.insert(start, merged);
    Ok(table)
}

/// Applies every configured merge range to `table`.
///
/// All ranges are checked against the unmerged table before anything is
/// changed, so a bad range never leaves a half-repaired table. Ranges are
/// then applied from the highest start to the lowest, which keeps the
/// indices of the ranges still to be applied valid.
///
/// # Errors
///
/// Returns [`NormalizeError::RangeOutOfBounds`] if a range does not fit the
/// table, or [`NormalizeError::OverlappingRanges`] if two ranges share a
/// row.
pub fn fix_known_splits(table: Table4, ranges: &[MergeRange]) -> Result<Table4, NormalizeError> {
    let len = table.len();

    for range in ranges {
        check_bounds(*range, len)?;
    }

    let mut ordered = ranges.to_vec();
    ordered.sort_unstable_by(|a, b| b.start.cmp(&a.start));

    if let Some(pair) = ordered.windows(2).find(|w| w[0].overlaps(&w[1])) {
        return Err(NormalizeError::OverlappingRanges {
            first: pair[1].to_string(),
            second: pair[0].to_string(),
        });
    }

    let table = ordered
        .iter()
        .try_fold(table, |t, range| merge_row_range(t, range.start, range.stop))?;

    log::debug!(
        "Applied {} merge range(s): {len} -> {} rows",
        ranges.len(),
        table.len()
    );

    Ok(table)
}

fn check_bounds(range: MergeRange, len: usize) -> Result<(), NormalizeError> {
    if range.start > range.stop || range.stop >= len {
        return Err(NormalizeError::RangeOutOfBounds {
            range: range.to_string(),
            len,
        });
    }
    Ok(())
}
