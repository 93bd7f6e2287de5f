#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Row-split repair and typed coercion for extracted budget tables.
//!
//! Turns a [`RawTable`] into one [`NormalizedRow`] per logical budget line:
//!
//! 1. [`schema::assign_schema`] picks the four schema columns by position.
//! 2. [`merge::fix_known_splits`] collapses the layout's known row-split
//!    artifacts.
//! 3. [`coerce::coerce_types`] parses `ID` and `VALUE`, degrading bad cells
//!    to zero.
//!
//! [`normalize`] runs all three for a [`LayoutDefinition`].

pub mod coerce;
pub mod merge;
pub mod schema;

use gov_budget_layout::LayoutDefinition;
use gov_budget_models::{NormalizedRow, RawTable};

pub use coerce::{CoercionReport, coerce_id, coerce_types, coerce_value, parse_id, parse_value};
pub use merge::{fix_known_splits, merge_row_range};
pub use schema::assign_schema;

/// Input-contract violations that abort normalization of a document.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// Fewer than four usable columns were extracted.
    #[error("Table has {found} usable column(s); at least 4 are required")]
    TooFewColumns {
        /// Columns left after dropping currency-label columns.
        found: usize,
    },

    /// A configured merge range does not fit the table.
    #[error("Merge range {range} is outside a table of {len} row(s)")]
    RangeOutOfBounds {
        /// The offending range.
        range: String,
        /// Row count of the table it was applied to.
        len: usize,
    },

    /// Two configured merge ranges share a row.
    #[error("Merge ranges {first} and {second} overlap")]
    OverlappingRanges {
        /// The lower range.
        first: String,
        /// The higher range.
        second: String,
    },
}

/// Runs schema assignment, split repair, and coercion for one document.
///
/// # Errors
///
/// Returns [`NormalizeError`] if the table has too few columns or the
/// layout's merge ranges do not fit it.
pub fn normalize(
    raw: &RawTable,
    layout: &LayoutDefinition,
) -> Result<(Vec<NormalizedRow>, CoercionReport), NormalizeError> {
    let table = assign_schema(raw, &layout.drop_headers)?;
    let table = fix_known_splits(table, &layout.merge_ranges)?;
    let (rows, report) = coerce_types(&table);

    if report.defaulted() > 0 {
        log::info!(
            "[{}] {} logical row(s) from {} physical row(s); {} ID and {} VALUE cell(s) defaulted to zero",
            layout.id,
            rows.len(),
            raw.rows.len(),
            report.id.total(),
            report.value.total()
        );
    } else {
        log::info!(
            "[{}] {} logical row(s) from {} physical row(s)",
            layout.id,
            rows.len(),
            raw.rows.len()
        );
    }

    Ok((rows, report))
}
