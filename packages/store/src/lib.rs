#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Section partitioning and the multi-year budget JSON store.
//!
//! [`partition_sections`] turns a normalized table into the revenue
//! (`esoda`) and expenditure (`eksoda`) sections of one year.
//! [`BudgetStore`] holds every year processed so far and replaces one
//! year's entry at a time.

pub mod partition;
pub mod store;
pub mod summary;

use std::path::PathBuf;

pub use partition::partition_sections;
pub use store::{BudgetStore, merge_into_store};
pub use summary::YearSummary;

/// Errors from partitioning or from reading and writing the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The store file exists but is not valid JSON.
    #[error("Store {} is not valid JSON: {source}", path.display())]
    Malformed {
        /// Store file that was read.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The store file is valid JSON but not an object keyed by year.
    #[error("Store {} is not a JSON object keyed by year", path.display())]
    NotAnObject {
        /// Store file that was read.
        path: PathBuf,
    },

    /// A year entry does not have the `{esoda, eksoda}` shape.
    #[error("Entry for year {year} is malformed: {source}")]
    Entry {
        /// Year key of the entry.
        year: String,
        /// Deserialization error for the entry.
        #[source]
        source: serde_json::Error,
    },

    /// JSON serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A section window does not fit the normalized table.
    #[error("Section window {range} is outside a table of {len} row(s)")]
    RangeOutOfBounds {
        /// The offending window.
        range: String,
        /// Rows in the normalized table.
        len: usize,
    },

    /// The revenue and expenditure windows share a row.
    #[error("Revenue window {revenue} overlaps expenditure window {expenditure}")]
    OverlappingRanges {
        /// Revenue window.
        revenue: String,
        /// Expenditure window.
        expenditure: String,
    },
}
