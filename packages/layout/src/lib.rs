#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Per-version budget document layout definitions.
//!
//! The row numbers at which the extractor splits logical rows, and the row
//! windows holding the revenue and expenditure sections, are properties of
//! one printed layout. They live in TOML data (see [`registry`]) so a new
//! year's document needs a new layout file, not new code.

pub mod layout_def;
pub mod registry;

pub use layout_def::{ExtractionConfig, LayoutDefinition, load_layout_file, parse_layout_toml};
pub use registry::{all_layouts, find_layout};

/// Errors that can occur while loading layout definitions.
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    /// The layout TOML could not be parsed.
    #[error("Layout TOML error: {0}")]
    Toml(String),

    /// The layout parsed but is internally inconsistent.
    #[error("Invalid layout: {0}")]
    Invalid(String),

    /// No embedded layout has the requested id.
    #[error("Unknown layout '{id}'. Available: {available}")]
    Unknown {
        /// The requested layout id.
        id: String,
        /// Comma-separated ids of the embedded layouts.
        available: String,
    },

    /// Reading a layout file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
