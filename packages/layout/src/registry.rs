//! Layout registry: loads all layout definitions from embedded TOML configs.
//!
//! Each `.toml` file in `packages/layout/layouts/` is baked into the binary
//! at compile time via [`include_str!`]. Supporting a new document layout
//! is a matter of adding a TOML file and listing it below; layouts can
//! also be loaded from disk with [`crate::load_layout_file`].

use crate::LayoutError;
use crate::layout_def::{LayoutDefinition, parse_layout_toml};

/// TOML configs embedded at compile time.
const LAYOUT_TOMLS: &[(&str, &str)] = &[("2025", include_str!("../layouts/2025.toml"))];

/// Total number of embedded layouts (used in tests).
#[cfg(test)]
const EXPECTED_LAYOUT_COUNT: usize = 1;

/// Returns all embedded layout definitions.
///
/// # Panics
///
/// Panics if any embedded TOML config is malformed (the configs ship with
/// the binary, so this is caught by the tests below).
#[must_use]
pub fn all_layouts() -> Vec<LayoutDefinition> {
    LAYOUT_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_layout_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Looks up an embedded layout by id.
///
/// # Errors
///
/// Returns [`LayoutError::Unknown`] if no embedded layout has that id.
pub fn find_layout(id: &str) -> Result<LayoutDefinition, LayoutError> {
    all_layouts()
        .into_iter()
        .find(|l| l.id == id)
        .ok_or_else(|| LayoutError::Unknown {
            id: id.to_owned(),
            available: all_layouts()
                .iter()
                .map(|l| l.id.clone())
                .collect::<Vec<_>>()
                .join(", "),
        })
}
