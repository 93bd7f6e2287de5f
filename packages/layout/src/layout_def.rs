//! Config-driven budget document layout definition.
//!
//! [`LayoutDefinition`] captures everything that changes between layout
//! versions of the budget document: which header columns to discard, which
//! physical rows are known split artifacts, and where the revenue and
//! expenditure sections sit. The pipeline itself never hard-codes any of
//! these numbers.

use std::path::Path;

use gov_budget_models::{MergeRange, RowRange};
use serde::Deserialize;

use crate::LayoutError;

/// Header labels that mark a unit-only column.
const DEFAULT_DROP_HEADERS: &[&str] = &["€", "Ευρώ"];

fn default_drop_headers() -> Vec<String> {
    DEFAULT_DROP_HEADERS.iter().map(|&s| s.to_owned()).collect()
}

/// A complete layout definition for one version of the budget document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayoutDefinition {
    /// Unique identifier (usually the fiscal year the layout was first
    /// seen in, e.g. `"2025"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Columns whose header equals one of these labels are dropped before
    /// the four-column schema is assigned.
    #[serde(default = "default_drop_headers")]
    pub drop_headers: Vec<String>,
    /// Known row-split artifacts, as indices into the table before any
    /// merge is applied.
    #[serde(default)]
    pub merge_ranges: Vec<MergeRange>,
    /// Rows holding revenue lines, after merging.
    pub revenue: RowRange,
    /// Rows holding expenditure lines, after merging.
    pub expenditure: RowRange,
    /// Column-detection overrides for the text-flow extractor.
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Optional tuning for table reconstruction from page text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExtractionConfig {
    /// Fixed column start offsets (in characters), replacing header-based
    /// column inference.
    pub column_starts: Option<Vec<usize>>,
    /// Minimum number of cells for a line to count as the header row.
    pub min_header_cells: Option<usize>,
}

impl LayoutDefinition {
    /// Merge ranges sorted by descending start, the order in which they
    /// must be applied so that earlier indices stay valid.
    #[must_use]
    pub fn merge_ranges_descending(&self) -> Vec<MergeRange> {
        let mut ranges = self.merge_ranges.clone();
        ranges.sort_unstable_by(|a, b| b.start.cmp(&a.start));
        ranges
    }

    /// Checks the definition for internal consistency.
    ///
    /// Bounds against an actual table are checked later, when the table is
    /// known; this only rejects layouts that can never be valid.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Invalid`] describing the first problem found.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.id.trim().is_empty() {
            return Err(LayoutError::Invalid("layout id is empty".to_string()));
        }

        for range in &self.merge_ranges {
            if range.start > range.stop {
                return Err(LayoutError::Invalid(format!(
                    "{}: merge range {range} has start after stop",
                    self.id
                )));
            }
        }

        if let Some(pair) = self
            .merge_ranges_descending()
            .windows(2)
            .find(|w| w[0].overlaps(&w[1]))
        {
            return Err(LayoutError::Invalid(format!(
                "{}: merge ranges {} and {} overlap",
                self.id, pair[1], pair[0]
            )));
        }

        for (label, range) in [("revenue", &self.revenue), ("expenditure", &self.expenditure)] {
            if !range.is_well_formed() {
                return Err(LayoutError::Invalid(format!(
                    "{}: {label} window {range} has start after end",
                    self.id
                )));
            }
        }

        if self.revenue.overlaps(&self.expenditure) {
            return Err(LayoutError::Invalid(format!(
                "{}: revenue window {} overlaps expenditure window {}",
                self.id, self.revenue, self.expenditure
            )));
        }

        if self.extraction.min_header_cells == Some(0) {
            return Err(LayoutError::Invalid(format!(
                "{}: min_header_cells must be at least 1",
                self.id
            )));
        }

        Ok(())
    }
}

/// Parses and validates a [`LayoutDefinition`] from a TOML string.
///
/// # Errors
///
/// Returns [`LayoutError::Toml`] if the TOML is malformed or missing
/// required fields, or [`LayoutError::Invalid`] if it fails validation.
pub fn parse_layout_toml(toml_str: &str) -> Result<LayoutDefinition, LayoutError> {
    let layout: LayoutDefinition =
        toml::de::from_str(toml_str).map_err(|e| LayoutError::Toml(e.to_string()))?;
    layout.validate()?;
    Ok(layout)
}

/// Reads a layout definition from a TOML file on disk.
///
/// # Errors
///
/// Returns [`LayoutError::Io`] if the file cannot be read, otherwise the
/// same errors as [`parse_layout_toml`].
pub fn load_layout_file(path: &Path) -> Result<LayoutDefinition, LayoutError> {
    let content = std::fs::read_to_string(path)?;
    let layout = parse_layout_toml(&content)?;
    log::debug!("Loaded layout {} from {}", layout.id, path.display());
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
id = "test"
name = "Test layout"

[revenue]
start = 0
end = 3

[expenditure]
start = 4
"#;

    #[test]
    fn applies_defaults() {
        let layout = parse_layout_toml(MINIMAL).unwrap();
        assert_eq!(layout.drop_headers, vec!["€", "Ευρώ"]);
        assert!(layout.merge_ranges.is_empty());
        assert_eq!(layout.revenue, RowRange::new(0, 3));
        assert_eq!(layout.expenditure, RowRange::open(4));
        assert_eq!(layout.extraction, ExtractionConfig::default());
    }

    #[test]
    fn parses_merge_ranges_as_pairs() {
        let toml = format!("merge_ranges = [[1, 2], [5, 7]]\n{MINIMAL}");
        let layout = parse_layout_toml(&toml).unwrap();
        assert_eq!(
            layout.merge_ranges,
            vec![MergeRange::new(1, 2), MergeRange::new(5, 7)]
        );
        assert_eq!(
            layout.merge_ranges_descending(),
            vec![MergeRange::new(5, 7), MergeRange::new(1, 2)]
        );
    }

    #[test]
    fn rejects_overlapping_merge_ranges() {
        let toml = format!("merge_ranges = [[1, 3], [3, 4]]\n{MINIMAL}");
        let err = parse_layout_toml(&toml).unwrap_err();
        assert!(matches!(err, LayoutError::Invalid(msg) if msg.contains("overlap")));
    }

    #[test]
    fn rejects_inverted_merge_range() {
        let toml = format!("merge_ranges = [[4, 2]]\n{MINIMAL}");
        assert!(matches!(
            parse_layout_toml(&toml),
            Err(LayoutError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_overlapping_sections() {
        let toml = r#"
id = "bad"
name = "Bad"
[revenue]
start = 0
end = 10
[expenditure]
start = 9
"#;
        let err = parse_layout_toml(toml).unwrap_err();
        assert!(matches!(err, LayoutError::Invalid(msg) if msg.contains("overlaps")));
    }

    #[test]
    fn missing_sections_is_toml_error() {
        let err = parse_layout_toml("id = \"x\"\nname = \"x\"\n").unwrap_err();
        assert!(matches!(err, LayoutError::Toml(_)));
    }

    #[test]
    fn reads_extraction_overrides() {
        let toml = format!("{MINIMAL}\n[extraction]\ncolumn_starts = [0, 30, 36, 90]\n");
        let layout = parse_layout_toml(&toml).unwrap();
        assert_eq!(layout.extraction.column_starts, Some(vec![0, 30, 36, 90]));
        assert_eq!(layout.extraction.min_header_cells, None);
    }
}
