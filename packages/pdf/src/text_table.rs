//! Text-flow table reconstruction from extracted PDF text.
//!
//! Budget tables have no ruled lines, so columns are recovered from the
//! text layout alone:
//! - a **cell** is a run of text; single spaces stay inside a cell, while
//!   two or more spaces (or a tab) end it
//! - the **header** is the first line with at least `min_header_cells`
//!   cells, and its cell offsets become the column starts unless explicit
//!   `column_starts` are configured
//! - every body cell goes to the column whose start is the closest one at
//!   or before the cell's offset

use std::sync::LazyLock;

use gov_budget_models::RawTable;
use regex::Regex;

use crate::PdfError;

/// Slack (in characters) allowed when a cell starts slightly left of its
/// column's header.
const COLUMN_TOLERANCE: usize = 2;

/// Options for [`extract`].
#[derive(Debug, Clone)]
pub struct TextTableOptions {
    /// Explicit column start offsets (in characters). When `None` the
    /// offsets of the header cells are used.
    pub column_starts: Option<Vec<usize>>,
    /// Minimum number of cells for a line to be accepted as the header.
    pub min_header_cells: usize,
}

impl Default for TextTableOptions {
    fn default() -> Self {
        Self {
            column_starts: None,
            min_header_cells: 4,
        }
    }
}

/// A run of text on one line, positioned by its starting character offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextCell {
    /// Offset of the first character, counted in `char`s.
    pub offset: usize,
    /// Cell text without surrounding whitespace.
    pub text: String,
}

/// Separator between cells: any run containing a tab, or two or more
/// spaces (regular or no-break).
static CELL_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[ \u{a0}]*\t[ \t\u{a0}]*|[ \u{a0}]{2,}").unwrap_or_else(|_| unreachable!())
});

/// Splits a line into cells separated by runs of 2+ spaces or a tab.
#[must_use]
pub fn split_cells(line: &str) -> Vec<TextCell> {
    let mut cells = Vec::new();
    let mut push = |from: usize, to: usize| {
        let segment = &line[from..to];
        let text = segment.trim();
        if text.is_empty() {
            return;
        }
        let byte_offset = from + (segment.len() - segment.trim_start().len());
        cells.push(TextCell {
            offset: line[..byte_offset].chars().count(),
            text: text.to_owned(),
        });
    };

    let mut last = 0;
    for gap in CELL_SEPARATOR.find_iter(line) {
        push(last, gap.start());
        last = gap.end();
    }
    push(last, line.len());

    cells
}

/// Returns the index of the column a cell starting at `offset` belongs to.
fn column_for(offset: usize, column_starts: &[usize]) -> usize {
    column_starts
        .iter()
        .rposition(|&start| start <= offset + COLUMN_TOLERANCE)
        .unwrap_or(0)
}

/// Places `cells` into a row with `width` columns, space-joining cells that
/// land in the same column.
fn place_cells(cells: Vec<TextCell>, column_starts: &[usize], width: usize) -> Vec<Option<String>> {
    let mut row: Vec<Option<String>> = vec![None; width];

    for cell in cells {
        let col = column_for(cell.offset, column_starts).min(width.saturating_sub(1));
        match &mut row[col] {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(&cell.text);
            }
            slot @ None => *slot = Some(cell.text),
        }
    }

    row
}

/// Builds a [`RawTable`] from the text of a single page.
///
/// Lines before the header (titles, captions) are skipped. Blank lines are
/// ignored.
///
/// # Errors
///
/// Returns [`PdfError::NoTable`] if no line qualifies as a header.
pub fn extract(text: &str, options: &TextTableOptions) -> Result<RawTable, PdfError> {
    let mut lines = text.lines().filter(|l| !l.trim().is_empty());

    let header_cells = lines
        .by_ref()
        .map(split_cells)
        .find(|cells| cells.len() >= options.min_header_cells)
        .ok_or(PdfError::NoTable {
            min_cells: options.min_header_cells,
        })?;

    let column_starts: Vec<usize> = options
        .column_starts
        .clone()
        .unwrap_or_else(|| header_cells.iter().map(|c| c.offset).collect());
    let width = column_starts.len().max(1);

    let header: Vec<String> = place_cells(header_cells, &column_starts, width)
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();

    let rows: Vec<Vec<Option<String>>> = lines
        .map(|line| place_cells(split_cells(line), &column_starts, width))
        .collect();

    log::debug!(
        "Reconstructed table with {} columns and {} body rows",
        header.len(),
        rows.len()
    );

    Ok(RawTable::new(header, rows))
}
