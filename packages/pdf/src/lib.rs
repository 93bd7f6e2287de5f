#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Page-one table extraction from budget PDFs.
//!
//! Budget documents publish their summary table on the first page as
//! borderless, text-flow layout. This crate pulls the page text with
//! [`pdf_extract`] and rebuilds a [`RawTable`] from it using the column
//! heuristics in [`text_table`].
//!
//! The rest of the pipeline only sees the [`TableExtractor`] trait, so the
//! extraction strategy can be swapped (or stubbed in tests) without
//! touching normalization.

pub mod text_table;

use std::path::Path;

use gov_budget_models::RawTable;

pub use text_table::TextTableOptions;

/// Errors specific to PDF extraction.
#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    /// Reading the PDF file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// PDF text extraction failed.
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    /// The document has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// No line on the page looked like a table header.
    #[error("No table header found (need a line with at least {min_cells} cells)")]
    NoTable {
        /// The configured minimum number of header cells.
        min_cells: usize,
    },
}

/// Produces the single table of a budget document.
pub trait TableExtractor {
    /// Extracts the table found on the first page of the document at
    /// `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PdfError`] if the document cannot be read or contains no
    /// recognisable table.
    fn extract_table(&self, path: &Path) -> Result<RawTable, PdfError>;
}

/// [`TableExtractor`] backed by [`pdf_extract`] text output.
#[derive(Debug, Clone, Default)]
pub struct PdfTableExtractor {
    options: TextTableOptions,
}

impl PdfTableExtractor {
    /// Creates an extractor with the given column heuristics.
    #[must_use]
    pub const fn new(options: TextTableOptions) -> Self {
        Self { options }
    }

    /// Extracts the text of the first page of `bytes`.
    fn first_page_text(bytes: &[u8]) -> Result<String, PdfError> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| PdfError::Extraction(format!("failed to extract text from PDF: {e}")))?;

        pages.into_iter().next().ok_or(PdfError::NoPages)
    }
}

impl TableExtractor for PdfTableExtractor {
    fn extract_table(&self, path: &Path) -> Result<RawTable, PdfError> {
        let bytes = std::fs::read(path)?;

        log::debug!("Read {} bytes from {}", bytes.len(), path.display());

        let text = Self::first_page_text(&bytes)?;

        log::debug!(
            "Extracted {} characters of page-1 text from {}",
            text.len(),
            path.display()
        );

        let table = text_table::extract(&text, &self.options)?;

        log::info!(
            "Extracted {}x{} table from {}",
            table.rows.len(),
            table.column_count(),
            path.display()
        );

        Ok(table)
    }
}
