#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Library for ingesting budget PDFs into the multi-year JSON store.
//!
//! One document flows through extraction, normalization, and section
//! partitioning, and its year entry is merged into the in-memory
//! [`BudgetStore`] only once every step has succeeded. A batch run loads
//! the store once, processes its documents in order, and writes the store
//! once at the end.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use gov_budget_ingest_models::{DocumentJob, DocumentResult, ProgressCallback, RunConfig, RunReport};
use gov_budget_layout::{LayoutDefinition, LayoutError, find_layout, load_layout_file};
use gov_budget_models::{NormalizedRow, RawTable};
use gov_budget_normalize::{CoercionReport, NormalizeError, normalize};
use gov_budget_pdf::{PdfError, PdfTableExtractor, TableExtractor, TextTableOptions};
use gov_budget_store::{BudgetStore, StoreError, partition_sections};

/// Environment variable overriding the default store path.
pub const STORE_PATH_ENV: &str = "BUDGET_STORE_PATH";

/// Store path used when neither the CLI nor the environment names one.
pub const DEFAULT_STORE_PATH: &str = "budget.json";

/// Errors that abort a document or a run.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    Pdf(#[from] PdfError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid combination of inputs.
    #[error("{0}")]
    Config(String),
}

/// Returns the store path from [`STORE_PATH_ENV`], or
/// [`DEFAULT_STORE_PATH`] if it is unset.
#[must_use]
pub fn default_store_path() -> PathBuf {
    std::env::var_os(STORE_PATH_ENV)
        .filter(|v| !v.is_empty())
        .map_or_else(|| PathBuf::from(DEFAULT_STORE_PATH), PathBuf::from)
}

/// Resolves the layout a job asks for.
///
/// A `layout_file` wins over an embedded `layout` id; with neither, the
/// embedded layout whose id is the job's year is used.
///
/// # Errors
///
/// Returns [`IngestError::Layout`] if the file cannot be loaded or no
/// embedded layout matches.
pub fn resolve_layout(job: &DocumentJob) -> Result<LayoutDefinition, IngestError> {
    select_layout(job.layout.as_deref(), job.layout_file.as_deref(), &job.year)
}

/// Layout used by `inspect` when none is named.
pub const DEFAULT_INSPECT_LAYOUT: &str = "2025";

/// Loads `layout_file` if given, else the embedded layout `layout`, else
/// the embedded layout `default_id`.
///
/// # Errors
///
/// Returns [`IngestError::Layout`] if the file cannot be loaded or no
/// embedded layout matches.
pub fn select_layout(
    layout: Option<&str>,
    layout_file: Option<&Path>,
    default_id: &str,
) -> Result<LayoutDefinition, IngestError> {
    let layout = match layout_file {
        Some(file) => load_layout_file(file)?,
        None => find_layout(layout.unwrap_or(default_id))?,
    };
    Ok(layout)
}

/// Text-table options for a layout, falling back to the extractor defaults.
#[must_use]
pub fn extraction_options(layout: &LayoutDefinition) -> TextTableOptions {
    let defaults = TextTableOptions::default();
    TextTableOptions {
        column_starts: layout.extraction.column_starts.clone(),
        min_header_cells: layout
            .extraction
            .min_header_cells
            .unwrap_or(defaults.min_header_cells),
    }
}

/// Builds the PDF extractor configured for `layout`.
#[must_use]
pub fn pdf_extractor_for(layout: &LayoutDefinition) -> PdfTableExtractor {
    PdfTableExtractor::new(extraction_options(layout))
}

/// Runs one document through the pipeline and stores its year entry.
///
/// The store is only touched after extraction, normalization, and
/// partitioning have all succeeded, so a failed document leaves it as it
/// was.
///
/// # Errors
///
/// Returns [`IngestError::Config`] if `year` is blank, or the error of
/// the first step that fails.
pub fn process_document<E: TableExtractor + ?Sized>(
    extractor: &E,
    path: &Path,
    year: &str,
    layout: &LayoutDefinition,
    store: &mut BudgetStore,
) -> Result<DocumentResult, IngestError> {
    if year.trim().is_empty() {
        return Err(IngestError::Config(format!(
            "{}: fiscal year must not be empty",
            path.display()
        )));
    }

    let start = Instant::now();
    log::info!(
        "[{year}] Ingesting {} with layout {}",
        path.display(),
        layout.id
    );

    let raw = extractor.extract_table(path)?;
    let (rows, report) = normalize(&raw, layout)?;
    let (esoda, eksoda) = partition_sections(&rows, layout.revenue, layout.expenditure)?;

    let result = DocumentResult {
        year: year.to_owned(),
        layout_id: layout.id.clone(),
        rows_extracted: raw.rows.len(),
        rows_normalized: rows.len(),
        revenue_lines: esoda.len(),
        expenditure_lines: eksoda.len(),
        cells_defaulted: report.defaulted(),
        duration: start.elapsed(),
    };

    store.merge_year(year, esoda, eksoda)?;

    log::info!(
        "[{year}] Done: {} revenue, {} expenditure line(s) in {:.1}s",
        result.revenue_lines,
        result.expenditure_lines,
        result.duration.as_secs_f64()
    );

    Ok(result)
}

/// Processes `jobs` in order against one in-memory store.
///
/// A failing document is logged and recorded in the report; the remaining
/// documents still run.
pub fn run_documents<E, F>(
    jobs: &[DocumentJob],
    store: &mut BudgetStore,
    make_extractor: F,
    progress: &Arc<dyn ProgressCallback>,
) -> RunReport
where
    E: TableExtractor,
    F: Fn(&LayoutDefinition) -> E,
{
    let mut report = RunReport::default();
    progress.set_total(jobs.len() as u64);

    for job in jobs {
        progress.set_message(format!("{} ({})", job.year, job.path.display()));

        let outcome = resolve_layout(job).and_then(|layout| {
            let extractor = make_extractor(&layout);
            process_document(&extractor, &job.path, &job.year, &layout, store)
        });

        match outcome {
            Ok(result) => report.succeeded.push(result),
            Err(e) => {
                log::error!("[{}] Failed to ingest {}: {e}", job.year, job.path.display());
                report.failed.push((job.path.clone(), e.to_string()));
            }
        }

        progress.inc(1);
    }

    progress.finish(format!(
        "{} ingested, {} failed",
        report.succeeded.len(),
        report.failed.len()
    ));

    report
}

/// Loads the store at `output`, processes `jobs`, and writes the store back
/// if at least one document succeeded.
///
/// # Errors
///
/// Returns [`IngestError::Store`] if the existing store is malformed
/// (before any document is processed) or cannot be written.
pub fn run_batch<E, F>(
    jobs: &[DocumentJob],
    output: &Path,
    make_extractor: F,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunReport, IngestError>
where
    E: TableExtractor,
    F: Fn(&LayoutDefinition) -> E,
{
    let mut store = BudgetStore::load(output)?;

    let report = run_documents(jobs, &mut store, make_extractor, progress);

    if report.succeeded.is_empty() {
        log::warn!("No document succeeded; leaving {} untouched", output.display());
    } else {
        store.save(output)?;
    }

    Ok(report)
}

/// Runs every document of `config` with the PDF extractor.
///
/// # Errors
///
/// See [`run_batch`].
pub fn run(
    config: &RunConfig,
    output: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<RunReport, IngestError> {
    log::info!(
        "Ingesting {} document(s) into {}",
        config.documents.len(),
        output.display()
    );
    run_batch(&config.documents, output, pdf_extractor_for, progress)
}

/// The raw table of a document next to its normalized rows.
#[derive(Debug)]
pub struct Inspection {
    pub raw: RawTable,
    /// Normalization outcome; kept as a result so the raw table can still
    /// be shown when the layout does not fit.
    pub normalized: Result<(Vec<NormalizedRow>, CoercionReport), NormalizeError>,
}

/// Extracts and normalizes a document without touching any store.
///
/// # Errors
///
/// Returns [`IngestError::Pdf`] if extraction fails.
pub fn inspect_document<E: TableExtractor + ?Sized>(
    extractor: &E,
    path: &Path,
    layout: &LayoutDefinition,
) -> Result<Inspection, IngestError> {
    let raw = extractor.extract_table(path)?;
    let normalized = normalize(&raw, layout);
    Ok(Inspection { raw, normalized })
}

#[cfg(test)]
mod tests {
    use gov_budget_ingest_models::null_progress;
    use gov_budget_layout::parse_layout_toml;

    use super::*;

    struct StubExtractor(RawTable);

    impl TableExtractor for StubExtractor {
        fn extract_table(&self, _path: &Path) -> Result<RawTable, PdfError> {
            Ok(self.0.clone())
        }
    }

    struct FailingExtractor;

    impl TableExtractor for FailingExtractor {
        fn extract_table(&self, _path: &Path) -> Result<RawTable, PdfError> {
            Err(PdfError::NoPages)
        }
    }

    /// A 35-row table shaped for the embedded 2025 layout: rows 8..=10 and
    /// 28..=30 are split artifacts.
    fn table_2025() -> RawTable {
        let header = ["Κατηγορία", "Κωδ.", "Περιγραφή", "Ευρώ", "Ποσό"]
            .iter()
            .map(|&s| s.to_owned())
            .collect();
        let rows = (0..35)
            .map(|i| {
                let split_tail = (9..=10).contains(&i) || (29..=30).contains(&i);
                let cells = if split_tail {
                    ["", "", "συνέχεια", "", ""].map(str::to_owned)
                } else {
                    [
                        if i < 15 { "Έσοδα" } else { "Έξοδα" }.to_owned(),
                        (100 + i).to_string(),
                        format!("Γραμμή {i}"),
                        "€".to_owned(),
                        format!("{i}.000"),
                    ]
                };
                cells.into_iter().map(Some).collect()
            })
            .collect();
        RawTable::new(header, rows)
    }

    fn job(year: &str) -> DocumentJob {
        DocumentJob {
            path: PathBuf::from(format!("{year}.pdf")),
            year: year.to_owned(),
            layout: Some("2025".to_owned()),
            layout_file: None,
        }
    }

    fn temp_output() -> PathBuf {
        std::env::temp_dir()
            .join(format!("gov_budget_ingest_{}", uuid::Uuid::new_v4()))
            .join("budget.json")
    }

    #[test]
    fn job_without_layout_uses_year() {
        let layout = resolve_layout(&DocumentJob {
            layout: None,
            ..job("2025")
        })
        .unwrap();
        assert_eq!(layout.id, "2025");

        let err = resolve_layout(&DocumentJob {
            layout: None,
            ..job("1990")
        })
        .unwrap_err();
        assert!(matches!(err, IngestError::Layout(LayoutError::Unknown { .. })));
    }

    #[test]
    fn layout_file_wins_over_layout_id() {
        let dir = temp_output().parent().unwrap().to_path_buf();
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("custom.toml");
        std::fs::write(
            &file,
            "id = \"custom\"\nname = \"Custom\"\n[revenue]\nstart = 0\nend = 2\n[expenditure]\nstart = 2\n",
        )
        .unwrap();

        let layout = select_layout(Some("1990"), Some(&file), DEFAULT_INSPECT_LAYOUT).unwrap();
        assert_eq!(layout.id, "custom");

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn inspect_defaults_to_embedded_layout() {
        let layout = select_layout(None, None, DEFAULT_INSPECT_LAYOUT).unwrap();
        assert_eq!(layout.id, DEFAULT_INSPECT_LAYOUT);

        let err = select_layout(Some("1990"), None, DEFAULT_INSPECT_LAYOUT).unwrap_err();
        assert!(matches!(err, IngestError::Layout(LayoutError::Unknown { .. })));
    }

    #[test]
    fn extraction_options_fall_back_to_defaults() {
        let layout = find_layout("2025").unwrap();
        let options = extraction_options(&layout);
        assert_eq!(
            options.min_header_cells,
            TextTableOptions::default().min_header_cells
        );
    }

    #[test]
    fn processes_2025_document() {
        let layout = find_layout("2025").unwrap();
        let mut store = BudgetStore::new();

        let result = process_document(
            &StubExtractor(table_2025()),
            Path::new("2025.pdf"),
            "2025",
            &layout,
            &mut store,
        )
        .unwrap();

        assert_eq!(result.rows_extracted, 35);
        assert_eq!(result.rows_normalized, 31);
        assert_eq!(result.revenue_lines, 13);
        assert_eq!(result.expenditure_lines, 16);
        assert_eq!(result.cells_defaulted, 0);

        let year = store.year("2025").unwrap().unwrap();
        assert_eq!(year.esoda[8].bill, "Γραμμή 8 συνέχεια συνέχεια");
        assert_eq!(year.esoda[8].id, 108);
        assert!((year.esoda[8].value - 8000.0).abs() < f64::EPSILON);
        assert_eq!(year.eksoda[0].id, 117);
    }

    #[test]
    fn blank_year_is_rejected() {
        let layout = find_layout("2025").unwrap();
        let mut store = BudgetStore::new();
        let err = process_document(
            &StubExtractor(table_2025()),
            Path::new("x.pdf"),
            " ",
            &layout,
            &mut store,
        )
        .unwrap_err();
        assert!(matches!(err, IngestError::Config(_)));
        assert!(store.is_empty());
    }

    #[test]
    fn failed_document_leaves_store_untouched() {
        let layout = parse_layout_toml(
            r#"
id = "narrow"
name = "narrow"
[revenue]
start = 0
end = 40
[expenditure]
start = 40
"#,
        )
        .unwrap();
        let mut store = BudgetStore::new();
        store.merge_year("2024", Vec::new(), Vec::new()).unwrap();
        let before = store.clone();

        let err = process_document(
            &StubExtractor(table_2025()),
            Path::new("x.pdf"),
            "2025",
            &layout,
            &mut store,
        )
        .unwrap_err();

        assert!(matches!(err, IngestError::Store(StoreError::RangeOutOfBounds { .. })));
        assert_eq!(store, before);
    }

    #[test]
    fn absent_store_gets_exactly_one_year() {
        let output = temp_output();

        let report = run_batch(
            &[job("2025")],
            &output,
            |_| StubExtractor(table_2025()),
            &null_progress(),
        )
        .unwrap();

        assert!(report.is_success());
        let store = BudgetStore::load(&output).unwrap();
        assert_eq!(store.years().collect::<Vec<_>>(), vec!["2025"]);

        std::fs::remove_dir_all(output.parent().unwrap()).ok();
    }

    #[test]
    fn failing_document_does_not_stop_the_run() {
        let mut store = BudgetStore::new();
        let jobs = [job("2024"), job("2025")];

        let report = run_documents(
            &jobs,
            &mut store,
            |_| StubExtractor(table_2025()),
            &null_progress(),
        );
        assert!(report.is_success());
        assert_eq!(store.len(), 2);

        let mut store = BudgetStore::new();
        let report = run_documents(&jobs, &mut store, |_| FailingExtractor, &null_progress());
        assert_eq!(report.failed.len(), 2);
        assert!(store.is_empty());
    }

    #[derive(Default)]
    struct RecordingProgress(std::sync::Mutex<Vec<String>>);

    impl RecordingProgress {
        fn push(&self, event: String) {
            if let Ok(mut events) = self.0.lock() {
                events.push(event);
            }
        }
    }

    impl ProgressCallback for RecordingProgress {
        fn set_total(&self, total: u64) {
            self.push(format!("total {total}"));
        }
        fn inc(&self, delta: u64) {
            self.push(format!("inc {delta}"));
        }
        fn set_message(&self, msg: String) {
            self.push(format!("message {msg}"));
        }
        fn finish(&self, msg: String) {
            self.push(format!("finish {msg}"));
        }
    }

    #[test]
    fn progress_advances_once_per_document() {
        let recorder = Arc::new(RecordingProgress::default());
        let progress: Arc<dyn ProgressCallback> = recorder.clone();
        let mut store = BudgetStore::new();

        run_documents(
            &[job("2024"), job("2025")],
            &mut store,
            |_| FailingExtractor,
            &progress,
        );

        let events = recorder.0.lock().unwrap().clone();
        assert_eq!(
            events,
            vec![
                "total 2",
                "message 2024 (2024.pdf)",
                "inc 1",
                "message 2025 (2025.pdf)",
                "inc 1",
                "finish 0 ingested, 2 failed",
            ]
        );
    }

    #[test]
    fn all_failed_run_does_not_write_store() {
        let output = temp_output();

        let report =
            run_batch(&[job("2025")], &output, |_| FailingExtractor, &null_progress()).unwrap();

        assert!(!report.is_success());
        assert!(!output.exists());
    }

    #[test]
    fn malformed_store_aborts_before_processing() {
        let output = temp_output();
        std::fs::create_dir_all(output.parent().unwrap()).unwrap();
        std::fs::write(&output, "not json").unwrap();

        let err = run_batch(
            &[job("2025")],
            &output,
            |_| StubExtractor(table_2025()),
            &null_progress(),
        )
        .unwrap_err();

        assert!(matches!(err, IngestError::Store(StoreError::Malformed { .. })));
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "not json");

        std::fs::remove_dir_all(output.parent().unwrap()).ok();
    }

    #[test]
    fn inspection_keeps_raw_table_when_layout_does_not_fit() {
        let layout = find_layout("2025").unwrap();
        let short = RawTable::new(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec![vec![Some("x".into()), None, None, None]],
        );

        let inspection =
            inspect_document(&StubExtractor(short), Path::new("x.pdf"), &layout).unwrap();

        assert_eq!(inspection.raw.rows.len(), 1);
        assert!(matches!(
            inspection.normalized,
            Err(NormalizeError::RangeOutOfBounds { .. })
        ));
    }
}
