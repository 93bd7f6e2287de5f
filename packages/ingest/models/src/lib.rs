#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Run configuration, progress, and result types for budget ingestion.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// A run configuration that could not be read or parsed.
#[derive(Debug, thiserror::Error)]
pub enum RunConfigError {
    /// Filesystem error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The TOML does not describe a run.
    #[error("Invalid run config: {0}")]
    Toml(String),

    /// The config lists no documents.
    #[error("Run config lists no documents")]
    NoDocuments,
}

/// One budget document to ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentJob {
    /// Path to the PDF.
    pub path: PathBuf,
    /// Fiscal year key the document's entry is stored under.
    pub year: String,
    /// Embedded layout id. Defaults to [`Self::year`].
    #[serde(default)]
    pub layout: Option<String>,
    /// Layout TOML file. Takes precedence over [`Self::layout`].
    #[serde(default)]
    pub layout_file: Option<PathBuf>,
}

/// A batch of documents sharing one output store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Store path. Falls back to the binary's default when absent.
    #[serde(default)]
    pub output: Option<PathBuf>,
    /// Documents in processing order.
    #[serde(default)]
    pub documents: Vec<DocumentJob>,
}

impl RunConfig {
    /// Resolves relative document, layout, and output paths against `base`.
    #[must_use]
    pub fn rebased(mut self, base: &Path) -> Self {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };

        if let Some(output) = &mut self.output {
            rebase(output);
        }
        for doc in &mut self.documents {
            rebase(&mut doc.path);
            if let Some(layout_file) = &mut doc.layout_file {
                rebase(layout_file);
            }
        }
        self
    }
}

/// Parses a run configuration from TOML text.
///
/// # Errors
///
/// Returns [`RunConfigError::Toml`] if the text is not a valid run config,
/// or [`RunConfigError::NoDocuments`] if it lists no documents.
pub fn parse_run_toml(text: &str) -> Result<RunConfig, RunConfigError> {
    let config: RunConfig =
        toml::de::from_str(text).map_err(|e| RunConfigError::Toml(e.to_string()))?;

    if config.documents.is_empty() {
        return Err(RunConfigError::NoDocuments);
    }

    Ok(config)
}

/// Reads a run configuration, resolving its relative paths against the
/// directory that contains it.
///
/// # Errors
///
/// Returns [`RunConfigError`] if the file cannot be read or parsed.
pub fn load_run_config(path: &Path) -> Result<RunConfig, RunConfigError> {
    let text = std::fs::read_to_string(path)?;
    let config = parse_run_toml(&text)?;
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(config.rebased(base))
}

/// Receives progress updates from a batch run.
///
/// A run processes its documents one after another: it announces the
/// document count, names each document as it starts, advances by one when
/// the document finishes (whether it succeeded or not), and closes with a
/// one-line outcome. The CLI renders this as a bar; library callers and
/// tests pass [`null_progress`].
pub trait ProgressCallback: Send + Sync {
    /// Number of documents in the run.
    fn set_total(&self, total: u64);

    /// Marks `delta` more documents as done.
    fn inc(&self, delta: u64);

    /// Names the document being processed.
    fn set_message(&self, msg: String);

    /// Ends the run with its outcome.
    fn finish(&self, msg: String);
}

/// A [`ProgressCallback`] that ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

/// Result of ingesting one document into the store.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentResult {
    /// Fiscal year the entry was stored under.
    pub year: String,
    /// Layout that was applied.
    pub layout_id: String,
    /// Physical rows extracted from the PDF.
    pub rows_extracted: usize,
    /// Logical rows after split repair.
    pub rows_normalized: usize,
    /// Revenue lines written.
    pub revenue_lines: usize,
    /// Expenditure lines written.
    pub expenditure_lines: usize,
    /// `ID`/`VALUE` cells that fell back to zero.
    pub cells_defaulted: usize,
    /// How long the document took.
    pub duration: Duration,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    /// Documents that reached the store.
    pub succeeded: Vec<DocumentResult>,
    /// Documents that failed, with the error text.
    pub failed: Vec<(PathBuf, String)>,
}

impl RunReport {
    /// Whether every document succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}
