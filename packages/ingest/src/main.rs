#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the budget ingestion tool.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use gov_budget_cli_utils::IndicatifProgress;
use gov_budget_ingest::{
    DEFAULT_INSPECT_LAYOUT, default_store_path, inspect_document, pdf_extractor_for, run,
    run_batch, select_layout,
};
use gov_budget_ingest_models::{DocumentJob, RunReport, load_run_config};
use gov_budget_layout::all_layouts;
use gov_budget_models::{NormalizedRow, RawTable};
use gov_budget_store::BudgetStore;

#[derive(Parser)]
#[command(name = "gov_budget_ingest", about = "Budget PDF ingestion tool")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Layout selection shared by `ingest` and `inspect`.
#[derive(Args)]
struct LayoutArgs {
    /// Embedded layout id (defaults to the year, or "2025" for `inspect`)
    #[arg(long, conflicts_with = "layout_file")]
    layout: Option<String>,
    /// Layout TOML file to use instead of an embedded layout
    #[arg(long)]
    layout_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest every document listed in a run config
    Run {
        /// Run config TOML
        #[arg(long)]
        config: PathBuf,
        /// Store path (overrides the config's `output`)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Ingest a single budget PDF
    Ingest {
        /// Budget PDF
        pdf: PathBuf,
        /// Fiscal year the entry is stored under (e.g., "2025")
        #[arg(long)]
        year: String,
        #[command(flatten)]
        layout: LayoutArgs,
        /// Store path (defaults to `BUDGET_STORE_PATH` or budget.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// List the embedded layouts
    Layouts,
    /// Print revenue, expenditure, and net totals per year
    Summary {
        /// Store path (defaults to `BUDGET_STORE_PATH` or budget.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the extracted and normalized rows of a PDF with their indices
    Inspect {
        /// Budget PDF
        pdf: PathBuf,
        #[command(flatten)]
        layout: LayoutArgs,
    },
}

fn finish_run(report: &RunReport) -> Result<(), Box<dyn std::error::Error>> {
    for result in &report.succeeded {
        log::info!(
            "[{}] {} revenue, {} expenditure line(s); {} cell(s) defaulted",
            result.year,
            result.revenue_lines,
            result.expenditure_lines,
            result.cells_defaulted
        );
    }

    if report.is_success() {
        return Ok(());
    }

    for (path, error) in &report.failed {
        log::error!("{}: {error}", path.display());
    }
    Err(format!("{} document(s) failed", report.failed.len()).into())
}

fn print_raw(raw: &RawTable) {
    println!("Raw table: {} row(s)", raw.rows.len());
    println!("{:>4}  {}", "", raw.header.join(" | "));
    for (i, row) in raw.rows.iter().enumerate() {
        let cells: Vec<&str> = row.iter().map(|c| c.as_deref().unwrap_or("")).collect();
        println!("{i:>4}  {}", cells.join(" | "));
    }
}

fn print_normalized(rows: &[NormalizedRow]) {
    println!("Normalized: {} row(s)", rows.len());
    println!("{:>4}  {:<24} {:>8}  {:<48} {:>18}", "", "REVENUE", "ID", "BILL", "VALUE");
    for (i, row) in rows.iter().enumerate() {
        println!(
            "{i:>4}  {:<24} {:>8}  {:<48} {:>18.2}",
            row.revenue, row.id, row.bill, row.value
        );
    }
}

fn inspect(pdf: &Path, args: &LayoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let layout = select_layout(
        args.layout.as_deref(),
        args.layout_file.as_deref(),
        DEFAULT_INSPECT_LAYOUT,
    )?;
    let extractor = pdf_extractor_for(&layout);
    let inspection = inspect_document(&extractor, pdf, &layout)?;

    print_raw(&inspection.raw);
    println!();
    match inspection.normalized {
        Ok((rows, report)) => {
            print_normalized(&rows);
            println!(
                "{} ID and {} VALUE cell(s) defaulted to zero",
                report.id.total(),
                report.value.total()
            );
        }
        Err(e) => println!("Layout {} does not fit: {e}", layout.id),
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = gov_budget_cli_utils::init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, output } => {
            let run_config = load_run_config(&config)?;
            let output = output
                .or_else(|| run_config.output.clone())
                .unwrap_or_else(default_store_path);

            let progress = IndicatifProgress::steps_bar(
                &multi,
                "Documents",
                run_config.documents.len() as u64,
            );
            let report = run(&run_config, &output, &progress)?;
            finish_run(&report)?;
        }
        Commands::Ingest {
            pdf,
            year,
            layout,
            output,
        } => {
            let job = DocumentJob {
                path: pdf,
                year,
                layout: layout.layout,
                layout_file: layout.layout_file,
            };
            let output = output.unwrap_or_else(default_store_path);

            let progress = IndicatifProgress::steps_bar(&multi, "Documents", 1);
            let report = run_batch(&[job], &output, pdf_extractor_for, &progress)?;
            finish_run(&report)?;
        }
        Commands::Layouts => {
            let layouts = all_layouts();
            println!("{:<10} {:<8} NAME", "ID", "MERGES");
            println!("{}", "-".repeat(60));
            for layout in &layouts {
                println!(
                    "{:<10} {:<8} {}",
                    layout.id,
                    layout.merge_ranges.len(),
                    layout.name
                );
            }
        }
        Commands::Summary { output } => {
            let output = output.unwrap_or_else(default_store_path);
            let store = BudgetStore::load(&output)?;
            if store.is_empty() {
                println!("No years in {}", output.display());
                return Ok(());
            }

            println!(
                "{:<6} {:>20} {:>20} {:>20} {:>6} {:>6}",
                "YEAR", "REVENUE", "EXPENDITURE", "NET", "REV#", "EXP#"
            );
            println!("{}", "-".repeat(83));
            for summary in store.summaries()? {
                println!(
                    "{:<6} {:>20.2} {:>20.2} {:>20.2} {:>6} {:>6}",
                    summary.year,
                    summary.revenue_total,
                    summary.expenditure_total,
                    summary.net,
                    summary.revenue_lines,
                    summary.expenditure_lines
                );
            }
        }
        Commands::Inspect { pdf, layout } => inspect(&pdf, &layout)?,
    }

    Ok(())
}
