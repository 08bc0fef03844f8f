pub mod aggregator;
pub mod period;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use models::{AggregatedGrid, Settings};
use quant_parser::{DisclosureParser, ParseError};

pub use aggregator::Aggregator;
pub use period::{period_label, sort_key, sort_periods, Period};

pub struct Config {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    pub title: String,
}

impl From<&Settings> for Config {
    fn from(settings: &Settings) -> Self {
        Self {
            input_dir: settings.input_dir.clone(),
            output_file: settings.output_file.clone(),
            title: settings.scheme_title.clone(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    pub files_found: usize,
    pub files_parsed: usize,
    pub files_skipped: usize,
    pub securities: usize,
    pub periods: Vec<String>,
    /// `None` when there was nothing to aggregate and no workbook was written.
    pub output: Option<PathBuf>,
}

/// Aggregate every disclosure workbook in `cfg.input_dir` into one grid workbook.
pub fn run(cfg: &Config) -> Result<RunSummary> {
    tracing::info!(dir = %cfg.input_dir.display(), "Checking for disclosure files");
    let files = discover_inputs(&cfg.input_dir)?;

    if files.is_empty() {
        tracing::warn!(dir = %cfg.input_dir.display(), "No Excel files found");
        return Ok(RunSummary::default());
    }
    tracing::info!(count = files.len(), "Aggregating files");

    let parser = DisclosureParser::new();
    let (grid, mut summary) = aggregate_files(&files, &parser);
    tracing::info!(periods = ?grid.periods, "Months ordered");

    let layout = grid_engine::render(&grid, &cfg.title);
    let written = grid_engine::write_xlsx(&layout, &cfg.output_file)
        .with_context(|| format!("Writing output file: {}", cfg.output_file.display()))?;
    tracing::info!(
        path = %written.display(),
        securities = summary.securities,
        "Saved aggregated workbook"
    );

    summary.output = Some(written);
    Ok(summary)
}

/// Parse and fold the given files in order. Files that fail are logged and skipped;
/// their period still appears in the grid.
pub fn aggregate_files(
    files: &[PathBuf],
    parser: &DisclosureParser,
) -> (AggregatedGrid, RunSummary) {
    let mut aggregator = Aggregator::new();
    let mut summary = RunSummary {
        files_found: files.len(),
        ..RunSummary::default()
    };

    for path in files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        let label = period_label(&file_name);
        aggregator.register_period(&label);
        tracing::info!(file = %file_name, period = %label, "Reading");

        match parser.parse_file(path) {
            Ok(records) => {
                tracing::debug!(file = %file_name, records = records.len(), "parsed");
                aggregator.add_records(&label, &records);
                summary.files_parsed += 1;
            }
            Err(e) => {
                log_skip(&file_name, &e);
                summary.files_skipped += 1;
            }
        }
    }

    let grid = aggregator.finish();
    summary.securities = grid.entries.len();
    summary.periods = grid.periods.clone();
    (grid, summary)
}

fn log_skip(file_name: &str, error: &ParseError) {
    match error {
        ParseError::HeaderNotFound { .. } => {
            tracing::warn!(file = %file_name, "Could not find header, skipping: {error}")
        }
        ParseError::MissingRequiredColumns { .. } => {
            tracing::warn!(file = %file_name, "Missing columns, skipping: {error}")
        }
        _ => tracing::warn!(file = %file_name, "Error processing file, skipping: {error}"),
    }
}

/// All `.xlsx` / `.xls` files directly inside `dir`, sorted by path. Hidden files and
/// Excel lock files (`~$...`) are ignored.
pub fn discover_inputs(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("Reading input dir: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
            continue;
        };
        if name.starts_with('.') || name.starts_with("~$") {
            continue;
        }

        let is_workbook = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls"));
        if is_workbook {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
