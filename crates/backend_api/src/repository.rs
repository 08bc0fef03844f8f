use async_trait::async_trait;
use models::PortfolioView;
use quant_parser::read_first_sheet;
use std::path::{Path, PathBuf};

use crate::error::{ApiError, Result};
use crate::reader::parse_grid;

/// Repository trait for accessing the aggregated holdings
/// This abstraction allows swapping the workbook for another backing store
#[async_trait]
pub trait GridRepository: Send + Sync {
    async fn fetch_portfolio(&self) -> Result<PortfolioView>;
}

/// File-based implementation that re-reads the rendered workbook on every request
pub struct FileGridRepository {
    grid_path: PathBuf,
}

impl FileGridRepository {
    pub fn new<P: AsRef<Path>>(grid_path: P) -> Self {
        Self {
            grid_path: grid_path.as_ref().to_path_buf(),
        }
    }

    async fn load_portfolio(&self) -> Result<PortfolioView> {
        if !tokio::fs::try_exists(&self.grid_path).await? {
            return Err(ApiError::OutputMissing(self.grid_path.display().to_string()));
        }

        let path = self.grid_path.clone();
        let sheet = tokio::task::spawn_blocking(move || read_first_sheet(&path))
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?
            .map_err(|e| ApiError::Read(e.to_string()))?;

        let view = parse_grid(&sheet);
        tracing::debug!(
            months = view.months.len(),
            records = view.records.len(),
            "grid loaded"
        );
        Ok(view)
    }
}

#[async_trait]
impl GridRepository for FileGridRepository {
    async fn fetch_portfolio(&self) -> Result<PortfolioView> {
        self.load_portfolio().await
    }
}

/// One-holding grid written to `path`, shared by the router tests.
#[cfg(test)]
pub(crate) fn write_sample_grid(path: &Path) {
    use models::{AggregatedGrid, MonthFigures, Portfolio, PortfolioEntry};

    let mut entry = PortfolioEntry::new("INE001A01036", "Acme Industries", "Chemicals");
    entry.months.insert(
        "January 2025".into(),
        MonthFigures {
            quantity: 1000.0,
            market_value: 50.5,
            pct_of_assets: 2.0,
        },
    );
    let mut entries = Portfolio::new();
    entries.insert(entry.isin.clone(), entry);
    let grid = AggregatedGrid {
        periods: vec!["January 2025".into()],
        entries,
    };
    grid_engine::write_xlsx(&grid_engine::render(&grid, "Fund"), path).unwrap();
}
