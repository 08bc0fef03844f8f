use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// Settings models

/// Contents of `settings.json`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
	/// Title written in the first row of the output grid.
	pub scheme_title: String,
	/// Source file prefix, e.g. `quant_Small_Cap_Fund` in `quant_Small_Cap_Fund_Jan_2025.xlsx`.
	pub file_prefix: String,
	pub download_base_url: String,
	pub input_dir: PathBuf,
	pub output_file: PathBuf,
	/// First disclosure year fetched by the downloader.
	pub start_year: i32,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			scheme_title: "Quant Small Cap Fund".to_string(),
			file_prefix: "quant_Small_Cap_Fund".to_string(),
			download_base_url: "https://quantmutual.com/Admin/disclouser/".to_string(),
			input_dir: PathBuf::from("Disclosures"),
			output_file: PathBuf::from("Quant_SmallCap_Equity_Analysis.xlsx"),
			start_year: 2025,
		}
	}
}

// Raw ingestion models

/// A single untyped spreadsheet cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Cell {
	#[default]
	Empty,
	Text(String),
	Number(f64),
	Bool(bool),
}

impl Cell {
	/// Stringified cell value; empty cells become "".
	pub fn as_text(&self) -> String {
		match self {
			Cell::Empty => String::new(),
			Cell::Text(s) => s.clone(),
			Cell::Number(f) => f.to_string(),
			Cell::Bool(b) => b.to_string(),
		}
	}

	pub fn is_blank(&self) -> bool {
		match self {
			Cell::Empty => true,
			Cell::Text(s) => s.trim().is_empty(),
			_ => false,
		}
	}
}

impl From<&str> for Cell {
	fn from(s: &str) -> Self {
		Cell::Text(s.to_string())
	}
}

impl From<String> for Cell {
	fn from(s: String) -> Self {
		Cell::Text(s)
	}
}

impl From<f64> for Cell {
	fn from(f: f64) -> Self {
		Cell::Number(f)
	}
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Row-major grid of cells as read from one worksheet. No schema is implied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSheet {
	pub name: String,
	pub rows: Vec<Vec<Cell>>,
}

impl RawSheet {
	pub fn new(name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
		Self { name: name.into(), rows }
	}

	pub fn height(&self) -> usize {
		self.rows.len()
	}

	pub fn width(&self) -> usize {
		self.rows.iter().map(|r| r.len()).max().unwrap_or(0)
	}

	/// Cell at (row, col); out-of-range positions read as `Cell::Empty`.
	pub fn cell(&self, row: usize, col: usize) -> &Cell {
		self.rows
			.get(row)
			.and_then(|r| r.get(col))
			.unwrap_or(&EMPTY_CELL)
	}
}

// Holding models

/// The fixed set of fields every disclosure header must resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalField {
	Name,
	#[serde(rename = "ISIN")]
	Isin,
	Category,
	Quantity,
	MarketValue,
	PctOfAssets,
}

impl CanonicalField {
	pub fn as_str(&self) -> &'static str {
		match self {
			CanonicalField::Name => "Name",
			CanonicalField::Isin => "ISIN",
			CanonicalField::Category => "Category",
			CanonicalField::Quantity => "Quantity",
			CanonicalField::MarketValue => "MarketValue",
			CanonicalField::PctOfAssets => "PctOfAssets",
		}
	}
}

impl fmt::Display for CanonicalField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One security's line in one monthly disclosure.
/// `pct_of_assets` is kept as published (a whole percentage, e.g. 4.5 for 4.5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingRecord {
	pub name: String,
	pub isin: String,
	pub category: String,
	pub quantity: f64,
	pub market_value: f64,
	pub pct_of_assets: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthFigures {
	pub quantity: f64,
	pub market_value: f64,
	pub pct_of_assets: f64,
}

impl From<&HoldingRecord> for MonthFigures {
	fn from(r: &HoldingRecord) -> Self {
		Self {
			quantity: r.quantity,
			market_value: r.market_value,
			pct_of_assets: r.pct_of_assets,
		}
	}
}

// Aggregated models

/// Accumulated state for one ISIN across every period of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioEntry {
	pub isin: String,
	pub name: String,
	pub category: String,
	/// Period label -> figures, in the order periods were first written.
	pub months: IndexMap<String, MonthFigures>,
}

impl PortfolioEntry {
	pub fn new(isin: impl Into<String>, name: impl Into<String>, category: impl Into<String>) -> Self {
		Self {
			isin: isin.into(),
			name: name.into(),
			category: category.into(),
			months: IndexMap::new(),
		}
	}

	/// Figures for a period; absent periods read as zero.
	pub fn figures(&self, period: &str) -> MonthFigures {
		self.months.get(period).copied().unwrap_or_default()
	}
}

/// ISIN -> entry. Insertion order is first-seen order and drives output row order.
pub type Portfolio = IndexMap<String, PortfolioEntry>;

/// Final aggregation result: chronologically ordered periods plus every entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedGrid {
	pub periods: Vec<String>,
	pub entries: Portfolio,
}

// Presentation models

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ViewFigures {
	#[serde(rename = "Quantity")]
	pub quantity: f64,
	#[serde(rename = "Value")]
	pub value: f64,
	#[serde(rename = "Pct")]
	pub pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewRecord {
	#[serde(rename = "Name")]
	pub name: String,
	#[serde(rename = "ISIN")]
	pub isin: String,
	#[serde(rename = "Category")]
	pub category: String,
	#[serde(rename = "Months")]
	pub months: IndexMap<String, ViewFigures>,
}

/// Payload of the presentation API.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioView {
	pub months: Vec<String>,
	pub records: Vec<ViewRecord>,
}
