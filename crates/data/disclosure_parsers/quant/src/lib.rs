pub mod header;
pub mod workbook;

use models::{CanonicalField, Cell, HoldingRecord, RawSheet};
use std::path::Path;
use thiserror::Error;

pub use header::{locate_header_row, normalize_header, ColumnMap, HEADER_SCAN_ROWS, REQUIRED_FIELDS};
pub use workbook::read_first_sheet;

/// Per-file structural failures. None of them abort a run; callers log and skip the file.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Cannot read workbook {path}: {source}")]
    Workbook {
        path: String,
        #[source]
        source: calamine::Error,
    },

    #[error("Workbook {0} has no worksheets")]
    NoWorksheet(String),

    #[error("Header row not found in the first {scanned} rows")]
    HeaderNotFound { scanned: usize },

    #[error("Missing required columns {missing:?}; found {found:?}")]
    MissingRequiredColumns {
        missing: Vec<CanonicalField>,
        found: Vec<String>,
    },
}

/// Parser for the monthly portfolio disclosure workbooks.
pub struct DisclosureParser {
    pub header_scan_rows: usize,
}

impl Default for DisclosureParser {
    fn default() -> Self {
        Self::new()
    }
}

impl DisclosureParser {
    pub fn new() -> Self {
        Self {
            header_scan_rows: HEADER_SCAN_ROWS,
        }
    }

    /// Read the first worksheet of a file and extract its holdings.
    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<HoldingRecord>, ParseError> {
        let sheet = read_first_sheet(path)?;
        self.parse_sheet(&sheet)
    }

    pub fn parse_sheet(&self, sheet: &RawSheet) -> Result<Vec<HoldingRecord>, ParseError> {
        let header_row = locate_header_row(sheet, self.header_scan_rows)?;
        extract_records(sheet, header_row)
    }
}

/// Build holding records from the rows below `header_row`.
///
/// Iteration stops for good at the first "Grand Total" row. Above it, only rows
/// with a real ISIN survive, which drops section headings and spacer rows.
pub fn extract_records(
    sheet: &RawSheet,
    header_row: usize,
) -> Result<Vec<HoldingRecord>, ParseError> {
    let columns = ColumnMap::from_header_row(sheet, header_row);

    let missing = columns.missing(&REQUIRED_FIELDS);
    if !missing.is_empty() {
        return Err(ParseError::MissingRequiredColumns {
            missing,
            found: columns.found,
        });
    }

    let text_at = |r_idx: usize, field: CanonicalField| -> String {
        columns
            .get(field)
            .map(|c| sheet.cell(r_idx, c).as_text())
            .unwrap_or_default()
    };
    let number_at = |r_idx: usize, field: CanonicalField| -> f64 {
        columns
            .get(field)
            .map(|c| coerce_number(sheet.cell(r_idx, c)))
            .unwrap_or(0.0)
    };

    let mut out = Vec::new();

    for r_idx in (header_row + 1)..sheet.height() {
        let name = text_at(r_idx, CanonicalField::Name);
        if is_grand_total(&name) {
            break;
        }

        let isin = text_at(r_idx, CanonicalField::Isin);
        let isin = isin.trim();
        if isin.is_empty() || isin.eq_ignore_ascii_case("nan") {
            continue;
        }

        out.push(HoldingRecord {
            name: name.trim().to_string(),
            isin: isin.to_string(),
            category: text_at(r_idx, CanonicalField::Category).trim().to_string(),
            quantity: number_at(r_idx, CanonicalField::Quantity),
            market_value: number_at(r_idx, CanonicalField::MarketValue),
            pct_of_assets: number_at(r_idx, CanonicalField::PctOfAssets),
        });
    }

    Ok(out)
}

fn is_grand_total(name: &str) -> bool {
    name.contains("Total") && name.contains("Grand")
}

/// Numeric cell value; anything missing or unparseable becomes 0.0.
pub fn coerce_number(cell: &Cell) -> f64 {
    let value = match cell {
        Cell::Number(f) => Some(*f),
        Cell::Text(s) => {
            let s = s.trim().replace(',', "");
            if s.is_empty() {
                None
            } else {
                s.parse::<f64>().ok()
            }
        }
        Cell::Empty | Cell::Bool(_) => None,
    };

    match value {
        Some(v) if v.is_finite() => v,
        _ => {
            if !cell.is_blank() {
                tracing::debug!(cell = %cell.as_text(), "unparseable numeric cell, using 0.0");
            }
            0.0
        }
    }
}
