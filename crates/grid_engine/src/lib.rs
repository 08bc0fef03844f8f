pub mod format;
pub mod xlsx;

use models::{AggregatedGrid, Cell, RawSheet};
use serde::{Deserialize, Serialize};

pub use format::NumberFormat;
pub use xlsx::write_xlsx;

pub const SHEET_NAME: &str = "Equity Analysis";
pub const STATIC_HEADERS: [&str; 3] = ["Name of the Instrument", "ISIN", "Industry/Rating"];
pub const SUB_HEADERS: [&str; 3] = ["Quantity", "Market Value (Rs. Lakhs)", "% Net Assets"];
pub const TOTAL_LABEL: &str = "Total";

/// Title row, period row, sub-header row.
pub const HEADER_ROWS: usize = 3;
/// Zero-based index of the first period column.
pub const FIRST_PERIOD_COL: usize = STATIC_HEADERS.len();
pub const BLOCK_WIDTH: usize = SUB_HEADERS.len();

pub const IDENTITY_COLUMN_WIDTH: f64 = 30.0;
pub const PERIOD_COLUMN_WIDTH: f64 = 15.0;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BorderWeight {
    #[default]
    None,
    Thin,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Align {
    #[default]
    General,
    /// Centered both ways, wrapped.
    Center,
    /// Vertically centered only.
    Middle,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CellStyle {
    pub bold: bool,
    pub font_size: Option<f64>,
    pub align: Align,
    pub number_format: Option<NumberFormat>,
    /// Thin left/top/bottom edges; the right edge uses `right_border`.
    pub bordered: bool,
    pub right_border: BorderWeight,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GridCell {
    pub value: CellValue,
    pub style: CellStyle,
}

/// Horizontal merge on a single row, zero-based and inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeRange {
    pub row: usize,
    pub first_col: usize,
    pub last_col: usize,
}

/// Spreadsheet-agnostic rendering of an `AggregatedGrid`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLayout {
    pub sheet_name: String,
    pub rows: Vec<Vec<GridCell>>,
    pub merges: Vec<MergeRange>,
    pub column_widths: Vec<f64>,
}

impl GridLayout {
    pub fn width(&self) -> usize {
        self.column_widths.len()
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&GridCell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Index of the trailing Total row.
    pub fn total_row(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Cell values as they would be read back from the written workbook.
    pub fn to_raw_sheet(&self) -> RawSheet {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| match &c.value {
                        CellValue::Empty => Cell::Empty,
                        CellValue::Text(s) => Cell::Text(s.clone()),
                        CellValue::Number(n) => Cell::Number(*n),
                    })
                    .collect()
            })
            .collect();
        RawSheet::new(self.sheet_name.clone(), rows)
    }

    /// Displayed text of a cell, with its number format applied.
    pub fn display(&self, row: usize, col: usize) -> String {
        match self.cell(row, col) {
            Some(GridCell {
                value: CellValue::Number(n),
                style,
            }) => match style.number_format {
                Some(fmt) => fmt.display(*n),
                None => n.to_string(),
            },
            Some(GridCell {
                value: CellValue::Text(s),
                ..
            }) => s.clone(),
            _ => String::new(),
        }
    }
}

/// Right edge of a zero-based column: medium after the identity columns and after
/// every period block, thin elsewhere.
pub fn right_border(col: usize) -> BorderWeight {
    if col + 1 >= FIRST_PERIOD_COL && (col + 1 - FIRST_PERIOD_COL) % BLOCK_WIDTH == 0 {
        BorderWeight::Medium
    } else {
        BorderWeight::Thin
    }
}

fn header_style(col: usize) -> CellStyle {
    CellStyle {
        bold: true,
        font_size: Some(12.0),
        align: Align::Center,
        number_format: None,
        bordered: true,
        right_border: right_border(col),
    }
}

fn body_style(col: usize, number_format: Option<NumberFormat>) -> CellStyle {
    CellStyle {
        bold: false,
        font_size: None,
        align: Align::Middle,
        number_format,
        bordered: true,
        right_border: right_border(col),
    }
}

fn text(s: impl Into<String>, style: CellStyle) -> GridCell {
    let s = s.into();
    let value = if s.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(s)
    };
    GridCell { value, style }
}

fn blank(style: CellStyle) -> GridCell {
    GridCell {
        value: CellValue::Empty,
        style,
    }
}

fn number(n: f64, style: CellStyle) -> GridCell {
    GridCell {
        value: CellValue::Number(n),
        style,
    }
}

/// Lay out the aggregated holdings as a period-blocked grid.
///
/// Percentages are published as whole numbers and divided by 100 here. The Total
/// row is the plain column sum, percentage columns included.
pub fn render(grid: &AggregatedGrid, title: &str) -> GridLayout {
    let width = FIRST_PERIOD_COL + BLOCK_WIDTH * grid.periods.len();
    let mut rows: Vec<Vec<GridCell>> = Vec::with_capacity(HEADER_ROWS + grid.entries.len() + 1);
    let mut merges = Vec::new();

    // Title
    let mut title_row = vec![GridCell::default(); width];
    title_row[0] = text(
        title,
        CellStyle {
            bold: true,
            font_size: Some(14.0),
            align: Align::Center,
            ..CellStyle::default()
        },
    );
    rows.push(title_row);
    merges.push(MergeRange {
        row: 0,
        first_col: 0,
        last_col: width - 1,
    });

    // Static headers + one merged label per period
    let mut period_row: Vec<GridCell> = (0..width).map(|c| blank(header_style(c))).collect();
    let mut sub_row: Vec<GridCell> = (0..width).map(|c| blank(header_style(c))).collect();
    for (c, label) in STATIC_HEADERS.iter().enumerate() {
        period_row[c] = text(*label, header_style(c));
    }
    for (p_idx, period) in grid.periods.iter().enumerate() {
        let first = FIRST_PERIOD_COL + p_idx * BLOCK_WIDTH;
        period_row[first] = text(period.as_str(), header_style(first));
        for (k, sub) in SUB_HEADERS.iter().enumerate() {
            sub_row[first + k] = text(*sub, header_style(first + k));
        }
        merges.push(MergeRange {
            row: 1,
            first_col: first,
            last_col: first + BLOCK_WIDTH - 1,
        });
    }
    rows.push(period_row);
    rows.push(sub_row);

    // Holdings
    let mut totals = vec![0.0_f64; width];
    for (isin, entry) in grid.entries.iter() {
        let mut row = Vec::with_capacity(width);
        row.push(text(entry.name.as_str(), body_style(0, None)));
        row.push(text(isin.as_str(), body_style(1, None)));
        row.push(text(entry.category.as_str(), body_style(2, None)));

        for period in &grid.periods {
            let figures = entry.figures(period);
            let values = [
                figures.quantity,
                figures.market_value,
                figures.pct_of_assets / 100.0,
            ];
            for (k, value) in values.into_iter().enumerate() {
                let col = row.len();
                totals[col] += value;
                row.push(number(
                    value,
                    body_style(col, Some(NumberFormat::for_block_offset(k))),
                ));
            }
        }
        rows.push(row);
    }

    // Totals
    let mut total_row = vec![GridCell::default(); width];
    total_row[0] = text(
        TOTAL_LABEL,
        CellStyle {
            bold: true,
            ..CellStyle::default()
        },
    );
    for (col, total) in totals.iter().enumerate().skip(FIRST_PERIOD_COL) {
        total_row[col] = number(
            *total,
            CellStyle {
                bold: true,
                number_format: Some(NumberFormat::for_block_offset(col - FIRST_PERIOD_COL)),
                bordered: true,
                right_border: right_border(col),
                ..CellStyle::default()
            },
        );
    }
    rows.push(total_row);

    let column_widths = (0..width)
        .map(|c| {
            if c < FIRST_PERIOD_COL {
                IDENTITY_COLUMN_WIDTH
            } else {
                PERIOD_COLUMN_WIDTH
            }
        })
        .collect();

    GridLayout {
        sheet_name: SHEET_NAME.to_string(),
        rows,
        merges,
        column_widths,
    }
}
