use calamine::{open_workbook_auto, Data, Range, Reader};
use models::{Cell, RawSheet};
use std::path::Path;

use crate::ParseError;

/// Read the first worksheet of an `.xlsx` / `.xls` file into a `RawSheet`.
///
/// calamine trims leading empty rows/columns from a range; they are padded back
/// so row and column indices match the sheet as a user sees it.
pub fn read_first_sheet<P: AsRef<Path>>(path: P) -> Result<RawSheet, ParseError> {
    let path = path.as_ref();
    let display = path.display().to_string();

    let mut workbook = open_workbook_auto(path).map_err(|source| ParseError::Workbook {
        path: display.clone(),
        source,
    })?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ParseError::NoWorksheet(display.clone()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|source| ParseError::Workbook {
            path: display,
            source,
        })?;

    Ok(range_to_sheet(sheet_name, &range))
}

pub fn range_to_sheet(name: String, range: &Range<Data>) -> RawSheet {
    let (start_row, start_col) = range
        .start()
        .map(|(r, c)| (r as usize, c as usize))
        .unwrap_or((0, 0));

    let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); start_row];
    for row in range.rows() {
        let mut cells = vec![Cell::Empty; start_col];
        cells.extend(row.iter().map(to_cell));
        rows.push(cells);
    }

    RawSheet::new(name, rows)
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        other => Cell::Text(other.to_string()),
    }
}
