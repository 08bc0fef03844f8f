use models::{CanonicalField, RawSheet};
use std::collections::HashMap;

use crate::ParseError;

/// Number of leading rows searched for the header.
pub const HEADER_SCAN_ROWS: usize = 15;

/// Ordered normalization rules. First match wins, so a header such as
/// "NAME OF THE INSTRUMENT (ISIN)" resolves to `Name`, not `Isin`.
const FIELD_RULES: &[(&[&str], CanonicalField)] = &[
    (&["NAME OF THE INSTRUMENT"], CanonicalField::Name),
    (&["ISIN"], CanonicalField::Isin),
    (&["INDUSTRY"], CanonicalField::Category),
    (&["QUANTITY"], CanonicalField::Quantity),
    (&["MARKET VALUE"], CanonicalField::MarketValue),
    (&["% TO NAV", "% TO NET ASSETS"], CanonicalField::PctOfAssets),
];

/// Columns that must be present for a sheet to be usable.
pub const REQUIRED_FIELDS: [CanonicalField; 4] = [
    CanonicalField::Name,
    CanonicalField::Isin,
    CanonicalField::Quantity,
    CanonicalField::MarketValue,
];

/// Find the first row (within `max_rows`) holding both an ISIN and a quantity marker cell.
pub fn locate_header_row(sheet: &RawSheet, max_rows: usize) -> Result<usize, ParseError> {
    for (r_idx, row) in sheet.rows.iter().take(max_rows).enumerate() {
        let values: Vec<String> = row
            .iter()
            .map(|c| c.as_text().trim().to_uppercase())
            .collect();

        let has_isin = values.iter().any(|v| v == "ISIN");
        let has_quantity = values.iter().any(|v| v == "QUANTITY" || v == "QTY");

        if has_isin && has_quantity {
            return Ok(r_idx);
        }
    }

    Err(ParseError::HeaderNotFound {
        scanned: sheet.height().min(max_rows),
    })
}

/// Map a raw header label to its canonical field, if any rule matches.
pub fn normalize_header(raw: &str) -> Option<CanonicalField> {
    let header = collapse_whitespace(raw).to_uppercase();
    if header.is_empty() {
        return None;
    }

    FIELD_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| header.contains(k)))
        .map(|(_, field)| *field)
}

/// Canonical field -> column index for a header row. The leftmost column wins on duplicates.
#[derive(Debug, Clone, Default)]
pub struct ColumnMap {
    columns: HashMap<CanonicalField, usize>,
    pub found: Vec<String>,
}

impl ColumnMap {
    pub fn from_header_row(sheet: &RawSheet, header_row: usize) -> Self {
        let mut map = ColumnMap::default();
        let Some(row) = sheet.rows.get(header_row) else {
            return map;
        };

        for (c_idx, cell) in row.iter().enumerate() {
            let label = cell.as_text();
            let label = label.trim();
            if label.is_empty() {
                continue;
            }
            map.found.push(collapse_whitespace(label));

            if let Some(field) = normalize_header(label) {
                map.columns.entry(field).or_insert(c_idx);
            }
        }

        map
    }

    pub fn get(&self, field: CanonicalField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn missing(&self, required: &[CanonicalField]) -> Vec<CanonicalField> {
        required
            .iter()
            .filter(|f| !self.columns.contains_key(f))
            .copied()
            .collect()
    }
}

pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::Cell;

    fn row(cells: &[&str]) -> Vec<Cell> {
        cells
            .iter()
            .map(|s| if s.is_empty() { Cell::Empty } else { Cell::from(*s) })
            .collect()
    }

    #[test]
    fn test_locate_header_after_preamble() {
        let sheet = RawSheet::new(
            "Sheet1",
            vec![
                row(&["quant Small Cap Fund"]),
                row(&["Portfolio as on 31-Jan-2025"]),
                row(&[]),
                row(&["SR", "ISIN", "NAME OF THE INSTRUMENT", "INDUSTRY", "Quantity"]),
                row(&["1", "INE001A01036", "Acme", "Chemicals", "1000"]),
            ],
        );

        assert_eq!(locate_header_row(&sheet, HEADER_SCAN_ROWS).unwrap(), 3);
    }

    #[test]
    fn test_locate_header_accepts_qty_and_mixed_case() {
        let sheet = RawSheet::new("s", vec![row(&["Isin", " qty "])]);
        assert_eq!(locate_header_row(&sheet, HEADER_SCAN_ROWS).unwrap(), 0);
    }

    #[test]
    fn test_header_needs_both_markers() {
        let sheet = RawSheet::new(
            "s",
            vec![row(&["ISIN", "Name"]), row(&["Quantity", "Value"])],
        );
        assert!(matches!(
            locate_header_row(&sheet, HEADER_SCAN_ROWS),
            Err(ParseError::HeaderNotFound { scanned: 2 })
        ));
    }

    #[test]
    fn test_header_on_last_scanned_row_is_found() {
        let mut rows: Vec<Vec<Cell>> = (0..14).map(|_| row(&["filler"])).collect();
        rows.push(row(&["ISIN", "QUANTITY"]));
        let sheet = RawSheet::new("s", rows);

        assert_eq!(locate_header_row(&sheet, HEADER_SCAN_ROWS).unwrap(), 14);
    }

    #[test]
    fn test_header_outside_scan_window_is_not_found() {
        let mut rows: Vec<Vec<Cell>> = (0..15).map(|_| row(&["filler"])).collect();
        rows.push(row(&["ISIN", "QUANTITY"]));
        let sheet = RawSheet::new("s", rows);

        assert!(matches!(
            locate_header_row(&sheet, HEADER_SCAN_ROWS),
            Err(ParseError::HeaderNotFound { scanned: 15 })
        ));
    }

    #[test]
    fn test_normalize_variant_headers() {
        assert_eq!(normalize_header("NAME OF THE INSTRUMENT"), Some(CanonicalField::Name));
        assert_eq!(normalize_header("ISIN"), Some(CanonicalField::Isin));
        assert_eq!(normalize_header("Industry / Rating"), Some(CanonicalField::Category));
        assert_eq!(normalize_header("Quantity"), Some(CanonicalField::Quantity));
        assert_eq!(
            normalize_header("MARKET VALUE(Rs.in Lakhs)"),
            Some(CanonicalField::MarketValue)
        );
        assert_eq!(normalize_header("% to NAV"), Some(CanonicalField::PctOfAssets));
        assert_eq!(
            normalize_header("% to Net\n Assets"),
            Some(CanonicalField::PctOfAssets)
        );
        assert_eq!(normalize_header("SR"), None);
        assert_eq!(normalize_header("RATING"), None);
        assert_eq!(normalize_header("   "), None);
    }

    #[test]
    fn test_normalize_collapses_inner_whitespace() {
        assert_eq!(
            normalize_header("Name  of the\nInstrument"),
            Some(CanonicalField::Name)
        );
        assert_eq!(
            normalize_header("Market\tValue (Rs. Lakhs)"),
            Some(CanonicalField::MarketValue)
        );
    }

    #[test]
    fn test_normalize_priority_order() {
        assert_eq!(
            normalize_header("Name of the Instrument / ISIN"),
            Some(CanonicalField::Name)
        );
        assert_eq!(normalize_header("ISIN Quantity"), Some(CanonicalField::Isin));
        assert_eq!(
            normalize_header("Industry Market Value"),
            Some(CanonicalField::Category)
        );
    }

    #[test]
    fn test_column_map_keeps_leftmost_duplicate() {
        let sheet = RawSheet::new(
            "s",
            vec![row(&[
                "ISIN",
                "Market Value",
                "Quantity",
                "Market Value (Lakhs)",
            ])],
        );
        let map = ColumnMap::from_header_row(&sheet, 0);

        assert_eq!(map.get(CanonicalField::MarketValue), Some(1));
        assert_eq!(
            map.missing(&REQUIRED_FIELDS),
            vec![CanonicalField::Name]
        );
        assert_eq!(map.found.len(), 4);
    }
}
