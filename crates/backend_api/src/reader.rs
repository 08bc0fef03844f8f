//! Reads a rendered grid back into the presentation payload.

use grid_engine::{BLOCK_WIDTH, FIRST_PERIOD_COL, HEADER_ROWS};
use indexmap::IndexMap;
use models::{Cell, PortfolioView, RawSheet, ViewFigures, ViewRecord};
use quant_parser::coerce_number;

/// Row holding the merged period labels.
const PERIOD_ROW: usize = 1;

/// Rebuild the holdings table from a grid sheet.
///
/// Rows whose first cell is blank or `nan` are skipped. The Total row is kept as a
/// regular record. Cells that are missing or not numeric read as 0.0.
pub fn parse_grid(sheet: &RawSheet) -> PortfolioView {
    let periods = period_columns(sheet);

    let records = sheet
        .rows
        .iter()
        .skip(HEADER_ROWS)
        .filter(|row| !is_blank_label(row.first()))
        .map(|row| {
            let text_at = |c: usize| {
                row.get(c)
                    .map(|cell| cell.as_text().trim().to_string())
                    .unwrap_or_default()
            };

            let months = periods
                .iter()
                .map(|(label, col)| (label.clone(), block_figures(row, *col)))
                .collect::<IndexMap<_, _>>();

            ViewRecord {
                name: text_at(0),
                isin: text_at(1),
                category: text_at(2),
                months,
            }
        })
        .collect();

    PortfolioView {
        months: periods.into_iter().map(|(label, _)| label).collect(),
        records,
    }
}

/// Period labels with the column their block starts at.
fn period_columns(sheet: &RawSheet) -> Vec<(String, usize)> {
    (FIRST_PERIOD_COL..sheet.width())
        .step_by(BLOCK_WIDTH)
        .filter_map(|col| {
            let label = sheet.cell(PERIOD_ROW, col).as_text().trim().to_string();
            (!label.is_empty()).then_some((label, col))
        })
        .collect()
}

fn block_figures(row: &[Cell], col: usize) -> ViewFigures {
    if row.len() < col + BLOCK_WIDTH {
        return ViewFigures::default();
    }
    ViewFigures {
        quantity: coerce_number(&row[col]),
        value: coerce_number(&row[col + 1]),
        pct: coerce_number(&row[col + 2]),
    }
}

fn is_blank_label(cell: Option<&Cell>) -> bool {
    match cell {
        None => true,
        Some(cell) => cell.is_blank() || cell.as_text().trim().eq_ignore_ascii_case("nan"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{AggregatedGrid, MonthFigures, Portfolio, PortfolioEntry};

    fn sample_grid() -> AggregatedGrid {
        let mut acme = PortfolioEntry::new("INE001A01036", "Acme Industries", "Chemicals");
        acme.months.insert(
            "January 2025".into(),
            MonthFigures {
                quantity: 1000.0,
                market_value: 50.5,
                pct_of_assets: 2.0,
            },
        );
        acme.months.insert(
            "February 2025".into(),
            MonthFigures {
                quantity: 1200.0,
                market_value: 60.0,
                pct_of_assets: 2.5,
            },
        );
        let mut beta = PortfolioEntry::new("INE002A01018", "Beta Power", "Power");
        beta.months.insert(
            "February 2025".into(),
            MonthFigures {
                quantity: 300.0,
                market_value: 10.0,
                pct_of_assets: 0.5,
            },
        );

        let mut entries = Portfolio::new();
        entries.insert(acme.isin.clone(), acme);
        entries.insert(beta.isin.clone(), beta);
        AggregatedGrid {
            periods: vec!["January 2025".into(), "February 2025".into()],
            entries,
        }
    }

    #[test]
    fn test_round_trips_rendered_grid() {
        let sheet = grid_engine::render(&sample_grid(), "Fund").to_raw_sheet();
        let view = parse_grid(&sheet);

        assert_eq!(view.months, vec!["January 2025", "February 2025"]);
        assert_eq!(view.records.len(), 3);

        let acme = &view.records[0];
        assert_eq!(acme.name, "Acme Industries");
        assert_eq!(acme.isin, "INE001A01036");
        assert_eq!(acme.category, "Chemicals");
        assert_eq!(
            acme.months["January 2025"],
            ViewFigures {
                quantity: 1000.0,
                value: 50.5,
                pct: 0.02
            }
        );

        let beta = &view.records[1];
        assert_eq!(beta.months["January 2025"], ViewFigures::default());
        assert_eq!(beta.months["February 2025"].quantity, 300.0);
    }

    #[test]
    fn test_total_row_is_included() {
        let sheet = grid_engine::render(&sample_grid(), "Fund").to_raw_sheet();
        let view = parse_grid(&sheet);

        let total = view.records.last().unwrap();
        assert_eq!(total.name, "Total");
        assert_eq!(total.isin, "");
        assert_eq!(total.months["February 2025"].quantity, 1500.0);
        assert_eq!(total.months["February 2025"].value, 70.0);
        assert!((total.months["February 2025"].pct - 0.03).abs() < 1e-12);
    }

    /// Data row with `label` first and a block of ones.
    fn ones(label: Cell, isin: &str) -> Vec<Cell> {
        vec![
            label,
            Cell::from(isin),
            Cell::Empty,
            Cell::Number(1.0),
            Cell::Number(1.0),
            Cell::Number(1.0),
        ]
    }

    #[test]
    fn test_blank_and_nan_rows_are_skipped() {
        let header = |s: &str| Cell::from(s);
        let sheet = RawSheet::new(
            "Equity Analysis",
            vec![
                vec![header("Fund")],
                vec![
                    header("Name"),
                    header("ISIN"),
                    header("Industry"),
                    header("March 2025"),
                    Cell::Empty,
                    Cell::Empty,
                ],
                vec![Cell::Empty; 6],
                ones(Cell::Empty, "X"),
                ones(header("nan"), "Y"),
                vec![
                    header("Acme"),
                    header("INE001A01036"),
                    header("Chemicals"),
                    header("1,200"),
                    header("n/a"),
                    Cell::Empty,
                ],
            ],
        );

        let view = parse_grid(&sheet);
        assert_eq!(view.months, vec!["March 2025"]);
        assert_eq!(view.records.len(), 1);
        assert_eq!(
            view.records[0].months["March 2025"],
            ViewFigures {
                quantity: 1200.0,
                value: 0.0,
                pct: 0.0
            }
        );
    }

    #[test]
    fn test_short_row_reads_as_zero() {
        let sheet = RawSheet::new(
            "Equity Analysis",
            vec![
                vec![Cell::from("Fund")],
                vec![
                    Cell::from("Name"),
                    Cell::from("ISIN"),
                    Cell::from("Industry"),
                    Cell::from("March 2025"),
                    Cell::Empty,
                    Cell::Empty,
                ],
                vec![],
                vec![
                    Cell::from("Acme"),
                    Cell::from("INE001A01036"),
                    Cell::from("Chemicals"),
                    Cell::Number(5.0),
                ],
            ],
        );

        let view = parse_grid(&sheet);
        assert_eq!(view.records.len(), 1);
        assert_eq!(view.records[0].months["March 2025"], ViewFigures::default());
    }

    #[test]
    fn test_empty_sheet_has_no_months() {
        let view = parse_grid(&RawSheet::new("Equity Analysis", vec![]));
        assert_eq!(view, PortfolioView::default());
    }
}
