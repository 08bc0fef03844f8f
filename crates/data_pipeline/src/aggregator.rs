use indexmap::IndexSet;
use models::{AggregatedGrid, HoldingRecord, MonthFigures, Portfolio, PortfolioEntry};

use crate::period::sort_periods;

/// Folds monthly holdings into one entry per ISIN.
///
/// Files must be fed in a fixed order: the first non-empty name and category seen
/// for an ISIN are kept for good, while figures for a period are replaced by any
/// later record for the same period.
#[derive(Debug, Default)]
pub struct Aggregator {
    entries: Portfolio,
    periods: IndexSet<String>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a period part of the output even if it ends up contributing no rows.
    pub fn register_period(&mut self, label: &str) {
        if !self.periods.contains(label) {
            self.periods.insert(label.to_string());
        }
    }

    pub fn add_records(&mut self, label: &str, records: &[HoldingRecord]) {
        self.register_period(label);
        for record in records {
            self.add_record(label, record);
        }
    }

    pub fn add_record(&mut self, label: &str, record: &HoldingRecord) {
        self.register_period(label);

        let isin = record.isin.trim();
        if isin.is_empty() {
            return;
        }

        let entry = self
            .entries
            .entry(isin.to_string())
            .or_insert_with(|| {
                PortfolioEntry::new(isin, record.name.trim(), record.category.trim())
            });

        if entry.name.is_empty() && !record.name.trim().is_empty() {
            entry.name = record.name.trim().to_string();
        }
        if entry.category.is_empty() && !record.category.trim().is_empty() {
            entry.category = record.category.trim().to_string();
        }

        entry
            .months
            .insert(label.to_string(), MonthFigures::from(record));
    }

    pub fn entries(&self) -> &Portfolio {
        &self.entries
    }

    /// Finalize into a grid with chronologically ordered periods.
    pub fn finish(self) -> AggregatedGrid {
        let mut periods: Vec<String> = self.periods.into_iter().collect();
        sort_periods(&mut periods);

        AggregatedGrid {
            periods,
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(
        isin: &str,
        name: &str,
        category: &str,
        qty: f64,
        mv: f64,
        pct: f64,
    ) -> HoldingRecord {
        HoldingRecord {
            name: name.into(),
            isin: isin.into(),
            category: category.into(),
            quantity: qty,
            market_value: mv,
            pct_of_assets: pct,
        }
    }

    #[test]
    fn test_two_months_one_entry() {
        let mut agg = Aggregator::new();
        agg.add_records(
            "February 2025",
            &[record("INE001A01036", "Acme", "Chemicals", 1200.0, 60.0, 2.4)],
        );
        agg.add_records(
            "January 2025",
            &[record("INE001A01036", "Acme", "Chemicals", 1000.0, 50.5, 2.1)],
        );

        let grid = agg.finish();
        assert_eq!(grid.periods, vec!["January 2025", "February 2025"]);
        assert_eq!(grid.entries.len(), 1);

        let entry = &grid.entries["INE001A01036"];
        assert_eq!(entry.months.len(), 2);
        assert_eq!(
            entry.figures("January 2025"),
            MonthFigures {
                quantity: 1000.0,
                market_value: 50.5,
                pct_of_assets: 2.1
            }
        );
        assert_eq!(entry.figures("February 2025").quantity, 1200.0);
    }

    #[test]
    fn test_duplicate_period_last_write_wins() {
        let mut agg = Aggregator::new();
        agg.add_records("January 2025", &[record("INE001A01036", "Acme", "", 1.0, 1.0, 1.0)]);
        agg.add_records("January 2025", &[record("INE001A01036", "Acme", "", 2.0, 3.0, 4.0)]);

        let grid = agg.finish();
        let entry = &grid.entries["INE001A01036"];
        assert_eq!(entry.months.len(), 1);
        assert_eq!(
            entry.figures("January 2025"),
            MonthFigures {
                quantity: 2.0,
                market_value: 3.0,
                pct_of_assets: 4.0
            }
        );
        assert_eq!(grid.periods, vec!["January 2025"]);
    }

    #[test]
    fn test_static_fields_are_first_write_wins() {
        let mut agg = Aggregator::new();
        let first = record("INE001A01036", "Acme Ltd", "Chemicals", 1.0, 1.0, 1.0);
        let second = record("INE001A01036", "Acme Limited", "Fertilisers", 1.0, 1.0, 1.0);
        agg.add_records("January 2025", &[first]);
        agg.add_records("February 2025", &[second]);

        let entry = &agg.entries()["INE001A01036"];
        assert_eq!(entry.name, "Acme Ltd");
        assert_eq!(entry.category, "Chemicals");
    }

    #[test]
    fn test_empty_static_fields_are_backfilled() {
        let mut agg = Aggregator::new();
        agg.add_records("January 2025", &[record("INE001A01036", "", "", 1.0, 1.0, 1.0)]);
        agg.add_records("February 2025", &[record("INE001A01036", "Acme", "", 1.0, 1.0, 1.0)]);
        let third = record("INE001A01036", "Other", "Chemicals", 1.0, 1.0, 1.0);
        agg.add_records("March 2025", &[third]);

        let entry = &agg.entries()["INE001A01036"];
        assert_eq!(entry.name, "Acme");
        assert_eq!(entry.category, "Chemicals");
    }

    #[test]
    fn test_isin_is_trimmed_and_order_is_first_seen() {
        let mut agg = Aggregator::new();
        agg.add_records(
            "January 2025",
            &[
                record("INE002A01018", "Beta", "", 1.0, 1.0, 1.0),
                record(" INE001A01036 ", "Acme", "", 1.0, 1.0, 1.0),
            ],
        );
        agg.add_records(
            "February 2025",
            &[
                record("INE001A01036", "Acme", "", 1.0, 1.0, 1.0),
                record("INE003A01024", "Gamma", "", 1.0, 1.0, 1.0),
            ],
        );

        let keys: Vec<&str> = agg.entries().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["INE002A01018", "INE001A01036", "INE003A01024"]);
    }

    #[test]
    fn test_registered_period_without_records_is_kept() {
        let mut agg = Aggregator::new();
        agg.register_period("broken.xlsx");
        agg.add_records("March 2025", &[record("INE001A01036", "Acme", "", 1.0, 1.0, 1.0)]);

        let grid = agg.finish();
        assert_eq!(grid.periods, vec!["March 2025", "broken.xlsx"]);
        assert!(grid.entries["INE001A01036"]
            .months
            .keys()
            .all(|k| grid.periods.contains(k)));
    }
}
