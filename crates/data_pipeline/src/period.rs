//! Period labels derived from disclosure file names, and their calendar ordering.
//!
//! A file `quant_Small_Cap_Fund_Jan_2025.xlsx` becomes the label `"January 2025"`.
//! Names that do not end in `_<Mon>_<Year>` keep their raw file name as an opaque
//! label, which sorts after every calendar period.

use chrono::Month;

/// Sort key of labels that are not `"<Month> <Year>"`.
pub const FALLBACK_SORT_KEY: (i32, u32) = (9999, 99);
/// Month index used when the year parses but the month name does not.
const UNKNOWN_MONTH_INDEX: u32 = 99;

const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// File-name month tokens. `Sept` shows up for September alongside `Sep`.
const MONTH_ABBREVIATIONS: [(&str, Month); 13] = [
    ("Jan", Month::January),
    ("Feb", Month::February),
    ("Mar", Month::March),
    ("Apr", Month::April),
    ("May", Month::May),
    ("Jun", Month::June),
    ("Jul", Month::July),
    ("Aug", Month::August),
    ("Sep", Month::September),
    ("Sept", Month::September),
    ("Oct", Month::October),
    ("Nov", Month::November),
    ("Dec", Month::December),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub month: Month,
    pub year: i32,
}

impl Period {
    pub fn new(month: Month, year: i32) -> Self {
        Self { month, year }
    }

    /// `<prefix>_<Mon>_<Year>.xlsx` -> Period. `None` when the tail tokens don't fit.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let stem = strip_workbook_extension(file_name);
        let mut tokens = stem.rsplit('_');
        let year = tokens.next()?;
        let month = tokens.next()?;

        let month = MONTH_ABBREVIATIONS
            .iter()
            .find(|(abbr, _)| *abbr == month)
            .map(|(_, m)| *m)?;
        let year = year.trim().parse::<i32>().ok()?;

        Some(Self::new(month, year))
    }

    /// Parse a `"<FullMonthName> <Year>"` label.
    pub fn parse_label(label: &str) -> Option<Self> {
        let mut parts = label.split_whitespace();
        let month = month_by_name(parts.next()?)?;
        let year = parts.next()?.parse::<i32>().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self::new(month, year))
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.month.name(), self.year)
    }

    pub fn sort_key(&self) -> (i32, u32) {
        (self.year, self.month.number_from_month())
    }
}

/// Display label for a source file, falling back to the file name itself.
pub fn period_label(file_name: &str) -> String {
    Period::from_file_name(file_name)
        .map(|p| p.label())
        .unwrap_or_else(|| file_name.to_string())
}

/// Chronological key of a label: `(year, month)`, with unparseable labels last.
pub fn sort_key(label: &str) -> (i32, u32) {
    let mut parts = label.split_whitespace();
    let (Some(month), Some(year)) = (parts.next(), parts.next()) else {
        return FALLBACK_SORT_KEY;
    };
    let Ok(year) = year.parse::<i32>() else {
        return FALLBACK_SORT_KEY;
    };

    let month = month_by_name(month)
        .map(|m| m.number_from_month())
        .unwrap_or(UNKNOWN_MONTH_INDEX);
    (year, month)
}

/// Sort labels chronologically; equal keys fall back to the label text.
pub fn sort_periods(labels: &mut [String]) {
    labels.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)).then_with(|| a.cmp(b)));
}

fn month_by_name(name: &str) -> Option<Month> {
    MONTHS.iter().find(|m| m.name() == name).copied()
}

fn strip_workbook_extension(file_name: &str) -> &str {
    let lower = file_name.to_ascii_lowercase();
    for ext in [".xlsx", ".xls"] {
        if lower.ends_with(ext) {
            return &file_name[..file_name.len() - ext.len()];
        }
    }
    file_name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_from_file_name() {
        assert_eq!(period_label("quant_Small_Cap_Fund_Jan_2025.xlsx"), "January 2025");
        assert_eq!(period_label("quant_Small_Cap_Fund_Sep_2025.xls"), "September 2025");
        assert_eq!(period_label("quant_Small_Cap_Fund_Sept_2025.xlsx"), "September 2025");
        assert_eq!(period_label("fund_Dec_2024.XLSX"), "December 2024");
    }

    #[test]
    fn test_unparseable_file_name_falls_back() {
        assert_eq!(period_label("portfolio.xlsx"), "portfolio.xlsx");
        assert_eq!(period_label("fund_Foo_2025.xlsx"), "fund_Foo_2025.xlsx");
        assert_eq!(period_label("fund_Jan_latest.xlsx"), "fund_Jan_latest.xlsx");
        assert_eq!(period_label("Jan_2025.xlsx"), "January 2025");
    }

    #[test]
    fn test_sort_key_is_chronological() {
        assert!(sort_key("March 2025") < sort_key("April 2025"));
        assert!(sort_key("April 2025") < sort_key("January 2026"));
        assert!(sort_key("December 2024") < sort_key("January 2025"));
    }

    #[test]
    fn test_unknown_month_file_sorts_with_fallbacks() {
        let label = period_label("fund_Foo_2025.xlsx");
        assert_eq!(label, "fund_Foo_2025.xlsx");
        assert_eq!(sort_key(&label), FALLBACK_SORT_KEY);
    }

    #[test]
    fn test_sort_key_fallbacks() {
        assert_eq!(sort_key("portfolio.xlsx"), FALLBACK_SORT_KEY);
        assert_eq!(sort_key("March twenty"), FALLBACK_SORT_KEY);
        assert_eq!(sort_key("Marzo 2025"), (2025, 99));
        assert!(sort_key("December 9998") < FALLBACK_SORT_KEY);
    }

    #[test]
    fn test_sort_periods_puts_fallbacks_last() {
        let mut labels = vec![
            "zzz.xlsx".to_string(),
            "February 2025".to_string(),
            "aaa.xlsx".to_string(),
            "January 2026".to_string(),
            "January 2025".to_string(),
        ];
        sort_periods(&mut labels);
        assert_eq!(
            labels,
            vec![
                "January 2025",
                "February 2025",
                "January 2026",
                "aaa.xlsx",
                "zzz.xlsx",
            ]
        );
    }

    #[test]
    fn test_label_round_trip() {
        let period = Period::from_file_name("x_Sept_2025.xlsx").unwrap();
        assert_eq!(period, Period::new(Month::September, 2025));
        assert_eq!(Period::parse_label(&period.label()), Some(period));
        assert_eq!(period.sort_key(), (2025, 9));
        assert_eq!(Period::parse_label("September 2025 extra"), None);
    }
}
