use serde::{Deserialize, Serialize};

/// Display formats used in the period blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NumberFormat {
    /// `#,##0`
    Integer,
    /// `#,##0.00`
    Decimal,
    /// `0.00%` over a fraction (0.045 -> 4.50%)
    Percent,
}

impl NumberFormat {
    /// Format code understood by spreadsheet applications.
    pub fn code(&self) -> &'static str {
        match self {
            NumberFormat::Integer => "#,##0",
            NumberFormat::Decimal => "#,##0.00",
            NumberFormat::Percent => "0.00%",
        }
    }

    /// Format for the n-th column (0, 1, 2) of a period block.
    pub fn for_block_offset(offset: usize) -> Self {
        match offset % 3 {
            0 => NumberFormat::Integer,
            1 => NumberFormat::Decimal,
            _ => NumberFormat::Percent,
        }
    }

    /// Render a value the way a spreadsheet shows it under this format.
    pub fn display(&self, value: f64) -> String {
        match self {
            NumberFormat::Integer => group_thousands(&format!("{:.0}", value)),
            NumberFormat::Decimal => group_thousands(&format!("{:.2}", value)),
            NumberFormat::Percent => format!("{:.2}%", value * 100.0),
        }
    }
}

fn group_thousands(formatted: &str) -> String {
    let (sign, unsigned) = match formatted.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", formatted),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
