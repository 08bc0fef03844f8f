use anyhow::{Context, Result};
use quant_parser::{locate_header_row, normalize_header, read_first_sheet, HEADER_SCAN_ROWS};
use std::env;

fn main() -> Result<()> {
    let xlsx_path = env::args()
        .nth(1)
        .context("Usage: inspect_workbook <file.xlsx>")?;

    let sheet = read_first_sheet(&xlsx_path).with_context(|| format!("Cannot open {}", xlsx_path))?;
    println!("== {} ==", sheet.name);
    println!("  size: rows={}, cols={}", sheet.height(), sheet.width());

    // First 15 non-empty rows, up to 12 columns.
    let mut printed = 0usize;
    for (r_idx, row) in sheet.rows.iter().enumerate() {
        if printed >= HEADER_SCAN_ROWS {
            break;
        }

        let mut cells: Vec<String> = row
            .iter()
            .take(12)
            .map(|c| c.as_text().trim().to_string())
            .collect();

        if cells.iter().all(|s| s.is_empty()) {
            continue;
        }
        while matches!(cells.last(), Some(s) if s.is_empty()) {
            cells.pop();
        }

        println!("  row {:>4}: {}", r_idx + 1, cells.join(" | "));
        printed += 1;
    }

    match locate_header_row(&sheet, HEADER_SCAN_ROWS) {
        Ok(header_row) => {
            println!("  header row: {}", header_row + 1);
            for cell in sheet.rows[header_row].iter() {
                let label = cell.as_text();
                if label.trim().is_empty() {
                    continue;
                }
                let mapped = normalize_header(&label)
                    .map(|f| f.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("    {:<40} -> {}", label.trim(), mapped);
            }
        }
        Err(e) => println!("  header row: (none) {e}"),
    }

    Ok(())
}
