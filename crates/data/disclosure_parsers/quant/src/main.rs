use anyhow::{Context, Result};
use std::{env, fs};

use quant_parser::DisclosureParser;

fn main() -> Result<()> {
    // Usage:
    //   quant_parser file1.xlsx file2.xls ...
    //
    // If no files are given, every .xlsx/.xls in the current directory is parsed.
    // Records are printed as JSON, one array per file.
    logger::init("quant_parser=info");

    let mut paths: Vec<String> = env::args()
        .skip(1)
        .filter(|a| is_workbook(a))
        .collect();

    if paths.is_empty() {
        for entry in fs::read_dir(".").context("Cannot read current directory")? {
            let path = entry?.path();
            if let Some(name) = path.file_name().and_then(|s| s.to_str()) {
                if is_workbook(name) {
                    paths.push(name.to_string());
                }
            }
        }
        paths.sort();
    }

    if paths.is_empty() {
        tracing::warn!("No .xlsx/.xls input files found");
        return Ok(());
    }

    let parser = DisclosureParser::new();

    for p in &paths {
        match parser.parse_file(p) {
            Ok(records) => {
                tracing::info!(file = %p, records = records.len(), "parsed");
                println!("{}", serde_json::to_string_pretty(&records)?);
            }
            Err(e) => tracing::warn!(file = %p, error = %e, "skipped"),
        }
    }

    Ok(())
}

fn is_workbook(name: &str) -> bool {
    let low = name.to_lowercase();
    low.ends_with(".xlsx") || low.ends_with(".xls")
}
