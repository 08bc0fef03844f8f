use anyhow::Result;
use clap::Parser;
use data_pipeline::{run, Config};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "aggregate",
    about = "Merge monthly portfolio disclosures into one period-blocked workbook."
)]
struct Args {
    /// Optional settings file; defaults to ./settings.json when present
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Directory holding the monthly .xlsx/.xls disclosures
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Output workbook path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Title written above the grid
    #[arg(long)]
    title: Option<String>,
}

fn main() -> Result<()> {
    logger::init("info");
    let args = Args::parse();

    let settings = settings_loader::load_settings_or_default(args.settings.as_ref())?;
    let mut config = Config::from(&settings);
    if let Some(dir) = args.input_dir {
        config.input_dir = dir;
    }
    if let Some(output) = args.output {
        config.output_file = output;
    }
    if let Some(title) = args.title {
        config.title = title;
    }

    let summary = run(&config)?;
    match &summary.output {
        Some(path) => println!(
            "Saved {} securities across {} months to {} ({} of {} files skipped)",
            summary.securities,
            summary.periods.len(),
            path.display(),
            summary.files_skipped,
            summary.files_found
        ),
        None => println!("No Excel files found in {}", config.input_dir.display()),
    }

    Ok(())
}
