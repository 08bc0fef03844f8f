use anyhow::Result;
use clap::Parser;
use downloader::DownloadConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "download",
    about = "Fetch monthly portfolio disclosures that are not on disk yet."
)]
struct Args {
    /// Optional settings file; defaults to ./settings.json when present
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Directory the workbooks are saved into
    #[arg(short, long)]
    target_dir: Option<PathBuf>,

    /// First year to fetch
    #[arg(long)]
    start_year: Option<i32>,
}

fn main() -> Result<()> {
    logger::init("info");
    let args = Args::parse();

    let settings = settings_loader::load_settings_or_default(args.settings.as_ref())?;
    let mut config = DownloadConfig::from(&settings);
    if let Some(dir) = args.target_dir {
        config.target_dir = dir;
    }
    if let Some(year) = args.start_year {
        config.start_year = year;
    }

    let today = chrono::Local::now().date_naive();
    let present = downloader::run(&config, today)?;
    tracing::info!(present, dir = %config.target_dir.display(), "Download finished");

    Ok(())
}
