use anyhow::{anyhow, Context, Result};
use chrono::{Datelike, NaiveDate};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::StatusCode;
use std::fs;
use std::path::{Path, PathBuf};

use models::Settings;

/// Some disclosure servers reject clients that don't look like a browser.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const MONTH_TOKENS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Where and what to fetch.
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    pub file_prefix: String,
    pub base_url: String,
    pub start_year: i32,
    pub target_dir: PathBuf,
}

impl From<&Settings> for DownloadConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            file_prefix: settings.file_prefix.clone(),
            base_url: settings.download_base_url.clone(),
            start_year: settings.start_year,
            target_dir: settings.input_dir.clone(),
        }
    }
}

/// One monthly disclosure workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    pub month: &'static str,
    pub year: i32,
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    AlreadyPresent(PathBuf),
    Downloaded(PathBuf),
}

/// Targets for every month of `year` up to and including the month of `today`.
pub fn monthly_targets(
    prefix: &str,
    base_url: &str,
    year: i32,
    today: NaiveDate,
) -> Vec<DownloadTarget> {
    if year > today.year() {
        return Vec::new();
    }
    let last_month = if year == today.year() { today.month() as usize } else { 12 };

    MONTH_TOKENS
        .iter()
        .take(last_month)
        .map(|month| {
            let filename = format!("{prefix}_{month}_{year}.xlsx");
            DownloadTarget {
                month,
                year,
                url: format!("{base_url}{filename}"),
                filename,
            }
        })
        .collect()
}

/// Targets from `start_year` through the year of `today`.
pub fn all_targets(config: &DownloadConfig, today: NaiveDate) -> Vec<DownloadTarget> {
    (config.start_year..=today.year())
        .flat_map(|year| monthly_targets(&config.file_prefix, &config.base_url, year, today))
        .collect()
}

/// `..._Sep_2025.xlsx` -> `..._Sept_2025.xlsx`; `None` for other months.
pub fn sept_variant(url: &str) -> Option<String> {
    url.contains("_Sep_").then(|| url.replacen("_Sep_", "_Sept_", 1))
}

/// Minimal blocking fetcher for disclosure workbooks.
#[derive(Debug, Clone)]
pub struct Downloader {
    http: Client,
}

impl Downloader {
    pub fn new() -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));

        let http = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http })
    }

    /// Fetch one target into `dir`. Existing files are left untouched.
    pub fn download(&self, target: &DownloadTarget, dir: &Path) -> Result<DownloadOutcome> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Cannot create download directory {}", dir.display()))?;

        let path = dir.join(&target.filename);
        if path.exists() {
            tracing::info!(file = %target.filename, "Skipping, already exists");
            return Ok(DownloadOutcome::AlreadyPresent(path));
        }

        tracing::info!(file = %target.filename, url = %target.url, "Downloading");
        let mut url = target.url.clone();
        let mut response = self
            .http
            .get(&url)
            .send()
            .with_context(|| format!("GET {url} failed"))?;

        if response.status() == StatusCode::NOT_FOUND {
            if let Some(alt) = sept_variant(&url) {
                tracing::info!(url = %alt, "404 for Sep, trying Sept");
                url = alt;
                response = self
                    .http
                    .get(&url)
                    .send()
                    .with_context(|| format!("GET {url} failed"))?;
            }
        }

        let mut response = response
            .error_for_status()
            .with_context(|| format!("GET {url} returned non-success status"))?;

        let partial = dir.join(format!(".partial.{}", target.filename));
        let mut file = fs::File::create(&partial)
            .with_context(|| format!("Cannot create {}", partial.display()))?;
        response
            .copy_to(&mut file)
            .with_context(|| format!("Failed to read body of {url}"))?;
        fs::rename(&partial, &path)
            .with_context(|| format!("Cannot move {} into place", partial.display()))?;

        tracing::info!(path = %path.display(), "Saved");
        Ok(DownloadOutcome::Downloaded(path))
    }

    /// Fetch every target, logging and skipping failures. Returns the number of
    /// files now present on disk.
    pub fn download_all(&self, targets: &[DownloadTarget], dir: &Path) -> usize {
        targets
            .iter()
            .filter(|target| match self.download(target, dir) {
                Ok(_) => true,
                Err(e) => {
                    tracing::warn!(file = %target.filename, "Failed to download: {e:#}");
                    false
                }
            })
            .count()
    }
}

/// Generate every target up to `today` and fetch them into `config.target_dir`.
pub fn run(config: &DownloadConfig, today: NaiveDate) -> Result<usize> {
    tracing::info!(
        prefix = %config.file_prefix,
        "Years: {} to {}, target directory: {}",
        config.start_year,
        today.year(),
        config.target_dir.display()
    );

    let targets = all_targets(config, today);
    if targets.is_empty() {
        return Err(anyhow!(
            "No links generated; start year {} is after {}",
            config.start_year,
            today.year()
        ));
    }
    tracing::info!(count = targets.len(), "Potential download links");

    let downloader = Downloader::new()?;
    Ok(downloader.download_all(&targets, &config.target_dir))
}
