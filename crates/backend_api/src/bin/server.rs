use backend_api::{run_server, FileGridRepository};
use std::sync::Arc;
use std::{env, path::PathBuf};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Environment variables with sane defaults
    let grid_path_raw = env::var("GRID_PATH")
        .unwrap_or_else(|_| "Quant_SmallCap_Equity_Analysis.xlsx".to_string());
    let static_dir_raw = env::var("STATIC_DIR").ok();
    let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| "5000".to_string())
        .parse()
        .unwrap_or(5000);

    let crate_root = env::current_dir()?;
    let workspace_root = find_workspace_root().unwrap_or_else(|| crate_root.clone());
    let bases = [&workspace_root, &crate_root];

    let grid_path = resolve_with_fallback(&grid_path_raw, &bases);
    let static_dir = static_dir_raw
        .as_deref()
        .map(|raw| resolve_with_fallback(raw, &bases));

    println!("Portfolio Grid Viewer");
    println!("=====================");
    println!("Workspace root: {}", workspace_root.display());
    println!("Grid path (resolved): {}", grid_path.display());
    if let Some(dir) = &static_dir {
        println!("Static dir (resolved): {}", dir.display());
    }
    println!("Listening on: {}:{}", host, port);
    println!();

    // Pre-flight checks
    if !grid_path.exists() {
        eprintln!("[WARN] grid workbook not found at: {}", grid_path.display());
        eprintln!("       Continuing; /api/data will 404 until the aggregator has run.");
    }
    if let Some(dir) = static_dir.as_ref().filter(|d| !d.is_dir()) {
        eprintln!("[WARN] static directory not found at: {}", dir.display());
    }

    let repo = Arc::new(FileGridRepository::new(grid_path));
    run_server(repo, &host, port, static_dir).await?;

    Ok(())
}

/// Walk up from the current directory to the first Cargo.toml with a [workspace] section.
fn find_workspace_root() -> Option<PathBuf> {
    let mut dir = env::current_dir().ok()?;
    for _ in 0..10 {
        let candidate = dir.join("Cargo.toml");
        if let Ok(content) = std::fs::read_to_string(&candidate) {
            if content.contains("[workspace]") {
                return Some(dir);
            }
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Resolve a raw path against a list of base directories, returning the first existing match,
/// or the path under the first base.
fn resolve_with_fallback(raw: &str, bases: &[&PathBuf]) -> PathBuf {
    let input = PathBuf::from(raw);
    if input.is_absolute() {
        return input;
    }
    for base in bases {
        let candidate = base.join(&input);
        if candidate.exists() {
            return candidate;
        }
    }
    match bases.first() {
        Some(base) => base.join(input),
        None => input,
    }
}
