use std::path::PathBuf;

use anyhow::{Context, Result};
use log::info;

use fpl_summary::config::SummaryConfig;
use fpl_summary::fpl_fetch;
use fpl_summary::pipeline::run_pipeline;
use fpl_summary::snapshot;
use fpl_summary::summary_export::{default_output_path, export_summary};

const PROGRESS_EVERY: usize = 50;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let config = SummaryConfig::from_env();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let source = match parse_path_arg(&args, "--snapshot-in") {
        Some(path) => {
            info!("loading source snapshot from {}", path.display());
            snapshot::load_source(&path)?
        }
        None => {
            info!(
                "fetching from {} with {} workers",
                config.api_base, config.fetch_parallelism
            );
            fpl_fetch::fetch_source_data_with_progress(&config, |progress| {
                if progress.current % PROGRESS_EVERY == 0 || progress.current == progress.total {
                    info!("[{}/{}] {}", progress.current, progress.total, progress.message);
                }
            })?
        }
    };

    if let Some(path) = parse_path_arg(&args, "--snapshot-out") {
        snapshot::save_source(&path, &source)?;
        info!("source snapshot written to {}", path.display());
    }

    let table = run_pipeline(&source, &config).context("summary pipeline failed")?;

    let out = parse_path_arg(&args, "--out").unwrap_or_else(|| default_output_path(&config.output_dir));
    let report = export_summary(&out, &table)?;

    println!("Player summary complete");
    println!("File: {}", report.path.display());
    println!("Players: {}", report.rows);
    if report.duplicates > 0 {
        println!("Duplicate gameweeks: {} (see Anomalies sheet)", report.duplicates);
    }
    for row in table.rows.iter().take(5) {
        println!(
            " - {} ({} {}) weighted={:.2} total={}",
            row.profile.display_name,
            row.profile.team_name,
            row.profile.position.label(),
            row.totals.weighted_points,
            row.totals.points
        );
    }

    Ok(())
}

fn parse_path_arg(args: &[String], flag: &str) -> Option<PathBuf> {
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix(&prefix) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(PathBuf::from(next));
        }
    }
    None
}
