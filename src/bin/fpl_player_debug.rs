use anyhow::{Context, Result, anyhow};

use fpl_summary::config::SummaryConfig;
use fpl_summary::derive::RecencyWeighting;
use fpl_summary::fpl_fetch;
use fpl_summary::http_client::http_client;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    let player_id = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("FPL_DEBUG_PLAYER").ok())
        .and_then(|v| v.trim().parse::<u32>().ok())
        .ok_or_else(|| anyhow!("usage: fpl_player_debug <player-id> (or FPL_DEBUG_PLAYER)"))?;

    let config = SummaryConfig::from_env();
    let client = http_client()?;
    let bundle = fpl_fetch::fetch_player_bundle(client, &config, player_id)
        .with_context(|| format!("fetch element summary for {player_id}"))?;
    let weighting = RecencyWeighting::new(config.alpha);

    println!("Player {player_id}: {} gameweek entries", bundle.history.len());
    for entry in &bundle.history {
        let Some(round) = entry.round else {
            println!("  entry without round: {entry:?}");
            continue;
        };
        let points = entry.total_points.unwrap_or_default();
        println!(
            "  GW{:>2} pts={:>3} min={:>3} weight={:.3} weighted={:.2}",
            round,
            points,
            entry.minutes.unwrap_or_default(),
            weighting.weight(round),
            points as f64 * weighting.weight(round)
        );
    }

    let upcoming: Vec<_> = bundle
        .fixtures
        .iter()
        .filter(|f| f.finished == Some(false))
        .collect();
    println!("Upcoming fixtures: {}", upcoming.len());
    for fixture in upcoming.iter().take(8) {
        println!(
            "  GW{} difficulty={}",
            fixture.event.map(|e| e.to_string()).unwrap_or_else(|| "?".to_string()),
            fixture.difficulty.map(|d| d.to_string()).unwrap_or_else(|| "?".to_string())
        );
    }

    Ok(())
}
