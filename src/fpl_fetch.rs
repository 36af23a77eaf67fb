use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{info, warn};
use rayon::prelude::*;
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::config::SummaryConfig;
use crate::error::PipelineError;
use crate::http_cache::{fetch_json_cached, flush_cache};
use crate::http_client::http_client;
use crate::source::{PlayerBundle, RawFixture, RawHistoryEntry, RawPlayer, RawTeam, SourceData};

const RETRY_BACKOFF_MS: u64 = 500;

pub struct Bootstrap {
    pub players: Vec<RawPlayer>,
    pub teams: Vec<RawTeam>,
}

pub struct FetchProgress {
    pub current: usize,
    pub total: usize,
    pub message: String,
}

#[derive(Debug, Deserialize)]
struct BootstrapResponse {
    elements: Vec<RawPlayer>,
    teams: Vec<RawTeam>,
}

#[derive(Debug, Deserialize)]
struct ElementSummaryResponse {
    history: Vec<RawHistoryEntry>,
    fixtures: Vec<RawFixture>,
}

pub fn parse_bootstrap_json(raw: &str) -> Result<Bootstrap> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow::anyhow!("empty bootstrap response"));
    }
    let parsed: BootstrapResponse =
        serde_json::from_str(trimmed).context("invalid bootstrap json")?;
    Ok(Bootstrap {
        players: parsed.elements,
        teams: parsed.teams,
    })
}

pub fn parse_element_summary_json(player_id: u32, raw: &str) -> Result<PlayerBundle> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(anyhow::anyhow!("empty element summary for player {player_id}"));
    }
    let parsed: ElementSummaryResponse = serde_json::from_str(trimmed)
        .with_context(|| format!("invalid element summary json for player {player_id}"))?;
    Ok(PlayerBundle {
        player_id,
        history: parsed.history,
        fixtures: parsed.fixtures,
    })
}

pub fn bootstrap_url(config: &SummaryConfig) -> String {
    format!("{}/bootstrap-static/", config.api_base)
}

pub fn element_summary_url(config: &SummaryConfig, player_id: u32) -> String {
    format!("{}/element-summary/{player_id}/", config.api_base)
}

pub fn fetch_bootstrap(client: &Client, config: &SummaryConfig) -> Result<Bootstrap> {
    let url = bootstrap_url(config);
    let body = with_retries("bootstrap", config.fetch_retries, || {
        fetch_json_cached(client, &url)
    })?;
    parse_bootstrap_json(&body)
}

pub fn fetch_player_bundle(
    client: &Client,
    config: &SummaryConfig,
    player_id: u32,
) -> Result<PlayerBundle> {
    let url = element_summary_url(config, player_id);
    let label = format!("player {player_id}");
    let body = with_retries(&label, config.fetch_retries, || {
        fetch_json_cached(client, &url)
    })?;
    parse_element_summary_json(player_id, &body)
}

/// Fetches bootstrap data and every player's detail payload.
///
/// Detail fetches fan out over a pool of `config.fetch_parallelism` threads.
/// Each result is owned by its own player slot, so one failure cannot leak into
/// another player's data; any failure aborts with `IncompleteInput` listing
/// every player that could not be fetched.
pub fn fetch_source_data_with_progress(
    config: &SummaryConfig,
    on_progress: impl Fn(FetchProgress) + Sync,
) -> Result<SourceData> {
    let client = http_client()?;
    let bootstrap = fetch_bootstrap(client, config).context("bootstrap fetch failed")?;
    let ids: Vec<u32> = bootstrap.players.iter().filter_map(|p| p.id).collect();
    let total = ids.len();
    info!(
        "bootstrap loaded: {} players, {} teams",
        total,
        bootstrap.teams.len()
    );
    on_progress(FetchProgress {
        current: 0,
        total,
        message: "Loaded bootstrap".to_string(),
    });

    let done = AtomicUsize::new(0);
    let results: Vec<(u32, Result<PlayerBundle>)> = with_fetch_pool(config.fetch_parallelism, || {
        ids.par_iter()
            .map(|id| {
                let res = fetch_player_bundle(client, config, *id);
                let current = done.fetch_add(1, Ordering::Relaxed) + 1;
                on_progress(FetchProgress {
                    current,
                    total,
                    message: match &res {
                        Ok(_) => format!("Player {id} loaded"),
                        Err(_) => format!("Player {id} failed"),
                    },
                });
                (*id, res)
            })
            .collect()
    });

    if let Err(err) = flush_cache() {
        warn!("http cache flush failed: {err:#}");
    }

    let mut bundles = Vec::with_capacity(results.len());
    let mut failed = Vec::new();
    for (id, res) in results {
        match res {
            Ok(bundle) => bundles.push(bundle),
            Err(err) => failed.push(format!("player {id}: {err:#}")),
        }
    }
    if !failed.is_empty() {
        return Err(PipelineError::IncompleteInput { failed }.into());
    }

    Ok(SourceData {
        players: bootstrap.players,
        teams: bootstrap.teams,
        bundles,
    })
}

fn with_retries<T>(label: &str, retries: u32, mut action: impl FnMut() -> Result<T>) -> Result<T> {
    let mut attempt = 0u32;
    loop {
        match action() {
            Ok(value) => return Ok(value),
            Err(err) if attempt < retries => {
                attempt += 1;
                warn!("{label} fetch failed (attempt {attempt}/{}): {err:#}", retries + 1);
                thread::sleep(Duration::from_millis(RETRY_BACKOFF_MS * attempt as u64));
            }
            Err(err) => return Err(err),
        }
    }
}

fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
