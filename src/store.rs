use std::collections::{BTreeMap, HashMap};

use log::{debug, warn};

use crate::config::{DuplicatePolicy, SummaryConfig};
use crate::error::PipelineError;
use crate::source::{PlayerBundle, RawFixture, RawHistoryEntry, RawPlayer, SourceData};

/// Provider position code (`element_type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position(pub u8);

impl Position {
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "GKP",
            2 => "DEF",
            3 => "MID",
            4 => "FWD",
            _ => "UNK",
        }
    }
}

/// Slow-changing attributes of a player, rebuilt from source on every run.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProfile {
    pub player_id: u32,
    pub display_name: String,
    pub full_name: String,
    pub team_id: u32,
    pub team_name: String,
    pub position: Position,
    pub cost: f64,
    pub points_per_game: f64,
    pub status: String,
    pub news: String,
    pub chance_of_playing: Option<u32>,
    pub expected_points_this: Option<f64>,
    pub expected_points_next: Option<f64>,
    pub ict_index: f64,
    pub threat: f64,
    pub form: f64,
    /// Mean difficulty of unfinished fixtures; `None` when nothing is left to play.
    pub average_difficulty: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatLine {
    pub points: i32,
    pub goals: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub minutes: u32,
    pub bonus: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub transfers_in: u64,
    pub transfers_out: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Observation {
    pub player_id: u32,
    pub gameweek: u32,
    pub stats: StatLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicateGameweek {
    pub player_id: u32,
    pub gameweek: u32,
    pub count: usize,
}

/// Validated profiles plus the flat observation list, in source order.
#[derive(Debug, Clone, Default)]
pub struct ObservationStore {
    profiles: Vec<PlayerProfile>,
    index: HashMap<u32, usize>,
    observations: Vec<Observation>,
    duplicates: Vec<DuplicateGameweek>,
}

impl ObservationStore {
    pub fn profiles(&self) -> &[PlayerProfile] {
        &self.profiles
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn duplicates(&self) -> &[DuplicateGameweek] {
        &self.duplicates
    }

    pub fn profile(&self, player_id: u32) -> Option<&PlayerProfile> {
        self.index.get(&player_id).map(|idx| &self.profiles[*idx])
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }
}

pub fn build_store(
    source: &SourceData,
    config: &SummaryConfig,
) -> Result<ObservationStore, PipelineError> {
    let mut teams: HashMap<u32, &str> = HashMap::with_capacity(source.teams.len());
    for team in &source.teams {
        let id = team.id.ok_or(PipelineError::missing(None, "teams[].id"))?;
        let name = team
            .name
            .as_deref()
            .ok_or(PipelineError::missing(None, "teams[].name"))?;
        teams.insert(id, name);
    }
    let mut bundles: HashMap<u32, &PlayerBundle> = HashMap::with_capacity(source.bundles.len());
    for bundle in &source.bundles {
        if bundles.insert(bundle.player_id, bundle).is_some() {
            return Err(PipelineError::DuplicatePlayer {
                player_id: bundle.player_id,
                record: "element-summary",
            });
        }
    }

    let mut store = ObservationStore::default();
    for raw in &source.players {
        let player_id = raw.id.ok_or(PipelineError::missing(None, "id"))?;
        if store.index.contains_key(&player_id) {
            return Err(PipelineError::DuplicatePlayer {
                player_id,
                record: "players",
            });
        }
        let bundle = bundles
            .get(&player_id)
            .ok_or(PipelineError::missing(Some(player_id), "element-summary"))?;

        let profile = build_profile(player_id, raw, &teams, &bundle.fixtures)?;
        let before = store.observations.len();
        for entry in &bundle.history {
            store
                .observations
                .push(build_observation(player_id, entry)?);
        }

        let dupes = find_duplicates(player_id, &store.observations[before..]);
        for dup in &dupes {
            if config.duplicate_policy == DuplicatePolicy::Reject {
                return Err(PipelineError::DuplicateKey {
                    player_id: dup.player_id,
                    gameweek: dup.gameweek,
                    count: dup.count,
                });
            }
            warn!(
                "player {} ({}) has {} entries for gameweek {}, keeping all",
                player_id, profile.display_name, dup.count, dup.gameweek
            );
        }
        store.duplicates.extend(dupes);
        check_season_total(&profile, raw.total_points, &store.observations[before..]);

        store.index.insert(player_id, store.profiles.len());
        store.profiles.push(profile);
    }

    if let Some(orphan) = source
        .bundles
        .iter()
        .find(|b| !store.index.contains_key(&b.player_id))
    {
        return Err(PipelineError::OrphanBundle {
            player_id: orphan.player_id,
        });
    }

    debug!(
        "store built: {} profiles, {} observations, {} duplicate gameweeks",
        store.profiles.len(),
        store.observations.len(),
        store.duplicates.len()
    );
    Ok(store)
}

fn build_profile(
    player_id: u32,
    raw: &RawPlayer,
    teams: &HashMap<u32, &str>,
    fixtures: &[RawFixture],
) -> Result<PlayerProfile, PipelineError> {
    let pid = Some(player_id);
    let team_id = raw.team.ok_or(PipelineError::missing(pid, "team"))?;
    let team_name = teams
        .get(&team_id)
        .ok_or(PipelineError::missing(pid, "teams[team]"))?;
    let first = required(pid, "first_name", raw.first_name.as_deref())?;
    let second = required(pid, "second_name", raw.second_name.as_deref())?;
    let now_cost = raw.now_cost.ok_or(PipelineError::missing(pid, "now_cost"))?;

    Ok(PlayerProfile {
        player_id,
        display_name: required(pid, "web_name", raw.web_name.as_deref())?.to_string(),
        full_name: format!("{first} {second}"),
        team_id,
        team_name: team_name.to_string(),
        position: Position(
            raw.element_type
                .ok_or(PipelineError::missing(pid, "element_type"))?,
        ),
        cost: now_cost / 10.0,
        points_per_game: raw
            .points_per_game
            .ok_or(PipelineError::missing(pid, "points_per_game"))?,
        status: required(pid, "status", raw.status.as_deref())?.to_string(),
        news: raw.news.clone().unwrap_or_default(),
        chance_of_playing: raw.chance_of_playing_next_round,
        expected_points_this: raw.ep_this,
        expected_points_next: raw.ep_next,
        ict_index: raw.ict_index.ok_or(PipelineError::missing(pid, "ict_index"))?,
        threat: raw.threat.ok_or(PipelineError::missing(pid, "threat"))?,
        form: raw.form.ok_or(PipelineError::missing(pid, "form"))?,
        average_difficulty: average_upcoming_difficulty(player_id, fixtures)?,
    })
}

fn build_observation(player_id: u32, entry: &RawHistoryEntry) -> Result<Observation, PipelineError> {
    let pid = Some(player_id);
    let field = |value: Option<u32>, name: &'static str| value.ok_or(PipelineError::missing(pid, name));
    let gameweek = entry
        .round
        .filter(|round| *round > 0)
        .ok_or(PipelineError::missing(pid, "history[].round"))?;
    if let Some(element) = entry.element
        && element != player_id
    {
        return Err(PipelineError::ForeignEntry {
            player_id,
            element,
            gameweek,
        });
    }

    Ok(Observation {
        player_id,
        gameweek,
        stats: StatLine {
            points: entry
                .total_points
                .ok_or(PipelineError::missing(pid, "history[].total_points"))?,
            goals: field(entry.goals_scored, "history[].goals_scored")?,
            assists: field(entry.assists, "history[].assists")?,
            clean_sheets: field(entry.clean_sheets, "history[].clean_sheets")?,
            minutes: field(entry.minutes, "history[].minutes")?,
            bonus: field(entry.bonus, "history[].bonus")?,
            yellow_cards: field(entry.yellow_cards, "history[].yellow_cards")?,
            red_cards: field(entry.red_cards, "history[].red_cards")?,
            transfers_in: entry
                .transfers_in
                .ok_or(PipelineError::missing(pid, "history[].transfers_in"))?,
            transfers_out: entry
                .transfers_out
                .ok_or(PipelineError::missing(pid, "history[].transfers_out"))?,
        },
    })
}

fn average_upcoming_difficulty(
    player_id: u32,
    fixtures: &[RawFixture],
) -> Result<Option<f64>, PipelineError> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for fixture in fixtures {
        let finished = fixture
            .finished
            .ok_or(PipelineError::missing(Some(player_id), "fixtures[].finished"))?;
        if finished {
            continue;
        }
        let difficulty = fixture
            .difficulty
            .ok_or(PipelineError::missing(Some(player_id), "fixtures[].difficulty"))?;
        sum += difficulty as f64;
        n += 1;
    }
    if n == 0 {
        Ok(None)
    } else {
        Ok(Some(sum / n as f64))
    }
}

/// Warns when the provider's season total disagrees with the summed history.
fn check_season_total(
    profile: &PlayerProfile,
    reported: Option<i32>,
    observations: &[Observation],
) -> bool {
    let Some(reported) = reported else {
        return true;
    };
    let summed: i32 = observations.iter().map(|obs| obs.stats.points).sum();
    if summed != reported {
        warn!(
            "player {} ({}) history sums to {} points, provider reports {}",
            profile.player_id, profile.display_name, summed, reported
        );
        return false;
    }
    true
}

fn find_duplicates(player_id: u32, observations: &[Observation]) -> Vec<DuplicateGameweek> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for obs in observations {
        *counts.entry(obs.gameweek).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(gameweek, count)| DuplicateGameweek {
            player_id,
            gameweek,
            count,
        })
        .collect()
}

fn required<'a>(
    player_id: Option<u32>,
    field: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, PipelineError> {
    value.ok_or(PipelineError::missing(player_id, field))
}
