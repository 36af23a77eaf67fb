use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::derive::DerivedObservation;
use crate::error::PipelineError;
use crate::store::{Observation, ObservationStore, PlayerProfile};

/// Per-player sums over every observation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LifetimeTotals {
    pub points: i32,
    pub weighted_points: f64,
    pub goals: u32,
    pub assists: u32,
    pub clean_sheets: u32,
    pub minutes: u32,
    pub recent_short_points: i32,
    pub recent_long_points: i32,
}

/// Latest-wins view of a player: the observation with the highest gameweek.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentSnapshot {
    pub profile: PlayerProfile,
    pub observation: Observation,
}

/// `(over / at_or_under) * games_played`, with the division-by-zero cases
/// kept as explicit variants.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConsistencyRatio {
    Finite(f64),
    /// Never scored at or under the threshold.
    Unbounded,
    /// No games at all.
    NotApplicable,
}

impl ConsistencyRatio {
    pub fn from_counts(over: usize, at_or_under: usize, games_played: usize) -> Self {
        if at_or_under > 0 {
            ConsistencyRatio::Finite((over as f64 / at_or_under as f64) * games_played as f64)
        } else if over > 0 {
            ConsistencyRatio::Unbounded
        } else {
            ConsistencyRatio::NotApplicable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConsistencyTally {
    pub games_played: usize,
    pub over: usize,
    pub at_or_under: usize,
    pub ratio: ConsistencyRatio,
}

/// The three per-player aggregates, keyed by player id.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    pub totals: BTreeMap<u32, LifetimeTotals>,
    pub snapshots: BTreeMap<u32, CurrentSnapshot>,
    pub tallies: BTreeMap<u32, ConsistencyTally>,
}

pub fn aggregate(
    store: &ObservationStore,
    derived: &[DerivedObservation],
) -> Result<Aggregates, PipelineError> {
    Ok(Aggregates {
        totals: lifetime_totals(derived),
        snapshots: current_snapshots(store, derived)?,
        tallies: consistency_tallies(derived),
    })
}

pub fn lifetime_totals(derived: &[DerivedObservation]) -> BTreeMap<u32, LifetimeTotals> {
    let mut out: BTreeMap<u32, LifetimeTotals> = BTreeMap::new();
    for row in derived {
        let stats = &row.observation.stats;
        let t = out.entry(row.player_id()).or_default();
        t.points += stats.points;
        t.weighted_points += row.weighted_points;
        t.goals += stats.goals;
        t.assists += stats.assists;
        t.clean_sheets += stats.clean_sheets;
        t.minutes += stats.minutes;
        t.recent_short_points += row.recent_short_points;
        t.recent_long_points += row.recent_long_points;
    }
    out
}

pub fn current_snapshots(
    store: &ObservationStore,
    derived: &[DerivedObservation],
) -> Result<BTreeMap<u32, CurrentSnapshot>, PipelineError> {
    let latest = latest_observations(derived);
    latest
        .into_iter()
        .map(|(player_id, observation)| {
            let profile = store
                .profile(player_id)
                .ok_or(PipelineError::JoinMismatch {
                    player_id,
                    aggregate: "profiles",
                })?
                .clone();
            Ok((
                player_id,
                CurrentSnapshot {
                    profile,
                    observation,
                },
            ))
        })
        .collect()
}

/// Ties on the maximum gameweek (double gameweeks) keep the first entry in
/// input order.
pub fn latest_observations(derived: &[DerivedObservation]) -> BTreeMap<u32, Observation> {
    let mut latest: BTreeMap<u32, Observation> = BTreeMap::new();
    for row in derived {
        match latest.entry(row.player_id()) {
            Entry::Vacant(slot) => {
                slot.insert(row.observation);
            }
            Entry::Occupied(mut slot) => {
                if row.gameweek() > slot.get().gameweek {
                    slot.insert(row.observation);
                }
            }
        }
    }
    latest
}

pub fn consistency_tallies(derived: &[DerivedObservation]) -> BTreeMap<u32, ConsistencyTally> {
    let mut counts: BTreeMap<u32, (usize, usize, usize)> = BTreeMap::new();
    for row in derived {
        let (games, over, under) = counts.entry(row.player_id()).or_default();
        *games += 1;
        if row.over_threshold {
            *over += 1;
        }
        if row.at_or_under_threshold {
            *under += 1;
        }
    }
    counts
        .into_iter()
        .map(|(player_id, (games_played, over, at_or_under))| {
            (
                player_id,
                ConsistencyTally {
                    games_played,
                    over,
                    at_or_under,
                    ratio: ConsistencyRatio::from_counts(over, at_or_under, games_played),
                },
            )
        })
        .collect()
}
