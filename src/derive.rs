use std::collections::BTreeSet;

use log::debug;

use crate::config::SummaryConfig;
use crate::store::{Observation, ObservationStore};

/// `weight(gw) = exp(alpha * (gw - 1))`, so gameweek 1 always weighs 1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecencyWeighting {
    pub alpha: f64,
}

impl RecencyWeighting {
    pub fn new(alpha: f64) -> Self {
        Self { alpha }
    }

    pub fn weight(&self, gameweek: u32) -> f64 {
        (self.alpha * (gameweek as f64 - 1.0)).exp()
    }
}

/// Gameweek numbers counted as "recent".
///
/// Windows are taken over the whole dataset, not per player: the short window
/// is the `short` highest distinct gameweeks seen for anyone. A player who
/// sat those gameweeks out scores zero in the window rather than having it
/// slide back over their own older games.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentWindows {
    short: BTreeSet<u32>,
    long: BTreeSet<u32>,
}

impl RecentWindows {
    pub fn from_observations(observations: &[Observation], short: usize, long: usize) -> Self {
        let distinct: BTreeSet<u32> = observations.iter().map(|o| o.gameweek).collect();
        Self {
            short: distinct.iter().rev().take(short).copied().collect(),
            long: distinct.iter().rev().take(long).copied().collect(),
        }
    }

    pub fn in_short(&self, gameweek: u32) -> bool {
        self.short.contains(&gameweek)
    }

    pub fn in_long(&self, gameweek: u32) -> bool {
        self.long.contains(&gameweek)
    }

    pub fn short_gameweeks(&self) -> &BTreeSet<u32> {
        &self.short
    }

    pub fn long_gameweeks(&self) -> &BTreeSet<u32> {
        &self.long
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedObservation {
    pub observation: Observation,
    pub weight: f64,
    pub weighted_points: f64,
    /// Own points when the gameweek is in the short window, else 0.
    pub recent_short_points: i32,
    pub recent_long_points: i32,
    pub over_threshold: bool,
    pub at_or_under_threshold: bool,
}

impl DerivedObservation {
    pub fn player_id(&self) -> u32 {
        self.observation.player_id
    }

    pub fn gameweek(&self) -> u32 {
        self.observation.gameweek
    }

    pub fn points(&self) -> i32 {
        self.observation.stats.points
    }
}

pub fn derive_observations(
    store: &ObservationStore,
    config: &SummaryConfig,
) -> Vec<DerivedObservation> {
    let weighting = RecencyWeighting::new(config.alpha);
    let windows =
        RecentWindows::from_observations(store.observations(), config.recent_short, config.recent_long);
    debug!(
        "recent windows: short={:?} long={:?}",
        windows.short_gameweeks(),
        windows.long_gameweeks()
    );

    store
        .observations()
        .iter()
        .map(|obs| derive_one(obs, &weighting, &windows, config.points_threshold))
        .collect()
}

fn derive_one(
    obs: &Observation,
    weighting: &RecencyWeighting,
    windows: &RecentWindows,
    threshold: i32,
) -> DerivedObservation {
    let points = obs.stats.points;
    let weight = weighting.weight(obs.gameweek);
    DerivedObservation {
        observation: *obs,
        weight,
        weighted_points: points as f64 * weight,
        recent_short_points: if windows.in_short(obs.gameweek) { points } else { 0 },
        recent_long_points: if windows.in_long(obs.gameweek) { points } else { 0 },
        over_threshold: points > threshold,
        at_or_under_threshold: points <= threshold,
    }
}
