use std::cmp::Ordering;

use crate::aggregate::{Aggregates, ConsistencyRatio, LifetimeTotals};
use crate::error::PipelineError;
use crate::store::{PlayerProfile, StatLine};

/// One output row per player with at least one observation.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummaryRow {
    pub profile: PlayerProfile,
    pub totals: LifetimeTotals,
    /// Gameweek of the current snapshot.
    pub gameweek: u32,
    /// Stat line of the current snapshot (bonus, cards and transfers are read from here).
    pub latest: StatLine,
    pub games_played: usize,
    pub over_threshold: usize,
    pub at_or_under_threshold: usize,
    pub ratio: ConsistencyRatio,
}

impl PlayerSummaryRow {
    pub fn player_id(&self) -> u32 {
        self.profile.player_id
    }

    pub fn weighted_points(&self) -> f64 {
        self.totals.weighted_points
    }
}

/// Joins the three aggregates on player id and returns rows in ranking order.
pub fn compose(aggregates: &Aggregates) -> Result<Vec<PlayerSummaryRow>, PipelineError> {
    for player_id in aggregates
        .snapshots
        .keys()
        .chain(aggregates.tallies.keys())
    {
        if !aggregates.totals.contains_key(player_id) {
            return Err(PipelineError::JoinMismatch {
                player_id: *player_id,
                aggregate: "lifetime totals",
            });
        }
    }

    let mut rows = Vec::with_capacity(aggregates.totals.len());
    for (player_id, totals) in &aggregates.totals {
        let snapshot =
            aggregates
                .snapshots
                .get(player_id)
                .ok_or(PipelineError::JoinMismatch {
                    player_id: *player_id,
                    aggregate: "current snapshot",
                })?;
        let tally = aggregates
            .tallies
            .get(player_id)
            .ok_or(PipelineError::JoinMismatch {
                player_id: *player_id,
                aggregate: "consistency",
            })?;

        rows.push(PlayerSummaryRow {
            profile: snapshot.profile.clone(),
            totals: *totals,
            gameweek: snapshot.observation.gameweek,
            latest: snapshot.observation.stats,
            games_played: tally.games_played,
            over_threshold: tally.over,
            at_or_under_threshold: tally.at_or_under,
            ratio: tally.ratio,
        });
    }

    rank_rows(&mut rows);
    Ok(rows)
}

/// Weighted points descending, player id ascending on ties.
pub fn rank_rows(rows: &mut [PlayerSummaryRow]) {
    rows.sort_by(ranking_order);
}

fn ranking_order(a: &PlayerSummaryRow, b: &PlayerSummaryRow) -> Ordering {
    b.weighted_points()
        .total_cmp(&a.weighted_points())
        .then_with(|| a.player_id().cmp(&b.player_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{ConsistencyTally, CurrentSnapshot};
    use crate::store::{Observation, Position};

    fn profile(player_id: u32) -> PlayerProfile {
        PlayerProfile {
            player_id,
            display_name: format!("P{player_id}"),
            full_name: format!("Player {player_id}"),
            team_id: 1,
            team_name: "Arsenal".to_string(),
            position: Position(4),
            cost: 7.5,
            points_per_game: 0.0,
            status: "a".to_string(),
            news: String::new(),
            chance_of_playing: None,
            expected_points_this: None,
            expected_points_next: None,
            ict_index: 0.0,
            threat: 0.0,
            form: 0.0,
            average_difficulty: None,
        }
    }

    fn insert_player(aggs: &mut Aggregates, player_id: u32, weighted: f64) {
        aggs.totals.insert(
            player_id,
            LifetimeTotals {
                weighted_points: weighted,
                ..LifetimeTotals::default()
            },
        );
        aggs.snapshots.insert(
            player_id,
            CurrentSnapshot {
                profile: profile(player_id),
                observation: Observation {
                    player_id,
                    gameweek: 5,
                    stats: StatLine::default(),
                },
            },
        );
        aggs.tallies.insert(
            player_id,
            ConsistencyTally {
                games_played: 1,
                over: 1,
                at_or_under: 0,
                ratio: ConsistencyRatio::Unbounded,
            },
        );
    }

    #[test]
    fn rows_sorted_by_weighted_points_then_id() {
        let mut aggs = Aggregates::default();
        insert_player(&mut aggs, 9, 10.0);
        insert_player(&mut aggs, 3, 25.5);
        insert_player(&mut aggs, 4, 10.0);
        insert_player(&mut aggs, 1, 2.0);

        let rows = compose(&aggs).unwrap();
        let ids: Vec<u32> = rows.iter().map(|r| r.player_id()).collect();
        assert_eq!(ids, vec![3, 4, 9, 1]);
        assert_eq!(rows[0].ratio, ConsistencyRatio::Unbounded);
    }

    #[test]
    fn missing_snapshot_is_a_join_mismatch() {
        let mut aggs = Aggregates::default();
        insert_player(&mut aggs, 1, 1.0);
        aggs.snapshots.remove(&1);
        let err = compose(&aggs).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::JoinMismatch {
                player_id: 1,
                aggregate: "current snapshot"
            }
        ));
    }

    #[test]
    fn orphan_tally_is_a_join_mismatch() {
        let mut aggs = Aggregates::default();
        insert_player(&mut aggs, 1, 1.0);
        aggs.totals.remove(&1);
        let err = compose(&aggs).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::JoinMismatch {
                player_id: 1,
                aggregate: "lifetime totals"
            }
        ));
    }
}
