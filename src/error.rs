use thiserror::Error;

/// Failures that abort a summary run before any output is produced.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("missing required field `{field}`{}", player_suffix(.player_id))]
    MissingField {
        player_id: Option<u32>,
        field: &'static str,
    },

    #[error("player {player_id} has {count} entries for gameweek {gameweek}")]
    DuplicateKey {
        player_id: u32,
        gameweek: u32,
        count: usize,
    },

    #[error("player {player_id} appears more than once in {record}")]
    DuplicatePlayer {
        player_id: u32,
        record: &'static str,
    },

    #[error("element-summary for player {player_id} has no matching player record")]
    OrphanBundle { player_id: u32 },

    #[error("element-summary for player {player_id} carries gameweek {gameweek} of player {element}")]
    ForeignEntry {
        player_id: u32,
        element: u32,
        gameweek: u32,
    },

    #[error("player {player_id} is missing from the {aggregate} aggregate")]
    JoinMismatch {
        player_id: u32,
        aggregate: &'static str,
    },

    #[error("input incomplete, {} fetch(es) failed: {}", .failed.len(), .failed.join("; "))]
    IncompleteInput { failed: Vec<String> },

    #[error("no gameweek observations in source data")]
    EmptyInput,
}

impl PipelineError {
    pub fn missing(player_id: Option<u32>, field: &'static str) -> Self {
        PipelineError::MissingField { player_id, field }
    }
}

fn player_suffix(player_id: &Option<u32>) -> String {
    match player_id {
        Some(id) => format!(" for player {id}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let err = PipelineError::missing(Some(42), "web_name");
        assert_eq!(
            err.to_string(),
            "missing required field `web_name` for player 42"
        );

        let err = PipelineError::missing(None, "teams");
        assert_eq!(err.to_string(), "missing required field `teams`");

        let err = PipelineError::IncompleteInput {
            failed: vec!["player 1: timeout".to_string(), "player 2: http 500".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "input incomplete, 2 fetch(es) failed: player 1: timeout; player 2: http 500"
        );

        let err = PipelineError::DuplicatePlayer {
            player_id: 10,
            record: "players",
        };
        assert_eq!(err.to_string(), "player 10 appears more than once in players");
    }
}
