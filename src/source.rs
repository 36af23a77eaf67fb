//! Provider payloads as they arrive from the fantasy API.
//!
//! Every field is optional here. Required-field checks happen once, in
//! [`crate::store::build_store`], so a missing key surfaces as a
//! `MissingField` error naming the player instead of a deserialize failure
//! for the whole payload.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPlayer {
    pub id: Option<u32>,
    pub web_name: Option<String>,
    pub first_name: Option<String>,
    pub second_name: Option<String>,
    pub team: Option<u32>,
    pub element_type: Option<u8>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub now_cost: Option<f64>,
    pub total_points: Option<i32>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub ict_index: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub threat: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub points_per_game: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub ep_this: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub ep_next: Option<f64>,
    #[serde(default, deserialize_with = "flex_f64")]
    pub form: Option<f64>,
    pub status: Option<String>,
    pub chance_of_playing_next_round: Option<u32>,
    pub news: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTeam {
    pub id: Option<u32>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHistoryEntry {
    pub element: Option<u32>,
    pub round: Option<u32>,
    pub total_points: Option<i32>,
    pub goals_scored: Option<u32>,
    pub assists: Option<u32>,
    pub clean_sheets: Option<u32>,
    pub minutes: Option<u32>,
    pub bonus: Option<u32>,
    pub yellow_cards: Option<u32>,
    pub red_cards: Option<u32>,
    pub transfers_in: Option<u64>,
    pub transfers_out: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawFixture {
    pub event: Option<u32>,
    pub finished: Option<bool>,
    pub difficulty: Option<u32>,
}

/// One player's detail payload (per-gameweek history plus fixture list).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerBundle {
    pub player_id: u32,
    #[serde(default)]
    pub history: Vec<RawHistoryEntry>,
    #[serde(default)]
    pub fixtures: Vec<RawFixture>,
}

/// Fully materialized input for one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceData {
    pub players: Vec<RawPlayer>,
    pub teams: Vec<RawTeam>,
    pub bundles: Vec<PlayerBundle>,
}

// The API sends most decimal stats as strings ("5.2") but a few as numbers.
fn flex_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.parse::<f64>().map_err(serde::de::Error::custom)?)
            }
        }
        serde_json::Value::Null => None,
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected number or numeric string, got {other}"
            )));
        }
    };
    Ok(parsed)
}
