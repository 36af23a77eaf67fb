use std::fs;
use std::path::PathBuf;

use fpl_summary::fpl_fetch::{parse_bootstrap_json, parse_element_summary_json};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_bootstrap_fixture() {
    let raw = read_fixture("bootstrap.json");
    let boot = parse_bootstrap_json(&raw).expect("fixture should parse");
    assert_eq!(boot.players.len(), 4);
    assert_eq!(boot.teams.len(), 2);

    let saka = &boot.players[0];
    assert_eq!(saka.id, Some(10));
    assert_eq!(saka.web_name.as_deref(), Some("Saka"));
    assert_eq!(saka.now_cost, Some(100.0));
    assert_eq!(saka.ict_index, Some(30.1));
    assert_eq!(saka.chance_of_playing_next_round, None);

    let raya = &boot.players[2];
    assert_eq!(raya.ep_this, None);
    assert_eq!(raya.chance_of_playing_next_round, Some(75));
}

#[test]
fn parses_element_summary_fixture() {
    let raw = read_fixture("element_summary_30.json");
    let bundle = parse_element_summary_json(30, &raw).expect("fixture should parse");
    assert_eq!(bundle.player_id, 30);
    assert_eq!(bundle.history.len(), 4);
    assert_eq!(bundle.history[3].round, Some(5));
    assert_eq!(bundle.history[3].total_points, Some(7));
    assert_eq!(bundle.fixtures.len(), 2);
    assert_eq!(bundle.fixtures[0].finished, Some(false));
    assert_eq!(bundle.fixtures[0].difficulty, Some(2));
}

#[test]
fn element_summary_without_history_key_is_rejected() {
    let raw = r#"{"fixtures":[]}"#;
    assert!(parse_element_summary_json(1, raw).is_err());
}

#[test]
fn null_payloads_are_errors() {
    assert!(parse_bootstrap_json("null").is_err());
    assert!(parse_bootstrap_json("  ").is_err());
    assert!(parse_element_summary_json(1, "null").is_err());
}
