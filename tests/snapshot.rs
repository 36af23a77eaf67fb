use std::fs;

use fpl_summary::config::SummaryConfig;
use fpl_summary::pipeline::run_pipeline;
use fpl_summary::snapshot::{load_source, save_source};
use fpl_summary::source::{PlayerBundle, RawHistoryEntry, RawPlayer, RawTeam, SourceData};

fn tiny_source() -> SourceData {
    SourceData {
        players: vec![RawPlayer {
            id: Some(1),
            web_name: Some("Keeper".to_string()),
            first_name: Some("Kee".to_string()),
            second_name: Some("Per".to_string()),
            team: Some(3),
            element_type: Some(1),
            now_cost: Some(45.0),
            total_points: Some(6),
            ict_index: Some(1.5),
            threat: Some(0.0),
            points_per_game: Some(6.0),
            ep_this: Some(2.0),
            ep_next: Some(2.5),
            form: Some(6.0),
            status: Some("a".to_string()),
            chance_of_playing_next_round: None,
            news: None,
        }],
        teams: vec![RawTeam {
            id: Some(3),
            name: Some("Brentford".to_string()),
        }],
        bundles: vec![PlayerBundle {
            player_id: 1,
            history: vec![RawHistoryEntry {
                element: Some(1),
                round: Some(1),
                total_points: Some(6),
                goals_scored: Some(0),
                assists: Some(0),
                clean_sheets: Some(1),
                minutes: Some(90),
                bonus: Some(0),
                yellow_cards: Some(0),
                red_cards: Some(0),
                transfers_in: Some(10),
                transfers_out: Some(2),
            }],
            fixtures: Vec::new(),
        }],
    }
}

#[test]
fn snapshot_reloads_into_identical_summary() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("nested").join("source.json");
    let source = tiny_source();

    save_source(&path, &source).expect("snapshot should save");
    let loaded = load_source(&path).expect("snapshot should load");

    let config = SummaryConfig::default();
    let before = run_pipeline(&source, &config).unwrap();
    let after = run_pipeline(&loaded, &config).unwrap();
    assert_eq!(before.rows, after.rows);
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn snapshot_with_other_version_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("old.json");
    fs::write(
        &path,
        r#"{"version":99,"saved_at":"x","source":{"players":[],"teams":[],"bundles":[]}}"#,
    )
    .unwrap();
    let err = load_source(&path).unwrap_err();
    assert!(err.to_string().contains("version 99"));
}
