use fpl_summary::aggregate::{ConsistencyRatio, LifetimeTotals};
use fpl_summary::compose::PlayerSummaryRow;
use fpl_summary::pipeline::SummaryTable;
use fpl_summary::store::{DuplicateGameweek, PlayerProfile, Position, StatLine};
use fpl_summary::summary_export::{
    Cell, default_output_path, export_summary, summary_cells, summary_header,
};

fn row(player_id: u32, ratio: ConsistencyRatio, chance: Option<u32>) -> PlayerSummaryRow {
    PlayerSummaryRow {
        profile: PlayerProfile {
            player_id,
            display_name: "Haaland".to_string(),
            full_name: "Erling Haaland".to_string(),
            team_id: 13,
            team_name: "Man City".to_string(),
            position: Position(4),
            cost: 14.5,
            points_per_game: 8.0,
            status: "a".to_string(),
            news: String::new(),
            chance_of_playing: chance,
            expected_points_this: Some(7.5),
            expected_points_next: None,
            ict_index: 60.2,
            threat: 120.0,
            form: 8.0,
            average_difficulty: None,
        },
        totals: LifetimeTotals {
            points: 40,
            weighted_points: 48.25,
            goals: 6,
            assists: 1,
            clean_sheets: 0,
            minutes: 430,
            recent_short_points: 30,
            recent_long_points: 40,
        },
        gameweek: 5,
        latest: StatLine {
            points: 13,
            bonus: 3,
            transfers_in: 120000,
            ..StatLine::default()
        },
        games_played: 5,
        over_threshold: 5,
        at_or_under_threshold: 0,
        ratio,
    }
}

fn table(rows: Vec<PlayerSummaryRow>, duplicates: Vec<DuplicateGameweek>) -> SummaryTable {
    SummaryTable {
        rows,
        recent_short: 4,
        recent_long: 8,
        points_threshold: 3,
        duplicates,
    }
}

#[test]
fn header_and_cells_line_up() {
    let t = table(vec![row(1, ConsistencyRatio::Unbounded, None)], Vec::new());
    let header = summary_header(&t);
    let cells = summary_cells(&t.rows[0]);
    assert_eq!(header.len(), cells.len());
    assert_eq!(header.first().map(String::as_str), Some("Player ID"));
    assert_eq!(header.last().map(String::as_str), Some("Ratio"));
    assert!(header.contains(&"Recent 4 Weeks Points".to_string()));
    assert!(header.contains(&"Over 3 Points".to_string()));
    assert!(header.contains(&"3 Points and Under".to_string()));

    let col = |name: &str| header.iter().position(|h| h == name).unwrap();
    assert_eq!(cells[col("Weighted Points")], Cell::Number(48.25));
    assert_eq!(cells[col("Ratio")], Cell::Text("inf".to_string()));
    assert_eq!(cells[col("Chance of Playing Next GW (%)")], Cell::Text("N/A".to_string()));
    assert_eq!(cells[col("Avg Fixture Difficulty (Upcoming)")], Cell::Empty);
    assert_eq!(cells[col("Expected Points (Next GW)")], Cell::Empty);
    assert_eq!(cells[col("Bonus Points")], Cell::Number(3.0));
    assert_eq!(cells[col("Goals Scored")], Cell::Number(6.0));
}

#[test]
fn finite_ratio_and_known_chance_are_numbers() {
    let r = row(2, ConsistencyRatio::Finite(6.0), Some(75));
    let t = table(vec![r], Vec::new());
    let header = summary_header(&t);
    let cells = summary_cells(&t.rows[0]);
    let col = |name: &str| header.iter().position(|h| h == name).unwrap();
    assert_eq!(cells[col("Ratio")], Cell::Number(6.0));
    assert_eq!(cells[col("Chance of Playing Next GW (%)")], Cell::Number(75.0));
}

#[test]
fn workbook_is_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out").join("summary.xlsx");
    let t = table(
        vec![
            row(1, ConsistencyRatio::Unbounded, None),
            row(2, ConsistencyRatio::Finite(2.0), Some(50)),
        ],
        vec![DuplicateGameweek {
            player_id: 2,
            gameweek: 5,
            count: 2,
        }],
    );
    let report = export_summary(&path, &t).expect("export should succeed");
    assert_eq!(report.rows, 2);
    assert_eq!(report.duplicates, 1);
    assert!(path.exists());
}

#[test]
fn default_path_is_dated_xlsx() {
    let path = default_output_path(std::path::Path::new("data"));
    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("Summarized_Player_Performance_"));
    assert!(name.ends_with(".xlsx"));
    assert!(path.starts_with("data"));
}
