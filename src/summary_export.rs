use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rust_xlsxwriter::{Format, Workbook, Worksheet};

use crate::aggregate::ConsistencyRatio;
use crate::compose::PlayerSummaryRow;
use crate::pipeline::SummaryTable;

const SUMMARY_SHEET: &str = "Summary";
const ANOMALY_SHEET: &str = "Anomalies";

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

pub struct ExportReport {
    pub path: PathBuf,
    pub rows: usize,
    pub duplicates: usize,
}

pub fn default_output_path(dir: &Path) -> PathBuf {
    let today = chrono::Local::now().date_naive();
    dir.join(format!(
        "Summarized_Player_Performance_{}.xlsx",
        today.format("%Y-%m-%d")
    ))
}

pub fn summary_header(table: &SummaryTable) -> Vec<String> {
    let threshold = table.points_threshold;
    vec![
        "Player ID".to_string(),
        "Player Name".to_string(),
        "Full Name".to_string(),
        "Team ID".to_string(),
        "Team Name".to_string(),
        "Position".to_string(),
        "Cost (£)".to_string(),
        "Total Points".to_string(),
        "Weighted Points".to_string(),
        format!("Recent {} Weeks Points", table.recent_short),
        format!("Recent {} Weeks Points", table.recent_long),
        "Expected Points (This GW)".to_string(),
        "Expected Points (Next GW)".to_string(),
        "ICT Index".to_string(),
        "Threat".to_string(),
        "Points Per Game".to_string(),
        "Current Form".to_string(),
        "Status".to_string(),
        "Chance of Playing Next GW (%)".to_string(),
        "News".to_string(),
        "Avg Fixture Difficulty (Upcoming)".to_string(),
        "Game Week".to_string(),
        "Goals Scored".to_string(),
        "Assists".to_string(),
        "Clean Sheets".to_string(),
        "Minutes Played".to_string(),
        "Bonus Points".to_string(),
        "Yellow Cards".to_string(),
        "Red Cards".to_string(),
        "Transfers In".to_string(),
        "Transfers Out".to_string(),
        "Games Played".to_string(),
        format!("Over {threshold} Points"),
        format!("{threshold} Points and Under"),
        "Ratio".to_string(),
    ]
}

pub fn summary_cells(row: &PlayerSummaryRow) -> Vec<Cell> {
    let p = &row.profile;
    let t = &row.totals;
    vec![
        num(p.player_id),
        Cell::Text(p.display_name.clone()),
        Cell::Text(p.full_name.clone()),
        num(p.team_id),
        Cell::Text(p.team_name.clone()),
        num(p.position.0),
        Cell::Number(p.cost),
        num(t.points),
        Cell::Number(t.weighted_points),
        num(t.recent_short_points),
        num(t.recent_long_points),
        opt_num(p.expected_points_this),
        opt_num(p.expected_points_next),
        Cell::Number(p.ict_index),
        Cell::Number(p.threat),
        Cell::Number(p.points_per_game),
        Cell::Number(p.form),
        Cell::Text(p.status.clone()),
        match p.chance_of_playing {
            Some(pct) => num(pct),
            None => Cell::Text("N/A".to_string()),
        },
        Cell::Text(p.news.clone()),
        opt_num(p.average_difficulty),
        num(row.gameweek),
        num(t.goals),
        num(t.assists),
        num(t.clean_sheets),
        num(t.minutes),
        num(row.latest.bonus),
        num(row.latest.yellow_cards),
        num(row.latest.red_cards),
        Cell::Number(row.latest.transfers_in as f64),
        Cell::Number(row.latest.transfers_out as f64),
        Cell::Number(row.games_played as f64),
        Cell::Number(row.over_threshold as f64),
        Cell::Number(row.at_or_under_threshold as f64),
        ratio_cell(row.ratio),
    ]
}

/// Writes the ranked table to a workbook, preserving row order.
pub fn export_summary(path: &Path, table: &SummaryTable) -> Result<ExportReport> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create output dir {}", dir.display()))?;
        }
    }

    let header_format = Format::new().set_bold();
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SUMMARY_SHEET)?;
        write_header(sheet, &summary_header(table), &header_format)?;
        for (idx, row) in table.rows.iter().enumerate() {
            write_cells(sheet, (idx + 1) as u32, &summary_cells(row))?;
        }
        sheet.set_freeze_panes(1, 0)?;
    }

    if !table.duplicates.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.set_name(ANOMALY_SHEET)?;
        let header = vec![
            "Player ID".to_string(),
            "Game Week".to_string(),
            "Entries".to_string(),
        ];
        write_header(sheet, &header, &header_format)?;
        for (idx, dup) in table.duplicates.iter().enumerate() {
            let cells = vec![num(dup.player_id), num(dup.gameweek), Cell::Number(dup.count as f64)];
            write_cells(sheet, (idx + 1) as u32, &cells)?;
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportReport {
        path: path.to_path_buf(),
        rows: table.rows.len(),
        duplicates: table.duplicates.len(),
    })
}

fn ratio_cell(ratio: ConsistencyRatio) -> Cell {
    match ratio {
        ConsistencyRatio::Finite(v) => Cell::Number(v),
        ConsistencyRatio::Unbounded => Cell::Text("inf".to_string()),
        ConsistencyRatio::NotApplicable => Cell::Empty,
    }
}

fn num<T: Into<f64>>(value: T) -> Cell {
    Cell::Number(value.into())
}

fn opt_num(value: Option<f64>) -> Cell {
    value.map(Cell::Number).unwrap_or(Cell::Empty)
}

fn write_header(worksheet: &mut Worksheet, header: &[String], format: &Format) -> Result<()> {
    for (col_idx, title) in header.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col_idx as u16, title, format)
            .with_context(|| format!("write header cell {col_idx}"))?;
    }
    Ok(())
}

fn write_cells(worksheet: &mut Worksheet, row_idx: u32, cells: &[Cell]) -> Result<()> {
    for (col_idx, cell) in cells.iter().enumerate() {
        let col = col_idx as u16;
        match cell {
            Cell::Text(value) => {
                worksheet
                    .write_string(row_idx, col, value)
                    .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
            }
            Cell::Number(value) => {
                worksheet
                    .write_number(row_idx, col, *value)
                    .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
            }
            Cell::Empty => {}
        }
    }
    Ok(())
}
