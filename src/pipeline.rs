use log::{debug, info};

use crate::aggregate::aggregate;
use crate::compose::{PlayerSummaryRow, compose};
use crate::config::SummaryConfig;
use crate::derive::derive_observations;
use crate::error::PipelineError;
use crate::source::SourceData;
use crate::store::{DuplicateGameweek, build_store};

/// Final ranked table handed to the export layer.
#[derive(Debug, Clone)]
pub struct SummaryTable {
    pub rows: Vec<PlayerSummaryRow>,
    pub recent_short: usize,
    pub recent_long: usize,
    pub points_threshold: i32,
    pub duplicates: Vec<DuplicateGameweek>,
}

/// Store -> derive -> aggregate -> compose. Either the full table or an error;
/// nothing partial is returned.
pub fn run_pipeline(
    source: &SourceData,
    config: &SummaryConfig,
) -> Result<SummaryTable, PipelineError> {
    let store = build_store(source, config)?;
    if store.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let derived = derive_observations(&store, config);
    debug!("derived {} observations", derived.len());

    let aggregates = aggregate(&store, &derived)?;
    debug!(
        "aggregated: totals={} snapshots={} tallies={}",
        aggregates.totals.len(),
        aggregates.snapshots.len(),
        aggregates.tallies.len()
    );

    let rows = compose(&aggregates)?;
    info!(
        "summary ready: {} players from {} observations",
        rows.len(),
        store.observations().len()
    );

    Ok(SummaryTable {
        rows,
        recent_short: config.recent_short,
        recent_long: config.recent_long,
        points_threshold: config.points_threshold,
        duplicates: store.duplicates().to_vec(),
    })
}
