use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::source::SourceData;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    saved_at: String,
    source: SourceData,
}

/// Writes the raw source payloads so a run can be repeated offline.
pub fn save_source(path: &Path, source: &SourceData) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)
                .with_context(|| format!("create snapshot dir {}", dir.display()))?;
        }
    }
    let file = SnapshotFile {
        version: SNAPSHOT_VERSION,
        saved_at: chrono::Local::now().to_rfc3339(),
        source: source.clone(),
    };
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string(&file).context("serialize snapshot")?;
    fs::write(&tmp, json).with_context(|| format!("write snapshot {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap snapshot {}", path.display()))?;
    Ok(())
}

pub fn load_source(path: &Path) -> Result<SourceData> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read snapshot {}", path.display()))?;
    let file: SnapshotFile = serde_json::from_str(&raw)
        .with_context(|| format!("invalid snapshot json in {}", path.display()))?;
    if file.version != SNAPSHOT_VERSION {
        return Err(anyhow!(
            "snapshot {} has version {}, expected {}",
            path.display(),
            file.version,
            SNAPSHOT_VERSION
        ));
    }
    Ok(file.source)
}
