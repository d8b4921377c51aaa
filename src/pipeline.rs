//! Import pipeline
//!
//! Workbook → rows → dedup candidates → resolved plan. The interactive review
//! sits between `prepare_dedup` and `finalize_plan`.

use crate::error::{Result, RosterImportError};
use roster_import_common::dedup::{find_candidates, group_by_confidence, DedupCandidate, MatchOptions};
use roster_import_common::extract::{import_workbook, ImportOptions, ImportResult};
use roster_import_common::resolver::{
    action_counts, build_import_plan, resolution_progress, resolve, validate_overrides, ActionCounts,
    OverrideMap, PlannedAction, ResolutionProgress,
};
use roster_import_common::{ExistingPlayer, Workbook};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Read and parse a JSON input file
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(RosterImportError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

pub fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Extracted rows paired with their match candidates
#[derive(Debug, Clone)]
pub struct PreparedDedup {
    pub import: ImportResult,
    pub candidates: Vec<DedupCandidate>,
}

/// Final plan and its summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupReport {
    pub progress: ResolutionProgress,
    pub counts: ActionCounts,
    pub plan: Vec<PlannedAction>,
}

pub fn prepare_dedup(
    workbook: &Workbook,
    existing: &[ExistingPlayer],
    import_options: &ImportOptions,
    match_options: &MatchOptions,
) -> Result<PreparedDedup> {
    let import = import_workbook(workbook, import_options)?;
    let candidates = find_candidates(&import.rows, existing, match_options);

    let groups = group_by_confidence(&candidates);
    tracing::info!(
        rows = import.rows.len(),
        high = groups.high.len(),
        medium = groups.medium.len(),
        low = groups.low.len(),
        "dedup candidates grouped"
    );

    Ok(PreparedDedup { import, candidates })
}

/// Validate overrides, resolve and join with the parsed rows
pub fn finalize_plan(prepared: &PreparedDedup, overrides: &OverrideMap) -> Result<DedupReport> {
    validate_overrides(&prepared.candidates, overrides)?;

    let decisions = resolve(&prepared.candidates, overrides);
    let counts = action_counts(&decisions);
    debug_assert_eq!(counts.total(), decisions.len());

    Ok(DedupReport {
        progress: resolution_progress(&prepared.candidates, overrides),
        counts,
        plan: build_import_plan(&prepared.import.rows, &decisions),
    })
}
