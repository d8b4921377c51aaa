//! Decision resolution
//!
//! Merges operator overrides with the matcher's default actions into the final
//! create / update / skip list handed to persistence.

use crate::dedup::{DedupAction, DedupCandidate};
use crate::error::{Error, Result};
use crate::types::ParsedPlayerRow;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Operator choices: parsed-row index to action
pub type OverrideMap = BTreeMap<usize, DedupAction>;

/// Finalized outcome for one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupDecision {
    pub row: usize,
    pub action: DedupAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<BTreeMap<String, Value>>,
}

/// Review progress over rows that have a match
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionProgress {
    pub resolved: usize,
    pub total: usize,
}

/// Tally of decisions by action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    pub create: usize,
    pub update: usize,
    pub skip: usize,
}

impl ActionCounts {
    pub fn total(&self) -> usize {
        self.create + self.update + self.skip
    }
}

/// Resolve every candidate into a decision
///
/// The override wins over the default. `create` never carries an existing id,
/// and an id is only attached when a match exists.
pub fn resolve(candidates: &[DedupCandidate], overrides: &OverrideMap) -> Vec<DedupDecision> {
    candidates
        .iter()
        .map(|candidate| {
            let action = overrides
                .get(&candidate.row)
                .copied()
                .unwrap_or(candidate.default_action);

            let (existing_id, payload) = match (action, &candidate.best_match) {
                (DedupAction::Update, Some(m)) => (Some(m.existing_id.clone()), Some(m.merge.payload())),
                (DedupAction::Skip, Some(m)) => (Some(m.existing_id.clone()), None),
                _ => (None, None),
            };

            DedupDecision {
                row: candidate.row,
                action,
                existing_id,
                payload,
            }
        })
        .collect()
}

/// `total` counts matched rows; `resolved` those with a recorded override
pub fn resolution_progress(candidates: &[DedupCandidate], overrides: &OverrideMap) -> ResolutionProgress {
    let matched = candidates.iter().filter(|c| c.best_match.is_some());
    ResolutionProgress {
        resolved: matched.clone().filter(|c| overrides.contains_key(&c.row)).count(),
        total: matched.count(),
    }
}

pub fn action_counts(decisions: &[DedupDecision]) -> ActionCounts {
    decisions.iter().fold(ActionCounts::default(), |mut counts, d| {
        match d.action {
            DedupAction::Create => counts.create += 1,
            DedupAction::Update => counts.update += 1,
            DedupAction::Skip => counts.skip += 1,
        }
        counts
    })
}

/// Reject overrides the resolver cannot honor
///
/// Call before `resolve`: an override must name a row of this import, and
/// `update` / `skip` need an existing-player match.
pub fn validate_overrides(candidates: &[DedupCandidate], overrides: &OverrideMap) -> Result<()> {
    for (&row, &action) in overrides {
        let candidate = candidates
            .iter()
            .find(|c| c.row == row)
            .ok_or(Error::OverrideRowOutOfRange(row))?;

        if action != DedupAction::Create && candidate.best_match.is_none() {
            return Err(Error::OverrideWithoutMatch {
                row,
                action: action.to_string(),
            });
        }
    }
    Ok(())
}

/// One persistence instruction with its player record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedAction {
    #[serde(flatten)]
    pub decision: DedupDecision,
    pub player: ParsedPlayerRow,
}

/// Join decisions with their parsed rows, in decision order
pub fn build_import_plan(rows: &[ParsedPlayerRow], decisions: &[DedupDecision]) -> Vec<PlannedAction> {
    decisions
        .iter()
        .filter_map(|decision| {
            rows.get(decision.row).map(|player| PlannedAction {
                decision: decision.clone(),
                player: player.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::{BestMatch, FieldChange, MergeDiff};
    use crate::types::{ExistingPlayer, PlayerField};

    fn matched(row: usize, id: &str, default_action: DedupAction) -> DedupCandidate {
        DedupCandidate {
            row,
            best_match: Some(BestMatch {
                existing_id: id.to_string(),
                existing: ExistingPlayer::default(),
                score: 0.9,
                merge: MergeDiff {
                    changes: vec![FieldChange {
                        field: PlayerField::Rating,
                        from: Value::from(1500),
                        to: Value::from(1550),
                    }],
                },
            }),
            default_action,
        }
    }

    fn unmatched(row: usize) -> DedupCandidate {
        DedupCandidate {
            row,
            best_match: None,
            default_action: DedupAction::Create,
        }
    }

    #[test]
    fn test_resolve_defaults() {
        let candidates = vec![matched(0, "p1", DedupAction::Update), unmatched(1)];
        let decisions = resolve(&candidates, &OverrideMap::new());

        assert_eq!(decisions[0].action, DedupAction::Update);
        assert_eq!(decisions[0].existing_id.as_deref(), Some("p1"));
        assert_eq!(decisions[0].payload.as_ref().unwrap()["rating"], Value::from(1550));

        assert_eq!(decisions[1].action, DedupAction::Create);
        assert_eq!(decisions[1].existing_id, None);
    }

    #[test]
    fn test_explicit_create_drops_existing_id() {
        let candidates = vec![matched(0, "p1", DedupAction::Update)];
        let mut overrides = OverrideMap::new();
        overrides.insert(0, DedupAction::Create);

        let decisions = resolve(&candidates, &overrides);
        assert_eq!(decisions[0].action, DedupAction::Create);
        assert_eq!(decisions[0].existing_id, None);
        assert_eq!(decisions[0].payload, None);
    }

    #[test]
    fn test_skip_carries_id_without_payload() {
        let candidates = vec![matched(0, "p1", DedupAction::Update)];
        let mut overrides = OverrideMap::new();
        overrides.insert(0, DedupAction::Skip);

        let decisions = resolve(&candidates, &overrides);
        assert_eq!(decisions[0].existing_id.as_deref(), Some("p1"));
        assert_eq!(decisions[0].payload, None);
    }

    #[test]
    fn test_update_without_match_never_fabricates_id() {
        let candidates = vec![unmatched(0)];
        let mut overrides = OverrideMap::new();
        overrides.insert(0, DedupAction::Update);

        let decisions = resolve(&candidates, &overrides);
        assert_eq!(decisions[0].existing_id, None);
        assert!(matches!(
            validate_overrides(&candidates, &overrides),
            Err(Error::OverrideWithoutMatch { row: 0, .. })
        ));
    }

    #[test]
    fn test_validate_overrides() {
        let candidates = vec![matched(0, "p1", DedupAction::Skip), unmatched(1)];
        let mut overrides = OverrideMap::new();
        overrides.insert(0, DedupAction::Update);
        overrides.insert(1, DedupAction::Create);
        assert!(validate_overrides(&candidates, &overrides).is_ok());

        overrides.insert(9, DedupAction::Create);
        assert!(matches!(
            validate_overrides(&candidates, &overrides),
            Err(Error::OverrideRowOutOfRange(9))
        ));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let candidates = vec![
            matched(0, "p1", DedupAction::Update),
            unmatched(1),
            matched(2, "p3", DedupAction::Skip),
        ];
        let mut overrides = OverrideMap::new();
        overrides.insert(2, DedupAction::Update);

        assert_eq!(resolve(&candidates, &overrides), resolve(&candidates, &overrides));
    }

    #[test]
    fn test_progress_counts_explicit_create() {
        let candidates = vec![
            matched(0, "p1", DedupAction::Update),
            matched(1, "p2", DedupAction::Skip),
            unmatched(2),
        ];
        let mut overrides = OverrideMap::new();
        overrides.insert(0, DedupAction::Create);
        overrides.insert(2, DedupAction::Create);

        let progress = resolution_progress(&candidates, &overrides);
        assert_eq!(progress, ResolutionProgress { resolved: 1, total: 2 });
    }

    #[test]
    fn test_action_counts_sum_to_decisions() {
        let candidates = vec![
            matched(0, "p1", DedupAction::Update),
            matched(1, "p2", DedupAction::Skip),
            unmatched(2),
            unmatched(3),
        ];
        let overrides: OverrideMap = candidates.iter().map(|c| (c.row, c.default_action)).collect();

        let decisions = resolve(&candidates, &overrides);
        let counts = action_counts(&decisions);
        assert_eq!(counts, ActionCounts { create: 2, update: 1, skip: 1 });
        assert_eq!(counts.total(), overrides.len());
        assert_eq!(counts.total(), decisions.len());
    }

    #[test]
    fn test_build_import_plan() {
        let rows = vec![
            ParsedPlayerRow { name: "A".into(), original_index: 5, ..Default::default() },
            ParsedPlayerRow { name: "B".into(), original_index: 6, ..Default::default() },
        ];
        let candidates = vec![matched(0, "p1", DedupAction::Skip), unmatched(1)];
        let plan = build_import_plan(&rows, &resolve(&candidates, &OverrideMap::new()));

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].player.original_index, 6);

        let json = serde_json::to_value(&plan[0]).unwrap();
        assert_eq!(json["action"], "skip");
        assert_eq!(json["existingId"], "p1");
        assert_eq!(json["player"]["name"], "A");
    }
}
