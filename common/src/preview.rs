//! Review preview limiting
//!
//! Callers without full-results access see only part of the winners per
//! category. The allocation itself is untouched; only winner identity is
//! hidden, so conflicts and unfilled prizes always pass through.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};

/// Categories with this many filled prizes or fewer reveal one winner
const SMALL_CATEGORY_PRIZES: usize = 5;

/// Grouping key for entries without a category id or name
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Record passed through without interpretation
pub type OpaqueRecord = Map<String, Value>;

/// One prize slot of the coverage report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageEntry {
    #[serde(alias = "prize_id")]
    pub prize_id: String,
    #[serde(default, alias = "category_id")]
    pub category_id: Option<String>,
    #[serde(default, alias = "category_name")]
    pub category_name: Option<String>,
    #[serde(default, alias = "is_unfilled")]
    pub is_unfilled: bool,
    #[serde(flatten)]
    pub extra: OpaqueRecord,
}

impl CoverageEntry {
    /// Category id, then category name, then `"unknown"`
    pub fn category_key(&self) -> &str {
        self.category_id
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.category_name.as_deref().filter(|s| !s.is_empty()))
            .unwrap_or(UNKNOWN_CATEGORY)
    }
}

/// A prize winner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    #[serde(alias = "prize_id")]
    pub prize_id: String,
    #[serde(flatten)]
    pub extra: OpaqueRecord,
}

/// Allocation output handed to the review screen
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationData {
    #[serde(default)]
    pub coverage: Vec<CoverageEntry>,
    #[serde(default)]
    pub winners: Vec<Winner>,
    #[serde(default)]
    pub conflicts: Vec<OpaqueRecord>,
    #[serde(default)]
    pub unfilled: Vec<OpaqueRecord>,
    /// Allocation debug rows behind the RCA export
    #[serde(default)]
    pub rca: Vec<OpaqueRecord>,
}

/// Per-category visibility summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPreview {
    pub category_key: String,
    pub total_winners: usize,
    pub visible_winners: usize,
    pub hidden_winners: usize,
}

/// Limited (or full) view of the allocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    pub coverage: Vec<CoverageEntry>,
    pub winners: Vec<Winner>,
    pub conflicts: Vec<OpaqueRecord>,
    pub unfilled: Vec<OpaqueRecord>,
    pub category_preview: Vec<CategoryPreview>,
    pub hidden_winner_count: usize,
}

/// Download affordances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportAvailability {
    pub can_download_coverage: bool,
    pub can_download_rca: bool,
}

/// Number of filled prizes revealed in a category
pub fn visible_prize_count(filled: usize) -> usize {
    if filled == 0 {
        0
    } else if filled <= SMALL_CATEGORY_PRIZES {
        1
    } else {
        filled.div_ceil(2)
    }
}

/// Apply the preview limit
///
/// With full access everything passes through. Otherwise each category
/// reveals the winners of its first N filled prizes, N from
/// `visible_prize_count`. Winners whose prize is not in the coverage report
/// are hidden and counted only in `hidden_winner_count`.
pub fn apply_review_preview_limit(data: &AllocationData, has_full_access: bool) -> PreviewResult {
    // Category order follows first appearance in the coverage report
    let mut order: Vec<&str> = Vec::new();
    let mut filled_by_category: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut category_of_prize: HashMap<&str, &str> = HashMap::new();

    for entry in &data.coverage {
        let key = entry.category_key();
        if !filled_by_category.contains_key(key) {
            order.push(key);
        }
        let filled = filled_by_category.entry(key).or_default();
        category_of_prize.insert(entry.prize_id.as_str(), key);
        if !entry.is_unfilled {
            filled.push(entry.prize_id.as_str());
        }
    }

    let visible_prizes: HashSet<&str> = if has_full_access {
        data.winners.iter().map(|w| w.prize_id.as_str()).collect()
    } else {
        order
            .iter()
            .flat_map(|key| {
                let filled = &filled_by_category[key];
                filled.iter().take(visible_prize_count(filled.len())).copied()
            })
            .collect()
    };

    let winners: Vec<Winner> = data
        .winners
        .iter()
        .filter(|w| visible_prizes.contains(w.prize_id.as_str()))
        .cloned()
        .collect();

    let category_preview: Vec<CategoryPreview> = order
        .iter()
        .map(|key| {
            let in_category: Vec<&Winner> = data
                .winners
                .iter()
                .filter(|w| category_of_prize.get(w.prize_id.as_str()) == Some(key))
                .collect();
            let visible = in_category
                .iter()
                .filter(|w| visible_prizes.contains(w.prize_id.as_str()))
                .count();
            CategoryPreview {
                category_key: key.to_string(),
                total_winners: in_category.len(),
                visible_winners: visible,
                hidden_winners: in_category.len() - visible,
            }
        })
        .collect();

    let hidden_winner_count = data.winners.len() - winners.len();
    if hidden_winner_count > 0 {
        tracing::debug!(hidden = hidden_winner_count, "winners hidden by preview limit");
    }

    PreviewResult {
        coverage: data.coverage.clone(),
        winners,
        conflicts: data.conflicts.clone(),
        unfilled: data.unfilled.clone(),
        category_preview,
        hidden_winner_count,
    }
}

/// Downloads need export enabled, full access and a non-empty dataset
pub fn can_download_allocation_exports(
    export_enabled: bool,
    has_full_access: bool,
    coverage_len: usize,
    rca_len: usize,
) -> ExportAvailability {
    let allowed = export_enabled && has_full_access;
    ExportAvailability {
        can_download_coverage: allowed && coverage_len > 0,
        can_download_rca: allowed && rca_len > 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(prize: &str, category: Option<&str>, unfilled: bool) -> CoverageEntry {
        CoverageEntry {
            prize_id: prize.to_string(),
            category_id: category.map(str::to_string),
            category_name: None,
            is_unfilled: unfilled,
            extra: OpaqueRecord::new(),
        }
    }

    fn winner(prize: &str) -> Winner {
        Winner {
            prize_id: prize.to_string(),
            extra: OpaqueRecord::new(),
        }
    }

    #[test]
    fn test_visible_prize_count() {
        assert_eq!(visible_prize_count(0), 0);
        assert_eq!(visible_prize_count(1), 1);
        assert_eq!(visible_prize_count(5), 1);
        assert_eq!(visible_prize_count(6), 3);
        assert_eq!(visible_prize_count(7), 4);
    }

    #[test]
    fn test_one_prize_per_category() {
        let data = AllocationData {
            coverage: vec![
                entry("p1", Some("u9"), false),
                entry("p2", Some("u11"), false),
                entry("p3", Some("u13"), false),
            ],
            winners: vec![winner("p1"), winner("p2"), winner("p3")],
            ..Default::default()
        };

        let limited = apply_review_preview_limit(&data, false);
        assert_eq!(limited.winners.len(), 3);
        assert_eq!(limited.hidden_winner_count, 0);
        for preview in &limited.category_preview {
            assert_eq!(preview.visible_winners, 1);
            assert_eq!(preview.hidden_winners, preview.total_winners - 1);
        }

        let full = apply_review_preview_limit(&data, true);
        assert_eq!(full.winners, data.winners);
    }

    #[test]
    fn test_large_category_reveals_half() {
        let coverage: Vec<CoverageEntry> = (1..=7)
            .map(|i| entry(&format!("p{}", i), Some("open"), false))
            .chain(std::iter::once(entry("p8", Some("open"), true)))
            .collect();
        let winners: Vec<Winner> = (1..=7).map(|i| winner(&format!("p{}", i))).collect();
        let data = AllocationData {
            coverage,
            winners,
            conflicts: vec![OpaqueRecord::new()],
            unfilled: vec![OpaqueRecord::new(), OpaqueRecord::new()],
            ..Default::default()
        };

        let limited = apply_review_preview_limit(&data, false);
        let ids: Vec<&str> = limited.winners.iter().map(|w| w.prize_id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p2", "p3", "p4"]);
        assert_eq!(limited.hidden_winner_count, 3);
        assert_eq!(
            limited.category_preview,
            vec![CategoryPreview {
                category_key: "open".to_string(),
                total_winners: 7,
                visible_winners: 4,
                hidden_winners: 3,
            }]
        );
        assert_eq!(limited.conflicts.len(), 1);
        assert_eq!(limited.unfilled.len(), 2);
    }

    #[test]
    fn test_unfilled_entries_do_not_gate() {
        // The first entry is unfilled, so the first *filled* prize is revealed
        let data = AllocationData {
            coverage: vec![entry("p1", Some("girls"), true), entry("p2", Some("girls"), false)],
            winners: vec![winner("p2")],
            ..Default::default()
        };
        let limited = apply_review_preview_limit(&data, false);
        assert_eq!(limited.winners.len(), 1);
    }

    #[test]
    fn test_category_key_fallbacks() {
        let mut named = entry("p1", None, false);
        named.category_name = Some("Best Veteran".to_string());
        assert_eq!(named.category_key(), "Best Veteran");
        assert_eq!(entry("p2", None, false).category_key(), UNKNOWN_CATEGORY);
    }

    #[test]
    fn test_orphan_winner_hidden() {
        let data = AllocationData {
            coverage: vec![entry("p1", Some("open"), false)],
            winners: vec![winner("p1"), winner("ghost")],
            ..Default::default()
        };
        let limited = apply_review_preview_limit(&data, false);
        assert_eq!(limited.winners.len(), 1);
        assert_eq!(limited.hidden_winner_count, 1);
    }

    #[test]
    fn test_coverage_deserializes_snake_case() {
        let entry: CoverageEntry = serde_json::from_str(
            r#"{"prize_id":"p1","category_id":"u9","is_unfilled":true,"amount":5000}"#,
        )
        .unwrap();
        assert_eq!(entry.prize_id, "p1");
        assert!(entry.is_unfilled);
        assert_eq!(entry.extra["amount"], 5000);
    }

    #[test]
    fn test_can_download_allocation_exports() {
        let all = can_download_allocation_exports(true, true, 3, 2);
        assert!(all.can_download_coverage && all.can_download_rca);

        let no_rca = can_download_allocation_exports(true, true, 3, 0);
        assert!(no_rca.can_download_coverage);
        assert!(!no_rca.can_download_rca);

        let restricted = can_download_allocation_exports(true, false, 3, 2);
        assert!(!restricted.can_download_coverage && !restricted.can_download_rca);

        let disabled = can_download_allocation_exports(false, true, 3, 2);
        assert!(!disabled.can_download_coverage);
    }
}
