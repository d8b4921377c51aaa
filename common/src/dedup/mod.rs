//! Duplicate detection against stored players
//!
//! Every parsed row is scored against the tournament's existing players and
//! paired with its best match, if any is plausible.
//!
//! ## Scoring
//! - equal FIDE ids: 1.0; different FIDE ids: never the same person
//! - otherwise the name must be similar enough, then a weighted mean of
//!   name (0.6), birth date (0.25) and rating (0.15) over the signals both
//!   sides have

pub mod confidence;
pub mod merge;

pub use confidence::{group_by_confidence, ConfidenceGroups, ConfidenceTier};
pub use merge::{compute_merge, FieldChange, MergeDiff};

use crate::error::Error;
use crate::normalizer::name_key;
use crate::types::{ExistingPlayer, ParsedPlayerRow};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

const NAME_WEIGHT: f64 = 0.6;
const BIRTH_WEIGHT: f64 = 0.25;
const RATING_WEIGHT: f64 = 0.15;

/// Same birth year but no exact date agreement
const SAME_YEAR_SCORE: f64 = 0.7;

/// Rating gap treated as identical / as unrelated
const RATING_CLOSE: f64 = 100.0;
const RATING_FAR: f64 = 400.0;

/// What to do with one imported row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupAction {
    Create,
    Update,
    Skip,
}

impl fmt::Display for DedupAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DedupAction::Create => write!(f, "create"),
            DedupAction::Update => write!(f, "update"),
            DedupAction::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for DedupAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(DedupAction::Create),
            "update" => Ok(DedupAction::Update),
            "skip" => Ok(DedupAction::Skip),
            _ => Err(Error::InvalidAction(s.to_string())),
        }
    }
}

/// Best stored-player match for one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BestMatch {
    pub existing_id: String,
    pub existing: ExistingPlayer,
    /// Match score in `[0, 1]`
    pub score: f64,
    pub merge: MergeDiff,
}

/// A parsed row paired with its best-guess existing player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupCandidate {
    /// Index into the parsed rows
    pub row: usize,
    pub best_match: Option<BestMatch>,
    pub default_action: DedupAction,
}

impl DedupCandidate {
    pub fn tier(&self) -> Option<ConfidenceTier> {
        self.best_match
            .as_ref()
            .map(|m| ConfidenceTier::from_score(m.score))
    }
}

/// Matcher options
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchOptions {
    /// Name similarity (Jaro-Winkler) a pair needs before it is scored at all
    pub min_name_similarity: f64,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            min_name_similarity: 0.80,
        }
    }
}

/// Score one incoming row against one stored player
///
/// `None` when the pair is not a plausible match.
pub fn score_match(incoming: &ParsedPlayerRow, existing: &ExistingPlayer, options: &MatchOptions) -> Option<f64> {
    match (clean_id(&incoming.fide_id), clean_id(&existing.fide_id)) {
        (Some(a), Some(b)) if a == b => return Some(1.0),
        (Some(_), Some(_)) => return None,
        _ => {}
    }

    let incoming_key = name_key(&incoming.name);
    let existing_key = name_key(&existing.name);
    if incoming_key.is_empty() || existing_key.is_empty() {
        return None;
    }

    let name_similarity = strsim::jaro_winkler(&incoming_key, &existing_key);
    if name_similarity < options.min_name_similarity {
        return None;
    }

    let mut weighted = NAME_WEIGHT * name_similarity;
    let mut total = NAME_WEIGHT;

    if let Some(birth) = birth_similarity(incoming, existing) {
        weighted += BIRTH_WEIGHT * birth;
        total += BIRTH_WEIGHT;
    }

    if let (Some(a), Some(b)) = (incoming.rating, existing.rating) {
        weighted += RATING_WEIGHT * rating_similarity(a, b);
        total += RATING_WEIGHT;
    }

    Some((weighted / total).clamp(0.0, 1.0))
}

fn clean_id(id: &Option<String>) -> Option<&str> {
    id.as_deref().map(str::trim).filter(|id| !id.is_empty() && *id != "0")
}

fn birth_similarity(incoming: &ParsedPlayerRow, existing: &ExistingPlayer) -> Option<f64> {
    if let (Some(a), Some(b)) = (incoming.dob, existing.dob) {
        return Some(if a == b {
            1.0
        } else if incoming.year_of_birth() == existing.year_of_birth() {
            SAME_YEAR_SCORE
        } else {
            0.0
        });
    }
    let (a, b) = (incoming.year_of_birth()?, existing.year_of_birth()?);
    Some(if a == b { SAME_YEAR_SCORE } else { 0.0 })
}

fn rating_similarity(a: u32, b: u32) -> f64 {
    let gap = (a as f64 - b as f64).abs();
    if gap <= RATING_CLOSE {
        1.0
    } else if gap >= RATING_FAR {
        0.0
    } else {
        (RATING_FAR - gap) / (RATING_FAR - RATING_CLOSE)
    }
}

/// Pair every parsed row with its best existing-player match
///
/// Ties keep the first stored player. Output is in row order.
pub fn find_candidates(
    rows: &[ParsedPlayerRow],
    existing: &[ExistingPlayer],
    options: &MatchOptions,
) -> Vec<DedupCandidate> {
    #[cfg(feature = "parallel")]
    let candidates: Vec<DedupCandidate> = rows
        .par_iter()
        .enumerate()
        .map(|(idx, row)| candidate_for(idx, row, existing, options))
        .collect();

    #[cfg(not(feature = "parallel"))]
    let candidates: Vec<DedupCandidate> = rows
        .iter()
        .enumerate()
        .map(|(idx, row)| candidate_for(idx, row, existing, options))
        .collect();

    tracing::debug!(
        rows = rows.len(),
        existing = existing.len(),
        matched = candidates.iter().filter(|c| c.best_match.is_some()).count(),
        "dedup candidates computed"
    );

    candidates
}

fn candidate_for(
    idx: usize,
    row: &ParsedPlayerRow,
    existing: &[ExistingPlayer],
    options: &MatchOptions,
) -> DedupCandidate {
    let mut best: Option<(f64, &ExistingPlayer)> = None;
    for player in existing {
        if let Some(score) = score_match(row, player, options) {
            if best.map(|(s, _)| score > s).unwrap_or(true) {
                best = Some((score, player));
            }
        }
    }

    let best_match = best.map(|(score, player)| BestMatch {
        existing_id: player.id.clone(),
        existing: player.clone(),
        score,
        merge: compute_merge(row, player),
    });

    let default_action = match &best_match {
        Some(m) if ConfidenceTier::from_score(m.score) == ConfidenceTier::High => {
            if m.merge.is_empty() {
                DedupAction::Skip
            } else {
                DedupAction::Update
            }
        }
        _ => DedupAction::Create,
    };

    DedupCandidate {
        row: idx,
        best_match,
        default_action,
    }
}
