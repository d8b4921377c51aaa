//! Confidence tiers for operator triage

use super::DedupCandidate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lower bound of the high tier (inclusive)
pub const HIGH_CONFIDENCE: f64 = 0.70;
/// Lower bound of the medium tier (inclusive)
pub const MEDIUM_CONFIDENCE: f64 = 0.50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

impl ConfidenceTier {
    /// `[0.70, 1.0]` high, `[0.50, 0.70)` medium, below that low
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_CONFIDENCE {
            ConfidenceTier::High
        } else if score >= MEDIUM_CONFIDENCE {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfidenceTier::High => write!(f, "high"),
            ConfidenceTier::Medium => write!(f, "medium"),
            ConfidenceTier::Low => write!(f, "low"),
        }
    }
}

/// Candidates split by tier; candidates without a match are left out
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfidenceGroups<'a> {
    pub high: Vec<&'a DedupCandidate>,
    pub medium: Vec<&'a DedupCandidate>,
    pub low: Vec<&'a DedupCandidate>,
}

impl ConfidenceGroups<'_> {
    pub fn len(&self) -> usize {
        self.high.len() + self.medium.len() + self.low.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub fn group_by_confidence(candidates: &[DedupCandidate]) -> ConfidenceGroups<'_> {
    let mut groups = ConfidenceGroups::default();
    for candidate in candidates {
        match candidate.tier() {
            Some(ConfidenceTier::High) => groups.high.push(candidate),
            Some(ConfidenceTier::Medium) => groups.medium.push(candidate),
            Some(ConfidenceTier::Low) => groups.low.push(candidate),
            None => {}
        }
    }
    groups
}
