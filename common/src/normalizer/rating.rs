//! Rating and unrated-flag normalization

use crate::types::Cell;
use serde::{Deserialize, Serialize};

/// Rating from a raw cell
///
/// Accepts thousands separators and surrounding whitespace (`" 1,523 "`).
/// Zero, negative and unparsable values are absent: zero is not a rating.
pub fn normalize_rating(cell: &Cell) -> Option<u32> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => {
            let cleaned: String = s
                .trim()
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            cleaned.parse::<f64>().ok()?
        }
        Cell::Empty => return None,
    };

    if !value.is_finite() || value <= 0.0 || value > u32::MAX as f64 {
        return None;
    }
    Some(value.round() as u32)
}

/// Recognized options for unrated inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnratedOptions {
    /// Missing rating and no FIDE id means unrated
    pub treat_empty_as_unrated: bool,
    /// Missing rating alone means unrated
    pub infer_from_missing_rating: bool,
}

impl Default for UnratedOptions {
    fn default() -> Self {
        Self {
            treat_empty_as_unrated: true,
            infer_from_missing_rating: false,
        }
    }
}

/// Decide the unrated flag
///
/// An explicit flag from the roster always wins over inference.
pub fn infer_unrated(
    explicit: Option<bool>,
    rating: Option<u32>,
    fide_id: Option<&str>,
    options: &UnratedOptions,
) -> bool {
    if let Some(flag) = explicit {
        return flag;
    }
    if rating.is_some() {
        return false;
    }
    if options.infer_from_missing_rating {
        return true;
    }
    let has_fide_id = fide_id.map(|id| !id.trim().is_empty()).unwrap_or(false);
    options.treat_empty_as_unrated && !has_fide_id
}

/// Explicit unrated marker from a roster cell
pub fn parse_unrated_flag(cell: &Cell) -> Option<bool> {
    let text = cell.as_text()?.to_lowercase();
    match text.as_str() {
        "yes" | "y" | "true" | "1" | "u" | "unrated" | "ur" => Some(true),
        "no" | "n" | "false" | "0" | "rated" => Some(false),
        _ => None,
    }
}
