//! Header row detection
//!
//! Pairing-tool exports put the real header anywhere in the first rows of any
//! sheet, under tournament titles, arbiter names and blank spacer rows. Every
//! row within the scan depth is scored against a fixed vocabulary and the best
//! scoring row across all sheets wins.
//!
//! ## Scoring
//! - +10 per distinct core field (rank, name, start number, rating, birth)
//! - +3 per distinct secondary field (FIDE id, gender, federation, club, state, city)
//! - +5 per exact `rank` / `sno` / `rtg` cell
//! - -20 when a cell is a bare year, -10 when a cell is a number above 100
//! - -15 when fewer than 3 cells are filled
//!
//! Rows scoring 15 or less are not header candidates.

use crate::error::{Error, Result};
use crate::normalizer::{collapse_whitespace, normalize_header_cell};
use crate::types::{Cell, Workbook};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Rows scanned per sheet unless configured otherwise
pub const DEFAULT_MAX_SCAN_ROWS: usize = 25;

/// A row must score above this to be a candidate
pub const MIN_HEADER_SCORE: i32 = 15;

/// Candidates kept for diagnostics
const DIAGNOSTIC_CANDIDATES: usize = 3;

const CORE_WEIGHT: i32 = 10;
const SECONDARY_WEIGHT: i32 = 3;
const EXACT_TOKEN_BONUS: i32 = 5;
const YEAR_PENALTY: i32 = -20;
const LARGE_NUMBER_PENALTY: i32 = -10;
const SPARSE_ROW_PENALTY: i32 = -15;

/// Field name and the substrings that identify it
type Vocabulary = &'static [(&'static str, &'static [&'static str])];

const CORE_FIELDS: Vocabulary = &[
    ("rank", &["rank"]),
    ("name", &["name"]),
    ("startNumber", &["sno", "start no", "startno", "start number", "snr", "sr no", "srno"]),
    ("rating", &["rating", "rtg", "elo"]),
    ("birth", &["birth", "dob", "born", "yob"]),
];

const SECONDARY_FIELDS: Vocabulary = &[
    ("fideId", &["fide id", "fideid", "fide no", "id no", "ident"]),
    ("gender", &["gender", "sex"]),
    ("federation", &["fed", "country"]),
    ("club", &["club", "team"]),
    ("state", &["state"]),
    ("city", &["city", "place", "town"]),
];

const EXACT_TOKENS: &[&str] = &["rank", "sno", "rtg"];

/// A scored row that could be the header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderCandidate {
    pub sheet_name: String,
    pub row_index: usize,
    pub score: i32,
    /// Raw labels (whitespace-collapsed), before deduplication
    pub headers: Vec<String>,
}

/// The chosen header row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedHeader {
    pub sheet_name: String,
    pub row_index: usize,
    /// Deduplicated labels, one per column
    pub headers: Vec<String>,
    pub confidence: i32,
    /// Top candidates, best first
    pub candidates: Vec<HeaderCandidate>,
}

/// Score one row as a header
pub fn score_header_row(row: &[Cell]) -> i32 {
    lazy_static::lazy_static! {
        static ref YEAR_RE: Regex = Regex::new(r"^(19|20)\d{2}$").unwrap();
    }

    let normalized: Vec<String> = row
        .iter()
        .filter_map(|c| c.as_text())
        .map(|t| normalize_header_cell(&t))
        .filter(|t| !t.is_empty())
        .collect();

    let mut score = 0;
    score += CORE_WEIGHT * count_fields(&normalized, CORE_FIELDS);
    score += SECONDARY_WEIGHT * count_fields(&normalized, SECONDARY_FIELDS);

    for token in EXACT_TOKENS {
        if normalized.iter().any(|cell| cell == token) {
            score += EXACT_TOKEN_BONUS;
        }
    }

    if normalized.iter().any(|cell| YEAR_RE.is_match(cell)) {
        score += YEAR_PENALTY;
    }

    if row.iter().any(|c| c.as_number().map(|n| n > 100.0).unwrap_or(false)) {
        score += LARGE_NUMBER_PENALTY;
    }

    let filled = row.iter().filter(|c| !c.is_empty()).count();
    if filled < 3 {
        score += SPARSE_ROW_PENALTY;
    }

    score
}

/// Number of distinct vocabulary fields hit by any cell
fn count_fields(cells: &[String], vocabulary: Vocabulary) -> i32 {
    vocabulary
        .iter()
        .filter(|(_, patterns)| {
            cells
                .iter()
                .any(|cell| patterns.iter().any(|p| cell.contains(p)))
        })
        .count() as i32
}

/// Find the header row across all sheets
///
/// # Arguments
/// * `workbook` - all sheets of the uploaded file
/// * `max_scan_rows` - rows scanned per sheet
///
/// # Errors
/// `Error::NoHeaderFound` when no row scores above the threshold
pub fn detect_header_row(workbook: &Workbook, max_scan_rows: usize) -> Result<DetectedHeader> {
    let mut candidates: Vec<HeaderCandidate> = Vec::new();

    for sheet in &workbook.sheets {
        for (row_index, row) in sheet.rows.iter().take(max_scan_rows).enumerate() {
            if row.len() < 3 {
                continue;
            }

            let score = score_header_row(row);
            if score <= MIN_HEADER_SCORE {
                continue;
            }

            candidates.push(HeaderCandidate {
                sheet_name: sheet.name.clone(),
                row_index,
                score,
                headers: row
                    .iter()
                    .map(|c| c.as_text().map(|t| collapse_whitespace(&t)).unwrap_or_default())
                    .collect(),
            });
        }
    }

    // Stable: equal scores keep scan order (sheet, then row)
    candidates.sort_by(|a, b| b.score.cmp(&a.score));
    candidates.truncate(DIAGNOSTIC_CANDIDATES);

    let best = candidates.first().ok_or(Error::NoHeaderFound)?;
    let headers = dedupe_headers(&best.headers);

    tracing::debug!(
        sheet = %best.sheet_name,
        row = best.row_index,
        score = best.score,
        "header row detected"
    );

    Ok(DetectedHeader {
        sheet_name: best.sheet_name.clone(),
        row_index: best.row_index,
        headers,
        confidence: best.score,
        candidates: candidates.clone(),
    })
}

/// Make header labels unique
///
/// Repeats get ` (2)`, ` (3)`... in order of appearance (case-insensitive);
/// empty labels become `Column <n>`.
pub fn dedupe_headers(raw: &[String]) -> Vec<String> {
    let mut used: HashSet<String> = HashSet::new();
    let mut result = Vec::with_capacity(raw.len());

    for (idx, label) in raw.iter().enumerate() {
        let base = collapse_whitespace(label);
        let base = if base.is_empty() {
            format!("Column {}", idx + 1)
        } else {
            base
        };

        let mut candidate = base.clone();
        let mut n = 1;
        while !used.insert(candidate.to_lowercase()) {
            n += 1;
            candidate = format!("{} ({})", base, n);
        }
        result.push(candidate);
    }

    result
}
