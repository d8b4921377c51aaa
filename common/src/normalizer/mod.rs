//! Field normalizers
//!
//! Pure conversions from raw cells into canonical typed values.
//!
//! ## Modules
//! - `rating`: ratings and the unrated flag
//! - `gender`: gender values and the column strategy chain
//! - `state`: state / federation codes from identifiers
//! - `dob`: birth dates, birth years and age

pub mod dob;
pub mod gender;
pub mod rating;
pub mod state;

pub use dob::{age_on, parse_birth, BirthValue};
pub use gender::normalize_gender;
pub use rating::{infer_unrated, normalize_rating, parse_unrated_flag, UnratedOptions};
pub use state::{extract_state_code, StateCode, DEFAULT_FLAGGED_FEDERATIONS};

use crate::types::Cell;
use regex::Regex;

/// Trim and collapse runs of whitespace into one space
pub fn collapse_whitespace(text: &str) -> String {
    lazy_static::lazy_static! {
        static ref WS_RE: Regex = Regex::new(r"\s+").unwrap();
    }
    WS_RE.replace_all(text.trim(), " ").to_string()
}

/// Normalized form of a header cell used for vocabulary matching
///
/// - trim, collapse whitespace into one space
/// - drop everything that is not alphanumeric or space
/// - lowercase
pub fn normalize_header_cell(text: &str) -> String {
    let collapsed = collapse_whitespace(text);
    let stripped: String = collapsed
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ')
        .collect();
    collapse_whitespace(&stripped).to_lowercase()
}

/// Display form of a player name
pub fn normalize_name(text: &str) -> String {
    collapse_whitespace(text)
}

/// Order-insensitive comparison key for names
///
/// `"Carlsen, Magnus"` and `"magnus carlsen"` share the key `"carlsen magnus"`.
pub fn name_key(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Optional free-text field (club, city, title...)
pub fn normalize_text(cell: &Cell) -> Option<String> {
    cell.as_text().map(|s| collapse_whitespace(&s))
}

/// Rank or start number: positive integer, trailing dot tolerated (`"12."`)
pub fn parse_positive_int(cell: &Cell) -> Option<u32> {
    let value = match cell {
        Cell::Number(n) => *n,
        Cell::Text(s) => s.trim().trim_end_matches('.').trim().parse::<f64>().ok()?,
        Cell::Empty => return None,
    };

    if value.is_finite() && value > 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
        Some(value as u32)
    } else {
        None
    }
}
