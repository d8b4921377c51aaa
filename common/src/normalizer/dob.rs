//! Birth date, birth year and age

use crate::types::Cell;
use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;

/// Parsed birth information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BirthValue {
    /// Full calendar date
    Date(NaiveDate),
    /// Year only (`2010`, `2010/00/00`)
    Year(i32),
}

impl BirthValue {
    pub fn year(&self) -> i32 {
        match self {
            BirthValue::Date(d) => d.year(),
            BirthValue::Year(y) => *y,
        }
    }
}

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d.%m.%Y", "%d-%m-%Y"];

/// Parse a birth cell
///
/// Numbers within 1900..=2100 are years; larger numbers are spreadsheet
/// serial dates (epoch 1899-12-30). Malformed values are absent.
pub fn parse_birth(cell: &Cell) -> Option<BirthValue> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) => parse_birth_number(*n),
        Cell::Text(s) => parse_birth_text(s.trim()),
    }
}

fn parse_birth_number(n: f64) -> Option<BirthValue> {
    if !n.is_finite() || n <= 0.0 {
        return None;
    }
    let whole = n.trunc() as i64;
    if (MIN_YEAR as i64..=MAX_YEAR as i64).contains(&whole) {
        return Some(BirthValue::Year(whole as i32));
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(Duration::try_days(whole)?)?;
    in_range(date.year()).then_some(BirthValue::Date(date))
}

fn parse_birth_text(text: &str) -> Option<BirthValue> {
    if text.is_empty() {
        return None;
    }

    lazy_static::lazy_static! {
        // 2010 / 2010/00/00 / 2010-00-00
        static ref YEAR_ONLY_RE: Regex = Regex::new(r"^(\d{4})(?:[/.\-]00[/.\-]00)?$").unwrap();
    }

    if let Some(caps) = YEAR_ONLY_RE.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        return in_range(year).then_some(BirthValue::Year(year));
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .filter(|d| in_range(d.year()))
        .map(BirthValue::Date)
}

fn in_range(year: i32) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
}

/// Age in whole years on `reference`
///
/// Exact for a full date; plain year difference for a year-only value.
pub fn age_on(dob: Option<NaiveDate>, birth_year: Option<i32>, reference: NaiveDate) -> Option<u32> {
    if let Some(dob) = dob {
        let mut age = reference.year() - dob.year();
        if (reference.month(), reference.day()) < (dob.month(), dob.day()) {
            age -= 1;
        }
        return u32::try_from(age).ok();
    }
    birth_year.and_then(|y| u32::try_from(reference.year() - y).ok())
}
