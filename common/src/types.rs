//! Shared data model
//!
//! Raw workbook cells, the typed player record produced by extraction,
//! the stored player shape supplied by persistence, and warning annotations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// One raw spreadsheet cell
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl Cell {
    /// Empty cell or whitespace-only text
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(n) => n.is_nan(),
        }
    }

    /// Trimmed text form; `None` for empty cells
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Cell::Number(n) if n.is_nan() => None,
            Cell::Number(n) => Some(format_number(*n)),
        }
    }

    /// Numeric value of a number cell, or of text that is a plain number
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if !n.is_nan() => Some(*n),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| !n.is_nan()),
            _ => None,
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::from(value.as_str())
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

/// Build a row of text cells; empty strings become `Cell::Empty`
pub fn text_row(values: &[&str]) -> Vec<Cell> {
    values.iter().map(|v| Cell::from(*v)).collect()
}

/// A named sheet of raw rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

/// All sheets of one uploaded roster file, in file order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    #[serde(default)]
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sheet (builder style)
    pub fn with_sheet(mut self, name: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        self.sheets.push(Sheet {
            name: name.into(),
            rows,
        });
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.iter().all(|s| s.rows.is_empty())
    }
}

/// Player gender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
    Other,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::M => write!(f, "M"),
            Gender::F => write!(f, "F"),
            Gender::Other => write!(f, "Other"),
        }
    }
}

/// Target fields a roster column can be mapped to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlayerField {
    Rank,
    StartNumber,
    Name,
    Rating,
    Dob,
    BirthYear,
    Gender,
    State,
    Club,
    City,
    FideId,
    Federation,
    Title,
    Identifier,
    Unrated,
}

impl PlayerField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerField::Rank => "rank",
            PlayerField::StartNumber => "startNumber",
            PlayerField::Name => "name",
            PlayerField::Rating => "rating",
            PlayerField::Dob => "dob",
            PlayerField::BirthYear => "birthYear",
            PlayerField::Gender => "gender",
            PlayerField::State => "state",
            PlayerField::Club => "club",
            PlayerField::City => "city",
            PlayerField::FideId => "fideId",
            PlayerField::Federation => "federation",
            PlayerField::Title => "title",
            PlayerField::Identifier => "identifier",
            PlayerField::Unrated => "unrated",
        }
    }
}

impl fmt::Display for PlayerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        match key.as_str() {
            "rank" => Ok(PlayerField::Rank),
            "startnumber" | "sno" => Ok(PlayerField::StartNumber),
            "name" => Ok(PlayerField::Name),
            "rating" | "rtg" => Ok(PlayerField::Rating),
            "dob" | "birth" | "birthdate" => Ok(PlayerField::Dob),
            "birthyear" | "yob" => Ok(PlayerField::BirthYear),
            "gender" | "sex" => Ok(PlayerField::Gender),
            "state" => Ok(PlayerField::State),
            "club" => Ok(PlayerField::Club),
            "city" => Ok(PlayerField::City),
            "fideid" => Ok(PlayerField::FideId),
            "federation" | "fed" => Ok(PlayerField::Federation),
            "title" => Ok(PlayerField::Title),
            "identifier" | "ident" => Ok(PlayerField::Identifier),
            "unrated" => Ok(PlayerField::Unrated),
            _ => Err(Error::UnknownField(s.to_string())),
        }
    }
}

/// Canonical typed record extracted from one roster row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPlayerRow {
    pub rank: Option<u32>,
    pub start_number: Option<u32>,
    pub name: String,
    pub rating: Option<u32>,
    pub dob: Option<NaiveDate>,
    pub birth_year: Option<i32>,
    pub gender: Option<Gender>,
    pub state: Option<String>,
    pub club: Option<String>,
    pub city: Option<String>,
    pub fide_id: Option<String>,
    pub federation: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub unrated: bool,
    /// Zero-based row index inside the header sheet
    #[serde(rename = "_originalIndex")]
    pub original_index: usize,
}

impl ParsedPlayerRow {
    /// Birth year from the full date if present, else the year-only value
    pub fn year_of_birth(&self) -> Option<i32> {
        use chrono::Datelike;
        self.dob.map(|d| d.year()).or(self.birth_year)
    }

    pub fn age_on(&self, reference: NaiveDate) -> Option<u32> {
        crate::normalizer::age_on(self.dob, self.birth_year, reference)
    }
}

/// A player already stored for the tournament
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingPlayer {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub rating: Option<u32>,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub birth_year: Option<i32>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub club: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub fide_id: Option<String>,
    #[serde(default)]
    pub federation: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ExistingPlayer {
    pub fn year_of_birth(&self) -> Option<i32> {
        use chrono::Datelike;
        self.dob.map(|d| d.year()).or(self.birth_year)
    }

    pub fn age_on(&self, reference: NaiveDate) -> Option<u32> {
        crate::normalizer::age_on(self.dob, self.birth_year, reference)
    }
}

/// Kind of non-fatal import annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WarningKind {
    /// Two-letter code is also a flagged federation code
    FederationCollision,
    /// Non-empty cell that could not be parsed; value dropped
    MalformedValue,
    /// Column picked by a fallback strategy rather than by its label
    InferredColumn,
}

/// Non-fatal annotation surfaced for operator review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportWarning {
    /// Source row, or `None` for sheet-level annotations
    pub original_index: Option<usize>,
    pub field: PlayerField,
    pub kind: WarningKind,
    pub message: String,
}
