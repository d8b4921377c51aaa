//! Ordered inference strategies
//!
//! Each strategy either returns a confident value or has no opinion; the first
//! confident strategy in the chain wins.

use crate::normalizer::gender::{gender_from_title, normalize_gender};
use crate::normalizer::state::{extract_state_code, StateCode};
use crate::types::{Cell, Gender};

/// One step of an inference chain
pub trait InferenceStrategy<T> {
    /// Name reported alongside the inferred value
    fn name(&self) -> &'static str;

    /// Value for this row, or `None` for no opinion
    fn infer(&self, row: &[Cell]) -> Option<T>;
}

/// Run the chain; returns the value and the name of the strategy that produced it
pub fn first_confident<T>(
    chain: &[Box<dyn InferenceStrategy<T> + Send + Sync>],
    row: &[Cell],
) -> Option<(T, &'static str)> {
    chain
        .iter()
        .find_map(|strategy| strategy.infer(row).map(|value| (value, strategy.name())))
}

fn cell(row: &[Cell], column: usize) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    row.get(column).unwrap_or(&EMPTY)
}

/// Gender from a labelled gender column
pub struct ExplicitGenderColumn(pub usize);

impl InferenceStrategy<Gender> for ExplicitGenderColumn {
    fn name(&self) -> &'static str {
        "explicitColumn"
    }

    fn infer(&self, row: &[Cell]) -> Option<Gender> {
        normalize_gender(cell(row, self.0))
    }
}

/// Gender from the unlabelled column after a repeated name column
pub struct PositionalGenderColumn(pub usize);

impl InferenceStrategy<Gender> for PositionalGenderColumn {
    fn name(&self) -> &'static str {
        "positionalColumn"
    }

    fn infer(&self, row: &[Cell]) -> Option<Gender> {
        normalize_gender(cell(row, self.0))
    }
}

/// Gender implied by a women's title
pub struct TitleGender(pub usize);

impl InferenceStrategy<Gender> for TitleGender {
    fn name(&self) -> &'static str {
        "titlePattern"
    }

    fn infer(&self, row: &[Cell]) -> Option<Gender> {
        cell(row, self.0).as_text().and_then(|t| gender_from_title(&t))
    }
}

/// State from a labelled state column
pub struct ExplicitStateColumn(pub usize);

impl InferenceStrategy<StateCode> for ExplicitStateColumn {
    fn name(&self) -> &'static str {
        "explicitColumn"
    }

    fn infer(&self, row: &[Cell]) -> Option<StateCode> {
        cell(row, self.0).as_text().map(|code| StateCode {
            code: code.to_uppercase(),
            federation_collision: false,
        })
    }
}

/// State parsed out of an identifier column
pub struct IdentifierState {
    pub column: usize,
    pub flagged_federations: Vec<String>,
}

impl InferenceStrategy<StateCode> for IdentifierState {
    fn name(&self) -> &'static str {
        "identifierPattern"
    }

    fn infer(&self, row: &[Cell]) -> Option<StateCode> {
        let identifier = cell(row, self.column).as_text()?;
        extract_state_code(&identifier, &self.flagged_federations)
    }
}
