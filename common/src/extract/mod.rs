//! Row extraction
//!
//! Turns the rows under a detected header into typed player records.
//!
//! ## Flow
//! 1. Map header labels to player fields (operator remaps first)
//! 2. Build the gender and state inference chains
//! 3. Normalize every data row; blank and anonymous rows are skipped

pub mod mapping;
pub mod strategy;

pub use mapping::{classify_header, map_columns, positional_gender_column, ColumnMapping};
pub use strategy::{first_confident, InferenceStrategy};

use crate::error::Result;
use crate::header::{detect_header_row, DetectedHeader, DEFAULT_MAX_SCAN_ROWS};
use crate::normalizer::{
    infer_unrated, normalize_name, normalize_rating, normalize_text, parse_birth,
    parse_positive_int, parse_unrated_flag, BirthValue, StateCode, UnratedOptions,
    DEFAULT_FLAGGED_FEDERATIONS,
};
use crate::types::{Cell, Gender, ImportWarning, ParsedPlayerRow, PlayerField, WarningKind, Workbook};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strategy::{
    ExplicitGenderColumn, ExplicitStateColumn, IdentifierState, PositionalGenderColumn, TitleGender,
};

type Chain<T> = Vec<Box<dyn InferenceStrategy<T> + Send + Sync>>;

/// Rating cell values that mean "no rating" rather than a typo
const UNRATED_MARKERS: &[&str] = &["-", "nr", "unr", "unrated", "n/a", "na"];

/// Import options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    /// Rows scanned per sheet for the header
    pub max_scan_rows: usize,
    pub unrated: UnratedOptions,
    /// Two-letter codes flagged as federation/state ambiguous
    pub flagged_federations: Vec<String>,
    /// Header label to field, applied before automatic mapping
    #[serde(default)]
    pub remaps: HashMap<String, PlayerField>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            max_scan_rows: DEFAULT_MAX_SCAN_ROWS,
            unrated: UnratedOptions::default(),
            flagged_federations: DEFAULT_FLAGGED_FEDERATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            remaps: HashMap::new(),
        }
    }
}

/// Everything produced by one import attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResult {
    pub header: DetectedHeader,
    pub mapping: ColumnMapping,
    pub rows: Vec<ParsedPlayerRow>,
    pub warnings: Vec<ImportWarning>,
    /// Non-blank rows dropped because they carry no name, rank or start number
    pub skipped_rows: usize,
}

/// Detect the header and extract all player rows
///
/// # Errors
/// `Error::NoHeaderFound` when the workbook has no recognizable header row;
/// the import stops before any row is extracted.
pub fn import_workbook(workbook: &Workbook, options: &ImportOptions) -> Result<ImportResult> {
    let header = detect_header_row(workbook, options.max_scan_rows)?;
    Ok(extract_rows(workbook, header, options))
}

/// Extract player rows below an already detected header
pub fn extract_rows(workbook: &Workbook, header: DetectedHeader, options: &ImportOptions) -> ImportResult {
    let mapping = map_columns(&header.headers, &options.remaps);
    let mut warnings = Vec::new();

    let mut gender_chain: Chain<Gender> = Vec::new();
    if let Some(col) = mapping.column(PlayerField::Gender) {
        gender_chain.push(Box::new(ExplicitGenderColumn(col)));
    } else if let Some(col) = positional_gender_column(&header.headers, &mapping) {
        warnings.push(ImportWarning {
            original_index: None,
            field: PlayerField::Gender,
            kind: WarningKind::InferredColumn,
            message: format!(
                "Gender read from unlabelled column \"{}\" next to the second name column; remap it if this is wrong",
                header.headers[col]
            ),
        });
        gender_chain.push(Box::new(PositionalGenderColumn(col)));
    }
    if let Some(col) = mapping.column(PlayerField::Title) {
        gender_chain.push(Box::new(TitleGender(col)));
    }

    let mut state_chain: Chain<StateCode> = Vec::new();
    if let Some(col) = mapping.column(PlayerField::State) {
        state_chain.push(Box::new(ExplicitStateColumn(col)));
    }
    if let Some(col) = mapping.column(PlayerField::Identifier) {
        state_chain.push(Box::new(IdentifierState {
            column: col,
            flagged_federations: options.flagged_federations.clone(),
        }));
    }

    let source_rows: &[Vec<Cell>] = workbook
        .sheet(&header.sheet_name)
        .map(|s| s.rows.as_slice())
        .unwrap_or(&[]);

    let mut rows = Vec::new();
    let mut skipped_rows = 0;

    for (original_index, row) in source_rows.iter().enumerate().skip(header.row_index + 1) {
        if row.iter().all(Cell::is_empty) {
            continue;
        }

        let field = |f: PlayerField| cell_at(row, mapping.column(f));

        let name = normalize_text(field(PlayerField::Name))
            .map(|n| normalize_name(&n))
            .unwrap_or_default();
        let rank = parse_positive_int(field(PlayerField::Rank));
        let start_number = parse_positive_int(field(PlayerField::StartNumber));

        if name.is_empty() && rank.is_none() && start_number.is_none() {
            skipped_rows += 1;
            continue;
        }

        let rating_cell = field(PlayerField::Rating);
        let rating = normalize_rating(rating_cell);
        if rating.is_none() && is_malformed_rating(rating_cell) {
            warnings.push(malformed(original_index, PlayerField::Rating, rating_cell));
        }

        // A column remapped to birthYear stands in when no date column exists
        let birth_field = if mapping.column(PlayerField::Dob).is_some() {
            PlayerField::Dob
        } else {
            PlayerField::BirthYear
        };
        let dob_cell = field(birth_field);
        let birth = parse_birth(dob_cell);
        if birth.is_none() && !dob_cell.is_empty() {
            warnings.push(malformed(original_index, birth_field, dob_cell));
        }
        let (dob, birth_year) = match birth {
            Some(BirthValue::Date(d)) => (Some(d), None),
            Some(BirthValue::Year(y)) => (None, Some(y)),
            None => (None, None),
        };

        // Pairing tools write 0 for "no FIDE id"
        let fide_id = normalize_text(field(PlayerField::FideId)).filter(|id| id != "0");

        let state = first_confident(&state_chain, row).map(|(state, source)| {
            if state.federation_collision {
                warnings.push(ImportWarning {
                    original_index: Some(original_index),
                    field: PlayerField::State,
                    kind: WarningKind::FederationCollision,
                    message: format!(
                        "State code {} from {} is also a federation code; confirm it is a state",
                        state.code, source
                    ),
                });
            }
            state.code
        });

        let explicit_unrated = mapping
            .column(PlayerField::Unrated)
            .and_then(|c| row.get(c))
            .and_then(parse_unrated_flag);
        let unrated = infer_unrated(explicit_unrated, rating, fide_id.as_deref(), &options.unrated);

        rows.push(ParsedPlayerRow {
            rank,
            start_number,
            name,
            rating,
            dob,
            birth_year,
            gender: first_confident(&gender_chain, row).map(|(g, _)| g),
            state,
            club: normalize_text(field(PlayerField::Club)),
            city: normalize_text(field(PlayerField::City)),
            fide_id,
            federation: normalize_text(field(PlayerField::Federation)).map(|f| f.to_uppercase()),
            title: normalize_text(field(PlayerField::Title)),
            unrated,
            original_index,
        });
    }

    tracing::debug!(
        sheet = %header.sheet_name,
        rows = rows.len(),
        skipped = skipped_rows,
        warnings = warnings.len(),
        "roster rows extracted"
    );

    ImportResult {
        header,
        mapping,
        rows,
        warnings,
        skipped_rows,
    }
}

fn cell_at(row: &[Cell], column: Option<usize>) -> &Cell {
    static EMPTY: Cell = Cell::Empty;
    column.and_then(|c| row.get(c)).unwrap_or(&EMPTY)
}

fn is_malformed_rating(cell: &Cell) -> bool {
    match cell {
        Cell::Text(s) => {
            let text = s.trim().to_lowercase();
            if text.is_empty() || UNRATED_MARKERS.contains(&text.as_str()) {
                return false;
            }
            let cleaned: String = text.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            cleaned.parse::<f64>().is_err()
        }
        _ => false,
    }
}

fn malformed(original_index: usize, field: PlayerField, cell: &Cell) -> ImportWarning {
    ImportWarning {
        original_index: Some(original_index),
        field,
        kind: WarningKind::MalformedValue,
        message: format!(
            "{} value \"{}\" could not be read and was left empty",
            field,
            cell.as_text().unwrap_or_default()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::types::text_row;
    use chrono::NaiveDate;

    fn swiss_manager_workbook() -> Workbook {
        Workbook::new()
            .with_sheet("Info", vec![text_row(&["Tournament", "Open 2024"])])
            .with_sheet(
                "Players",
                vec![
                    text_row(&["Open Rating Chess Tournament 2024"]),
                    text_row(&["", "", ""]),
                    text_row(&["Rank", "SNo", "Name", "Name", "", "Rtg", "Ident", "Birth", "FIDE-ID"]),
                    vec![
                        Cell::Number(1.0),
                        Cell::Number(3.0),
                        Cell::from("Sharma,  Ananya"),
                        Cell::from("Ananya S"),
                        Cell::from("F"),
                        Cell::from("1,523"),
                        Cell::from("IND/KA/1234"),
                        Cell::from("2010/00/00"),
                        Cell::from("0"),
                    ],
                    vec![
                        Cell::Number(2.0),
                        Cell::Number(1.0),
                        Cell::from("Patel, Rohan"),
                        Cell::from("Rohan P"),
                        Cell::from("M"),
                        Cell::Number(0.0),
                        Cell::from("US998877"),
                        Cell::from("2009-05-17"),
                        Cell::from("25098765"),
                    ],
                    text_row(&["", "", "", "", "", "", "", "", ""]),
                    text_row(&["", "", "", "", "", "", "Created with pairing software", "", ""]),
                ],
            )
    }

    #[test]
    fn test_import_swiss_manager_layout() {
        let result = import_workbook(&swiss_manager_workbook(), &ImportOptions::default()).unwrap();

        assert_eq!(result.header.sheet_name, "Players");
        assert_eq!(result.header.row_index, 2);
        assert_eq!(result.header.headers[3], "Name (2)");
        assert_eq!(result.header.headers[4], "Column 5");
        assert_eq!(result.rows.len(), 2);
        assert_eq!(result.skipped_rows, 1);

        let first = &result.rows[0];
        assert_eq!(first.original_index, 3);
        assert_eq!(first.rank, Some(1));
        assert_eq!(first.start_number, Some(3));
        assert_eq!(first.name, "Sharma, Ananya");
        assert_eq!(first.rating, Some(1523));
        assert_eq!(first.gender, Some(Gender::F));
        assert_eq!(first.state.as_deref(), Some("KA"));
        assert_eq!(first.birth_year, Some(2010));
        assert_eq!(first.fide_id, None);
        assert!(!first.unrated);

        let second = &result.rows[1];
        assert_eq!(second.rating, None);
        assert_eq!(second.gender, Some(Gender::M));
        assert_eq!(second.state.as_deref(), Some("US"));
        assert_eq!(second.dob, NaiveDate::from_ymd_opt(2009, 5, 17));
        assert_eq!(second.fide_id.as_deref(), Some("25098765"));
        // Has a FIDE id, so an empty rating is not treated as unrated
        assert!(!second.unrated);
    }

    #[test]
    fn test_import_warnings() {
        let result = import_workbook(&swiss_manager_workbook(), &ImportOptions::default()).unwrap();

        assert!(result
            .warnings
            .iter()
            .any(|w| w.kind == WarningKind::InferredColumn && w.original_index.is_none()));

        let collisions: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::FederationCollision)
            .collect();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].original_index, Some(4));
    }

    #[test]
    fn test_remap_overrides_positional_gender() {
        let mut options = ImportOptions::default();
        options.remaps.insert("Column 5".to_string(), PlayerField::Club);

        let result = import_workbook(&swiss_manager_workbook(), &options).unwrap();
        assert_eq!(result.rows[0].gender, None);
        assert_eq!(result.rows[0].club.as_deref(), Some("F"));
        assert!(result
            .warnings
            .iter()
            .all(|w| w.kind != WarningKind::InferredColumn));
    }

    #[test]
    fn test_malformed_values_become_absent() {
        let workbook = Workbook::new().with_sheet(
            "S",
            vec![
                text_row(&["Rank", "Name", "Rating", "DOB"]),
                text_row(&["1", "Kiran", "abc", "someday"]),
                text_row(&["2", "Meera", "-", ""]),
            ],
        );

        let result = import_workbook(&workbook, &ImportOptions::default()).unwrap();
        assert_eq!(result.rows[0].rating, None);
        assert_eq!(result.rows[0].dob, None);
        assert!(result.rows[0].unrated);

        let malformed: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::MalformedValue)
            .collect();
        assert_eq!(malformed.len(), 2);
        assert!(malformed.iter().all(|w| w.original_index == Some(1)));
    }

    #[test]
    fn test_huge_birth_number_is_malformed_not_fatal() {
        let workbook = Workbook::new().with_sheet(
            "S",
            vec![
                text_row(&["Rank", "Name", "Rating", "DOB"]),
                vec![
                    Cell::Number(1.0),
                    Cell::from("Kiran"),
                    Cell::Number(1500.0),
                    Cell::Number(1e15),
                ],
            ],
        );

        let result = import_workbook(&workbook, &ImportOptions::default()).unwrap();
        assert_eq!(result.rows.len(), 1);
        assert_eq!(result.rows[0].dob, None);
        assert_eq!(result.rows[0].birth_year, None);
        assert_eq!(result.rows[0].rating, Some(1500));

        let malformed: Vec<_> = result
            .warnings
            .iter()
            .filter(|w| w.kind == WarningKind::MalformedValue)
            .collect();
        assert_eq!(malformed.len(), 1);
        assert_eq!(malformed[0].field, PlayerField::Dob);
        assert_eq!(malformed[0].original_index, Some(1));
    }

    #[test]
    fn test_birth_year_remap_fills_year() {
        let workbook = Workbook::new().with_sheet(
            "S",
            vec![
                text_row(&["Rank", "Name", "Rating", "Year"]),
                text_row(&["1", "Kiran", "1500", "2011"]),
                text_row(&["2", "Meera", "1450", "soon"]),
            ],
        );
        let mut options = ImportOptions::default();
        options.remaps.insert("Year".to_string(), PlayerField::BirthYear);

        let result = import_workbook(&workbook, &options).unwrap();
        assert_eq!(result.rows[0].birth_year, Some(2011));
        assert_eq!(result.rows[0].dob, None);
        assert_eq!(result.rows[1].birth_year, None);

        let warning = result
            .warnings
            .iter()
            .find(|w| w.kind == WarningKind::MalformedValue)
            .unwrap();
        assert_eq!(warning.field, PlayerField::BirthYear);
        assert_eq!(warning.original_index, Some(2));
    }

    #[test]
    fn test_title_pattern_fills_gender() {
        let workbook = Workbook::new().with_sheet(
            "S",
            vec![
                text_row(&["SNo", "Title", "Name", "Rtg"]),
                text_row(&["1", "WIM", "Player A", "2200"]),
                text_row(&["2", "GM", "Player B", "2500"]),
            ],
        );

        let result = import_workbook(&workbook, &ImportOptions::default()).unwrap();
        assert_eq!(result.rows[0].gender, Some(Gender::F));
        assert_eq!(result.rows[1].gender, None);
    }

    #[test]
    fn test_no_header_stops_import() {
        let workbook = Workbook::new().with_sheet("S", vec![text_row(&["a", "b", "c"])]);
        assert!(matches!(
            import_workbook(&workbook, &ImportOptions::default()),
            Err(Error::NoHeaderFound)
        ));
    }

    #[test]
    fn test_original_index_unique() {
        let result = import_workbook(&swiss_manager_workbook(), &ImportOptions::default()).unwrap();
        let mut indices: Vec<usize> = result.rows.iter().map(|r| r.original_index).collect();
        indices.dedup();
        assert_eq!(indices.len(), result.rows.len());
    }
}
