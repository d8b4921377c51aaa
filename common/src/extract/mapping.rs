//! Header label to player field mapping

use crate::normalizer::{collapse_whitespace, normalize_header_cell};
use crate::types::PlayerField;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Which column feeds which field
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    /// Field to zero-based column index
    pub columns: BTreeMap<PlayerField, usize>,
    /// Fields assigned by an explicit operator remap
    pub remapped: Vec<PlayerField>,
}

impl ColumnMapping {
    pub fn column(&self, field: PlayerField) -> Option<usize> {
        self.columns.get(&field).copied()
    }

    pub fn field_of(&self, column: usize) -> Option<PlayerField> {
        self.columns
            .iter()
            .find(|(_, &c)| c == column)
            .map(|(f, _)| *f)
    }
}

/// Classify a header label; order matters (club before name, unrated before rating)
pub fn classify_header(label: &str) -> Option<PlayerField> {
    let key = normalize_header_cell(label);
    if key.is_empty() {
        return None;
    }
    let compact: String = key.chars().filter(|c| *c != ' ').collect();
    let has = |patterns: &[&str]| patterns.iter().any(|p| key.contains(p) || compact.contains(p));
    let exact = |tokens: &[&str]| tokens.iter().any(|t| key == *t || compact == *t);

    if has(&["unrated"]) {
        Some(PlayerField::Unrated)
    } else if has(&["fideid", "fideno", "fidecode"]) {
        Some(PlayerField::FideId)
    } else if has(&["ident", "aicf", "nationalid", "playerid"]) {
        Some(PlayerField::Identifier)
    } else if has(&["rank"]) || exact(&["rk", "pos", "position"]) {
        Some(PlayerField::Rank)
    } else if has(&["startno", "startnumber", "srno"]) || exact(&["sno", "no", "snr", "nr", "sn"]) {
        Some(PlayerField::StartNumber)
    } else if has(&["club", "team", "school", "academy"]) {
        Some(PlayerField::Club)
    } else if has(&["name"]) {
        Some(PlayerField::Name)
    } else if has(&["rating", "rtg", "elo"]) {
        Some(PlayerField::Rating)
    } else if has(&["birth", "dob", "born", "yob"]) {
        Some(PlayerField::Dob)
    } else if has(&["gender"]) || exact(&["sex", "mf"]) {
        Some(PlayerField::Gender)
    } else if has(&["state"]) {
        Some(PlayerField::State)
    } else if has(&["city", "town"]) || exact(&["place"]) {
        Some(PlayerField::City)
    } else if has(&["federation", "country"]) || exact(&["fed"]) {
        Some(PlayerField::Federation)
    } else if has(&["title"]) || exact(&["tit", "ti"]) {
        Some(PlayerField::Title)
    } else {
        None
    }
}

/// Build the column mapping for a header row
///
/// Operator remaps (header label to field, case-insensitive) are applied first
/// and always win. Remaining fields go to the first column whose label
/// classifies as that field.
pub fn map_columns(headers: &[String], remaps: &HashMap<String, PlayerField>) -> ColumnMapping {
    let mut mapping = ColumnMapping::default();
    let mut taken = vec![false; headers.len()];

    let remaps: HashMap<String, PlayerField> = remaps
        .iter()
        .map(|(label, field)| (collapse_whitespace(label).to_lowercase(), *field))
        .collect();

    for (idx, header) in headers.iter().enumerate() {
        let key = collapse_whitespace(header).to_lowercase();
        if let Some(field) = remaps.get(&key) {
            if mapping.columns.contains_key(field) {
                continue;
            }
            mapping.columns.insert(*field, idx);
            mapping.remapped.push(*field);
            taken[idx] = true;
        }
    }

    for (idx, header) in headers.iter().enumerate() {
        if taken[idx] {
            continue;
        }
        if let Some(field) = classify_header(header) {
            if !mapping.columns.contains_key(&field) {
                mapping.columns.insert(field, idx);
                taken[idx] = true;
            }
        }
    }

    mapping
}

/// Column between a second `Name` column and the `Rating` column
///
/// Pairing-tool exports often leave the gender column unlabelled right after
/// a repeated name column.
pub fn positional_gender_column(headers: &[String], mapping: &ColumnMapping) -> Option<usize> {
    let rating = mapping.column(PlayerField::Rating)?;
    let second_name = headers
        .iter()
        .enumerate()
        .filter(|(_, h)| normalize_header_cell(h).contains("name"))
        .map(|(idx, _)| idx)
        .nth(1)?;

    let candidate = second_name + 1;
    if candidate < rating && mapping.field_of(candidate).is_none() {
        Some(candidate)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_header() {
        assert_eq!(classify_header("Rk."), Some(PlayerField::Rank));
        assert_eq!(classify_header("SNo"), Some(PlayerField::StartNumber));
        assert_eq!(classify_header("Sr. No."), Some(PlayerField::StartNumber));
        assert_eq!(classify_header("Player Name"), Some(PlayerField::Name));
        assert_eq!(classify_header("Club/City"), Some(PlayerField::Club));
        assert_eq!(classify_header("RtgI"), Some(PlayerField::Rating));
        assert_eq!(classify_header("FIDE-ID"), Some(PlayerField::FideId));
        assert_eq!(classify_header("Ident-Number"), Some(PlayerField::Identifier));
        assert_eq!(classify_header("Birth"), Some(PlayerField::Dob));
        assert_eq!(classify_header("sex"), Some(PlayerField::Gender));
        assert_eq!(classify_header("FED"), Some(PlayerField::Federation));
        assert_eq!(classify_header("Unrated?"), Some(PlayerField::Unrated));
        assert_eq!(classify_header("Tit."), Some(PlayerField::Title));
        assert_eq!(classify_header("Pts."), None);
    }

    #[test]
    fn test_map_columns_first_column_wins() {
        let headers = strings(&["Rank", "Name", "Rtg", "Name (2)"]);
        let mapping = map_columns(&headers, &HashMap::new());
        assert_eq!(mapping.column(PlayerField::Name), Some(1));
        assert_eq!(mapping.column(PlayerField::Rating), Some(2));
        assert_eq!(mapping.field_of(3), None);
    }

    #[test]
    fn test_map_columns_remap_overrides_label() {
        let headers = strings(&["Rank", "Name", "Column 3", "Rtg"]);
        let mut remaps = HashMap::new();
        remaps.insert("column 3".to_string(), PlayerField::Gender);
        remaps.insert("NAME".to_string(), PlayerField::Club);

        let mapping = map_columns(&headers, &remaps);
        assert_eq!(mapping.column(PlayerField::Gender), Some(2));
        assert_eq!(mapping.column(PlayerField::Club), Some(1));
        // Name was remapped away and no other column is a name
        assert_eq!(mapping.column(PlayerField::Name), None);
        assert_eq!(mapping.remapped.len(), 2);
    }

    #[test]
    fn test_positional_gender_column() {
        let headers = strings(&["SNo", "Name", "Name (2)", "Column 4", "Rtg"]);
        let mapping = map_columns(&headers, &HashMap::new());
        assert_eq!(positional_gender_column(&headers, &mapping), Some(3));
    }

    #[test]
    fn test_positional_gender_column_requires_gap() {
        let headers = strings(&["SNo", "Name", "Name (2)", "Rtg"]);
        let mapping = map_columns(&headers, &HashMap::new());
        assert_eq!(positional_gender_column(&headers, &mapping), None);

        let headers = strings(&["SNo", "Name", "Rtg", "Sex"]);
        let mapping = map_columns(&headers, &HashMap::new());
        assert_eq!(positional_gender_column(&headers, &mapping), None);
    }
}
