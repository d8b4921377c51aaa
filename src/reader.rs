//! Workbook loading
//!
//! Spreadsheets (xlsx / xls / ods) go through calamine; `.json` files hold a
//! serialized `Workbook` and are read directly.

use crate::error::{Result, RosterImportError};
use calamine::{open_workbook_auto, Data, Reader};
use roster_import_common::{Cell, Sheet, Workbook};
use std::path::Path;

/// Load a roster file into the raw workbook model
pub fn read_workbook(path: &Path) -> Result<Workbook> {
    if !path.exists() {
        return Err(RosterImportError::FileNotFound(path.display().to_string()));
    }

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let workbook = if is_json {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)?
    } else {
        read_spreadsheet(path)?
    };

    if workbook.is_empty() {
        return Err(RosterImportError::EmptyWorkbook(path.display().to_string()));
    }

    tracing::debug!(
        path = %path.display(),
        sheets = workbook.sheets.len(),
        "workbook loaded"
    );
    Ok(workbook)
}

fn read_spreadsheet(path: &Path) -> Result<Workbook> {
    let workbook_error = |message: String| RosterImportError::Workbook {
        path: path.display().to_string(),
        message,
    };

    let mut source = open_workbook_auto(path).map_err(|e| workbook_error(e.to_string()))?;
    let sheet_names = source.sheet_names().to_owned();

    let mut workbook = Workbook::new();
    for sheet_name in sheet_names {
        let range = source
            .worksheet_range(&sheet_name)
            .map_err(|e| workbook_error(format!("sheet '{}': {}", sheet_name, e)))?;

        // Ranges start at the first used cell; pad so indices match the file
        let (row_offset, col_offset) = range.start().unwrap_or((0, 0));
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_offset as usize];
        for source_row in range.rows() {
            let mut row = vec![Cell::Empty; col_offset as usize];
            row.extend(source_row.iter().map(convert_cell));
            rows.push(row);
        }

        workbook.sheets.push(Sheet {
            name: sheet_name,
            rows,
        });
    }

    Ok(workbook)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        // Serial day number, resolved later by the birth parser
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::Error(_) => Cell::Empty,
        other => Cell::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_cell() {
        assert_eq!(convert_cell(&Data::Empty), Cell::Empty);
        assert_eq!(convert_cell(&Data::String("Name".into())), Cell::Text("Name".into()));
        assert_eq!(convert_cell(&Data::String(String::new())), Cell::Empty);
        assert_eq!(convert_cell(&Data::Int(1523)), Cell::Number(1523.0));
        assert_eq!(convert_cell(&Data::Bool(true)), Cell::Text("true".into()));
    }
}
