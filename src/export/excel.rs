//! Allocation workbooks
//!
//! Coverage and RCA tables rendered with rust_xlsxwriter. Fixed columns come
//! first; keys of the opaque records follow in first-seen order.

use crate::error::Result;
use roster_import_common::preview::{AllocationData, CoverageEntry, OpaqueRecord};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use serde_json::Value;

const COVERAGE_COLUMNS: &[&str] = &["Prize", "Category", "Status"];
const MAX_COLUMN_WIDTH: f64 = 48.0;

struct Formats {
    header: Format,
    value: Format,
    unfilled: Format,
}

impl Formats {
    fn new() -> Self {
        Self {
            header: Format::new()
                .set_bold()
                .set_font_color(Color::RGB(0x333333))
                .set_background_color(Color::RGB(0xF0F0F0))
                .set_align(FormatAlign::Center)
                .set_border(FormatBorder::Thin)
                .set_border_color(Color::RGB(0xAAAAAA)),
            value: Format::new()
                .set_border(FormatBorder::Hair)
                .set_border_color(Color::RGB(0xCCCCCC)),
            unfilled: Format::new()
                .set_font_color(Color::RGB(0x9C0006))
                .set_background_color(Color::RGB(0xFFC7CE))
                .set_border(FormatBorder::Hair)
                .set_border_color(Color::RGB(0xCCCCCC)),
        }
    }
}

/// Coverage sheet plus a winners sheet
pub fn generate_coverage_buffer(data: &AllocationData) -> Result<Vec<u8>> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    let extra_keys = collect_keys(data.coverage.iter().map(|e| &e.extra));
    let mut headers: Vec<String> = COVERAGE_COLUMNS.iter().map(|s| s.to_string()).collect();
    headers.extend(extra_keys.iter().cloned());

    let sheet = workbook.add_worksheet();
    sheet.set_name("Coverage")?;
    write_header(sheet, &headers, &formats)?;

    for (idx, entry) in data.coverage.iter().enumerate() {
        let row = idx as u32 + 1;
        let format = if entry.is_unfilled { &formats.unfilled } else { &formats.value };
        sheet.write_string_with_format(row, 0, &entry.prize_id, format)?;
        sheet.write_string_with_format(row, 1, category_label(entry), format)?;
        sheet.write_string_with_format(row, 2, if entry.is_unfilled { "Unfilled" } else { "Filled" }, format)?;
        for (offset, key) in extra_keys.iter().enumerate() {
            let col = (COVERAGE_COLUMNS.len() + offset) as u16;
            write_value(sheet, row, col, entry.extra.get(key), format)?;
        }
    }
    finish_sheet(sheet, &headers, data.coverage.len())?;

    let winner_keys = collect_keys(data.winners.iter().map(|w| &w.extra));
    let mut winner_headers = vec!["Prize".to_string()];
    winner_headers.extend(winner_keys.iter().cloned());

    let sheet = workbook.add_worksheet();
    sheet.set_name("Winners")?;
    write_header(sheet, &winner_headers, &formats)?;
    for (idx, winner) in data.winners.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string_with_format(row, 0, &winner.prize_id, &formats.value)?;
        for (offset, key) in winner_keys.iter().enumerate() {
            write_value(sheet, row, offset as u16 + 1, winner.extra.get(key), &formats.value)?;
        }
    }
    finish_sheet(sheet, &winner_headers, data.winners.len())?;

    Ok(workbook.save_to_buffer()?)
}

/// One row per RCA record
pub fn generate_rca_buffer(records: &[OpaqueRecord]) -> Result<Vec<u8>> {
    let formats = Formats::new();
    let mut workbook = Workbook::new();

    let headers = collect_keys(records.iter());
    let sheet = workbook.add_worksheet();
    sheet.set_name("RCA")?;
    write_header(sheet, &headers, &formats)?;

    for (idx, record) in records.iter().enumerate() {
        for (col, key) in headers.iter().enumerate() {
            write_value(sheet, idx as u32 + 1, col as u16, record.get(key), &formats.value)?;
        }
    }
    finish_sheet(sheet, &headers, records.len())?;

    Ok(workbook.save_to_buffer()?)
}

fn category_label(entry: &CoverageEntry) -> &str {
    entry
        .category_name
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| entry.category_key())
}

/// Union of record keys
///
/// Records contribute in order; keys within one record come out sorted.
fn collect_keys<'a>(records: impl Iterator<Item = &'a OpaqueRecord>) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for record in records {
        for key in record.keys() {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
    }
    keys
}

fn write_header(sheet: &mut Worksheet, headers: &[String], formats: &Formats) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, header, &formats.header)?;
    }
    Ok(())
}

fn write_value(sheet: &mut Worksheet, row: u32, col: u16, value: Option<&Value>, format: &Format) -> Result<()> {
    match value {
        None | Some(Value::Null) => {
            sheet.write_blank(row, col, format)?;
        }
        Some(Value::Number(n)) => match n.as_f64() {
            Some(f) => {
                sheet.write_number_with_format(row, col, f, format)?;
            }
            None => {
                sheet.write_string_with_format(row, col, n.to_string(), format)?;
            }
        },
        Some(Value::Bool(b)) => {
            sheet.write_boolean_with_format(row, col, *b, format)?;
        }
        Some(Value::String(s)) => {
            sheet.write_string_with_format(row, col, s, format)?;
        }
        Some(other) => {
            sheet.write_string_with_format(row, col, other.to_string(), format)?;
        }
    }
    Ok(())
}

fn finish_sheet(sheet: &mut Worksheet, headers: &[String], data_rows: usize) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        let width = (header.chars().count() as f64 + 4.0).clamp(10.0, MAX_COLUMN_WIDTH);
        sheet.set_column_width(col as u16, width)?;
    }
    sheet.set_freeze_panes(1, 0)?;
    if !headers.is_empty() && data_rows > 0 {
        sheet.autofilter(0, 0, data_rows as u32, headers.len() as u16 - 1)?;
    }
    Ok(())
}
