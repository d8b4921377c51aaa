//! Gender value normalization

use crate::types::{Cell, Gender};

/// Gender from a cell value; `None` when the value carries no opinion
pub fn normalize_gender(cell: &Cell) -> Option<Gender> {
    let text = cell.as_text()?;
    let key: String = text
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase();

    match key.as_str() {
        "m" | "male" | "man" | "b" | "boy" | "boys" | "open" => Some(Gender::M),
        "f" | "w" | "female" | "woman" | "women" | "g" | "girl" | "girls" => Some(Gender::F),
        "other" | "o" | "x" | "nb" | "nonbinary" => Some(Gender::Other),
        _ => None,
    }
}

/// Women's titles imply `F`
pub fn gender_from_title(title: &str) -> Option<Gender> {
    match title.trim().to_uppercase().as_str() {
        "WGM" | "WIM" | "WFM" | "WCM" => Some(Gender::F),
        _ => None,
    }
}
