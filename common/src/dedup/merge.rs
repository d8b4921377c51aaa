//! Field-level diff between an incoming row and a stored player

use crate::types::{ExistingPlayer, ParsedPlayerRow, PlayerField};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One changed field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldChange {
    pub field: PlayerField,
    pub from: Value,
    pub to: Value,
}

/// Changes an update would apply, in field order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeDiff {
    pub changes: Vec<FieldChange>,
}

impl MergeDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changed fields keyed by field name, with their new values
    pub fn payload(&self) -> BTreeMap<String, Value> {
        self.changes
            .iter()
            .map(|c| (c.field.as_str().to_string(), c.to.clone()))
            .collect()
    }
}

/// Diff the fields an import may update
///
/// Only fields present on the incoming row count; the name is never
/// overwritten, and text compares case-insensitively.
pub fn compute_merge(incoming: &ParsedPlayerRow, existing: &ExistingPlayer) -> MergeDiff {
    let mut changes = Vec::new();

    push_change(&mut changes, PlayerField::Rating, &existing.rating, &incoming.rating);
    push_change(&mut changes, PlayerField::Dob, &existing.dob, &incoming.dob);
    if incoming.dob.is_none() && existing.dob.is_none() {
        if let Some(year) = incoming.birth_year {
            if existing.birth_year != Some(year) {
                changes.push(FieldChange {
                    field: PlayerField::BirthYear,
                    from: value_of(&existing.birth_year),
                    to: value_of(&year),
                });
            }
        }
    }
    push_change(&mut changes, PlayerField::Gender, &existing.gender, &incoming.gender);
    push_text_change(&mut changes, PlayerField::State, &existing.state, &incoming.state);
    push_text_change(&mut changes, PlayerField::Club, &existing.club, &incoming.club);
    push_text_change(&mut changes, PlayerField::City, &existing.city, &incoming.city);
    push_text_change(&mut changes, PlayerField::FideId, &existing.fide_id, &incoming.fide_id);
    push_text_change(&mut changes, PlayerField::Federation, &existing.federation, &incoming.federation);
    push_text_change(&mut changes, PlayerField::Title, &existing.title, &incoming.title);

    MergeDiff { changes }
}

fn push_change<T: PartialEq + Serialize>(
    changes: &mut Vec<FieldChange>,
    field: PlayerField,
    existing: &Option<T>,
    incoming: &Option<T>,
) {
    if let Some(new) = incoming {
        if existing.as_ref() != Some(new) {
            changes.push(FieldChange {
                field,
                from: value_of(existing),
                to: value_of(new),
            });
        }
    }
}

fn push_text_change(
    changes: &mut Vec<FieldChange>,
    field: PlayerField,
    existing: &Option<String>,
    incoming: &Option<String>,
) {
    if let Some(new) = incoming {
        let same = existing
            .as_deref()
            .map(|old| old.trim().eq_ignore_ascii_case(new.trim()))
            .unwrap_or(false);
        if !same {
            changes.push(FieldChange {
                field,
                from: value_of(existing),
                to: Value::String(new.clone()),
            });
        }
    }
}

fn value_of<T: Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap_or(Value::Null)
}
