//! Interactive duplicate review
//!
//! Walks matched rows tier by tier (high, medium, low) and records the
//! operator's create / update / skip choice as an override.

use crate::error::{Result, RosterImportError};
use chrono::NaiveDate;
use dialoguer::Input;
use roster_import_common::dedup::{group_by_confidence, DedupAction, DedupCandidate};
use roster_import_common::resolver::{resolution_progress, OverrideMap};
use roster_import_common::{ExistingPlayer, ParsedPlayerRow};

/// One answer at the review prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    /// Record this action for the row
    Choose(DedupAction),
    /// Record the row's default action
    AcceptDefault,
    /// Record defaults for every remaining row
    AcceptAllDefaults,
    /// Stop; remaining rows keep their defaults without an override
    Quit,
}

/// Parse prompt input
///
/// `None` for unrecognized input so the prompt can ask again.
pub fn parse_review_input(input: &str) -> Option<ReviewAction> {
    match input.trim() {
        "" | "d" => Some(ReviewAction::AcceptDefault),
        "D" => Some(ReviewAction::AcceptAllDefaults),
        "c" | "create" => Some(ReviewAction::Choose(DedupAction::Create)),
        "u" | "update" => Some(ReviewAction::Choose(DedupAction::Update)),
        "s" | "skip" => Some(ReviewAction::Choose(DedupAction::Skip)),
        "q" | "Q" => Some(ReviewAction::Quit),
        _ => None,
    }
}

/// Review order: high tier first, then medium, then low; row order within a tier
pub fn review_order(candidates: &[DedupCandidate]) -> Vec<&DedupCandidate> {
    let groups = group_by_confidence(candidates);
    groups
        .high
        .into_iter()
        .chain(groups.medium)
        .chain(groups.low)
        .collect()
}

/// Name, with the age appended when one is known
pub fn player_label(name: &str, age: Option<u32>) -> String {
    match age {
        Some(age) => format!("{} (age {})", name, age),
        None => name.to_string(),
    }
}

fn incoming_label(row: Option<&ParsedPlayerRow>, today: NaiveDate) -> String {
    match row {
        Some(row) => player_label(&row.name, row.age_on(today)),
        None => "?".to_string(),
    }
}

fn existing_label(player: &ExistingPlayer, today: NaiveDate) -> String {
    player_label(&player.name, player.age_on(today))
}

/// Prompt for every matched row not already overridden
///
/// Existing overrides are kept and those rows are not asked again.
pub fn run_interactive_review(
    rows: &[ParsedPlayerRow],
    candidates: &[DedupCandidate],
    overrides: &mut OverrideMap,
) -> Result<()> {
    let pending: Vec<&DedupCandidate> = review_order(candidates)
        .into_iter()
        .filter(|c| !overrides.contains_key(&c.row))
        .collect();

    if pending.is_empty() {
        println!("✓ No matched rows need review");
        return Ok(());
    }

    println!("🔍 Matched rows to review: {}", pending.len());
    println!("---");
    println!("Keys: [Enter/d] default  [D] default for all remaining  [c]reate  [u]pdate  [s]kip  [q]uit");
    println!("---\n");

    let today = chrono::Local::now().date_naive();
    let mut accept_all = false;

    for (count, candidate) in pending.iter().enumerate() {
        if accept_all {
            overrides.insert(candidate.row, candidate.default_action);
            continue;
        }

        let Some(best) = candidate.best_match.as_ref() else {
            continue;
        };
        let incoming = incoming_label(rows.get(candidate.row), today);

        println!(
            "[{}/{}] {} → {} ({}, score {:.2}, default {})",
            count + 1,
            pending.len(),
            incoming,
            existing_label(&best.existing, today),
            candidate.tier().map(|t| t.to_string()).unwrap_or_default(),
            best.score,
            candidate.default_action
        );
        for change in &best.merge.changes {
            println!("    {}: {} → {}", change.field, change.from, change.to);
        }

        match prompt_review_action()? {
            ReviewAction::Choose(action) => {
                overrides.insert(candidate.row, action);
                println!("  → {}\n", action);
            }
            ReviewAction::AcceptDefault => {
                overrides.insert(candidate.row, candidate.default_action);
                println!("  → {}\n", candidate.default_action);
            }
            ReviewAction::AcceptAllDefaults => {
                overrides.insert(candidate.row, candidate.default_action);
                println!("  → defaults for all remaining rows\n");
                accept_all = true;
            }
            ReviewAction::Quit => {
                println!("Stopping review...");
                break;
            }
        }
    }

    let progress = resolution_progress(candidates, overrides);
    println!("\n✓ Reviewed {}/{} matched rows", progress.resolved, progress.total);

    Ok(())
}

fn prompt_review_action() -> Result<ReviewAction> {
    loop {
        let input: String = Input::new()
            .with_prompt("Action (d/D/c/u/s/q)")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| RosterImportError::CliExecution(e.to_string()))?;

        match parse_review_input(&input) {
            Some(action) => return Ok(action),
            None => println!("  Unknown choice '{}'", input.trim()),
        }
    }
}
