//! Roster Import Common Library
//!
//! Spreadsheet roster import core shared by the CLI and any other front end:
//! header detection, row extraction, duplicate matching, decision resolution
//! and the review preview limiter.

pub mod types;
pub mod error;
pub mod normalizer;
pub mod header;
pub mod extract;
pub mod dedup;
pub mod resolver;
pub mod preview;

pub use types::{Cell, ExistingPlayer, Gender, ImportWarning, ParsedPlayerRow, PlayerField, Sheet, WarningKind, Workbook};
pub use error::{Error, Result};
pub use header::{detect_header_row, DetectedHeader, HeaderCandidate, DEFAULT_MAX_SCAN_ROWS};
pub use extract::{import_workbook, ColumnMapping, ImportOptions, ImportResult};
pub use dedup::{find_candidates, group_by_confidence, ConfidenceTier, DedupAction, DedupCandidate, MatchOptions};
pub use resolver::{action_counts, build_import_plan, resolve, resolution_progress, validate_overrides, DedupDecision, OverrideMap};
pub use preview::{apply_review_preview_limit, can_download_allocation_exports, AllocationData, ExportAvailability, PreviewResult};
