pub mod excel;

use crate::error::{Result, RosterImportError};
use roster_import_common::preview::{can_download_allocation_exports, AllocationData};
use std::path::{Path, PathBuf};

fn output_path_for(output_dir: &Path, stem: &str, stamp: &str) -> PathBuf {
    output_dir.join(format!("{}-{}.xlsx", stem, stamp))
}

/// Write the coverage and RCA workbooks the gate allows
///
/// # Errors
/// `ExportNotAllowed` when neither download is available.
pub fn export_allocation(
    data: &AllocationData,
    export_enabled: bool,
    has_full_access: bool,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    let availability =
        can_download_allocation_exports(export_enabled, has_full_access, data.coverage.len(), data.rca.len());

    if !availability.can_download_coverage && !availability.can_download_rca {
        let reason = if !export_enabled {
            "exports are disabled in the configuration"
        } else if !has_full_access {
            "full results access is required"
        } else {
            "the allocation has no coverage or RCA rows"
        };
        return Err(RosterImportError::ExportNotAllowed(reason.into()));
    }

    std::fs::create_dir_all(output_dir)?;
    let stamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
    let mut written = Vec::new();

    if availability.can_download_coverage {
        let path = output_path_for(output_dir, "coverage", &stamp);
        println!("- Writing coverage workbook...");
        std::fs::write(&path, excel::generate_coverage_buffer(data)?)?;
        println!("✔ Coverage: {}", path.display());
        written.push(path);
    }

    if availability.can_download_rca {
        let path = output_path_for(output_dir, "rca", &stamp);
        println!("- Writing RCA workbook...");
        std::fs::write(&path, excel::generate_rca_buffer(&data.rca)?)?;
        println!("✔ RCA: {}", path.display());
        written.push(path);
    }

    tracing::info!(files = written.len(), "allocation exported");
    Ok(written)
}
