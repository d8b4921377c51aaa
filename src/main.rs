use anyhow::Context;
use clap::Parser;
use roster_import::{cli, config, export, pipeline, reader, review};
use roster_import_common::header::detect_header_row;
use roster_import_common::preview::{apply_review_preview_limit, AllocationData};
use roster_import_common::resolver::OverrideMap;
use roster_import_common::{import_workbook, ExistingPlayer};
use cli::{Cli, Commands};
use config::Config;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load().context("failed to load configuration")?;

    match cli.command {
        Commands::Detect { file, max_rows } => {
            println!("📋 roster-import - header detection\n");

            let workbook = reader::read_workbook(&file)?;
            let header = detect_header_row(&workbook, max_rows.unwrap_or(config.max_scan_rows))?;

            println!("✔ Sheet '{}', row {} (score {})", header.sheet_name, header.row_index + 1, header.confidence);
            println!("  Columns: {}", header.headers.join(" | "));
            println!("\nCandidates:");
            for (rank, candidate) in header.candidates.iter().enumerate() {
                println!(
                    "  {}. '{}' row {}: {}",
                    rank + 1,
                    candidate.sheet_name,
                    candidate.row_index + 1,
                    candidate.score
                );
            }
        }

        Commands::Parse { file, output, remaps } => {
            println!("📋 roster-import - row extraction\n");

            let workbook = reader::read_workbook(&file)?;
            let mut options = config.to_import_options();
            options.remaps.extend(remaps);

            let result = import_workbook(&workbook, &options)?;
            println!(
                "✔ {} players from sheet '{}' ({} rows skipped)",
                result.rows.len(),
                result.header.sheet_name,
                result.skipped_rows
            );
            print_warnings(&result.warnings);

            match output {
                Some(path) => {
                    pipeline::write_json(&result.rows, &path)?;
                    println!("✔ Saved: {}", path.display());
                }
                None => println!("{}", serde_json::to_string_pretty(&result.rows)?),
            }
        }

        Commands::Dedup { file, existing, overrides, interactive, output, remaps } => {
            println!("🔁 roster-import - deduplication\n");

            println!("[1/3] Reading roster...");
            let workbook = reader::read_workbook(&file)?;
            let players: Vec<ExistingPlayer> = pipeline::load_json(&existing)
                .with_context(|| format!("failed to read stored players from {}", existing.display()))?;
            let mut import_options = config.to_import_options();
            import_options.remaps.extend(remaps);

            println!("[2/3] Matching against {} stored players...", players.len());
            let prepared = pipeline::prepare_dedup(&workbook, &players, &import_options, &config.to_match_options())?;
            print_warnings(&prepared.import.warnings);

            let mut override_map: OverrideMap = match overrides {
                Some(path) => pipeline::load_json(&path)
                    .with_context(|| format!("failed to read overrides from {}", path.display()))?,
                None => OverrideMap::new(),
            };
            if interactive {
                review::run_interactive_review(&prepared.import.rows, &prepared.candidates, &mut override_map)?;
            }

            println!("[3/3] Resolving...");
            let report = pipeline::finalize_plan(&prepared, &override_map)?;
            println!("✔ Reviewed {}/{} matched rows", report.progress.resolved, report.progress.total);
            println!(
                "✔ create {}, update {}, skip {}",
                report.counts.create, report.counts.update, report.counts.skip
            );

            pipeline::write_json(&report, &output)?;
            println!("\n✅ Plan saved: {}", output.display());
        }

        Commands::Preview { input, full_access, output } => {
            let data: AllocationData = pipeline::load_json(&input)?;
            let preview = apply_review_preview_limit(&data, full_access);

            match output {
                Some(path) => {
                    pipeline::write_json(&preview, &path)?;
                    println!(
                        "✔ {} winners shown, {} hidden: {}",
                        preview.winners.len(),
                        preview.hidden_winner_count,
                        path.display()
                    );
                }
                None => println!("{}", serde_json::to_string_pretty(&preview)?),
            }
        }

        Commands::Export { input, full_access, output } => {
            println!("📄 roster-import - export\n");

            let data: AllocationData = pipeline::load_json(&input)?;
            let output_dir = output.unwrap_or_else(|| std::path::PathBuf::from("."));
            export::export_allocation(&data, config.export_enabled, full_access, &output_dir)?;

            println!("\n✅ Export complete");
        }

        Commands::Config { show, set } => {
            let mut config = config;

            if !set.is_empty() {
                for assignment in &set {
                    config.set(assignment)?;
                }
                config.save()?;
                println!("✔ Settings saved");
            }

            if show || set.is_empty() {
                println!("Settings ({}):", Config::config_path()?.display());
                println!("  max_scan_rows: {}", config.max_scan_rows);
                println!("  treat_empty_as_unrated: {}", config.treat_empty_as_unrated);
                println!("  infer_from_missing_rating: {}", config.infer_from_missing_rating);
                println!("  flagged_federation_codes: {}", config.flagged_federation_codes.join(","));
                println!("  min_name_similarity: {}", config.min_name_similarity);
                println!("  export_enabled: {}", config.export_enabled);
            }
        }
    }

    Ok(())
}

fn print_warnings(warnings: &[roster_import_common::ImportWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!("⚠ {} warnings:", warnings.len());
    for warning in warnings {
        match warning.original_index {
            Some(row) => println!("  row {}: {}", row + 1, warning.message),
            None => println!("  {}", warning.message),
        }
    }
}
