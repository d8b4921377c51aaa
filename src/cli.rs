use clap::{Parser, Subcommand};
use roster_import_common::PlayerField;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "roster-import")]
#[command(about = "Tournament roster import and player deduplication tool", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Detect the header row of a roster file
    Detect {
        /// Roster file (xlsx/xls/ods, or workbook JSON)
        #[arg(required = true)]
        file: PathBuf,

        /// Rows scanned per sheet (default from config)
        #[arg(long)]
        max_rows: Option<usize>,
    },

    /// Extract typed player rows
    Parse {
        #[arg(required = true)]
        file: PathBuf,

        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Map a header label to a field, e.g. "Nat=federation"
        #[arg(long = "map", value_parser = parse_remap)]
        remaps: Vec<(String, PlayerField)>,
    },

    /// Match rows against stored players and build the import plan
    Dedup {
        #[arg(required = true)]
        file: PathBuf,

        /// Stored players JSON (array of players with an `id`)
        #[arg(short, long, required = true)]
        existing: PathBuf,

        /// Operator overrides JSON (`{"<row>": "create|update|skip"}`)
        #[arg(long)]
        overrides: Option<PathBuf>,

        /// Review matched rows interactively
        #[arg(short, long)]
        interactive: bool,

        /// Output plan JSON (default: plan.json)
        #[arg(short, long, default_value = "plan.json")]
        output: PathBuf,

        #[arg(long = "map", value_parser = parse_remap)]
        remaps: Vec<(String, PlayerField)>,
    },

    /// Apply the review preview limit to an allocation
    Preview {
        /// Allocation JSON
        #[arg(required = true)]
        input: PathBuf,

        /// Caller has full results access
        #[arg(long)]
        full_access: bool,

        /// Output JSON file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write coverage and RCA workbooks for an allocation
    Export {
        #[arg(required = true)]
        input: PathBuf,

        #[arg(long)]
        full_access: bool,

        /// Output directory (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show or edit settings
    Config {
        /// Show settings
        #[arg(long)]
        show: bool,

        /// Set a value, e.g. max_scan_rows=40
        #[arg(long)]
        set: Vec<String>,
    },
}

/// `"Header=field"` to a remap pair
pub fn parse_remap(s: &str) -> Result<(String, PlayerField), String> {
    let (header, field) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("Expected Header=field, got '{}'", s))?;
    let header = header.trim();
    if header.is_empty() {
        return Err(format!("Empty header in '{}'", s));
    }
    let field = field.parse::<PlayerField>().map_err(|e| e.to_string())?;
    Ok((header.to_string(), field))
}
