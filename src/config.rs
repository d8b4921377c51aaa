use crate::error::{Result, RosterImportError};
use roster_import_common::dedup::MatchOptions;
use roster_import_common::extract::ImportOptions;
use roster_import_common::normalizer::{UnratedOptions, DEFAULT_FLAGGED_FEDERATIONS};
use roster_import_common::DEFAULT_MAX_SCAN_ROWS;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub max_scan_rows: usize,
    pub treat_empty_as_unrated: bool,
    pub infer_from_missing_rating: bool,
    pub flagged_federation_codes: Vec<String>,
    pub min_name_similarity: f64,
    pub export_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_scan_rows: DEFAULT_MAX_SCAN_ROWS,
            treat_empty_as_unrated: true,
            infer_from_missing_rating: false,
            flagged_federation_codes: DEFAULT_FLAGGED_FEDERATIONS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            min_name_similarity: MatchOptions::default().min_name_similarity,
            export_enabled: true,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Read a config file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| RosterImportError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("roster-import").join("config.json"))
    }

    /// Apply one `key=value` assignment
    pub fn set(&mut self, assignment: &str) -> Result<()> {
        let (key, value) = assignment
            .split_once('=')
            .ok_or_else(|| RosterImportError::Config(format!("expected key=value, got '{}'", assignment)))?;
        let (key, value) = (key.trim(), value.trim());

        match key {
            "max_scan_rows" => {
                self.max_scan_rows = parse_value(key, value)?;
                if self.max_scan_rows == 0 {
                    return Err(RosterImportError::Config("max_scan_rows must be at least 1".into()));
                }
            }
            "treat_empty_as_unrated" => self.treat_empty_as_unrated = parse_value(key, value)?,
            "infer_from_missing_rating" => self.infer_from_missing_rating = parse_value(key, value)?,
            "flagged_federation_codes" => {
                self.flagged_federation_codes = value
                    .split(',')
                    .map(|code| code.trim().to_uppercase())
                    .filter(|code| !code.is_empty())
                    .collect();
            }
            "min_name_similarity" => {
                let similarity: f64 = parse_value(key, value)?;
                if !(0.0..=1.0).contains(&similarity) {
                    return Err(RosterImportError::Config(
                        "min_name_similarity must be between 0 and 1".into(),
                    ));
                }
                self.min_name_similarity = similarity;
            }
            "export_enabled" => self.export_enabled = parse_value(key, value)?,
            _ => return Err(RosterImportError::Config(format!("unknown config key '{}'", key))),
        }
        Ok(())
    }

    pub fn to_import_options(&self) -> ImportOptions {
        ImportOptions {
            max_scan_rows: self.max_scan_rows,
            unrated: UnratedOptions {
                treat_empty_as_unrated: self.treat_empty_as_unrated,
                infer_from_missing_rating: self.infer_from_missing_rating,
            },
            flagged_federations: self.flagged_federation_codes.clone(),
            remaps: HashMap::new(),
        }
    }

    pub fn to_match_options(&self) -> MatchOptions {
        MatchOptions {
            min_name_similarity: self.min_name_similarity,
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| RosterImportError::Config(format!("invalid value '{}' for {}", value, key)))
}
