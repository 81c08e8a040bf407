//! Configuration management module
//!
//! Handles loading, saving, and validation of discretization settings
//! and access to the run history.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::discretize::Criterion;
use crate::{DiscretizeError, Result, APP_NAME, CONFIG_FILE};

pub mod persistence;

use crate::models::RunRecord;

/// Which criteria to run for each input file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriterionChoice {
    /// Main criterion only
    Main,
    /// Secondary criterion only
    Secondary,
    /// Both, main first
    Both,
}

impl CriterionChoice {
    /// Expand the choice into concrete criteria
    pub fn criteria(&self, target_coverage: f64) -> Vec<Criterion> {
        let secondary = Criterion::Secondary { target_coverage };
        match self {
            CriterionChoice::Main => vec![Criterion::Main],
            CriterionChoice::Secondary => vec![secondary],
            CriterionChoice::Both => vec![Criterion::Main, secondary],
        }
    }
}

impl std::str::FromStr for CriterionChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "main" => Ok(CriterionChoice::Main),
            "secondary" => Ok(CriterionChoice::Secondary),
            "both" => Ok(CriterionChoice::Both),
            other => Err(format!(
                "Unknown criterion '{}' (expected main, secondary or both)",
                other
            )),
        }
    }
}

/// Discretization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscretizeConfig {
    /// Criteria to run per file
    pub criterion: CriterionChoice,
    /// Coverage at which the secondary criterion stops
    pub target_coverage: f64,
    /// Directory for output files; next to the input when unset
    pub output_dir: Option<PathBuf>,
    /// Whether to write a JSON report per run
    pub write_report: bool,
    /// Whether to append runs to the history file
    pub record_history: bool,
    /// Rows shown by `preview`
    pub preview_rows: usize,
}

impl Default for DiscretizeConfig {
    fn default() -> Self {
        Self {
            criterion: CriterionChoice::Both,
            target_coverage: 0.95,
            output_dir: None,
            write_report: false,
            record_history: true,
            preview_rows: 5,
        }
    }
}

impl DiscretizeConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.target_coverage > 0.0 && self.target_coverage <= 1.0) {
            return Err(DiscretizeError::Config(format!(
                "Target coverage must be in (0, 1], got {}",
                self.target_coverage
            )));
        }

        if let Some(dir) = &self.output_dir {
            if !dir.is_dir() {
                return Err(DiscretizeError::Config(format!(
                    "Output directory does not exist: {}",
                    dir.display()
                )));
            }
        }

        if self.preview_rows == 0 {
            return Err(DiscretizeError::Config(
                "Preview rows must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Concrete criteria to run, in order
    pub fn criteria(&self) -> Vec<Criterion> {
        self.criterion.criteria(self.target_coverage)
    }

    /// Set which criteria to run
    pub fn with_criterion(mut self, criterion: CriterionChoice) -> Self {
        self.criterion = criterion;
        self
    }

    /// Set the secondary criterion's coverage target
    pub fn with_target_coverage(mut self, target_coverage: f64) -> Self {
        self.target_coverage = target_coverage;
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = Some(dir);
        self
    }

    /// Set whether to write JSON reports
    pub fn with_write_report(mut self, write: bool) -> Self {
        self.write_report = write;
        self
    }

    /// Set whether to record runs in the history
    pub fn with_record_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    /// Set the number of preview rows
    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows;
        self
    }

    /// Load configuration from the standard config file location
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load configuration from a specific file
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| {
            DiscretizeError::Config(format!(
                "Failed to read config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            DiscretizeError::Config(format!(
                "Failed to parse config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to the standard config file location
    pub fn save(&self) -> Result<PathBuf> {
        let config_path = Self::config_file_path()?;
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        self.validate()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DiscretizeError::Config(format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let content = self.to_toml()?;

        fs::write(config_path, content).map_err(|e| {
            DiscretizeError::Config(format!(
                "Failed to write config file {}: {}",
                config_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Pretty TOML rendering of the configuration
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Get the standard configuration file path
    /// Uses $CONFIG_HOME/discretizer/discretizer.toml
    pub fn config_file_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            DiscretizeError::Config("Unable to determine config directory".to_string())
        })?;

        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }
}

/// Configuration manager for handling config and run history persistence
pub struct ConfigManager {
    config_path: PathBuf,
    history: persistence::RunHistory,
}

impl ConfigManager {
    /// Create a new configuration manager at the standard locations
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: DiscretizeConfig::config_file_path()?,
            history: persistence::RunHistory::new()?,
        })
    }

    /// Create a manager over explicit paths
    pub fn with_paths(config_path: PathBuf, history_path: PathBuf) -> Self {
        Self {
            config_path,
            history: persistence::RunHistory::at(history_path),
        }
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Load configuration from file or return default
    pub fn load_config(&self) -> Result<DiscretizeConfig> {
        DiscretizeConfig::load_from(&self.config_path)
    }

    /// Save configuration to file
    pub fn save_config(&self, config: &DiscretizeConfig) -> Result<()> {
        config.save_to(&self.config_path)
    }

    /// Get the most recent runs (up to limit), most recent first
    pub fn get_recent_records(&self, limit: usize) -> Result<Vec<RunRecord>> {
        let mut records = self.history.recent(limit)?;
        records.reverse();
        Ok(records)
    }

    /// Remove all recorded runs
    pub fn clear_records(&self) -> Result<()> {
        self.history.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = DiscretizeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.criterion, CriterionChoice::Both);
        assert_eq!(config.criteria().len(), 2);
    }

    #[test]
    fn test_validation() {
        assert!(DiscretizeConfig::new()
            .with_target_coverage(0.0)
            .validate()
            .is_err());
        assert!(DiscretizeConfig::new()
            .with_target_coverage(1.01)
            .validate()
            .is_err());
        assert!(DiscretizeConfig::new()
            .with_preview_rows(0)
            .validate()
            .is_err());
        assert!(DiscretizeConfig::new()
            .with_output_dir(PathBuf::from("/definitely/not/a/dir"))
            .validate()
            .is_err());
    }

    #[test]
    fn test_criterion_choice() {
        assert_eq!("Main".parse::<CriterionChoice>(), Ok(CriterionChoice::Main));
        assert_eq!("both".parse::<CriterionChoice>(), Ok(CriterionChoice::Both));
        assert!("best".parse::<CriterionChoice>().is_err());

        let criteria = CriterionChoice::Secondary.criteria(0.8);
        assert_eq!(
            criteria,
            vec![Criterion::Secondary {
                target_coverage: 0.8
            }]
        );
    }

    #[test]
    fn test_toml_serialization() {
        let temp_dir = TempDir::new().unwrap();
        let config = DiscretizeConfig::new()
            .with_criterion(CriterionChoice::Secondary)
            .with_target_coverage(0.9)
            .with_output_dir(temp_dir.path().to_path_buf())
            .with_write_report(true);

        let toml_str = config.to_toml().expect("Failed to serialize to TOML");
        assert!(toml_str.contains("criterion = \"secondary\""));

        let deserialized: DiscretizeConfig =
            toml::from_str(&toml_str).expect("Failed to deserialize from TOML");
        assert_eq!(deserialized.criterion, CriterionChoice::Secondary);
        assert_eq!(deserialized.target_coverage, 0.9);
        assert_eq!(deserialized.output_dir, config.output_dir);
        assert!(deserialized.write_report);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let parsed: DiscretizeConfig = toml::from_str("write_report = true\n").unwrap();
        assert!(parsed.write_report);
        assert_eq!(parsed.target_coverage, 0.95);
        assert_eq!(parsed.criterion, CriterionChoice::Both);
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_paths(
            temp_dir.path().join("conf").join(CONFIG_FILE),
            temp_dir.path().join("history.json"),
        );

        // Missing file gives defaults
        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.preview_rows, 5);

        let config = DiscretizeConfig::new().with_preview_rows(12);
        manager.save_config(&config).unwrap();
        assert_eq!(manager.load_config().unwrap().preview_rows, 12);
    }

    #[test]
    fn test_invalid_file_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&path, "target_coverage = 7.0\n").unwrap();
        assert!(matches!(
            DiscretizeConfig::load_from(&path),
            Err(DiscretizeError::Config(_))
        ));
    }

    #[test]
    fn test_history_ignores_broken_config() {
        use crate::data::load_data;
        use crate::discretize::discretize_data;

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE);
        fs::write(&config_path, "criterion = [not toml\n").unwrap();
        let history_path = temp_dir.path().join("history.json");
        let manager = ConfigManager::with_paths(config_path, history_path.clone());
        assert!(manager.load_config().is_err());

        let input = temp_dir.path().join("t.csv");
        fs::write(&input, "x,d\n1,A\n2,B\n").unwrap();
        let table = load_data(&input).unwrap();
        let history = persistence::RunHistory::at(history_path);
        for criterion in [Criterion::Main, Criterion::Secondary { target_coverage: 0.5 }] {
            let result = discretize_data(&table, criterion).unwrap();
            history
                .append(RunRecord::new(input.clone(), None, &result))
                .unwrap();
        }

        let recent = manager.get_recent_records(5).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].criterion.name(), "secondary");
        assert_eq!(recent[1].criterion.name(), "main");
        assert_eq!(
            manager.get_recent_records(1).unwrap()[0].criterion.name(),
            "secondary"
        );

        manager.clear_records().unwrap();
        assert!(manager.get_recent_records(5).unwrap().is_empty());
    }

    #[test]
    fn test_config_file_path() {
        if let Ok(path) = DiscretizeConfig::config_file_path() {
            assert!(path.to_string_lossy().contains("discretizer.toml"));
        }
    }
}
