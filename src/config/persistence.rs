//! Run history persistence
//!
//! Handles saving, loading, and rotation of run records.

use std::fs;
use std::path::PathBuf;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::RunRecord;
use crate::{DiscretizeError, Result, APP_NAME, HISTORY_FILE, MAX_HISTORY};

/// Run history storage manager
#[derive(Debug)]
pub struct RunHistory {
    history_path: PathBuf,
}

/// History file structure for JSON persistence
#[derive(Debug, Serialize, Deserialize)]
struct HistoryFile {
    version: u32,
    runs: Vec<RunRecord>,
}

impl RunHistory {
    /// Create a history manager at the standard location
    pub fn new() -> Result<Self> {
        Ok(Self::at(Self::history_file_path()?))
    }

    /// Create a history manager over an explicit file
    pub fn at(history_path: PathBuf) -> Self {
        Self { history_path }
    }

    /// Get the standard history file path
    /// Uses $DATA_HOME/discretizer/history.json
    pub fn history_file_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir().ok_or_else(|| {
            DiscretizeError::Config("Unable to determine data directory".to_string())
        })?;

        Ok(data_dir.join(APP_NAME).join(HISTORY_FILE))
    }

    /// Load all records, oldest first
    pub fn load(&self) -> Result<Vec<RunRecord>> {
        if !self.history_path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.history_path).map_err(|e| {
            DiscretizeError::Persistence(format!(
                "Failed to read history file {}: {}",
                self.history_path.display(),
                e
            ))
        })?;

        let history: HistoryFile = serde_json::from_str(&content).map_err(|e| {
            DiscretizeError::Persistence(format!(
                "Failed to parse history file {}: {}",
                self.history_path.display(),
                e
            ))
        })?;

        Ok(history.runs)
    }

    /// Append a record, keeping only the newest MAX_HISTORY entries
    pub fn append(&self, record: RunRecord) -> Result<()> {
        let mut runs = self.load()?;
        runs.push(record);

        if runs.len() > MAX_HISTORY {
            let skip_count = runs.len() - MAX_HISTORY;
            runs.drain(..skip_count);
            debug!("Rotated {} old history records", skip_count);
        }

        self.save(runs)
    }

    fn save(&self, runs: Vec<RunRecord>) -> Result<()> {
        if let Some(parent) = self.history_path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                DiscretizeError::Persistence(format!(
                    "Failed to create history directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let history = HistoryFile { version: 1, runs };
        let content = serde_json::to_string_pretty(&history)?;

        fs::write(&self.history_path, content).map_err(|e| {
            DiscretizeError::Persistence(format!(
                "Failed to write history file {}: {}",
                self.history_path.display(),
                e
            ))
        })?;

        Ok(())
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize> {
        Ok(self.load()?.len())
    }

    /// Remove the history file
    pub fn clear(&self) -> Result<()> {
        if self.history_path.exists() {
            fs::remove_file(&self.history_path).map_err(|e| {
                DiscretizeError::Persistence(format!(
                    "Failed to remove history file {}: {}",
                    self.history_path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// The most recent `count` records, oldest first
    pub fn recent(&self, count: usize) -> Result<Vec<RunRecord>> {
        let mut runs = self.load()?;
        if runs.len() > count {
            runs.drain(..runs.len() - count);
        }
        Ok(runs)
    }

    pub fn path(&self) -> &PathBuf {
        &self.history_path
    }
}
