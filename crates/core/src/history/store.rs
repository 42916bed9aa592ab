use std::{
    fs::{self, OpenOptions},
    io::{BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::debug;

use super::RentalEvent;

/// File name used for the history inside the data directory.
pub const DEFAULT_HISTORY_FILE: &str = "rental_history.txt";

/// Plain-text, one-event-per-line rental history on disk.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Create a store backed by the given file. Nothing is touched until use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every stored line in file order, or nothing if the file does not exist yet.
    pub fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        let mut lines = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.with_context(|| format!("failed to read {}", self.path.display()))?;
            lines.push(line);
        }
        debug!(path = %self.path.display(), lines = lines.len(), "History loaded");
        Ok(lines)
    }

    /// Append one event as a single line and flush it to disk.
    pub fn append(&self, event: &RentalEvent) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;
        writeln!(file, "{event}")
            .and_then(|_| file.flush())
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::Money;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_empty() -> Result<()> {
        let dir = tempdir()?;
        let store = HistoryStore::new(dir.path().join(DEFAULT_HISTORY_FILE));
        assert!(store.load()?.is_empty());
        Ok(())
    }

    #[test]
    fn appends_in_order() -> Result<()> {
        let dir = tempdir()?;
        let store = HistoryStore::new(dir.path().join("nested/history.txt"));

        store.append(&RentalEvent::Rented {
            renter: "Alice".to_string(),
            brand: "Honda".to_string(),
            model: "Civic".to_string(),
            days: Some(2),
            total: Some(Money::from_dollars(80)),
        })?;
        store.append(&RentalEvent::Returned {
            renter: "Alice".to_string(),
            brand: "Honda".to_string(),
            model: "Civic".to_string(),
        })?;

        let lines = store.load()?;
        assert_eq!(
            lines,
            vec![
                "Alice RENTED Honda Civic for 2 days | Total: $80.00",
                "Alice RETURNED Honda Civic",
            ]
        );
        Ok(())
    }
}
