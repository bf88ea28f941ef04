//! Per-stage diagnostic snapshots.
//!
//! Each run gets its own directory under `.datalogs/`, named by the run's
//! start time in milliseconds, holding one pretty-printed JSON file per
//! pipeline stage. Snapshots are write-only — the pipeline never reads
//! them back, and a failed snapshot write is logged and swallowed.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::IngestError;

/// Diagnostic snapshot writer for one run.
#[derive(Debug)]
pub struct Datalogs {
    dir: PathBuf,
}

impl Datalogs {
    /// Creates the snapshot directory for a run.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the directory cannot be created.
    pub fn create(base: &Path) -> Result<Self, IngestError> {
        let dir = base.join(chrono::Utc::now().timestamp_millis().to_string());
        std::fs::create_dir_all(&dir)?;
        log::info!("Data logs: {}", dir.display());
        Ok(Self { dir })
    }

    /// Writes `<name>.json` into the run's snapshot directory, best-effort.
    pub fn record<T: Serialize + ?Sized>(&self, name: &str, data: &T) {
        let path = self.dir.join(format!("{name}.json"));
        match serde_json::to_string_pretty(data) {
            Ok(contents) => {
                if let Err(e) = std::fs::write(&path, contents) {
                    log::warn!("Failed to write datalog {}: {e}", path.display());
                } else {
                    log::debug!("Saved datalog: {}", path.display());
                }
            }
            Err(e) => log::warn!("Failed to serialize datalog '{name}': {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_snapshots_as_json_files() {
        let base = std::env::temp_dir().join("penalty_map_datalogs_test");
        let _ = std::fs::remove_dir_all(&base);

        let logs = Datalogs::create(&base).unwrap();
        logs.record("stores_list", &vec!["a", "b"]);

        let run_dir = std::fs::read_dir(&base).unwrap().next().unwrap().unwrap();
        let snapshot = run_dir.path().join("stores_list.json");
        let contents = std::fs::read_to_string(snapshot).unwrap();
        let back: Vec<String> = serde_json::from_str(&contents).unwrap();
        assert_eq!(back, vec!["a", "b"]);

        let _ = std::fs::remove_dir_all(&base);
    }

    #[test]
    fn failed_snapshot_write_does_not_panic() {
        let base = std::env::temp_dir().join("penalty_map_datalogs_test_fail");
        let _ = std::fs::remove_dir_all(&base);

        let logs = Datalogs::create(&base).unwrap();
        // Removing the directory out from under the writer only costs the
        // snapshot, never the run.
        std::fs::remove_dir_all(&base).unwrap();
        logs.record("grouping", &vec!["x"]);

        let _ = std::fs::remove_dir_all(&base);
    }
}
