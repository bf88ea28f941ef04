//! Change detection against the persisted register watermark.
//!
//! The watermark is the register's self-reported "Last updated on" marker,
//! stored verbatim in a single-line file. Comparison is exact byte
//! equality — no trimming, no date parsing. The file only advances after a
//! successful dataset write (see [`crate::collate::persist_and_advance`]).

use std::path::Path;

use crate::IngestError;

/// Loads the persisted watermark. A missing file reads as the empty string
/// (the first-ever run).
///
/// # Errors
///
/// Returns [`IngestError`] for any I/O failure other than the file being
/// absent.
pub fn load(path: &Path) -> Result<String, IngestError> {
    match std::fs::read_to_string(path) {
        Ok(stored) => Ok(stored),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Whether a full crawl should run.
///
/// Exact string comparison; an empty stored watermark always reads as
/// changed.
#[must_use]
pub fn has_changed(fresh: &str, stored: &str) -> bool {
    stored.is_empty() || fresh != stored
}

/// Persists `marker` as the new watermark, atomically.
///
/// # Errors
///
/// Returns [`IngestError`] if the write fails.
pub fn store(path: &Path, marker: &str) -> Result<(), IngestError> {
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, marker)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
