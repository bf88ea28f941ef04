//! Final collation and atomic persistence.
//!
//! Collation re-pairs the crawl and geocode stage outputs. Both carry
//! their [`penalty_map_models::GroupKey`] with them, so pairing is
//! verified, not assumed: a length or key mismatch means an upstream
//! ordering bug, and the run aborts without writing anything.
//!
//! Persistence ordering is the invariant that makes retries safe: the
//! dataset file is written (atomically) first, and the watermark advances
//! only after that write succeeds.

use std::path::Path;

use penalty_map_models::{CollatedRecord, Dataset};

use crate::crawl::CrawledGroup;
use crate::geocode::GeocodedGroup;
use crate::{IngestError, watermark};

/// Zips crawl results with geocode results into the final records.
///
/// # Errors
///
/// Returns [`IngestError::Collation`] if the sequences differ in length or
/// any pair of keys disagrees — nothing is ever silently dropped or
/// re-paired.
pub fn collate(
    crawled: Vec<CrawledGroup>,
    geocoded: Vec<GeocodedGroup>,
) -> Result<Vec<CollatedRecord>, IngestError> {
    if crawled.len() != geocoded.len() {
        return Err(IngestError::Collation {
            message: format!(
                "crawl and geocode result counts differ: {} vs {}",
                crawled.len(),
                geocoded.len()
            ),
        });
    }

    crawled
        .into_iter()
        .zip(geocoded)
        .map(|(unit, resolved)| {
            if unit.key != resolved.key {
                return Err(IngestError::Collation {
                    message: format!(
                        "group key mismatch: crawled '{}' vs geocoded '{}'",
                        unit.key, resolved.key
                    ),
                });
            }
            Ok(CollatedRecord {
                name: unit.key.name,
                address: resolved.result,
                notices: unit.notices,
            })
        })
        .collect()
}

/// Writes the dataset to `output`, atomically (`.tmp` + rename).
///
/// # Errors
///
/// Returns [`IngestError`] if serialization or the write fails. On
/// failure the previous output file, if any, is left intact.
pub fn persist(output: &Path, dataset: &Dataset) -> Result<(), IngestError> {
    let contents = serde_json::to_string_pretty(dataset)?;

    let mut tmp = output.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = std::path::PathBuf::from(tmp);

    std::fs::write(&tmp, contents)?;
    std::fs::rename(&tmp, output)?;
    log::info!("Saved data file to {}", output.display());
    Ok(())
}

/// Writes the dataset, then advances the watermark.
///
/// The ordering is the invariant: the watermark must never move unless the
/// matching dataset write succeeded, so a crash between the two writes
/// leaves a stale watermark and the next run simply redoes the work.
///
/// # Errors
///
/// Returns [`IngestError`] if either write fails.
pub fn persist_and_advance(
    output: &Path,
    watermark_path: &Path,
    dataset: &Dataset,
) -> Result<(), IngestError> {
    persist(output, dataset)?;
    watermark::store(watermark_path, &dataset.last_updated)?;
    log::info!("Watermark advanced to \"{}\"", dataset.last_updated);
    Ok(())
}

#[cfg(test)]
mod tests {
    use penalty_map_models::{
        DetailRecord, GeocodeResult, GeocodeSentinel, GroupKey, NoticeResult,
    };

    use super::*;

    fn key(name: &str) -> GroupKey {
        GroupKey {
            name: name.to_owned(),
            locality: "X".to_owned(),
        }
    }

    fn crawled(name: &str) -> CrawledGroup {
        CrawledGroup {
            key: key(name),
            notices: vec![NoticeResult::Notice(DetailRecord::default())],
        }
    }

    fn geocoded(name: &str) -> GeocodedGroup {
        GeocodedGroup {
            key: key(name),
            result: GeocodeSentinel::NoAddress.into(),
        }
    }

    #[test]
    fn collates_in_group_order() {
        let records = collate(
            vec![crawled("A"), crawled("B"), crawled("C")],
            vec![geocoded("A"), geocoded("B"), geocoded("C")],
        )
        .unwrap();

        assert_eq!(records.len(), 3);
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(records[0].notices.len(), 1);
        assert!(matches!(records[0].address, GeocodeResult::Sentinel(_)));
    }

    #[test]
    fn length_mismatch_is_fatal() {
        let err = collate(vec![crawled("A"), crawled("B")], vec![geocoded("A")]).unwrap_err();
        assert!(matches!(err, IngestError::Collation { .. }));
        assert!(err.to_string().contains("2 vs 1"));
    }

    #[test]
    fn key_mismatch_is_fatal() {
        let err = collate(vec![crawled("A")], vec![geocoded("B")]).unwrap_err();
        assert!(matches!(err, IngestError::Collation { .. }));
        assert!(err.to_string().contains("mismatch"));
    }

    #[test]
    fn persist_failure_leaves_the_watermark_alone() {
        let dir = std::env::temp_dir().join("penalty_map_collate_test_ordering");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let watermark_path = dir.join(".lastupdated");
        watermark::store(&watermark_path, "12 March 2020").unwrap();

        let dataset = Dataset {
            last_updated: "19 March 2020".to_owned(),
            data: vec![],
        };

        // Output path inside a directory that does not exist.
        let bad_output = dir.join("missing").join("out.json");
        let result = persist_and_advance(&bad_output, &watermark_path, &dataset);

        assert!(result.is_err());
        assert_eq!(watermark::load(&watermark_path).unwrap(), "12 March 2020");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn persist_then_advance_updates_both_files() {
        let dir = std::env::temp_dir().join("penalty_map_collate_test_advance");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let watermark_path = dir.join(".lastupdated");
        let output = dir.join("out.json");
        let dataset = Dataset {
            last_updated: "19 March 2020".to_owned(),
            data: vec![],
        };

        persist_and_advance(&output, &watermark_path, &dataset).unwrap();

        let written: Dataset =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written, dataset);
        assert_eq!(watermark::load(&watermark_path).unwrap(), "19 March 2020");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
