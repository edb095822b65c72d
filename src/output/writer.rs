//! JSON persistence of harvested records

use crate::output::record::FlatRecord;
use crate::HarvestError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::{Path, PathBuf};

/// Returns the output file name for a run started at `started_at`
pub fn output_file_name(started_at: DateTime<Utc>) -> String {
    format!("scrape_{}.json", started_at.format("%Y-%m-%d_%H-%M-%S"))
}

/// Serializes records as a pretty-printed JSON array (4-space indent)
pub fn to_pretty_json(records: &[FlatRecord]) -> Result<Vec<u8>, HarvestError> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer)?;
    Ok(buf)
}

/// Writes `records` to `directory/file_name`
///
/// The file is first written under a temporary name and then renamed, so a
/// reader sees either the complete file or nothing.
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(HarvestError)` - Failed to create the directory or write the file
pub fn write_records(
    records: &[FlatRecord],
    directory: &Path,
    file_name: &str,
) -> Result<PathBuf, HarvestError> {
    fs::create_dir_all(directory)?;

    let target = directory.join(file_name);
    let staging = directory.join(format!(".{}.partial", file_name));

    let bytes = to_pretty_json(records)?;
    let staged = fs::write(&staging, bytes).and_then(|()| fs::rename(&staging, &target));
    if let Err(e) = staged {
        // a failed write may have left a truncated staging file behind
        let _ = fs::remove_file(&staging);
        return Err(e.into());
    }

    tracing::info!("Wrote {} records to {}", records.len(), target.display());
    Ok(target)
}
