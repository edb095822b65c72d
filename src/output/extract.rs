//! Plain-text extraction from a persisted harvest
//!
//! Turns a `scrape_*.json` file into one line of comment text per record,
//! preserving record order.

use crate::HarvestError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// The only part of a persisted record extraction needs
#[derive(Debug, Deserialize)]
struct TextOnly {
    text: String,
}

/// Reads the text of every record in a persisted harvest file
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Record texts in file order
/// * `Err(HarvestError::MalformedInput)` - The file is not an array of records
/// * `Err(HarvestError::Io)` - The file could not be read
pub fn read_texts(input: &Path) -> Result<Vec<String>, HarvestError> {
    let content = fs::read_to_string(input)?;
    let records: Vec<TextOnly> =
        serde_json::from_str(&content).map_err(|source| HarvestError::MalformedInput {
            path: input.to_path_buf(),
            source,
        })?;

    Ok(records.into_iter().map(|r| r.text).collect())
}

/// Renders texts as newline-terminated lines
pub fn render_lines(texts: &[String]) -> String {
    let mut out = String::with_capacity(texts.iter().map(|t| t.len() + 1).sum());
    for text in texts {
        out.push_str(text);
        out.push('\n');
    }
    out
}

/// Extracts `input` into `directory/file_name`, overwriting any previous file
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written text file
/// * `Err(HarvestError)` - The input is malformed or a file operation failed
pub fn extract_to_file(
    input: &Path,
    directory: &Path,
    file_name: &str,
) -> Result<PathBuf, HarvestError> {
    let texts = read_texts(input)?;

    fs::create_dir_all(directory)?;
    let target = directory.join(file_name);
    fs::write(&target, render_lines(&texts))?;

    tracing::info!(
        "Extracted {} comments from {} to {}",
        texts.len(),
        input.display(),
        target.display()
    );
    Ok(target)
}
