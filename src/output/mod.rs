//! Output module for harvest results
//!
//! This module handles:
//! - The flat record format persisted for each kept comment
//! - Writing a run's records as one JSON file
//! - Extracting plain comment text from a persisted file
//! - Recording and reporting run metrics

mod extract;
mod record;
pub mod stats;
mod writer;

pub use extract::{extract_to_file, read_texts, render_lines};
pub use record::FlatRecord;
pub use stats::{print_summary, RunMetrics};
pub use writer::{output_file_name, to_pretty_json, write_records};
