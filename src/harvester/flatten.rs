//! Flattening of resolved reply forests into records

use crate::harvester::expander::ResolvedComment;
use crate::output::FlatRecord;
use chrono::{DateTime, Utc};

/// Converts a resolved forest into one record per comment
///
/// Records come out in pre-order, depth first, keeping the order the
/// forest presents at each level. Every record carries `created_at`, the
/// creation time of the owning post. The text is the raw comment body.
pub fn flatten(forest: &[ResolvedComment], created_at: DateTime<Utc>) -> Vec<FlatRecord> {
    let mut records = Vec::new();
    let mut stack: Vec<&ResolvedComment> = forest.iter().rev().collect();

    while let Some(comment) = stack.pop() {
        records.push(FlatRecord {
            id: comment.id.clone(),
            created_at,
            score: comment.score,
            text: comment.body.clone(),
        });
        stack.extend(comment.replies.iter().rev());
    }

    records
}
