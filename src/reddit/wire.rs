//! JSON shapes of Reddit API responses and their conversion into the
//! domain model

use crate::reddit::{CommentNode, MoreStub, Post, Reply};
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// Maximum number of ids `/api/morechildren` accepts per call
pub(crate) const MORE_CHILDREN_BATCH: usize = 100;

#[derive(Debug, Deserialize)]
pub(crate) struct Listing {
    pub data: ListingData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListingData {
    #[serde(default)]
    pub after: Option<String>,
    pub children: Vec<Thing>,
}

/// A typed Reddit object (`{"kind": ..., "data": {...}}`)
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", content = "data")]
pub(crate) enum Thing {
    #[serde(rename = "t3")]
    Link(LinkData),

    #[serde(rename = "t1")]
    Comment(CommentData),

    #[serde(rename = "more")]
    More(MoreData),
}

#[derive(Debug, Deserialize)]
pub(crate) struct LinkData {
    pub id: String,
    pub title: String,
    pub created_utc: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CommentData {
    pub id: String,
    pub parent_id: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub replies: RepliesField,
}

/// Reddit sends `""` instead of an empty listing for comments without replies
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RepliesField {
    Listing(Box<Listing>),
    Empty(String),
}

impl Default for RepliesField {
    fn default() -> Self {
        Self::Empty(String::new())
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoreData {
    #[serde(default)]
    pub count: u32,
    pub parent_id: String,
    #[serde(default)]
    pub children: Vec<String>,
}

/// Envelope of `/api/morechildren?api_type=json`
#[derive(Debug, Deserialize)]
pub(crate) struct MoreChildrenResponse {
    pub json: MoreChildrenJson,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoreChildrenJson {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    #[serde(default)]
    pub data: Option<MoreChildrenData>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MoreChildrenData {
    #[serde(default)]
    pub things: Vec<Thing>,
}

impl LinkData {
    /// Converts to a [`Post`], or `None` if the timestamp is out of range
    pub fn into_post(self) -> Option<Post> {
        let secs = self.created_utc.trunc() as i64;
        let created_at = Utc.timestamp_opt(secs, 0).single()?;
        Some(Post {
            id: self.id,
            title: self.title,
            created_at,
        })
    }
}

impl From<MoreData> for MoreStub {
    fn from(data: MoreData) -> Self {
        Self {
            count: data.count,
            parent_id: data.parent_id,
            children: data.children,
        }
    }
}

impl Thing {
    /// Converts a comment-tree object into a [`Reply`]; posts yield `None`
    pub fn into_reply(self) -> Option<Reply> {
        match self {
            Thing::Comment(data) => {
                let replies = match data.replies {
                    RepliesField::Listing(listing) => replies_of(*listing),
                    RepliesField::Empty(_) => Vec::new(),
                };
                Some(Reply::Comment(CommentNode {
                    id: data.id,
                    score: data.score,
                    body: data.body,
                    replies,
                }))
            }
            Thing::More(data) => Some(Reply::More(data.into())),
            Thing::Link(_) => None,
        }
    }
}

/// Converts the children of a comment listing into a reply forest
pub(crate) fn replies_of(listing: Listing) -> Vec<Reply> {
    listing
        .data
        .children
        .into_iter()
        .filter_map(Thing::into_reply)
        .collect()
}

/// Rebuilds the subtree hanging off `parent_id` from the flat, depth-first
/// list of things returned by `/api/morechildren`
///
/// Things whose parent is neither `parent_id` nor another thing of the batch
/// are dropped.
pub(crate) fn assemble_more_children(things: Vec<Thing>, parent_id: &str) -> Vec<Reply> {
    // Parents precede their children, so walking backwards sees every
    // child before the comment that adopts it.
    let mut by_parent: HashMap<String, Vec<Reply>> = HashMap::new();

    for thing in things.into_iter().rev() {
        let (parent, reply) = match thing {
            Thing::Comment(data) => {
                let mut replies = by_parent
                    .remove(&format!("t1_{}", data.id))
                    .unwrap_or_default();
                replies.reverse();
                let node = CommentNode {
                    id: data.id,
                    score: data.score,
                    body: data.body,
                    replies,
                };
                (data.parent_id, Reply::Comment(node))
            }
            Thing::More(data) => (data.parent_id.clone(), Reply::More(data.into())),
            Thing::Link(_) => continue,
        };
        by_parent.entry(parent).or_default().push(reply);
    }

    let mut roots = by_parent.remove(parent_id).unwrap_or_default();
    roots.reverse();

    if !by_parent.is_empty() {
        tracing::debug!(
            "Dropped {} orphaned groups while assembling replies of {}",
            by_parent.len(),
            parent_id
        );
    }

    roots
}

/// Splits a stub's child ids into the batch sent now and a stub for the rest
pub(crate) fn split_stub(stub: &MoreStub) -> (Vec<String>, Option<MoreStub>) {
    if stub.children.len() <= MORE_CHILDREN_BATCH {
        return (stub.children.clone(), None);
    }

    let (now, later) = stub.children.split_at(MORE_CHILDREN_BATCH);
    let rest = MoreStub {
        count: stub.count.saturating_sub(MORE_CHILDREN_BATCH as u32),
        parent_id: stub.parent_id.clone(),
        children: later.to_vec(),
    };
    (now.to_vec(), Some(rest))
}
