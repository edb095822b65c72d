//! Comment tree expansion
//!
//! Resolves the "more replies" stubs of a post's reply forest under a depth
//! budget. Stubs in the loaded forest are at depth 1; stubs revealed by
//! resolving a depth-k stub are at depth k+1. Stubs beyond the budget are
//! dropped from the result.
//!
//! Resolution runs from an explicit FIFO worklist, and the final forest is
//! assembled with an explicit stack, so deep threads never deepen the call
//! stack.

use crate::config::HarvestConfig;
use crate::harvester::limiter::RateLimiter;
use crate::reddit::{ApiError, ApiResult, CommentNode, MoreStub, Post, RedditApi, Reply};
use crate::HarvestError;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::time::Duration;

/// A comment whose whole subtree is loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedComment {
    pub id: String,
    pub score: i64,
    pub body: String,
    pub replies: Vec<ResolvedComment>,
}

impl ResolvedComment {
    fn from_node(node: &CommentNode, replies: Vec<ResolvedComment>) -> Self {
        Self {
            id: node.id.clone(),
            score: node.score,
            body: node.body.clone(),
            replies,
        }
    }
}

/// Limits applied while expanding one post
#[derive(Debug, Clone)]
pub struct ExpansionPolicy {
    /// Deepest stub that is still resolved (0 resolves nothing)
    pub max_depth: u32,

    /// Retries of a transient failure before giving up
    pub max_retries: u32,

    /// Delay before the first retry; doubles on each further retry
    pub retry_backoff: Duration,
}

impl ExpansionPolicy {
    /// Builds the policy from the `[harvest]` config section
    pub fn from_config(config: &HarvestConfig) -> Self {
        Self {
            max_depth: config.expansion_depth,
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    /// Delay before retry number `attempt` (0-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.retry_backoff.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Result of expanding one post
#[derive(Debug, Clone)]
pub struct Expansion {
    /// The reply forest with every resolved stub spliced in place
    pub forest: Vec<ResolvedComment>,

    /// Expansion calls issued
    pub calls: u32,

    /// Stubs left unresolved because they were beyond the depth budget
    pub truncated: u32,
}

/// Issues one throttled upstream call, retrying transient failures
///
/// Each attempt is throttled. Between attempts the backoff of
/// [`ExpansionPolicy::backoff`] is added on top of the throttle.
pub(crate) async fn call_with_retry<T, F, Fut, L>(
    limiter: &mut L,
    policy: &ExpansionPolicy,
    post: &Post,
    mut call: F,
) -> Result<T, HarvestError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ApiResult<T>>,
    L: RateLimiter + ?Sized,
{
    let mut attempt = 0;
    loop {
        limiter.throttle().await;
        match call().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < policy.max_retries => {
                let delay = policy.backoff(attempt);
                attempt += 1;
                tracing::warn!(
                    "Transient failure on post {} ({}), retry {}/{} in {:?}",
                    post.id,
                    e,
                    attempt,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
            }
            Err(ApiError::Auth(message)) => return Err(HarvestError::Authentication(message)),
            Err(e) => {
                return Err(HarvestError::Expansion {
                    post_id: post.id.clone(),
                    reason: e.to_string(),
                })
            }
        }
    }
}

/// Resolves the stubs of `forest` and returns the assembled forest
///
/// # Arguments
///
/// * `api` - The upstream API
/// * `limiter` - Throttle awaited before every expansion call
/// * `post` - The post owning the forest
/// * `forest` - The loaded, possibly stub-laden, reply forest
/// * `policy` - Depth budget and retry settings
///
/// # Returns
///
/// * `Ok(Expansion)` - The resolved forest
/// * `Err(HarvestError::Expansion)` - An expansion call failed for good
pub async fn expand_forest<A, L>(
    api: &A,
    limiter: &mut L,
    post: &Post,
    forest: &[Reply],
    policy: &ExpansionPolicy,
) -> Result<Expansion, HarvestError>
where
    A: RedditApi + ?Sized,
    L: RateLimiter + ?Sized,
{
    let mut worklist = VecDeque::new();
    collect_stubs(forest, 1, &mut worklist);

    let mut resolutions: HashMap<MoreStub, Vec<Reply>> = HashMap::new();
    let mut calls = 0;
    let mut truncated = 0;

    while let Some((stub, depth)) = worklist.pop_front() {
        if depth > policy.max_depth {
            truncated += 1;
            continue;
        }
        if resolutions.contains_key(&stub) {
            continue;
        }

        tracing::debug!(
            "Expanding {} hidden replies under {} (depth {})",
            stub.count,
            stub.parent_id,
            depth
        );

        let stub_ref = &stub;
        let batch = call_with_retry(&mut *limiter, policy, post, move || {
            api.expand_replies(post, stub_ref)
        })
        .await?;
        calls += 1;

        collect_stubs(&batch, depth + 1, &mut worklist);
        resolutions.insert(stub, batch);
    }

    if truncated > 0 {
        tracing::debug!(
            "Post {}: {} stubs beyond depth {} left unresolved",
            post.id,
            truncated,
            policy.max_depth
        );
    }

    Ok(Expansion {
        forest: assemble(forest, &resolutions),
        calls,
        truncated,
    })
}

/// Queues every stub in `forest` at the given depth, in pre-order
fn collect_stubs(forest: &[Reply], depth: u32, worklist: &mut VecDeque<(MoreStub, u32)>) {
    let mut stack: Vec<&Reply> = forest.iter().rev().collect();
    while let Some(reply) = stack.pop() {
        match reply {
            Reply::Comment(node) => stack.extend(node.replies.iter().rev()),
            Reply::More(stub) => worklist.push_back((stub.clone(), depth)),
        }
    }
}

struct Frame<'a> {
    node: Option<&'a CommentNode>,
    pending: VecDeque<&'a Reply>,
    built: Vec<ResolvedComment>,
}

impl<'a> Frame<'a> {
    fn new(node: Option<&'a CommentNode>, replies: &'a [Reply]) -> Self {
        Self {
            node,
            pending: replies.iter().collect(),
            built: Vec::new(),
        }
    }
}

/// Builds the stub-free forest, splicing each resolved stub's replies in at
/// the stub's position and dropping unresolved stubs
fn assemble(
    forest: &[Reply],
    resolutions: &HashMap<MoreStub, Vec<Reply>>,
) -> Vec<ResolvedComment> {
    let mut stack = vec![Frame::new(None, forest)];

    while let Some(frame) = stack.last_mut() {
        match frame.pending.pop_front() {
            Some(Reply::Comment(node)) => {
                stack.push(Frame::new(Some(node), &node.replies));
            }
            Some(Reply::More(stub)) => {
                if let Some(batch) = resolutions.get(stub) {
                    for reply in batch.iter().rev() {
                        frame.pending.push_front(reply);
                    }
                }
            }
            None => {
                let Some(done) = stack.pop() else { break };
                let Some(node) = done.node else {
                    return done.built;
                };
                let resolved = ResolvedComment::from_node(node, done.built);
                if let Some(parent) = stack.last_mut() {
                    parent.built.push(resolved);
                }
            }
        }
    }

    Vec::new()
}
