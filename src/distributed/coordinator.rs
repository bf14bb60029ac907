//! Distributed coordinator
//!
//! This module implements the scatter-gather quorum coordinator.
//! For one query the coordinator:
//! - Validates the quorum against the node count
//! - Shards the input round-robin (shard 0 stays local)
//! - Launches one local engine job and one remote job per peer, all before
//!   waiting on anything
//! - Collects completions in arrival order until quorum, deadline, or
//!   exhaustion
//! - Aggregates the successful replies
//!
//! # Lifecycle
//!
//! ```text
//! Dispatched ──> Collecting ──┬──> QuorumReached   (Ok)
//!                             ├──> TimedOut        (GrepError::QuorumTimeout)
//!                             └──> Unreachable     (GrepError::QuorumUnreachable)
//! ```
//!
//! Each remote call is bounded by half the deadline, so a silent peer usually
//! fails before the deadline itself. When every node has answered without
//! quorum and at least one of them failed on its call timeout, the outcome is
//! still reported as `QuorumTimeout`.
//!
//! Remote calls still pending when the coordinator returns are cancelled. The
//! local engine job is left to finish on its own; the completion channel is
//! sized to the node count so its late send never blocks.

use crate::distributed::client::{normalize_address, NodeClient};
use crate::distributed::protocol::{MatchFlags, MatchRequest, MatchResponse};
use crate::distributed::quorum::QuorumPlan;
use crate::distributed::shard::shard_lines;
use crate::error::GrepError;
use crate::grep;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Label of the local node in aggregated output
pub const SELF_NODE: &str = "self";

/// Coordinator settings for one query
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Normalized peer base URLs; shard `i + 1` goes to `peers[i]`
    pub peers: Vec<String>,
    /// Workers per node, 0 = node default
    pub workers: usize,
    /// Overall deadline
    pub timeout: Duration,
    /// Explicit quorum, `None` = majority
    pub quorum: Option<usize>,
    /// Prefix aggregated lines with `<node>\t`
    pub show_node: bool,
}

/// Aggregated answer of the successful nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Aggregate {
    /// Sum of counts (count-only queries)
    Count(u64),
    /// Matched lines in arrival order, optionally node-labelled
    Lines(Vec<String>),
}

/// Successful query result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryResult {
    pub nodes_ok: usize,
    pub nodes_total: usize,
    pub aggregate: Aggregate,
}

/// Completion signal of one node job
#[derive(Debug)]
struct Completion {
    node: String,
    result: Result<MatchResponse, GrepError>,
}

/// Per-query accumulator
#[derive(Debug, Default)]
struct Collected {
    ok_count: usize,
    total_count: u64,
    lines: Vec<String>,
    replies_seen: usize,
    calls_timed_out: usize,
}

impl Collected {
    fn accept(&mut self, response: MatchResponse, count_only: bool, show_node: bool) {
        self.ok_count += 1;
        self.total_count += response.count;
        if count_only {
            return;
        }
        if show_node {
            let node = response.node;
            self.lines
                .extend(response.matches.into_iter().map(|line| format!("{}\t{}", node, line)));
        } else {
            self.lines.extend(response.matches);
        }
    }

    fn finish(self, plan: &QuorumPlan, count_only: bool) -> QueryResult {
        let aggregate = if count_only {
            Aggregate::Count(self.total_count)
        } else {
            Aggregate::Lines(self.lines)
        };
        QueryResult {
            nodes_ok: self.ok_count,
            nodes_total: plan.total_nodes(),
            aggregate,
        }
    }
}

/// Distributed coordinator
///
/// Orchestrates one query across the local engine and the configured peers.
pub struct QuorumCoordinator {
    config: CoordinatorConfig,
    client: NodeClient,
}

impl QuorumCoordinator {
    /// Create a new coordinator
    pub fn new(config: CoordinatorConfig) -> Result<Self, GrepError> {
        let client = NodeClient::new(config.timeout)?;
        Ok(Self { config, client })
    }

    /// Quorum plan for the configured peers
    pub fn plan(&self) -> Result<QuorumPlan, GrepError> {
        QuorumPlan::new(self.config.peers.len() + 1, self.config.quorum)
    }

    /// Run one query
    ///
    /// Returns as soon as `required` nodes have succeeded. Fails with
    /// `InvalidQuorum` before dispatching anything, or with `QuorumTimeout` /
    /// `QuorumUnreachable` carrying the number of successes collected.
    pub async fn run(&self, pattern: &str, flags: MatchFlags, lines: Vec<String>) -> Result<QueryResult, GrepError> {
        let plan = self.plan()?;
        let deadline = Instant::now() + self.config.timeout;
        let total = plan.total_nodes();

        tracing::info!(
            nodes = total,
            required = plan.required(),
            lines = lines.len(),
            timeout = ?self.config.timeout,
            "dispatching query"
        );

        let mut shards = shard_lines(lines, total).into_iter();
        let local_shard = shards.next().unwrap_or_default();

        let (tx, mut rx) = mpsc::channel::<Completion>(total);
        let cancel = CancellationToken::new();
        let stamp = job_stamp();

        self.spawn_local(format!("job-{}-0", stamp), pattern, flags, local_shard, tx.clone());

        for (i, (peer, shard)) in self.config.peers.iter().zip(shards).enumerate() {
            let request = MatchRequest {
                job_id: format!("job-{}-{}", stamp, i + 1),
                pattern: pattern.to_string(),
                flags,
                lines: shard,
                workers: self.config.workers,
            };
            self.spawn_remote(normalize_address(peer), request, cancel.clone(), tx.clone());
        }
        drop(tx);

        // Stragglers are cancelled on every exit path.
        let _cancel_on_return = cancel.drop_guard();

        let mut collected = Collected::default();
        while collected.replies_seen < total {
            let completion = match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(completion)) => completion,
                Ok(None) => break,
                Err(_) => {
                    tracing::warn!(
                        ok = collected.ok_count,
                        required = plan.required(),
                        seen = collected.replies_seen,
                        "deadline elapsed before quorum"
                    );
                    return Err(GrepError::QuorumTimeout {
                        ok: collected.ok_count,
                        required: plan.required(),
                    });
                }
            };

            collected.replies_seen += 1;
            match completion.result {
                Ok(response) => {
                    tracing::debug!(node = %completion.node, count = response.count, "node succeeded");
                    collected.accept(response, flags.count_only, self.config.show_node);
                }
                Err(e) => {
                    if matches!(e, GrepError::CallTimeout(_)) {
                        collected.calls_timed_out += 1;
                    }
                    tracing::warn!(node = %completion.node, error = %e, "node error");
                }
            }

            if collected.ok_count >= plan.required() {
                tracing::info!(
                    ok = collected.ok_count,
                    seen = collected.replies_seen,
                    total,
                    "quorum reached"
                );
                return Ok(collected.finish(&plan, flags.count_only));
            }
        }

        tracing::warn!(ok = collected.ok_count, required = plan.required(), "all nodes replied without quorum");
        // A peer that ran out of time counts against the deadline, not reachability.
        if collected.calls_timed_out > 0 {
            return Err(GrepError::QuorumTimeout {
                ok: collected.ok_count,
                required: plan.required(),
            });
        }
        Err(GrepError::QuorumUnreachable {
            ok: collected.ok_count,
            required: plan.required(),
        })
    }

    fn spawn_local(
        &self,
        job_id: String,
        pattern: &str,
        flags: MatchFlags,
        shard: Vec<String>,
        tx: mpsc::Sender<Completion>,
    ) {
        let pattern = pattern.to_string();
        let workers = self.config.workers;
        tokio::spawn(async move {
            let result = grep::run(&pattern, &flags, shard, workers)
                .await
                .map(|output| MatchResponse::success(job_id, SELF_NODE, output.matches, output.count));
            let _ = tx
                .send(Completion {
                    node: SELF_NODE.to_string(),
                    result,
                })
                .await;
        });
    }

    fn spawn_remote(
        &self,
        node: String,
        request: MatchRequest,
        cancel: CancellationToken,
        tx: mpsc::Sender<Completion>,
    ) {
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.dispatch_until(&node, &request, &cancel).await;
            let _ = tx.send(Completion { node, result }).await;
        });
    }
}

/// Timestamp shared by the job ids of one query
fn job_stamp() -> i64 {
    let now = chrono::Utc::now();
    now.timestamp_nanos_opt().unwrap_or_else(|| now.timestamp_micros())
}
