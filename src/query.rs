//! Query execution
//!
//! Runs one query as configured: directly on the local engine when no peers
//! are given, through the quorum coordinator otherwise.

use crate::config::RunConfig;
use crate::distributed::{Aggregate, CoordinatorConfig, QuorumCoordinator, SELF_NODE};
use crate::error::GrepError;
use crate::grep;
use crate::output::Report;
use std::future::Future;
use tokio::runtime::Runtime;

/// Run `config` over `lines`
pub async fn execute(config: &RunConfig, lines: Vec<String>) -> Result<Report, GrepError> {
    if config.is_local() {
        return execute_local(config, lines).await;
    }

    let coordinator = QuorumCoordinator::new(CoordinatorConfig {
        peers: config.peers.clone(),
        workers: config.workers,
        timeout: config.timeout,
        quorum: config.quorum,
        show_node: config.show_node,
    })?;
    let result = coordinator.run(&config.pattern, config.flags, lines).await?;
    Ok(Report::from(result))
}

/// Drive `future` to completion on `runtime`, then shut the runtime down
/// without waiting for tasks still running on it
///
/// After an early quorum the local engine job may still be scanning its
/// shard; its result is discarded and it must not hold up the caller.
pub fn block_on_detached<F: Future>(runtime: Runtime, future: F) -> F::Output {
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    output
}

/// Local fast path: no quorum, no node counters
async fn execute_local(config: &RunConfig, lines: Vec<String>) -> Result<Report, GrepError> {
    tracing::debug!(lines = lines.len(), workers = config.workers, "running locally");
    let output = grep::run(&config.pattern, &config.flags, lines, config.workers).await?;

    let aggregate = if config.flags.count_only {
        Aggregate::Count(output.count)
    } else if config.show_node {
        Aggregate::Lines(
            output
                .matches
                .into_iter()
                .map(|line| format!("{}\t{}", SELF_NODE, line))
                .collect(),
        )
    } else {
        Aggregate::Lines(output.matches)
    };
    Ok(Report::local(aggregate))
}
