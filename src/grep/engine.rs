//! Parallel match engine
//!
//! Fans a line sequence out to a fixed-size pool of workers through a bounded
//! multi-consumer queue and fans the results back in through a bounded event
//! channel:
//!
//! ```text
//!                 ┌─> worker 0 ─┐
//! feeder ─queue─> ├─> worker 1 ─┼─events─> collector ─> MatchOutput
//!                 └─> worker N ─┘
//! ```
//!
//! Matching is CPU-bound, so the feeder and the workers run as scoped threads
//! inside a single blocking task while the collector stays async. Worker
//! counts are clamped to `MAX_WORKERS`.
//!
//! # Per-worker cap
//!
//! `max_per_worker` is enforced by each worker against its own running
//! count. A worker that reaches it stops pulling from the queue and leaves the
//! remaining lines to the others, so the aggregate count can exceed the cap.

use crate::distributed::protocol::MatchFlags;
use crate::error::GrepError;
use crate::grep::matcher::Matcher;
use crossbeam::channel::{self, Receiver};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Worker count used when the caller passes 0
pub const DEFAULT_WORKERS: usize = 4;

/// Capacity of the line queue and of the event channel
pub const QUEUE_CAPACITY: usize = 1024;

/// Result of one engine run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchOutput {
    /// Matched lines in completion order; always empty in count-only mode
    pub matches: Vec<String>,
    /// Sum of every worker's final match count
    pub count: u64,
}

/// Messages from workers to the collector
#[derive(Debug)]
enum WorkerEvent {
    Matched(String),
    /// Final local count; only sent when it is non-zero
    Finished { worker_id: usize, count: u64 },
}

/// Upper bound on workers per run; larger requests are clamped
pub const MAX_WORKERS: usize = 1024;

/// Resolve a requested worker count, 0 meaning the process default
pub fn resolve_workers(requested: usize) -> usize {
    if requested == 0 {
        DEFAULT_WORKERS
    } else {
        requested.min(MAX_WORKERS)
    }
}

/// Match `lines` against `pattern` with `workers` concurrent workers
///
/// Fails only when the pattern does not compile (or a worker panics).
pub async fn run(
    pattern: &str,
    flags: &MatchFlags,
    lines: Vec<String>,
    workers: usize,
) -> Result<MatchOutput, GrepError> {
    let matcher = Matcher::compile(pattern, flags)?;
    let workers = resolve_workers(workers);

    tracing::debug!(
        lines = lines.len(),
        workers,
        cap = flags.max_per_worker,
        count_only = flags.count_only,
        "starting match engine"
    );

    let (event_tx, mut event_rx) = mpsc::channel::<WorkerEvent>(QUEUE_CAPACITY);
    let cap = flags.max_per_worker;
    let count_only = flags.count_only;

    // The whole pool occupies one blocking-pool slot; workers are scoped
    // threads of their own, so any worker count makes progress.
    let pool: JoinHandle<Result<(), GrepError>> =
        tokio::task::spawn_blocking(move || run_pool(&matcher, lines, workers, cap, count_only, event_tx));

    let mut output = MatchOutput::default();
    while let Some(event) = event_rx.recv().await {
        match event {
            WorkerEvent::Matched(line) => output.matches.push(line),
            WorkerEvent::Finished { worker_id, count } => {
                tracing::trace!(worker_id, count, "worker finished");
                output.count += count;
            }
        }
    }

    pool.await.map_err(|e| GrepError::Worker(e.to_string()))??;

    if flags.count_only {
        output.matches.clear();
    }
    Ok(output)
}

/// Feed `lines` to `workers` scoped threads and wait for all of them
///
/// The feeder starts before any worker. It stops early once every worker has
/// dropped its end of the queue.
fn run_pool(
    matcher: &Matcher,
    lines: Vec<String>,
    workers: usize,
    cap: u64,
    count_only: bool,
    events: mpsc::Sender<WorkerEvent>,
) -> Result<(), GrepError> {
    let (line_tx, line_rx) = channel::bounded::<String>(QUEUE_CAPACITY);

    crossbeam::scope(|scope| {
        scope.spawn(move |_| {
            for line in lines {
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        });

        for worker_id in 0..workers {
            let queue = line_rx.clone();
            let events = events.clone();
            scope.spawn(move |_| worker_loop(worker_id, matcher, cap, count_only, queue, events));
        }
        // Workers own the only remaining handles: the queue disconnects once
        // every worker has stopped, and the event stream ends once every
        // worker is done.
        drop(line_rx);
        drop(events);
    })
    .map_err(|_| GrepError::Worker("match worker panicked".to_string()))
}

fn worker_loop(
    worker_id: usize,
    matcher: &Matcher,
    cap: u64,
    count_only: bool,
    queue: Receiver<String>,
    events: mpsc::Sender<WorkerEvent>,
) {
    let mut count = 0u64;
    for line in queue.iter() {
        if !matcher.is_match(&line) {
            continue;
        }
        if !count_only && events.blocking_send(WorkerEvent::Matched(line)).is_err() {
            return;
        }
        count += 1;
        if cap > 0 && count >= cap {
            break;
        }
    }
    if count > 0 {
        let _ = events.blocking_send(WorkerEvent::Finished { worker_id, count });
    }
}
