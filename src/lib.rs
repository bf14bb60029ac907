//! distgrep - Distributed quorum grep
//!
//! distgrep answers pattern-matching queries over line-oriented data that may
//! be partitioned across cooperating nodes. A query is sharded, matched in
//! parallel on every node (the coordinator included), and answered as soon as
//! a quorum of nodes has replied.
//!
//! # Architecture
//!
//! - **Match engine**: fixed-size worker pool over a shared line queue, with a
//!   per-worker match cap and a count-only mode
//! - **Quorum coordinator**: scatter-gather over HTTP with a single deadline,
//!   tolerant of slow and failed peers
//! - **Node service**: HTTP endpoint running the same engine on peers

pub mod config;
pub mod distributed;
pub mod error;
pub mod grep;
pub mod input;
pub mod logging;
pub mod output;
pub mod query;

// Re-export commonly used types
pub use config::{RunConfig, ServeConfig};
pub use error::GrepError;

/// Result type used throughout distgrep
pub type Result<T> = anyhow::Result<T>;
