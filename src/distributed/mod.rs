//! Distributed mode implementation
//!
//! This module implements quorum queries across multiple nodes.
//!
//! # Architecture
//!
//! distgrep distributed mode uses a coordinator-node architecture:
//!
//! - **Coordinator**: Shards the input, dispatches one job per node (itself
//!   included), and answers as soon as a quorum of nodes has succeeded
//! - **Node Service**: Runs on peers, executes match jobs over HTTP
//! - **Workers**: Engine threads on every node matching lines from a shared queue
//!
//! # Modules
//!
//! - `protocol`: Wire types and endpoint paths
//! - `shard`: Round-robin input partitioning
//! - `quorum`: Quorum plan computation
//! - `client`: HTTP client for peer nodes
//! - `coordinator`: Scatter-gather quorum coordinator
//! - `node_service`: Node service implementation

pub mod protocol;
pub mod shard;
pub mod quorum;
pub mod client;
pub mod coordinator;
pub mod node_service;

// Re-export key types
pub use protocol::{MatchFlags, MatchMode, MatchRequest, MatchResponse, API_PATH_GREP, API_PATH_HEALTH};

pub use client::NodeClient;
pub use coordinator::{Aggregate, CoordinatorConfig, QueryResult, QuorumCoordinator, SELF_NODE};
pub use node_service::NodeService;
pub use quorum::QuorumPlan;
pub use shard::shard_lines;
