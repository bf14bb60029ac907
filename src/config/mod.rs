//! Configuration module
//!
//! Handles CLI argument parsing, TOML configuration files, and validation.
//! Command-line flags take precedence over file values, which take precedence
//! over the built-in defaults below.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;

use crate::distributed::protocol::MatchFlags;
use std::path::PathBuf;
use std::time::Duration;

/// Default listen address of `serve`
pub const DEFAULT_ADDR: &str = ":8080";

/// Default per-node worker count of `serve`
pub const DEFAULT_NODE_WORKERS: usize = crate::grep::DEFAULT_WORKERS;

/// Default overall deadline of a distributed query
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Node server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    /// Listen address; a leading `:` means all interfaces
    pub addr: String,
    /// Identifier reported in every response
    pub node_id: String,
    /// Worker count used when a request does not ask for one
    pub workers: usize,
    /// Fallback data when a request carries no lines
    pub data_file: Option<PathBuf>,
}

/// Query configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub pattern: String,
    pub flags: MatchFlags,
    /// Input file, `None` reads stdin
    pub file: Option<PathBuf>,
    /// Normalized peer base URLs
    pub peers: Vec<String>,
    pub workers: usize,
    pub timeout: Duration,
    /// Explicit quorum, `None` selects a majority
    pub quorum: Option<usize>,
    pub json: bool,
    pub show_node: bool,
}

impl RunConfig {
    /// Total participating nodes (self + peers)
    pub fn total_nodes(&self) -> usize {
        self.peers.len() + 1
    }

    /// Whether the query runs on this process only
    pub fn is_local(&self) -> bool {
        self.peers.is_empty()
    }
}
