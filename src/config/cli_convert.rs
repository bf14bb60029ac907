//! CLI to Config conversion utilities
//!
//! Merges parsed arguments with the optional configuration file and fills in
//! defaults.

use crate::config::cli::{RunArgs, ServeArgs};
use crate::config::toml::{RunSection, ServeSection};
use crate::config::{RunConfig, ServeConfig, DEFAULT_ADDR, DEFAULT_NODE_WORKERS, DEFAULT_TIMEOUT};
use crate::distributed::client::{normalize_address, split_peers};
use crate::distributed::protocol::MatchFlags;
use crate::Result;
use anyhow::Context;
use std::time::Duration;

/// Build the node server configuration (CLI takes precedence)
pub fn serve_config(cli: &ServeArgs, file: &ServeSection) -> ServeConfig {
    let addr = cli
        .addr
        .clone()
        .or_else(|| file.addr.clone())
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());
    let node_id = cli
        .node
        .clone()
        .or_else(|| file.node.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| addr.clone());

    ServeConfig {
        addr,
        node_id,
        workers: cli.workers.or(file.workers).unwrap_or(DEFAULT_NODE_WORKERS),
        data_file: cli.data_file.clone().or_else(|| file.data_file.clone()),
    }
}

/// Build the query configuration (CLI takes precedence)
pub fn run_config(cli: &RunArgs, file: &RunSection) -> Result<RunConfig> {
    let pattern = cli
        .pattern
        .clone()
        .filter(|p| !p.is_empty())
        .or_else(|| cli.positional.first().cloned())
        .or_else(|| file.pattern.clone())
        .unwrap_or_default();

    let peers = match &cli.peers {
        Some(list) => split_peers(list),
        None => file
            .peers
            .iter()
            .map(|p| p.trim())
            .filter(|p| !p.is_empty())
            .map(normalize_address)
            .collect(),
    };

    let timeout = match cli.timeout.as_deref().or(file.timeout.as_deref()) {
        Some(s) => parse_duration(s).context("Invalid timeout")?,
        None => DEFAULT_TIMEOUT,
    };

    let flags = MatchFlags::from_switches(
        cli.fixed || file.fixed,
        cli.regex.or(file.regex),
        cli.ignore_case || file.ignore_case,
        cli.invert || file.invert,
        cli.max_count.or(file.max_count).unwrap_or(0),
        cli.count_only || file.count_only,
    );

    Ok(RunConfig {
        pattern,
        flags,
        file: cli.file.clone().or_else(|| file.file.clone()),
        peers,
        workers: cli.workers.or(file.workers).unwrap_or_else(num_cpus::get),
        timeout,
        quorum: cli.quorum.or(file.quorum).filter(|&q| q > 0),
        json: cli.json || file.json,
        show_node: cli.show_node || file.show_node,
    })
}

/// Parse a Go-style duration string (e.g. "10s", "1.5s", "500ms", "1m30s")
///
/// A bare number is taken as seconds.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim().to_lowercase();
    if s.is_empty() {
        anyhow::bail!("Invalid duration format: empty");
    }
    if let Ok(secs) = s.parse::<f64>() {
        return nanos(secs * 1e9, &s);
    }

    let mut total_ns = 0f64;
    let mut rest = s.as_str();
    while !rest.is_empty() {
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .with_context(|| format!("Invalid duration format: {} (missing unit)", s))?;
        let (num_str, tail) = rest.split_at(num_end);
        let num: f64 = num_str
            .parse()
            .with_context(|| format!("Invalid duration format: {}", s))?;

        let unit_end = tail.find(|c: char| c.is_ascii_digit() || c == '.').unwrap_or(tail.len());
        let (unit, next) = tail.split_at(unit_end);
        let multiplier = match unit {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" | "sec" => 1e9,
            "m" | "min" => 60e9,
            "h" | "hr" => 3600e9,
            other => anyhow::bail!("Invalid duration unit '{}' in {}", other, s),
        };
        total_ns += num * multiplier;
        rest = next;
    }
    nanos(total_ns, &s)
}

fn nanos(total_ns: f64, original: &str) -> Result<Duration> {
    if !total_ns.is_finite() || total_ns < 0.0 || total_ns > u64::MAX as f64 {
        anyhow::bail!("Invalid duration: {}", original);
    }
    Ok(Duration::from_nanos(total_ns.round() as u64))
}
