//! Configuration validation

use super::*;
use crate::Result;

/// Validate query configuration
///
/// Quorum against node count is checked by the coordinator itself, before
/// anything is dispatched.
pub fn validate_run(config: &RunConfig) -> Result<()> {
    if config.pattern.is_empty() {
        anyhow::bail!("pattern is required");
    }

    if config.workers == 0 {
        anyhow::bail!("workers must be at least 1");
    }

    if config.timeout.is_zero() {
        anyhow::bail!("timeout must be greater than zero");
    }

    for (i, peer) in config.peers.iter().enumerate() {
        if config.peers[..i].contains(peer) {
            tracing::warn!(peer = %peer, "peer listed more than once; it will receive one shard per entry");
        }
    }

    Ok(())
}

/// Validate node server configuration
pub fn validate_serve(config: &ServeConfig) -> Result<()> {
    if config.addr.trim().is_empty() {
        anyhow::bail!("listen address must not be empty");
    }

    if config.node_id.trim().is_empty() {
        anyhow::bail!("node id must not be empty");
    }

    if let Some(ref path) = config.data_file {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "data file does not exist yet; requests without lines will fail");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_config() -> RunConfig {
        RunConfig {
            pattern: "error".to_string(),
            flags: MatchFlags::default(),
            file: None,
            peers: Vec::new(),
            workers: 2,
            timeout: DEFAULT_TIMEOUT,
            quorum: None,
            json: false,
            show_node: false,
        }
    }

    #[test]
    fn test_valid_run() {
        assert!(validate_run(&run_config()).is_ok());
    }

    #[test]
    fn test_pattern_required() {
        let config = RunConfig {
            pattern: String::new(),
            ..run_config()
        };
        let err = validate_run(&config).unwrap_err();
        assert_eq!(err.to_string(), "pattern is required");
    }

    #[test]
    fn test_zero_workers_and_timeout_rejected() {
        assert!(validate_run(&RunConfig { workers: 0, ..run_config() }).is_err());
        assert!(validate_run(&RunConfig { timeout: Duration::ZERO, ..run_config() }).is_err());
    }

    #[test]
    fn test_duplicate_peers_allowed() {
        let config = RunConfig {
            peers: vec!["http://a:1".to_string(), "http://a:1".to_string()],
            ..run_config()
        };
        assert!(validate_run(&config).is_ok());
    }

    #[test]
    fn test_serve_validation() {
        let config = ServeConfig {
            addr: ":8080".to_string(),
            node_id: "nodeA".to_string(),
            workers: 4,
            data_file: None,
        };
        assert!(validate_serve(&config).is_ok());
        assert!(validate_serve(&ServeConfig { node_id: " ".to_string(), ..config.clone() }).is_err());
        assert!(validate_serve(&ServeConfig { addr: String::new(), ..config }).is_err());
    }
}
