//! TOML configuration file parsing
//!
//! A configuration file has an optional `[serve]` and an optional `[run]`
//! table whose keys mirror the command-line flags:
//!
//! ```toml
//! [serve]
//! addr = ":8081"
//! node = "nodeB"
//! workers = 8
//! data_file = "/var/log/app.log"
//!
//! [run]
//! peers = ["nodeA:8080", "nodeB:8081"]
//! timeout = "15s"
//! quorum = 2
//! ignore_case = true
//! ```

use crate::Result;
use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Complete configuration file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub serve: ServeSection,
    #[serde(default)]
    pub run: RunSection,
}

/// `[serve]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServeSection {
    pub addr: Option<String>,
    pub node: Option<String>,
    pub workers: Option<usize>,
    pub data_file: Option<PathBuf>,
}

/// `[run]` table
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunSection {
    pub pattern: Option<String>,
    pub file: Option<PathBuf>,
    #[serde(default)]
    pub peers: Vec<String>,
    pub workers: Option<usize>,
    pub timeout: Option<String>,
    pub quorum: Option<usize>,
    #[serde(default)]
    pub json: bool,
    #[serde(default)]
    pub show_node: bool,
    #[serde(default)]
    pub fixed: bool,
    pub regex: Option<bool>,
    #[serde(default)]
    pub ignore_case: bool,
    #[serde(default)]
    pub invert: bool,
    pub max_count: Option<u64>,
    #[serde(default)]
    pub count_only: bool,
}

/// Parse TOML configuration file
pub fn parse_toml_file(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_toml_string(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse TOML configuration from string
pub fn parse_toml_string(contents: &str) -> Result<FileConfig> {
    let config: FileConfig = ::toml::from_str(contents)
        .context("Failed to parse TOML configuration")?;

    Ok(config)
}

/// Load the file named by `path`, or an empty configuration
pub fn load_optional(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(p) => parse_toml_file(p),
        None => Ok(FileConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_toml_basic() {
        let toml = r#"
[serve]
addr = ":8081"
node = "nodeB"
workers = 8

[run]
peers = ["a:1", "b:2"]
timeout = "15s"
quorum = 2
ignore_case = true
max_count = 10
"#;
        let config = parse_toml_string(toml).unwrap();
        assert_eq!(config.serve.addr.as_deref(), Some(":8081"));
        assert_eq!(config.serve.node.as_deref(), Some("nodeB"));
        assert_eq!(config.serve.workers, Some(8));
        assert!(config.serve.data_file.is_none());

        assert_eq!(config.run.peers, vec!["a:1", "b:2"]);
        assert_eq!(config.run.timeout.as_deref(), Some("15s"));
        assert_eq!(config.run.quorum, Some(2));
        assert!(config.run.ignore_case);
        assert!(!config.run.invert);
        assert_eq!(config.run.max_count, Some(10));
    }

    #[test]
    fn test_empty_file_is_default() {
        let config = parse_toml_string("").unwrap();
        assert!(config.serve.addr.is_none());
        assert!(config.run.peers.is_empty());
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_toml_string("[run]\nbogus = 1\n").is_err());
    }

    #[test]
    fn test_parse_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[serve]\ndata_file = \"/srv/data.log\"").unwrap();

        let config = parse_toml_file(file.path()).unwrap();
        assert_eq!(config.serve.data_file, Some(PathBuf::from("/srv/data.log")));
    }

    #[test]
    fn test_load_optional_without_path() {
        let config = load_optional(None).unwrap();
        assert!(config.run.pattern.is_none());
    }
}
