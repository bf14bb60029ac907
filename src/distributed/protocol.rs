//! Distributed mode protocol
//!
//! This module defines the wire contract between the coordinator and peer
//! nodes. Messages are JSON documents exchanged over HTTP:
//!
//! ```text
//! Coordinator                          Peer Node
//!     |                                    |
//!     |---- POST /v1/grep (MatchRequest) ->|
//!     |                                    |  ParallelMatchEngine
//!     |<--- 200 (MatchResponse) -----------|
//!     |                                    |
//!     |---- GET /health ------------------>|
//!     |<--- 200 "ok" ----------------------|
//! ```
//!
//! # Field Names
//!
//! The JSON field names (including the PascalCase `flags` keys) are kept
//! compatible with existing deployments, so nodes built from either side can
//! serve each other. Logical failures travel inside a `200` response in the
//! `error` field; HTTP error statuses are reserved for malformed requests.

use serde::{Deserialize, Serialize};

/// Path of the match endpoint
pub const API_PATH_GREP: &str = "/v1/grep";

/// Path of the liveness probe
pub const API_PATH_HEALTH: &str = "/health";

/// Body returned by the liveness probe
pub const HEALTH_BODY: &str = "ok";

/// Matching options shared by every node of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MatchFlags {
    /// Regular expression mode (-E)
    pub regex: bool,

    /// Fixed substring mode (-F); takes precedence over `regex` when set
    pub fixed: bool,

    /// Case-insensitive matching (-i)
    pub ignore_case: bool,

    /// Select non-matching lines (-v)
    pub invert: bool,

    /// Per-worker match cap (-m), 0 = unbounded
    #[serde(rename = "MaxCount")]
    pub max_per_worker: u64,

    /// Only count matches, never ship matched lines (-c)
    pub count_only: bool,
}

impl Default for MatchFlags {
    fn default() -> Self {
        Self {
            regex: true,
            fixed: false,
            ignore_case: false,
            invert: false,
            max_per_worker: 0,
            count_only: false,
        }
    }
}

/// Effective matching mode derived from `MatchFlags`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Fixed,
    Regex,
}

impl MatchFlags {
    /// Resolve the effective mode
    ///
    /// Fixed wins when it is set; otherwise regex is used even if neither
    /// flag was forced.
    pub fn mode(&self) -> MatchMode {
        if self.fixed {
            MatchMode::Fixed
        } else {
            MatchMode::Regex
        }
    }

    /// Build flags from the command-line switches
    ///
    /// `-F` selects fixed mode unless `-E` was given explicitly as well.
    pub fn from_switches(
        fixed: bool,
        regex: Option<bool>,
        ignore_case: bool,
        invert: bool,
        max_per_worker: u64,
        count_only: bool,
    ) -> Self {
        let fixed = fixed && regex != Some(true);
        Self {
            regex: !fixed,
            fixed,
            ignore_case,
            invert,
            max_per_worker,
            count_only,
        }
    }
}

/// One unit of distributed work
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRequest {
    pub job_id: String,
    pub pattern: String,
    #[serde(default)]
    pub flags: MatchFlags,

    /// Inline shard; empty means "use the node's local data"
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lines: Vec<String>,

    /// Worker count, 0 = node default
    #[serde(default, skip_serializing_if = "is_zero")]
    pub workers: usize,
}

/// Reply of one node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResponse {
    #[serde(default)]
    pub job_id: String,

    #[serde(default)]
    pub node: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub matches: Vec<String>,

    #[serde(default)]
    pub count: u64,

    /// Logical failure reported by the node; count/matches are meaningless when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MatchResponse {
    /// Successful reply
    pub fn success(job_id: impl Into<String>, node: impl Into<String>, matches: Vec<String>, count: u64) -> Self {
        Self {
            job_id: job_id.into(),
            node: node.into(),
            matches,
            count,
            error: None,
        }
    }

    /// Failure carrier
    pub fn failure(job_id: impl Into<String>, node: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            node: node.into(),
            matches: Vec::new(),
            count: 0,
            error: Some(error.into()),
        }
    }

    /// Embedded error, treating an empty string as no error
    pub fn embedded_error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flags_wire_names() {
        let flags = MatchFlags {
            regex: false,
            fixed: true,
            ignore_case: true,
            invert: false,
            max_per_worker: 3,
            count_only: true,
        };

        let value = serde_json::to_value(flags).unwrap();
        assert_eq!(
            value,
            json!({
                "Regex": false,
                "Fixed": true,
                "IgnoreCase": true,
                "Invert": false,
                "MaxCount": 3,
                "CountOnly": true,
            })
        );
    }

    #[test]
    fn test_request_omits_empty_lines_and_zero_workers() {
        let req = MatchRequest {
            job_id: "job-1-1".to_string(),
            pattern: "error".to_string(),
            flags: MatchFlags::default(),
            lines: Vec::new(),
            workers: 0,
        };

        let value = serde_json::to_value(&req).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("lines"));
        assert!(!obj.contains_key("workers"));
        assert_eq!(obj["job_id"], "job-1-1");
    }

    #[test]
    fn test_request_decodes_with_missing_flags() {
        let req: MatchRequest = serde_json::from_str(r#"{"job_id":"j","pattern":"x"}"#).unwrap();
        assert_eq!(req.flags, MatchFlags::default());
        assert!(req.lines.is_empty());
        assert_eq!(req.workers, 0);
    }

    #[test]
    fn test_response_decodes_foreign_failure() {
        let resp: MatchResponse =
            serde_json::from_str(r#"{"job_id":"j","node":"nodeB","count":0,"error":"no data"}"#).unwrap();
        assert_eq!(resp.embedded_error(), Some("no data"));
        assert!(resp.matches.is_empty());
    }

    #[test]
    fn test_empty_error_is_not_a_failure() {
        let resp: MatchResponse = serde_json::from_str(r#"{"job_id":"j","node":"n","count":2,"error":""}"#).unwrap();
        assert_eq!(resp.embedded_error(), None);
    }

    #[test]
    fn test_count_only_response_has_no_matches_field() {
        let resp = MatchResponse::success("j", "n", Vec::new(), 7);
        let value = serde_json::to_value(&resp).unwrap();
        assert!(value.get("matches").is_none());
        assert!(value.get("error").is_none());
        assert_eq!(value["count"], 7);
    }

    #[test]
    fn test_fixed_switch_yields_to_explicit_regex() {
        let flags = MatchFlags::from_switches(true, None, false, false, 0, false);
        assert_eq!(flags.mode(), MatchMode::Fixed);
        assert!(!flags.regex);

        let flags = MatchFlags::from_switches(true, Some(true), false, false, 0, false);
        assert_eq!(flags.mode(), MatchMode::Regex);

        let flags = MatchFlags::from_switches(false, Some(false), false, false, 0, false);
        assert_eq!(flags.mode(), MatchMode::Regex);
    }
}
