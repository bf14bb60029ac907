//! Error taxonomy for matching and distributed queries
//!
//! Per-node failures (`Compile`, `Transport`, `CallTimeout`, `Embedded`) are recovered by the
//! coordinator and only show up as log lines and reduced success counts.
//! `InvalidQuorum`, `QuorumTimeout` and `QuorumUnreachable` are the
//! query-level outcomes that reach the caller.

use thiserror::Error;

/// Errors produced by the matcher, the engine and the quorum coordinator
#[derive(Debug, Error)]
pub enum GrepError {
    /// Requested quorum cannot be satisfied by the participating nodes
    #[error("invalid quorum {required} > total nodes {total}")]
    InvalidQuorum { required: usize, total: usize },

    /// Pattern is not a valid regular expression
    #[error("invalid pattern: {0}")]
    Compile(#[from] regex::Error),

    /// Peer could not be reached or sent an undecodable reply
    #[error("transport error: {0}")]
    Transport(String),

    /// Peer did not answer within the per-call timeout
    #[error("call timed out: {0}")]
    CallTimeout(String),

    /// Peer answered but reported a failure of its own
    #[error("{0}")]
    Embedded(String),

    /// Deadline elapsed before enough nodes succeeded
    #[error("timeout before reaching quorum: {ok}/{required}")]
    QuorumTimeout { ok: usize, required: usize },

    /// Every node replied but too few succeeded
    #[error("quorum not reached: {ok}/{required}")]
    QuorumUnreachable { ok: usize, required: usize },

    /// Engine worker pool failed to run to completion
    #[error("worker pool failure: {0}")]
    Worker(String),
}

impl GrepError {
    /// Process exit code for this error when it terminates a command
    ///
    /// Every query-level failure maps to 2; the server startup path uses 1
    /// and never produces a `GrepError`.
    pub fn exit_code(&self) -> i32 {
        2
    }
}

impl From<reqwest::Error> for GrepError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GrepError::CallTimeout(err.to_string())
        } else {
            GrepError::Transport(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quorum_messages_carry_counts() {
        let err = GrepError::QuorumTimeout { ok: 1, required: 2 };
        assert_eq!(err.to_string(), "timeout before reaching quorum: 1/2");
        assert_eq!(err.exit_code(), 2);

        let err = GrepError::QuorumUnreachable { ok: 0, required: 3 };
        assert_eq!(err.to_string(), "quorum not reached: 0/3");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_invalid_quorum_message() {
        let err = GrepError::InvalidQuorum { required: 6, total: 5 };
        assert_eq!(err.to_string(), "invalid quorum 6 > total nodes 5");
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn test_compile_error_from_regex() {
        let err: GrepError = regex::Regex::new("(unclosed").unwrap_err().into();
        assert!(matches!(err, GrepError::Compile(_)));
        assert!(err.to_string().starts_with("invalid pattern"));
    }
}
