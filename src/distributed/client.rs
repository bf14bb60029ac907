//! Remote node client
//!
//! Sends one `MatchRequest` to one peer and decodes its `MatchResponse`.
//! Every call is bounded by half of the coordinator's overall deadline and can
//! be abandoned early through a cancellation token.

use crate::distributed::protocol::{MatchRequest, MatchResponse, API_PATH_GREP};
use crate::error::GrepError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// HTTP client for peer nodes
#[derive(Debug, Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    call_timeout: Duration,
}

impl NodeClient {
    /// Create a client for a query with the given overall deadline
    pub fn new(overall_timeout: Duration) -> Result<Self, GrepError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            call_timeout: overall_timeout / 2,
        })
    }

    /// Send `request` to the peer at `address`
    ///
    /// Transport failures, non-2xx statuses and undecodable bodies become
    /// `GrepError::Transport`, an expired call `GrepError::CallTimeout`, and
    /// an error reported inside the response `GrepError::Embedded`. A
    /// response without a node id is labelled with the normalized address.
    pub async fn dispatch(&self, address: &str, request: &MatchRequest) -> Result<MatchResponse, GrepError> {
        let base = normalize_address(address);
        let url = format!("{}{}", base, API_PATH_GREP);

        let response = self
            .http
            .post(&url)
            .json(request)
            .timeout(self.call_timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GrepError::Transport(format!(
                "{} returned {}: {}",
                url,
                status,
                body.trim()
            )));
        }

        let mut reply: MatchResponse = response
            .json()
            .await
            .map_err(|e| GrepError::Transport(format!("failed to decode response from {}: {}", url, e)))?;

        if let Some(err) = reply.embedded_error() {
            return Err(GrepError::Embedded(err.to_string()));
        }
        if reply.node.is_empty() {
            reply.node = base;
        }
        Ok(reply)
    }

    /// `dispatch` that gives up as soon as `cancel` fires
    ///
    /// Dropping the in-flight request tears down its connection.
    pub async fn dispatch_until(
        &self,
        address: &str,
        request: &MatchRequest,
        cancel: &CancellationToken,
    ) -> Result<MatchResponse, GrepError> {
        tokio::select! {
            _ = cancel.cancelled() => Err(GrepError::Transport(format!("request to {} cancelled", address))),
            result = self.dispatch(address, request) => result,
        }
    }
}

/// Add a default `http://` scheme and strip trailing slashes
pub fn normalize_address(address: &str) -> String {
    let address = address.trim();
    let with_scheme = if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    };
    with_scheme.trim_end_matches('/').to_string()
}

/// Parse a comma-separated peer list, normalizing every entry
pub fn split_peers(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(normalize_address)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributed::protocol::MatchFlags;

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address("localhost:8080"), "http://localhost:8080");
        assert_eq!(normalize_address("http://a:1/"), "http://a:1");
        assert_eq!(normalize_address("https://a:1//"), "https://a:1");
        assert_eq!(normalize_address(" nodeB:9000 "), "http://nodeB:9000");
    }

    #[test]
    fn test_split_peers() {
        assert!(split_peers("").is_empty());
        assert!(split_peers("  ").is_empty());
        assert_eq!(
            split_peers("a:1, http://b:2/ ,,https://c:3"),
            vec!["http://a:1", "http://b:2", "https://c:3"]
        );
    }

    #[test]
    fn test_call_timeout_is_half_of_deadline() {
        let client = NodeClient::new(Duration::from_secs(10)).unwrap();
        assert_eq!(client.call_timeout, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_transport_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = NodeClient::new(Duration::from_secs(2)).unwrap();
        let request = MatchRequest {
            job_id: "job-0-1".to_string(),
            pattern: "x".to_string(),
            flags: MatchFlags::default(),
            lines: vec!["x".to_string()],
            workers: 1,
        };

        let err = client.dispatch(&addr.to_string(), &request).await.unwrap_err();
        assert!(matches!(err, GrepError::Transport(_)));
    }

    #[tokio::test]
    async fn test_silent_peer_is_call_timeout() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let client = NodeClient::new(Duration::from_millis(400)).unwrap();
        let request = MatchRequest {
            job_id: "job-0-1".to_string(),
            pattern: "x".to_string(),
            flags: MatchFlags::default(),
            lines: vec!["x".to_string()],
            workers: 1,
        };

        let err = client.dispatch(&addr.to_string(), &request).await.unwrap_err();
        assert!(matches!(err, GrepError::CallTimeout(_)));
    }

    #[tokio::test]
    async fn test_cancelled_dispatch_returns_promptly() {
        // Accepts connections but never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _hold = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        let client = NodeClient::new(Duration::from_secs(60)).unwrap();
        let request = MatchRequest {
            job_id: "job-0-1".to_string(),
            pattern: "x".to_string(),
            flags: MatchFlags::default(),
            lines: Vec::new(),
            workers: 0,
        };
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            trigger.cancel();
        });

        let started = std::time::Instant::now();
        let err = client.dispatch_until(&addr.to_string(), &request, &cancel).await.unwrap_err();
        assert!(matches!(err, GrepError::Transport(_)));
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
