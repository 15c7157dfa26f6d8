//! JSON-RPC over HTTP transport shared by the JSON-speaking adapters.
//!
//! # Responsibilities
//! - POST `{"jsonrpc","id","method","params"}` envelopes to one endpoint
//! - Apply the adapter's timeout (or none, for calls bounded by their caller)
//!   and optional basic auth
//! - Split transport, RPC-level and decoding failures
//!
//! # Design Decisions
//! - The body is parsed even on non-2xx statuses: bitcoind reports RPC
//!   errors with HTTP 500 and a JSON envelope
//! - No retries here; callers decide

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;

/// Errors from a single JSON-RPC exchange.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Connection, timeout or body read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The node answered with an RPC error object.
    #[error("rpc error {code}: {message}")]
    Rpc { code: i64, message: String },

    /// Non-success HTTP status without a JSON-RPC body.
    #[error("http status {status}: {body}")]
    Status { status: u16, body: String },

    /// The result did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

#[derive(Debug, Deserialize)]
struct ErrorObject {
    code: i64,
    message: String,
}

/// Minimal JSON-RPC client bound to one endpoint.
#[derive(Debug)]
pub struct JsonRpcClient {
    endpoint: url::Url,
    http: reqwest::Client,
    auth: Option<(String, Option<String>)>,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    /// Create a client for `endpoint` with a per-request `timeout`.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, RpcClientError> {
        Self::build(endpoint, Some(timeout))
    }

    /// Create a client with no request deadline. Requests run until the node
    /// answers or the connection drops, even after the caller stopped waiting.
    pub fn unbounded(endpoint: &str) -> Result<Self, RpcClientError> {
        Self::build(endpoint, None)
    }

    fn build(endpoint: &str, timeout: Option<Duration>) -> Result<Self, RpcClientError> {
        let endpoint = url::Url::parse(endpoint)
            .map_err(|e| RpcClientError(format!("invalid endpoint '{}': {}", endpoint, e)))?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| RpcClientError(format!("cannot build http client: {}", e)))?;

        Ok(Self {
            endpoint,
            http,
            auth: None,
            next_id: AtomicU64::new(1),
        })
    }

    /// Send HTTP basic auth with every request.
    pub fn with_basic_auth(mut self, user: String, pass: Option<String>) -> Self {
        self.auth = Some((user, pass));
        self
    }

    pub fn endpoint(&self) -> &url::Url {
        &self.endpoint
    }

    /// Call `method` with positional `params` and decode the result.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "1.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::trace!(endpoint = %self.endpoint, method, id, "Sending RPC request");

        let mut request = self.http.post(self.endpoint.clone()).json(&body);
        if let Some((user, pass)) = &self.auth {
            request = request.basic_auth(user, pass.as_ref());
        }

        let response = request.send().await?;
        let status = response.status();
        let raw = response.bytes().await?;

        let envelope: Envelope = match serde_json::from_slice(&raw) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(RpcError::Decode(e)),
            Err(_) => {
                return Err(RpcError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&raw).into_owned(),
                })
            }
        };

        if let Some(error) = envelope.error {
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        Ok(serde_json::from_value(envelope.result.unwrap_or(Value::Null))?)
    }
}

/// Construction failure for [`JsonRpcClient`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct RpcClientError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        let err = JsonRpcClient::new("not a url", Duration::from_secs(1)).unwrap_err();
        assert!(err.to_string().contains("invalid endpoint"));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let client = JsonRpcClient::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        let err = client.call::<Value>("getblockchaininfo", json!([])).await.unwrap_err();
        assert!(matches!(err, RpcError::Transport(_)));
    }

    #[test]
    fn test_unbounded_rejects_invalid_endpoint() {
        let err = JsonRpcClient::unbounded("::").unwrap_err();
        assert!(err.to_string().contains("invalid endpoint"));
    }

    #[test]
    fn test_rpc_error_display() {
        let err = RpcError::Rpc {
            code: -4,
            message: "Wallet is currently rescanning".to_string(),
        };
        assert_eq!(err.to_string(), "rpc error -4: Wallet is currently rescanning");
    }
}
