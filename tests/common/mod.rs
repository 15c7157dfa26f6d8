//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

use coins_oracle::transport::{
    Balance, ChainState, CoinClient, NodeError, NodeResult, Transaction,
};

/// What a mock node answers to one JSON-RPC call.
pub enum Reply {
    /// `{"jsonrpc": "2.0", "result": value}` with 200.
    Result(Value),
    /// `{"result": null, "error": {code, message}}` with 500, as bitcoind does.
    RpcError(i64, &'static str),
}

/// Handle to a running mock JSON-RPC node.
pub struct MockNode {
    pub url: String,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockNode {
    /// How many times `method` was called.
    pub fn calls(&self, method: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|m| *m == method).count()
    }
}

/// Start a programmable JSON-RPC node on an ephemeral port.
///
/// `handler` receives the method name and params of every request.
pub async fn start_rpc_node<F, Fut>(handler: F) -> MockNode
where
    F: Fn(String, Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Reply> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handler = Arc::new(handler);
    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = calls.clone();

    let app = Router::new().route(
        "/",
        post(move |Json(request): Json<Value>| {
            let handler = handler.clone();
            let recorded = recorded.clone();
            async move {
                let method = request["method"].as_str().unwrap_or_default().to_string();
                let id = request["id"].clone();
                recorded.lock().unwrap().push(method.clone());

                match (handler.as_ref())(method, request["params"].clone()).await {
                    Reply::Result(result) => (
                        StatusCode::OK,
                        Json(json!({ "jsonrpc": "2.0", "result": result, "id": id })),
                    ),
                    Reply::RpcError(code, message) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({
                            "result": null,
                            "error": { "code": code, "message": message },
                            "id": id
                        })),
                    ),
                }
            }
        }),
    );

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockNode {
        url: format!("http://{}", addr),
        calls,
    }
}

/// In-process client with a fixed latency and outcome.
pub struct FakeClient {
    asset_id: String,
    delay: Duration,
    fail: bool,
    pub info_calls: AtomicUsize,
}

impl FakeClient {
    pub fn healthy(asset_id: &str) -> Self {
        Self {
            asset_id: asset_id.to_string(),
            delay: Duration::ZERO,
            fail: false,
            info_calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(asset_id: &str) -> Self {
        Self {
            fail: true,
            ..Self::healthy(asset_id)
        }
    }

    pub fn slow(asset_id: &str, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::healthy(asset_id)
        }
    }
}

#[async_trait]
impl CoinClient for FakeClient {
    fn asset_id(&self) -> &str {
        &self.asset_id
    }

    async fn get_info(&self) -> NodeResult<ChainState> {
        self.info_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(NodeError::upstream(&self.asset_id, "get_info", "connection refused"));
        }
        Ok(ChainState {
            chain_name: format!("{}-main", self.asset_id.to_lowercase()),
            block_height: self.asset_id.len() as u64,
            current_block_hash: format!("hash-{}", self.asset_id),
        })
    }

    async fn get_balance(&self, _address: &str) -> NodeResult<Balance> {
        Ok(Balance::single(&self.asset_id, "0"))
    }

    async fn get_transaction_by_hash(&self, id: &str) -> NodeResult<Transaction> {
        Err(NodeError::upstream(&self.asset_id, "get_transaction_by_hash", format!("{id} unknown")))
    }
}
