//! Route handlers.
//!
//! Each handler resolves the asset through the registry and forwards to the
//! adapter; none of them knows which chain it is talking to.

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::response::{ApiError, Data, ErrorCode, NodeList, TransactionBody};
use crate::http::server::AppState;
use crate::registry::SharedClient;
use crate::transport::{self, Balance, ChainState};

/// `noinfo` is a free-form flag: only a case-insensitive `true` skips the
/// info calls, any other value (empty, `1`, `yes`) is treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct NodesQuery {
    #[serde(default)]
    pub noinfo: Option<String>,
}

impl NodesQuery {
    pub fn enrich(&self) -> bool {
        !self
            .noinfo
            .as_deref()
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
    }
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub addr: String,
}

fn resolve(state: &AppState, asset_id: &str) -> Result<SharedClient, ApiError> {
    state
        .registry
        .get(asset_id)
        .map_err(|_| ApiError::AssetNotFound(asset_id.to_string()))
}

pub async fn ping() -> Json<Value> {
    Json(json!({ "message": "pong" }))
}

pub async fn list_nodes(
    State(state): State<AppState>,
    Query(query): Query<NodesQuery>,
) -> Json<Data<NodeList>> {
    let nodes = state.registry.get_nodes(query.enrich()).await;
    Json(Data::new(NodeList { nodes }))
}

pub async fn node_info(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> Result<Json<Data<ChainState>>, ApiError> {
    let client = resolve(&state, &asset_id)?;
    let info = client
        .get_info()
        .await
        .map_err(|e| ApiError::from_node(e, ErrorCode::Info))?;
    Ok(Json(Data::new(info)))
}

pub async fn address_balance(
    State(state): State<AppState>,
    Path((asset_id, addr)): Path<(String, String)>,
) -> Result<Json<Data<Balance>>, ApiError> {
    let client = resolve(&state, &asset_id)?;
    let balance = client
        .get_balance(&addr)
        .await
        .map_err(|e| ApiError::from_node(e, ErrorCode::Balance))?;
    Ok(Json(Data::new(balance)))
}

pub async fn import_address(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
    body: Result<Json<ImportRequest>, JsonRejection>,
) -> Result<Json<Data<&'static str>>, ApiError> {
    let client = resolve(&state, &asset_id)?;

    let Json(request) = body.map_err(|e| ApiError::invalid(e.body_text()))?;
    let addr = request.addr.trim();
    if addr.is_empty() {
        return Err(ApiError::invalid("addr must not be empty"));
    }

    transport::import_address(client.as_ref(), addr)
        .await
        .map_err(|e| ApiError::from_node(e, ErrorCode::CannotImport))?;
    Ok(Json(Data::new("success")))
}

pub async fn transaction(
    State(state): State<AppState>,
    Path((asset_id, tx_hash)): Path<(String, String)>,
) -> Result<Json<Data<TransactionBody>>, ApiError> {
    let client = resolve(&state, &asset_id)?;
    let transaction = client
        .get_transaction_by_hash(&tx_hash)
        .await
        .map_err(|e| ApiError::from_node(e, ErrorCode::Transaction))?;
    Ok(Json(Data::new(TransactionBody { transaction })))
}
