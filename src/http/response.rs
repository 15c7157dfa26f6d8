//! Response envelopes and error mapping.
//!
//! # Responsibilities
//! - Wrap canonical shapes in the `{"data": ...}` envelope
//! - Map [`NodeError`] to status code and numeric error code
//!
//! # Design Decisions
//! - Unknown assets are 404 with a bare `{"error": ...}` body
//! - Adapter failures are 400 with `{"data": null, "error", "code"}`
//! - An import that outlived its client-side wait is 504; the backend may
//!   still finish it

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::registry::RegisteredNode;
use crate::transport::{NodeError, Transaction};

/// Numeric error codes carried in failure envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidRequest = 101,
    CannotImport = 201,
    Balance = 202,
    Transaction = 301,
    Info = 401,
}

impl ErrorCode {
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// Success envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeList {
    pub nodes: Vec<RegisteredNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionBody {
    pub transaction: Transaction,
}

/// Failure envelope for adapter errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenericResponse {
    pub data: Option<serde_json::Value>,
    pub error: String,
    pub code: u16,
}

/// Error returned by handlers.
#[derive(Debug)]
pub enum ApiError {
    /// No adapter registered for the asset.
    AssetNotFound(String),
    /// Adapter or request failure tagged with the endpoint's error code.
    Failed {
        status: StatusCode,
        code: ErrorCode,
        message: String,
    },
}

impl ApiError {
    /// Malformed request.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Failed {
            status: StatusCode::BAD_REQUEST,
            code: ErrorCode::InvalidRequest,
            message: message.into(),
        }
    }

    /// Map an adapter error raised while serving an endpoint with `code`.
    pub fn from_node(err: NodeError, code: ErrorCode) -> Self {
        match err {
            NodeError::NotFound { asset_id } => Self::AssetNotFound(asset_id),
            NodeError::InvalidInput(_) => Self::invalid(err.to_string()),
            NodeError::Timeout { .. } => Self::Failed {
                status: StatusCode::GATEWAY_TIMEOUT,
                code,
                message: err.to_string(),
            },
            NodeError::Upstream { .. } | NodeError::CapabilityUnsupported { .. } => Self::Failed {
                status: StatusCode::BAD_REQUEST,
                code,
                message: err.to_string(),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::AssetNotFound(_) => StatusCode::NOT_FOUND,
            Self::Failed { status, .. } => *status,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::AssetNotFound(asset_id) => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({ "error": format!("asset: {} was not found", asset_id) })),
            )
                .into_response(),
            Self::Failed {
                status,
                code,
                message,
            } => (
                status,
                Json(GenericResponse {
                    data: None,
                    error: message,
                    code: code.as_u16(),
                }),
            )
                .into_response(),
        }
    }
}
