//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Detect duplicate asset ids
//! - Check token contracts are present and well formed
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: OracleConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use alloy::primitives::Address;
use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{NodeKind, OracleConfig};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),

    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("timeout '{0}' must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("node #{0} has an empty asset_id")]
    EmptyAssetId(usize),

    #[error("asset_id '{0}' is configured more than once")]
    DuplicateAssetId(String),

    #[error("node '{asset_id}' has an invalid url '{url}'")]
    InvalidUrl { asset_id: String, url: String },

    #[error("node '{0}' sets rpc credentials but is not a bitcoin node")]
    UnexpectedCredentials(String),

    #[error("erc20 node '{0}' has no contract address")]
    MissingContract(String),

    #[error("node '{asset_id}' has an invalid contract address '{contract}'")]
    InvalidContract { asset_id: String, contract: String },

    #[error("node '{0}' sets a contract but is not an erc20 node")]
    UnexpectedContract(String),
}

/// Check `config` for semantic errors.
pub fn validate_config(config: &OracleConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    for (name, value) in [
        ("request_secs", config.timeouts.request_secs),
        ("rpc_secs", config.timeouts.rpc_secs),
        ("import_secs", config.timeouts.import_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    let mut seen = HashSet::new();
    for (i, node) in config.nodes.iter().enumerate() {
        let asset_id = node.asset_id.trim();
        if asset_id.is_empty() {
            errors.push(ValidationError::EmptyAssetId(i));
            continue;
        }

        if !seen.insert(asset_id.to_lowercase()) {
            errors.push(ValidationError::DuplicateAssetId(asset_id.to_string()));
        }

        let url = node.resolved_url();
        if url::Url::parse(&url).is_err() {
            errors.push(ValidationError::InvalidUrl {
                asset_id: asset_id.to_string(),
                url,
            });
        }

        if node.kind != NodeKind::Bitcoin && (node.rpc_user.is_some() || node.rpc_pass.is_some()) {
            errors.push(ValidationError::UnexpectedCredentials(asset_id.to_string()));
        }

        match (node.kind, node.contract.as_deref()) {
            (NodeKind::Erc20, None) => {
                errors.push(ValidationError::MissingContract(asset_id.to_string()));
            }
            (NodeKind::Erc20, Some(contract)) if contract.parse::<Address>().is_err() => {
                errors.push(ValidationError::InvalidContract {
                    asset_id: asset_id.to_string(),
                    contract: contract.to_string(),
                });
            }
            (NodeKind::Erc20, Some(_)) | (_, None) => {}
            (_, Some(_)) => {
                errors.push(ValidationError::UnexpectedContract(asset_id.to_string()));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
