//! Startup registration of adapters.
//!
//! # Responsibilities
//! - Turn an ordered list of (asset id, constructor) pairs into a registry
//! - Derive that list from configuration
//!
//! # Design Decisions
//! - The registry itself knows nothing about which chains exist
//! - Fail fast: a constructor error aborts startup
//! - Bitcoin-family nodes with the same endpoint and credentials share one
//!   protocol client
//! - ERC-20 tokens share the EVM client of their endpoint; a token listed
//!   before (or without) its chain's node gets one of its own

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::bitcoin::{BitcoinRpc, UtxoClient};
use crate::adapters::erc20::Erc20Client;
use crate::adapters::evm::EvmClient;
use crate::adapters::ripple::RippleClient;
use crate::config::{NodeConfig, NodeKind, OracleConfig};
use crate::registry::resolver::{CoinRegistry, SharedClient};
use crate::resilience::timeouts::SlowOperation;
use crate::transport::NodeResult;

/// Deferred adapter construction.
pub type Constructor = Box<dyn FnOnce() -> NodeResult<SharedClient> + Send>;

/// Build a registry by invoking each constructor once, in order.
pub fn initialize(entries: Vec<(String, Constructor)>) -> NodeResult<CoinRegistry> {
    let registry = CoinRegistry::new();

    for (asset_id, construct) in entries {
        match construct() {
            Ok(client) => {
                registry.register(&asset_id, client);
            }
            Err(e) => {
                tracing::error!(asset_id = %asset_id, error = %e, "Failed to create client");
                return Err(e);
            }
        }
    }

    tracing::info!(count = registry.len(), "Client registry initialized");
    Ok(registry)
}

/// Build the registry described by `config`.
pub fn from_config(config: &OracleConfig) -> NodeResult<CoinRegistry> {
    initialize(constructors(config)?)
}

/// Constructor list for every configured node, in file order.
pub fn constructors(config: &OracleConfig) -> NodeResult<Vec<(String, Constructor)>> {
    let rpc_timeout = Duration::from_secs(config.timeouts.rpc_secs);
    let import = SlowOperation::new("import_address", Duration::from_secs(config.timeouts.import_secs));

    let mut shared: HashMap<(String, Option<String>, Option<String>), Arc<BitcoinRpc>> =
        HashMap::new();
    let mut evm_hosts: HashMap<String, Arc<EvmClient>> = HashMap::new();
    let mut entries: Vec<(String, Constructor)> = Vec::with_capacity(config.nodes.len());

    for node in &config.nodes {
        let endpoint = node.resolved_url();
        let asset_id = node.asset_id.clone();

        let construct: Constructor = match node.kind {
            NodeKind::Bitcoin => {
                let key = (endpoint.clone(), node.rpc_user.clone(), node.rpc_pass.clone());
                let rpc = match shared.get(&key) {
                    Some(rpc) => Arc::clone(rpc),
                    None => {
                        let rpc = Arc::new(BitcoinRpc::new(
                            &endpoint,
                            node.rpc_user.clone(),
                            node.rpc_pass.clone(),
                            rpc_timeout,
                        )?);
                        shared.insert(key, Arc::clone(&rpc));
                        rpc
                    }
                };
                let import = import.clone();
                let asset_id = asset_id.clone();
                Box::new(move || Ok(Arc::new(UtxoClient::new(asset_id, rpc, import)) as SharedClient))
            }
            NodeKind::Ripple => {
                let chain = chain_label(node);
                let asset_id = asset_id.clone();
                Box::new(move || {
                    Ok(Arc::new(RippleClient::new(asset_id, &endpoint, chain, rpc_timeout)?)
                        as SharedClient)
                })
            }
            NodeKind::Evm => {
                let client = Arc::new(EvmClient::new(asset_id.clone(), &endpoint, rpc_timeout)?);
                evm_hosts.entry(endpoint.clone()).or_insert_with(|| Arc::clone(&client));
                Box::new(move || Ok(client as SharedClient))
            }
            NodeKind::Erc20 => {
                let evm = match evm_hosts.get(&endpoint) {
                    Some(evm) => Arc::clone(evm),
                    None => {
                        let evm = Arc::new(EvmClient::new(asset_id.clone(), &endpoint, rpc_timeout)?);
                        evm_hosts.insert(endpoint.clone(), Arc::clone(&evm));
                        evm
                    }
                };
                let contract = node.contract.clone().unwrap_or_default();
                let asset_id = asset_id.clone();
                Box::new(move || {
                    Ok(Arc::new(Erc20Client::new(asset_id, evm, &contract)?) as SharedClient)
                })
            }
        };

        tracing::info!(
            asset_id = %node.asset_id,
            kind = ?node.kind,
            endpoint = %node.resolved_url(),
            "Configured node"
        );
        entries.push((asset_id, construct));
    }

    Ok(entries)
}

fn chain_label(node: &NodeConfig) -> String {
    node.chain.clone().unwrap_or_else(|| "main".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::NodeError;

    fn node(asset_id: &str, kind: NodeKind, url: &str) -> NodeConfig {
        NodeConfig {
            asset_id: asset_id.to_string(),
            kind,
            url: Some(url.to_string()),
            url_env: None,
            rpc_user: None,
            rpc_pass: None,
            chain: None,
            contract: None,
        }
    }

    #[test]
    fn test_initialize_fails_fast() {
        let entries: Vec<(String, Constructor)> = vec![(
            "BTC".to_string(),
            Box::new(|| Err(NodeError::InvalidInput("bad endpoint".into()))),
        )];
        assert!(initialize(entries).is_err());
    }

    #[test]
    fn test_initialize_empty() {
        let registry = initialize(Vec::new()).unwrap();
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_from_config_registers_every_node() {
        let mut config = OracleConfig::default();
        config.nodes = vec![
            node("BTC", NodeKind::Bitcoin, "localhost:8332"),
            node("LTC", NodeKind::Bitcoin, "localhost:9332"),
            node("XRP", NodeKind::Ripple, "localhost:5005"),
            node("ETH", NodeKind::Evm, "http://localhost:8545"),
        ];

        let registry = from_config(&config).unwrap();

        assert_eq!(registry.len(), 4);
        for id in ["btc", "LTC", "xrp", "Eth"] {
            assert!(registry.get(id).is_ok(), "{id} not registered");
        }
        assert_eq!(registry.get("ltc").unwrap().asset_id(), "LTC");
    }

    #[tokio::test]
    async fn test_bitcoin_family_on_one_endpoint() {
        let mut config = OracleConfig::default();
        config.nodes = vec![
            node("BTC", NodeKind::Bitcoin, "localhost:8332"),
            node("BCH", NodeKind::Bitcoin, "http://localhost:8332"),
            node("DOGE", NodeKind::Bitcoin, "localhost:22555"),
        ];

        let entries = constructors(&config).unwrap();
        assert_eq!(entries.len(), 3);

        let registry = initialize(entries).unwrap();
        assert_eq!(registry.get("bch").unwrap().asset_id(), "BCH");
        assert_eq!(registry.get("doge").unwrap().asset_id(), "DOGE");
    }

    fn token(asset_id: &str, url: &str, contract: &str) -> NodeConfig {
        NodeConfig {
            contract: Some(contract.to_string()),
            ..node(asset_id, NodeKind::Erc20, url)
        }
    }

    #[tokio::test]
    async fn test_tokens_share_the_chain_client() {
        let mut config = OracleConfig::default();
        config.nodes = vec![
            node("ETH", NodeKind::Evm, "localhost:8545"),
            token("USDT", "http://localhost:8545", "0xdAC17F958D2ee523a2206206994597C13D831ec7"),
            token("ZRX", "localhost:8545", "0xE41d2489571d322189246DaFA5ebDe1F4699F498"),
            token("LINK", "otherhost:8545", "0x514910771AF9Ca656af840dff83E8264EcF986CA"),
        ];

        let registry = from_config(&config).unwrap();

        assert_eq!(registry.len(), 4);
        assert_eq!(registry.get("usdt").unwrap().asset_id(), "USDT");
        assert_eq!(registry.get("link").unwrap().asset_id(), "LINK");
        assert!(registry.get("zrx").unwrap().as_importer().is_none());
    }

    #[tokio::test]
    async fn test_token_with_bad_contract_fails_startup() {
        let mut config = OracleConfig::default();
        config.nodes = vec![token("USDT", "localhost:8545", "0x1234")];

        let err = from_config(&config).err().expect("startup should fail");
        assert!(matches!(err, NodeError::InvalidInput(_)));
    }
}
