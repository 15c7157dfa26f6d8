//! Adapters against mock JSON-RPC nodes.

use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use coins_oracle::adapters::{BitcoinRpc, Erc20Client, EvmClient, RippleClient, UtxoClient};
use coins_oracle::config::{NodeConfig, NodeKind, OracleConfig};
use coins_oracle::registry::bootstrap;
use coins_oracle::resilience::SlowOperation;
use coins_oracle::transport::{import_address, CoinClient, NodeError};

mod common;
use common::{start_rpc_node, Reply};

const RPC_TIMEOUT: Duration = Duration::from_secs(5);

fn utxo_client(asset_id: &str, url: &str, import_limit: Duration) -> UtxoClient {
    utxo_client_with_rpc_timeout(asset_id, url, RPC_TIMEOUT, import_limit)
}

fn utxo_client_with_rpc_timeout(
    asset_id: &str,
    url: &str,
    rpc_timeout: Duration,
    import_limit: Duration,
) -> UtxoClient {
    let rpc = BitcoinRpc::new(url, Some("user".into()), Some("pass".into()), rpc_timeout).unwrap();
    UtxoClient::new(
        asset_id.to_string(),
        Arc::new(rpc),
        SlowOperation::new("import_address", import_limit),
    )
}

#[tokio::test]
async fn test_bitcoin_info() {
    let node = start_rpc_node(|method, _params| async move {
        assert_eq!(method, "getblockchaininfo");
        Reply::Result(json!({
            "chain": "test",
            "blocks": 2_500_000,
            "bestblockhash": "00000000000000a1"
        }))
    })
    .await;

    let info = utxo_client("BTC", &node.url, Duration::from_secs(1)).get_info().await.unwrap();

    assert_eq!(info.chain_name, "test");
    assert_eq!(info.block_height, 2_500_000);
    assert_eq!(info.current_block_hash, "00000000000000a1");
}

#[tokio::test]
async fn test_bitcoin_balance_sums_unspent_outputs() {
    let node = start_rpc_node(|method, params| async move {
        assert_eq!(method, "listunspent");
        assert_eq!(params, json!([1, 9_999_999, ["ltc1qaddr"]]));
        Reply::Result(json!([
            {"txid": "a", "vout": 0, "amount": 0.5},
            {"txid": "b", "vout": 1, "amount": 0.25}
        ]))
    })
    .await;

    let balance = utxo_client("LTC", &node.url, Duration::from_secs(1))
        .get_balance("ltc1qaddr")
        .await
        .unwrap();

    assert_eq!(balance.assets.len(), 1);
    assert_eq!(balance.assets[0].asset_symbol, "LTC");
    assert_eq!(balance.assets[0].balance, "0.750000");
}

#[tokio::test]
async fn test_bitcoin_transaction_resolves_sender() {
    let node = start_rpc_node(|method, params| async move {
        assert_eq!(method, "getrawtransaction");
        match params[0].as_str() {
            Some("tx1") => Reply::Result(json!({
                "txid": "tx1",
                "confirmations": 3,
                "vin": [{"txid": "prev", "vout": 1}],
                "vout": [
                    {"value": 0.3, "n": 0, "scriptPubKey": {"address": "dest"}},
                    {"value": 0.2, "n": 1, "scriptPubKey": {"address": "change"}}
                ]
            })),
            _ => Reply::Result(json!({
                "txid": "prev",
                "confirmations": 10,
                "vin": [{"coinbase": "03ab"}],
                "vout": [
                    {"value": 1.0, "n": 0, "scriptPubKey": {"address": "other"}},
                    {"value": 0.6, "n": 1, "scriptPubKey": {"address": "source"}}
                ]
            })),
        }
    })
    .await;

    let tx = utxo_client("BTC", &node.url, Duration::from_secs(1))
        .get_transaction_by_hash("tx1")
        .await
        .unwrap();

    assert_eq!(tx.id, "tx1");
    assert_eq!(tx.from, "source");
    assert_eq!(tx.to, "dest");
    assert_eq!(tx.value, "0.500000");
    assert_eq!(tx.confirmation.threshold, Some(5));
    assert_eq!(tx.confirmation.observed_confirmations, Some(3));
    assert!(!tx.confirmation.confirmed);
    assert_eq!(node.calls("getrawtransaction"), 2);
}

#[tokio::test]
async fn test_bitcoin_rpc_error_is_upstream() {
    let node = start_rpc_node(|_method, _params| async move {
        Reply::RpcError(-5, "No such mempool or blockchain transaction")
    })
    .await;

    let err = utxo_client("BTC", &node.url, Duration::from_secs(1))
        .get_transaction_by_hash("missing")
        .await
        .unwrap_err();

    match err {
        NodeError::Upstream { asset_id, operation, .. } => {
            assert_eq!(asset_id, "BTC");
            assert_eq!(operation, "get_transaction_by_hash");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_import_completes_on_first_attempt() {
    let node = start_rpc_node(|method, params| async move {
        assert_eq!(method, "importaddress");
        assert_eq!(params, json!(["bc1qwatch", "", true]));
        Reply::Result(json!(null))
    })
    .await;

    let client = utxo_client("BTC", &node.url, Duration::from_millis(500));
    import_address(&client, "bc1qwatch").await.unwrap();

    assert_eq!(node.calls("importaddress"), 1);
}

#[tokio::test]
async fn test_import_converges_after_timeout() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let seen = attempts.clone();
    let node = start_rpc_node(move |_method, _params| {
        let seen = seen.clone();
        async move {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                // Rescan in progress: the first call blocks.
                tokio::time::sleep(Duration::from_secs(2)).await;
                Reply::Result(json!(null))
            } else {
                Reply::RpcError(-4, "Wallet is currently rescanning. Abort existing rescan or wait.")
            }
        }
    })
    .await;

    let client = utxo_client("BTC", &node.url, Duration::from_millis(100));
    import_address(&client, "bc1qwatch").await.unwrap();

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_import_times_out_twice() {
    let node = start_rpc_node(|_method, _params| async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        Reply::Result(json!(null))
    })
    .await;

    let client = utxo_client("BTC", &node.url, Duration::from_millis(50));
    let err = import_address(&client, "bc1qwatch").await.unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(node.calls("importaddress"), 2);
}

/// Mock bitcoind whose `importaddress` takes `rescan` and then bumps `finished`.
async fn rescanning_node(rescan: Duration) -> (common::MockNode, Arc<AtomicUsize>) {
    let finished = Arc::new(AtomicUsize::new(0));
    let counter = finished.clone();
    let node = start_rpc_node(move |_method, _params| {
        let counter = counter.clone();
        async move {
            tokio::time::sleep(rescan).await;
            counter.fetch_add(1, Ordering::SeqCst);
            Reply::Result(json!(null))
        }
    })
    .await;
    (node, finished)
}

#[tokio::test]
async fn test_import_timeout_wins_over_shorter_rpc_timeout() {
    let (node, _finished) = rescanning_node(Duration::from_secs(2)).await;

    let client = utxo_client_with_rpc_timeout(
        "BTC",
        &node.url,
        Duration::from_millis(100),
        Duration::from_millis(400),
    );
    let err = import_address(&client, "bc1qwatch").await.unwrap_err();

    assert!(err.is_timeout(), "expected a timeout, got {err}");
}

#[tokio::test]
async fn test_abandoned_import_runs_to_completion() {
    let (node, finished) = rescanning_node(Duration::from_millis(800)).await;

    let limit = Duration::from_millis(200);
    let client = utxo_client_with_rpc_timeout("BTC", &node.url, limit, limit);
    let err = import_address(&client, "bc1qwatch").await.unwrap_err();

    assert!(err.is_timeout(), "expected a timeout, got {err}");
    assert_eq!(finished.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(1200)).await;
    assert_eq!(node.calls("importaddress"), 2);
    assert_eq!(finished.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_configured_import_with_default_timeouts() {
    let (node, finished) = rescanning_node(Duration::from_millis(1500)).await;

    let mut config = OracleConfig::default();
    config.timeouts.rpc_secs = 1;
    config.timeouts.import_secs = 1;
    config.nodes = vec![NodeConfig {
        asset_id: "BTC".into(),
        kind: NodeKind::Bitcoin,
        url: Some(node.url.clone()),
        url_env: None,
        rpc_user: Some("user".into()),
        rpc_pass: Some("pass".into()),
        chain: None,
        contract: None,
    }];
    let registry = bootstrap::from_config(&config).unwrap();
    let client = registry.get("btc").unwrap();

    let err = import_address(client.as_ref(), "bc1qwatch").await.unwrap_err();
    assert!(err.is_timeout(), "expected a timeout, got {err}");

    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert_eq!(finished.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_import_real_failure_propagates() {
    let node = start_rpc_node(|_method, _params| async move {
        Reply::RpcError(-5, "Invalid Bitcoin address or script")
    })
    .await;

    let client = utxo_client("BTC", &node.url, Duration::from_millis(500));
    let err = import_address(&client, "garbage").await.unwrap_err();

    assert!(matches!(err, NodeError::Upstream { operation: "import_address", .. }));
    assert_eq!(node.calls("importaddress"), 2);
}

fn ripple_client(url: &str) -> RippleClient {
    RippleClient::new("XRP".into(), url, "main".into(), RPC_TIMEOUT).unwrap()
}

#[tokio::test]
async fn test_ripple_info_uses_validated_ledger() {
    let node = start_rpc_node(|method, _params| async move {
        assert_eq!(method, "server_info");
        Reply::Result(json!({
            "info": {
                "closed_ledger": {"hash": "CLOSED", "seq": 91},
                "validated_ledger": {"hash": "VALIDATED", "seq": 90}
            },
            "status": "success"
        }))
    })
    .await;

    let info = ripple_client(&node.url).get_info().await.unwrap();

    assert_eq!(info.chain_name, "main");
    assert_eq!(info.block_height, 90);
    assert_eq!(info.current_block_hash, "VALIDATED");
}

#[tokio::test]
async fn test_ripple_balance_in_xrp() {
    let node = start_rpc_node(|method, params| async move {
        assert_eq!(method, "account_info");
        assert_eq!(params[0]["account"], "rAccount");
        Reply::Result(json!({
            "account_data": {"Account": "rAccount", "Balance": "1500000"},
            "status": "success"
        }))
    })
    .await;

    let balance = ripple_client(&node.url).get_balance("rAccount").await.unwrap();

    assert_eq!(balance.assets[0].asset_symbol, "XRP");
    assert_eq!(balance.assets[0].balance, "1.5");
}

#[tokio::test]
async fn test_ripple_transaction_has_no_threshold() {
    let node = start_rpc_node(|method, _params| async move {
        assert_eq!(method, "tx");
        Reply::Result(json!({
            "hash": "E08D6E9754025BA2534A78707605E0601F03ACE063687A0CA1BDDACFCD1698C7",
            "Account": "rSender",
            "Destination": "rReceiver",
            "Amount": "25000000",
            "validated": true,
            "status": "success"
        }))
    })
    .await;

    let tx = ripple_client(&node.url)
        .get_transaction_by_hash("E08D6E9754025BA2534A78707605E0601F03ACE063687A0CA1BDDACFCD1698C7")
        .await
        .unwrap();

    assert_eq!(tx.from, "rSender");
    assert_eq!(tx.to, "rReceiver");
    assert_eq!(tx.value, "25");
    assert!(tx.confirmation.confirmed);
    assert_eq!(tx.confirmation.threshold, None);
    assert_eq!(tx.confirmation.observed_confirmations, None);
}

#[tokio::test]
async fn test_ripple_in_band_error() {
    let node = start_rpc_node(|_method, _params| async move {
        Reply::Result(json!({
            "error": "actNotFound",
            "error_message": "Account not found.",
            "status": "error"
        }))
    })
    .await;

    let err = ripple_client(&node.url).get_balance("rNobody").await.unwrap_err();

    assert!(err.to_string().contains("Account not found."));
}

#[tokio::test]
async fn test_ripple_has_no_import() {
    let client = ripple_client("http://127.0.0.1:1");
    let err = import_address(&client, "rAccount").await.unwrap_err();
    assert!(matches!(err, NodeError::CapabilityUnsupported { .. }));
}

const USDT_CONTRACT: &str = "0xdAC17F958D2ee523a2206206994597C13D831ec7";

#[tokio::test]
async fn test_token_balance_reads_contract() {
    let node = start_rpc_node(|method, params| async move {
        assert_eq!(method, "eth_call");
        let call = &params[0];
        assert_eq!(call["to"].as_str().unwrap().to_lowercase(), USDT_CONTRACT.to_lowercase());
        let input = call.get("input").or_else(|| call.get("data")).unwrap();
        assert!(input.as_str().unwrap().starts_with("0x70a08231"));
        // 2_500_000 token units
        Reply::Result(json!(format!("0x{:064x}", 2_500_000u64)))
    })
    .await;

    let evm = Arc::new(EvmClient::new("ETH".into(), &node.url, RPC_TIMEOUT).unwrap());
    let usdt = Erc20Client::new("USDT".into(), evm.clone(), USDT_CONTRACT).unwrap();
    let zrx = Erc20Client::new("ZRX".into(), evm, "0xE41d2489571d322189246DaFA5ebDe1F4699F498").unwrap();

    let balance = usdt
        .get_balance("0x1111111111111111111111111111111111111111")
        .await
        .unwrap();

    assert_eq!(balance.assets.len(), 1);
    assert_eq!(balance.assets[0].asset_symbol, "USDT");
    assert_eq!(balance.assets[0].balance, "2500000");
    assert_eq!(zrx.asset_id(), "ZRX");
    assert_eq!(node.calls("eth_call"), 1);
}

#[tokio::test]
async fn test_token_balance_rejects_short_reply() {
    let node = start_rpc_node(|_method, _params| async move { Reply::Result(json!("0x")) }).await;

    let evm = Arc::new(EvmClient::new("ETH".into(), &node.url, RPC_TIMEOUT).unwrap());
    let usdt = Erc20Client::new("USDT".into(), evm, USDT_CONTRACT).unwrap();
    let err = usdt
        .get_balance("0x1111111111111111111111111111111111111111")
        .await
        .unwrap_err();

    assert!(matches!(err, NodeError::Upstream { ref asset_id, operation: "get_balance", .. } if asset_id == "USDT"));
}
