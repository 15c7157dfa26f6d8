//! ERC-20 token adapter layered on an [`EvmClient`].
//!
//! # Data Flow
//! ```text
//! Erc20Client (token asset id, contract) ──► EvmClient (shared per endpoint) ──► node
//!
//! get_info          → host chain state
//! get_balance       → eth_call balanceOf(holder) on the contract (raw token units)
//! get_transaction   → host lookup, input decoded as transfer / transferFrom
//! ```
//!
//! # Design Decisions
//! - Tokens differ only by asset id and contract address
//! - Only the standard transfer calls are understood; anything else sent to the
//!   contract is reported as an upstream failure
//! - Balances are not scaled by `decimals()`

use alloy::consensus::Transaction as _;
use alloy::primitives::{Address, U256};
use alloy::sol;
use alloy::sol_types::{SolCall, SolInterface};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::Arc;

use crate::adapters::evm::{parse_address, EvmClient, MinedTransaction};
use crate::transport::{Balance, ChainState, CoinClient, ConfirmationInfo, NodeError, NodeResult, Transaction};

sol! {
    /// The part of the ERC-20 interface the oracle reads.
    interface IERC20 {
        function balanceOf(address account) external view returns (uint256);
        function transfer(address to, uint256 amount) external returns (bool);
        function transferFrom(address from, address to, uint256 amount) external returns (bool);
    }
}

/// Sender, recipient and amount of a token transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenTransfer {
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

/// Decode contract call `input` sent by `signer` as a token transfer.
pub fn decode_transfer(signer: Address, input: &[u8]) -> Option<TokenTransfer> {
    match IERC20::IERC20Calls::abi_decode(input).ok()? {
        IERC20::IERC20Calls::transfer(call) => Some(TokenTransfer {
            from: signer,
            to: call.to,
            amount: call.amount,
        }),
        IERC20::IERC20Calls::transferFrom(call) => Some(TokenTransfer {
            from: call.from,
            to: call.to,
            amount: call.amount,
        }),
        IERC20::IERC20Calls::balanceOf(_) => None,
    }
}

/// [`CoinClient`] for one ERC-20 token.
pub struct Erc20Client {
    asset_id: String,
    evm: Arc<EvmClient>,
    contract: Address,
}

impl Erc20Client {
    pub fn new(asset_id: String, evm: Arc<EvmClient>, contract: &str) -> NodeResult<Self> {
        let contract = Address::from_str(contract)
            .map_err(|e| NodeError::InvalidInput(format!("invalid contract '{}': {}", contract, e)))?;
        Ok(Self {
            asset_id,
            evm,
            contract,
        })
    }

    pub fn contract(&self) -> Address {
        self.contract
    }
}

#[async_trait]
impl CoinClient for Erc20Client {
    fn asset_id(&self) -> &str {
        &self.asset_id
    }

    async fn get_info(&self) -> NodeResult<ChainState> {
        self.evm.chain_state_for(&self.asset_id).await
    }

    async fn get_balance(&self, address: &str) -> NodeResult<Balance> {
        let account = parse_address(address)?;
        let input = IERC20::balanceOfCall { account }.abi_encode();

        let raw = self
            .evm
            .call_for(&self.asset_id, "get_balance", self.contract, input)
            .await?;
        let units = (raw.len() == 32)
            .then(|| U256::try_from_be_slice(&raw))
            .flatten()
            .ok_or_else(|| {
                NodeError::upstream(
                    &self.asset_id,
                    "get_balance",
                    format!("balanceOf returned {} bytes", raw.len()),
                )
            })?;

        tracing::debug!(asset_id = %self.asset_id, contract = %self.contract, "Token balance read");
        Ok(Balance::single(&self.asset_id, units.to_string()))
    }

    async fn get_transaction_by_hash(&self, id: &str) -> NodeResult<Transaction> {
        let MinedTransaction { hash, tx, observed } = self.evm.transaction_for(&self.asset_id, id).await?;

        if tx.to() != Some(self.contract) {
            return Err(NodeError::upstream(
                &self.asset_id,
                "get_transaction_by_hash",
                format!("transaction {id} is not addressed to {}", self.contract),
            ));
        }
        let transfer = decode_transfer(tx.inner.signer(), tx.input()).ok_or_else(|| {
            NodeError::upstream(
                &self.asset_id,
                "get_transaction_by_hash",
                format!("transaction {id} is not a token transfer"),
            )
        })?;

        Ok(Transaction {
            id: hash.to_string(),
            from: transfer.from.to_string(),
            to: transfer.to.to_string(),
            value: transfer.amount.to_string(),
            confirmation: ConfirmationInfo::with_default_threshold(observed),
        })
    }
}
