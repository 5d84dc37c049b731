use alloy::primitives::{Address, B256, Bytes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::contracts::CallData;
use crate::error::SdkResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionReceipt {
    pub transaction_hash: B256,
    pub block_number: Option<u64>,
    pub success: bool,
}

/// Read-only access to the chain (`eth_call`)
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn call(&self, call: &CallData) -> SdkResult<Bytes>;
}

/// Wallet able to sign and broadcast transactions.
///
/// `send_transaction` resolves once the transaction is mined.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn get_address(&self) -> SdkResult<Address>;

    async fn send_transaction(&self, call: CallData) -> SdkResult<TransactionReceipt>;
}
