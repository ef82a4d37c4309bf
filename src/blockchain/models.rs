// src/blockchain/models.rs

use ethers::types::{Address, TransactionRequest, H256, U256, U64};
use serde::{Deserialize, Serialize};

/// Addresses returned by `createMarketAndToken`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentResult {
    pub token_address: Address,
    pub market_address: Address,
}

/// Output of the dry run: what the factory will return, and the request to
/// send for real.
#[derive(Debug, Clone)]
pub struct PreparedDeployment {
    pub expected: DeploymentResult,
    pub request: TransactionRequest,
}

/// The parts of a transaction receipt the deployer cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub tx_hash: H256,
    pub block_number: Option<u64>,
    pub gas_used: Option<U256>,
    pub succeeded: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawReceipt {
    pub transaction_hash: H256,
    #[serde(default)]
    pub block_number: Option<U64>,
    #[serde(default)]
    pub gas_used: Option<U256>,
    #[serde(default)]
    pub status: Option<U64>,
}

impl From<RawReceipt> for ReceiptSummary {
    fn from(raw: RawReceipt) -> Self {
        ReceiptSummary {
            tx_hash: raw.transaction_hash,
            block_number: raw.block_number.map(|n| n.as_u64()),
            gas_used: raw.gas_used,
            // Pre-Byzantium receipts carry no status; treat them as success.
            succeeded: raw.status.map_or(true, |s| s == U64::one()),
        }
    }
}
