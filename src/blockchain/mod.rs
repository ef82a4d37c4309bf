// src/blockchain/mod.rs

pub mod factory;
pub mod models;
pub mod route;
pub mod rpc;
pub mod transactions;

pub use factory::{EvmFactoryClient, MarketParameters};
pub use models::{DeploymentResult, PreparedDeployment, ReceiptSummary};
pub use route::encode_route;

use anyhow::Result;
use async_trait::async_trait;
use ethers::types::{Address, TransactionRequest, H256, U256};

/// The on-chain side of a launch: a dry run of the factory call, the real
/// submission, and the wait for its receipt.
#[async_trait]
pub trait FactoryClient: Send + Sync {
    /// Read-only call of `createMarketAndToken`; returns the addresses the
    /// factory would produce and the request to submit.
    async fn simulate_create_market(
        &self,
        factory: Address,
        params: &MarketParameters,
    ) -> Result<PreparedDeployment>;

    /// Signs and broadcasts a prepared request, returning its hash.
    async fn submit(&self, request: TransactionRequest) -> Result<H256>;

    /// Blocks until the transaction is mined; errors if it reverted.
    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<ReceiptSummary>;

    /// Timestamp (seconds) of the latest block.
    async fn latest_block_timestamp(&self) -> Result<U256>;
}
