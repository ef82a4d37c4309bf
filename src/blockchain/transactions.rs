// src/blockchain/transactions.rs

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use ethers_signers::{LocalWallet, Signer};
use ethers_core::types::{transaction::eip2718::TypedTransaction, TransactionRequest, H256};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::{
    models::{RawReceipt, ReceiptSummary},
    rpc::{parse_quantity, RpcClient},
};

/// Fills in nonce, gas price and chain id, signs the request locally and
/// broadcasts it with `eth_sendRawTransaction`.
///
/// The nonce is read from the node's pending count on every call; nothing is
/// cached between submissions.
pub async fn sign_and_send(
    rpc: &RpcClient,
    wallet: &LocalWallet,
    chain_id: u64,
    tx_request: TransactionRequest,
) -> Result<H256> {
    let from_address = wallet.address();

    let nonce = parse_quantity(
        &rpc.call(
            "eth_getTransactionCount",
            json!([format!("{:?}", from_address), "pending"]),
        )
        .await?,
    )
    .context("Failed to get nonce from RPC response")?;

    let mut tx = tx_request
        .from(from_address)
        .nonce(nonce)
        .chain_id(chain_id);

    // If gas is not provided, estimate it via eth_estimateGas
    if tx.gas.is_none() {
        let call_obj = serde_json::to_value(&tx)?;
        let gas = parse_quantity(&rpc.call("eth_estimateGas", json!([call_obj])).await?)
            .context("Failed to get gas estimate")?;
        tx = tx.gas(gas);
    }

    // If gas price not provided, fetch eth_gasPrice and use legacy gas_price
    if tx.gas_price.is_none() {
        let gas_price = parse_quantity(&rpc.call("eth_gasPrice", json!([])).await?)
            .context("Failed to get gasPrice")?;
        tx = tx.gas_price(gas_price);
    }

    debug!(
        "Signing transaction from {:?} with nonce {} on chain {}",
        from_address, nonce, chain_id
    );

    let typed: TypedTransaction = tx.into();
    let signature = wallet
        .sign_transaction(&typed)
        .await
        .map_err(|e| anyhow!("Failed to sign transaction: {}", e))?;
    let raw_tx = typed.rlp_signed(&signature);

    let result = rpc
        .call(
            "eth_sendRawTransaction",
            json!([format!("0x{}", hex::encode(&raw_tx))]),
        )
        .await?;

    let tx_hash = result
        .as_str()
        .ok_or_else(|| anyhow!("Failed to extract transaction hash from response"))?;
    serde_json::from_value(Value::String(tx_hash.to_string()))
        .with_context(|| format!("Invalid transaction hash {}", tx_hash))
}

/// Polls `eth_getTransactionReceipt` until the transaction is mined, at most
/// `max_polls` times. A mined but reverted transaction is an error.
pub async fn wait_for_receipt(
    rpc: &RpcClient,
    tx_hash: H256,
    poll_interval: Duration,
    max_polls: u32,
) -> Result<ReceiptSummary> {
    for attempt in 1..=max_polls {
        let raw = rpc
            .call("eth_getTransactionReceipt", json!([format!("{:?}", tx_hash)]))
            .await?;

        if raw.is_null() {
            debug!("Receipt for {:?} not available yet (poll {})", tx_hash, attempt);
            tokio::time::sleep(poll_interval).await;
            continue;
        }

        let receipt: ReceiptSummary = serde_json::from_value::<RawReceipt>(raw)
            .context("Malformed transaction receipt")?
            .into();

        if !receipt.succeeded {
            bail!(
                "transaction {:?} reverted in block {}",
                tx_hash,
                receipt
                    .block_number
                    .map_or_else(|| "unknown".to_string(), |n| n.to_string())
            );
        }

        info!(
            "Transaction {:?} confirmed in block {:?}",
            tx_hash, receipt.block_number
        );
        return Ok(receipt);
    }

    bail!(
        "no receipt for transaction {:?} after {} polls",
        tx_hash,
        max_polls
    )
}
