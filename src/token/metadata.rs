// src/token/metadata.rs

//! The swap document a mini-app reads to render a "buy this token" button.
//! Field order and argument order are part of the contract with the mini-app.

use anyhow::{Context, Result};
use ethers::types::{Address, U256};
use ethers::utils::to_checksum;
use serde::Serialize;
use serde_json::{json, Value};

use crate::blockchain::route::encode_route;

/// 0.1 MON, in wei.
pub const SWAP_AMOUNT_WEI: u128 = 100_000_000_000_000_000;

/// Placeholder the mini-app replaces with the connected wallet.
pub const SENDER_PLACEHOLDER: &str = "{{sender}}";

/// Seconds added to the reference time to produce the swap deadline.
pub const DEADLINE_WINDOW_SECS: u64 = 3600;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapMetadata {
    pub label: String,
    pub description: String,
    pub chain_id: u64,
    pub token_address: String,
    pub address: String,
    pub abi: Vec<Value>,
    pub function_name: String,
    pub value: String,
    pub args: Vec<String>,
}

fn swap_exact_in_abi() -> Value {
    json!({
        "type": "function",
        "name": "swapExactIn",
        "stateMutability": "payable",
        "inputs": [
            { "name": "route", "type": "bytes" },
            { "name": "recipient", "type": "address" },
            { "name": "amountIn", "type": "uint256" },
            { "name": "amountOutMin", "type": "uint256" },
            { "name": "deadline", "type": "uint256" },
            { "name": "referrer", "type": "address" }
        ],
        "outputs": [
            { "name": "", "type": "uint256" },
            { "name": "", "type": "uint256" }
        ]
    })
}

impl SwapMetadata {
    pub fn new(
        token_name: &str,
        token_address: Address,
        proxy_address: Address,
        chain_id: u64,
        deadline: U256,
    ) -> Self {
        let route = encode_route(token_address);
        let amount = U256::from(SWAP_AMOUNT_WEI).to_string();

        SwapMetadata {
            label: format!("Swap 0.1 MON for {}", token_name),
            description: format!(
                "Buy {} on its TokenMill market with 0.1 MON",
                token_name
            ),
            chain_id,
            token_address: to_checksum(&token_address, None),
            address: to_checksum(&proxy_address, None),
            abi: vec![swap_exact_in_abi()],
            function_name: "swapExactIn".to_string(),
            value: amount.clone(),
            args: vec![
                format!("0x{}", hex::encode(&route)),
                SENDER_PLACEHOLDER.to_string(),
                amount,
                "0".to_string(),
                deadline.to_string(),
                to_checksum(&Address::zero(), None),
            ],
        }
    }
}

/// Renders the swap document for `token_name` as pretty-printed JSON.
pub fn build_metadata(
    token_name: &str,
    token_address: Address,
    proxy_address: Address,
    chain_id: u64,
    deadline: U256,
) -> Result<String> {
    let doc = SwapMetadata::new(token_name, token_address, proxy_address, chain_id, deadline);
    serde_json::to_string_pretty(&doc).context("Failed to serialize swap metadata")
}

/// Deadline one window after `reference_timestamp` (seconds). `None` when the
/// sum does not fit in 256 bits.
pub fn swap_deadline(reference_timestamp: U256) -> Option<U256> {
    reference_timestamp.checked_add(U256::from(DEADLINE_WINDOW_SECS))
}
