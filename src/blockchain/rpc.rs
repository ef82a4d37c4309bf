// src/blockchain/rpc.rs

use anyhow::{anyhow, Context, Result};
use ethers::types::U256;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

/// Minimal JSON-RPC 2.0 client for an EVM node.
#[derive(Clone, Debug)]
pub struct RpcClient {
    http: Client,
    url: String,
}

impl RpcClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Sends one request and returns its `result`, turning an RPC `error`
    /// object into an error.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1
        });
        debug!("RPC {} -> {}", method, self.url);

        let response: Value = self
            .http
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("{} request to {} failed", method, self.url))?
            .json()
            .await
            .with_context(|| format!("{} returned a non-JSON response", method))?;

        if let Some(err) = response.get("error") {
            return Err(anyhow!("RPC error in {}: {}", method, err));
        }
        Ok(response["result"].clone())
    }
}

/// Parses a hex quantity (`"0x1a"`) returned by the node.
pub fn parse_quantity(v: &Value) -> Result<U256> {
    let s = v
        .as_str()
        .ok_or_else(|| anyhow!("expected a hex quantity, got {}", v))?;
    U256::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| anyhow!("invalid hex quantity {}: {}", s, e))
}

/// Decodes a hex data string (`"0x..."`) returned by the node.
pub fn hex_to_bytes(v: &Value) -> Result<Vec<u8>> {
    let s = v
        .as_str()
        .ok_or_else(|| anyhow!("expected hex data, got {}", v))?;
    let s = s.strip_prefix("0x").unwrap_or(s);
    Ok(hex::decode(s)?)
}
