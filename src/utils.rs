//! Argument helpers for MCP tool calls

use std::str::FromStr;

use ethers::types::Address;
use serde::de::DeserializeOwned;
use serde_json::{from_value, Value};

use crate::mcp::protocol::{error_codes, Response};

/// Extracts a required argument from a tool's `arguments` object, or builds
/// the INVALID_PARAMS response to send back.
pub fn get_required_arg<T: DeserializeOwned>(
    args: &Value,
    key: &str,
    req_id: &Value,
) -> Result<T, Response> {
    from_value(args.get(key).cloned().unwrap_or(Value::Null)).map_err(|_| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Missing or invalid required argument: '{}'", key),
        )
    })
}

/// Like [`get_required_arg`] for a 0x-prefixed EVM address.
pub fn get_address_arg(args: &Value, key: &str, req_id: &Value) -> Result<Address, Response> {
    let raw: String = get_required_arg(args, key, req_id)?;
    Address::from_str(raw.trim()).map_err(|_| {
        Response::error(
            req_id.clone(),
            error_codes::INVALID_PARAMS,
            format!("Argument '{}' is not an EVM address: {}", key, raw),
        )
    })
}
