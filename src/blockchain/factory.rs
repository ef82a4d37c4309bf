// src/blockchain/factory.rs

//! The TokenMill factory call: payload construction, ladder validation and
//! the JSON-RPC backed `FactoryClient`.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ethers_core::abi::{decode, encode, ParamType, Token};
use ethers_core::types::{Address, Bytes, TransactionRequest, H256, U256};
use ethers_core::utils::keccak256;
use ethers_signers::{LocalWallet, Signer};
use secrecy::ExposeSecret;
use serde_json::json;
use tracing::{debug, info};

use super::{
    models::{DeploymentResult, PreparedDeployment, ReceiptSummary},
    rpc::{hex_to_bytes, parse_quantity, RpcClient},
    transactions, FactoryClient,
};
use crate::config::DeploySettings;
use crate::error::ActionError;
use crate::token::TokenParameters;

pub const CREATE_MARKET_AND_TOKEN_SIG: &str =
    "createMarketAndToken((uint96,string,string,address,uint256,uint16,uint16,uint256[],uint256[],bytes))";

/// ERC-20 token type in the factory's registry.
pub const TOKEN_TYPE_ERC20: u64 = 1;

pub const MIN_LADDER_LEN: usize = 2;
pub const MAX_LADDER_LEN: usize = 101;

const MAX_TOTAL_SHARE_BPS: u32 = 10_000;

// Price ladders, in quote-token wei per base token.
const BID_PRICES: [u128; 3] = [0, 9_800_000_000_000_000, 9_900_000_000_000_000];
const ASK_PRICES: [u128; 3] = [0, 9_900_000_000_000_000, 10_000_000_000_000_000];

fn selector(sig: &str) -> [u8; 4] {
    let mut sel = [0u8; 4];
    sel.copy_from_slice(&keccak256(sig.as_bytes())[0..4]);
    sel
}

fn encode_call(sig: &str, tokens: &[Token]) -> Bytes {
    let mut out = selector(sig).to_vec();
    out.extend(encode(tokens));
    Bytes::from(out)
}

/// Bid and ask ladders must be the same length, with at least two and at
/// most 101 price points.
pub fn validate_price_ladders(bid_prices: &[U256], ask_prices: &[U256]) -> Result<(), ActionError> {
    if bid_prices.len() != ask_prices.len() {
        return Err(ActionError::ValidationFailure(format!(
            "bid and ask ladders differ in length ({} vs {})",
            bid_prices.len(),
            ask_prices.len()
        )));
    }
    let len = bid_prices.len();
    if len < MIN_LADDER_LEN {
        return Err(ActionError::ValidationFailure(format!(
            "price ladders need at least {} points, got {}",
            MIN_LADDER_LEN, len
        )));
    }
    if len > MAX_LADDER_LEN {
        return Err(ActionError::ValidationFailure(format!(
            "price ladders allow at most {} points, got {}",
            MAX_LADDER_LEN, len
        )));
    }
    Ok(())
}

/// `supply * 10^decimals` as an exact integer. Fails when the supply has more
/// fractional digits than `decimals` or the result overflows 256 bits.
pub fn scale_supply(supply: f64, decimals: u8) -> Result<U256, ActionError> {
    let invalid = |reason: &str| {
        ActionError::ValidationFailure(format!(
            "total supply {} cannot be scaled to {} decimals: {}",
            supply, decimals, reason
        ))
    };
    if !supply.is_finite() || supply < 0.0 {
        return Err(invalid("not a positive number"));
    }

    let text = supply.to_string();
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');
    let decimals = usize::from(decimals);
    if fraction.len() > decimals {
        return Err(invalid("too many fractional digits"));
    }

    let digits = format!("{}{}{}", whole, fraction, "0".repeat(decimals - fraction.len()));
    U256::from_dec_str(&digits).map_err(|_| invalid("value does not fit in 256 bits"))
}

/// Arguments of `createMarketAndToken`.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketParameters {
    pub token_type: u64,
    pub name: String,
    pub symbol: String,
    pub quote_token: Address,
    pub total_supply: U256,
    /// Basis points.
    pub creator_share: u16,
    /// Basis points.
    pub staking_share: u16,
    pub bid_prices: Vec<U256>,
    pub ask_prices: Vec<U256>,
    /// ABI-encoded `uint256 decimals`.
    pub args: Bytes,
}

impl MarketParameters {
    /// Builds the factory payload for `token` with the fixed price ladders.
    pub fn from_token(token: &TokenParameters, quote_token: Address) -> Result<Self, ActionError> {
        let total_supply = scale_supply(token.total_supply, token.decimals)?;

        let params = MarketParameters {
            token_type: TOKEN_TYPE_ERC20,
            name: token.name.clone(),
            symbol: token.symbol.clone(),
            quote_token,
            total_supply,
            creator_share: u16::from(token.creator_share) * 100,
            staking_share: u16::from(token.staking_share) * 100,
            bid_prices: BID_PRICES.iter().map(|p| U256::from(*p)).collect(),
            ask_prices: ASK_PRICES.iter().map(|p| U256::from(*p)).collect(),
            args: Bytes::from(encode(&[Token::Uint(U256::from(token.decimals))])),
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<(), ActionError> {
        validate_price_ladders(&self.bid_prices, &self.ask_prices)?;
        let total_share = u32::from(self.creator_share) + u32::from(self.staking_share);
        if total_share > MAX_TOTAL_SHARE_BPS {
            return Err(ActionError::ValidationFailure(format!(
                "creator and staking shares add up to {} bps, above {}",
                total_share, MAX_TOTAL_SHARE_BPS
            )));
        }
        Ok(())
    }

    /// The struct argument as a single ABI tuple.
    pub fn to_token(&self) -> Token {
        Token::Tuple(vec![
            Token::Uint(U256::from(self.token_type)),
            Token::String(self.name.clone()),
            Token::String(self.symbol.clone()),
            Token::Address(self.quote_token),
            Token::Uint(self.total_supply),
            Token::Uint(U256::from(self.creator_share)),
            Token::Uint(U256::from(self.staking_share)),
            Token::Array(self.bid_prices.iter().copied().map(Token::Uint).collect()),
            Token::Array(self.ask_prices.iter().copied().map(Token::Uint).collect()),
            Token::Bytes(self.args.to_vec()),
        ])
    }

    /// Full calldata for `createMarketAndToken`.
    pub fn calldata(&self) -> Bytes {
        encode_call(CREATE_MARKET_AND_TOKEN_SIG, &[self.to_token()])
    }
}

/// Decodes the `(address baseToken, address market)` return value.
pub fn decode_deployment(data: &[u8]) -> Result<DeploymentResult> {
    let tokens = decode(&[ParamType::Address, ParamType::Address], data)
        .context("Failed to decode createMarketAndToken result")?;
    match tokens.as_slice() {
        [Token::Address(token), Token::Address(market)] => Ok(DeploymentResult {
            token_address: *token,
            market_address: *market,
        }),
        other => Err(anyhow!("unexpected createMarketAndToken result: {:?}", other)),
    }
}

/// Talks to the factory through a JSON-RPC node and signs locally.
pub struct EvmFactoryClient {
    rpc: RpcClient,
    wallet: LocalWallet,
    chain_id: u64,
    poll_interval: Duration,
    max_polls: u32,
}

impl EvmFactoryClient {
    pub fn new(settings: &DeploySettings) -> Result<Self> {
        let wallet = LocalWallet::from_str(settings.private_key.expose_secret())
            .map_err(|e| anyhow!("Invalid private key: {}", e))?
            .with_chain_id(settings.chain_id);

        Ok(Self {
            rpc: RpcClient::new(settings.rpc_url.clone()),
            wallet,
            chain_id: settings.chain_id,
            poll_interval: settings.receipt_poll_interval,
            max_polls: settings.receipt_max_polls,
        })
    }

    pub fn sender(&self) -> Address {
        self.wallet.address()
    }
}

#[async_trait]
impl FactoryClient for EvmFactoryClient {
    async fn simulate_create_market(
        &self,
        factory: Address,
        params: &MarketParameters,
    ) -> Result<PreparedDeployment> {
        let data = params.calldata();
        let from = self.sender();
        let call_obj = json!({
            "from": format!("{:?}", from),
            "to": format!("{:?}", factory),
            "data": format!("0x{}", hex::encode(&data)),
        });

        let raw = self.rpc.call("eth_call", json!([call_obj, "latest"])).await?;
        let expected = decode_deployment(&hex_to_bytes(&raw)?)?;

        let gas = parse_quantity(&self.rpc.call("eth_estimateGas", json!([call_obj])).await?)
            .context("Failed to estimate gas for createMarketAndToken")?;

        debug!(
            "Simulated createMarketAndToken: token {:?}, market {:?}, gas {}",
            expected.token_address, expected.market_address, gas
        );

        let request = TransactionRequest::new()
            .from(from)
            .to(factory)
            .data(data)
            .gas(gas);

        Ok(PreparedDeployment { expected, request })
    }

    async fn submit(&self, request: TransactionRequest) -> Result<H256> {
        let tx_hash =
            transactions::sign_and_send(&self.rpc, &self.wallet, self.chain_id, request).await?;
        info!("Submitted createMarketAndToken transaction {:?}", tx_hash);
        Ok(tx_hash)
    }

    async fn wait_for_receipt(&self, tx_hash: H256) -> Result<ReceiptSummary> {
        transactions::wait_for_receipt(&self.rpc, tx_hash, self.poll_interval, self.max_polls).await
    }

    async fn latest_block_timestamp(&self) -> Result<U256> {
        let block = self
            .rpc
            .call("eth_getBlockByNumber", json!(["latest", false]))
            .await?;
        parse_quantity(&block["timestamp"]).context("latest block has no timestamp")
    }
}
