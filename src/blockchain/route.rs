// src/blockchain/route.rs

use ethers::types::{Address, Bytes};

/// `(3 << 24) | (0 << 16) | 0`: single-hop route through a TokenMill market.
pub const ROUTE_FLAG: u32 = (3 << 24) | (0 << 16) | 0;

/// Length of an encoded route: address + uint32 + address, packed.
pub const ROUTE_LEN: usize = 20 + 4 + 20;

/// Packs the swap route `native asset -> target_token` the way the router
/// expects it (`abi.encodePacked(address(0), uint32 flag, target)`).
pub fn encode_route(target_token: Address) -> Bytes {
    let mut out = Vec::with_capacity(ROUTE_LEN);
    out.extend_from_slice(Address::zero().as_bytes());
    out.extend_from_slice(&ROUTE_FLAG.to_be_bytes());
    out.extend_from_slice(target_token.as_bytes());
    Bytes::from(out)
}
