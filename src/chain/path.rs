// path.rs - Packed multi-hop path for the V3 swap router.
//
// Layout: token(0) || fee(0) || token(1) || fee(1) || ... || token(n)
//   token: 20 bytes
//   fee:   3 bytes, big-endian (uint24)
// exactInput takes the path input -> output; exactOutput takes it output -> input.

use ethers::types::{Address, Bytes};

use crate::engine::trade::Route;
use crate::error::{Result, SwapError};

pub const ADDR_SIZE: usize = 20;
pub const FEE_SIZE: usize = 3;
const MAX_FEE: u32 = (1 << 24) - 1;

/// Byte length of an encoded path with `hops` pools.
pub const fn encoded_len(hops: usize) -> usize {
    ADDR_SIZE * (hops + 1) + FEE_SIZE * hops
}

fn checked_fee(fee: u32, hop: usize) -> Result<u32> {
    if fee == 0 || fee > MAX_FEE {
        return Err(SwapError::MissingFeeTier { hop });
    }
    Ok(fee)
}

/// Packs `tokens` and `fees` (one fee between each adjacent token pair).
pub fn encode_packed(tokens: &[Address], fees: &[u32]) -> Result<Bytes> {
    if tokens.len() != fees.len() + 1 || fees.is_empty() {
        return Err(SwapError::InvalidPath {
            reason: format!("{} tokens cannot be joined by {} fees", tokens.len(), fees.len()),
        });
    }
    let mut out = Vec::with_capacity(encoded_len(fees.len()));
    for (i, fee) in fees.iter().enumerate() {
        out.extend_from_slice(tokens[i].as_bytes());
        out.extend_from_slice(&fee.to_be_bytes()[1..]);
    }
    out.extend_from_slice(tokens[tokens.len() - 1].as_bytes());
    Ok(Bytes::from(out))
}

/// Path in swap order, for exactInput.
pub fn encode_route_forward(route: &Route) -> Result<Bytes> {
    let tokens: Vec<Address> = route.path().iter().map(|t| t.address).collect();
    let fees = route
        .pools()
        .iter()
        .enumerate()
        .map(|(i, p)| checked_fee(p.fee, i))
        .collect::<Result<Vec<_>>>()?;
    encode_packed(&tokens, &fees)
}

/// Path in reverse swap order (output first), for exactOutput.
pub fn encode_route_reversed(route: &Route) -> Result<Bytes> {
    let tokens: Vec<Address> = route.path().iter().rev().map(|t| t.address).collect();
    let fees = route
        .pools()
        .iter()
        .enumerate()
        .rev()
        .map(|(i, p)| checked_fee(p.fee, i))
        .collect::<Result<Vec<_>>>()?;
    encode_packed(&tokens, &fees)
}

/// Splits a packed path back into its tokens and fees.
pub fn decode_path(path: &[u8]) -> Result<(Vec<Address>, Vec<u32>)> {
    let step = ADDR_SIZE + FEE_SIZE;
    if path.len() < ADDR_SIZE + step || (path.len() - ADDR_SIZE) % step != 0 {
        return Err(SwapError::InvalidPath { reason: format!("bad path length {}", path.len()) });
    }
    let hops = (path.len() - ADDR_SIZE) / step;
    let mut tokens = Vec::with_capacity(hops + 1);
    let mut fees = Vec::with_capacity(hops);
    for i in 0..hops {
        let at = i * step;
        tokens.push(Address::from_slice(&path[at..at + ADDR_SIZE]));
        let f = &path[at + ADDR_SIZE..at + step];
        fees.push(u32::from_be_bytes([0, f[0], f[1], f[2]]));
    }
    tokens.push(Address::from_slice(&path[path.len() - ADDR_SIZE..]));
    Ok((tokens, fees))
}

/// `0x`-prefixed lower-case hex of an encoded path.
pub fn to_hex(path: &Bytes) -> String {
    format!("0x{}", hex::encode(path.as_ref()))
}
