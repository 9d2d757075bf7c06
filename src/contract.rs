//! Paint contract seam and fee arithmetic.

#[cfg(test)]
#[path = "contract_test.rs"]
mod contract_test;

use sha3::{Digest, Keccak256};

use crate::wallet::Address;

/// Wei per ETH.
pub const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// Default per-pixel fee: 0.00003 ETH.
pub const DEFAULT_FEE_PER_PIXEL_WEI: u128 = 30_000_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("transaction rejected by user")]
    Rejected,
    #[error("transaction reverted: {0}")]
    Reverted(String),
    #[error("contract call failed: {0}")]
    Rpc(String),
}

/// A mined transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub hash: String,
}

/// The on-chain paint contract. Calls resolve once the transaction is mined.
#[async_trait::async_trait]
pub trait PixelContract: Send + Sync {
    /// `paintPixels(bytes32 pixelsHash, uint256 numPixels)` with `fee_wei` attached.
    async fn paint_pixels(&self, pixels_hash: [u8; 32], count: u64, fee_wei: u128) -> Result<TxReceipt, ContractError>;

    /// `withdrawFees()`, callable by the fee recipient only.
    async fn withdraw_fees(&self) -> Result<TxReceipt, ContractError>;
}

/// Total fee for painting `count` pixels. The fee recipient paints for free.
#[must_use]
pub fn total_fee(fee_per_pixel_wei: u128, count: usize, privileged: bool) -> u128 {
    if privileged {
        return 0;
    }
    fee_per_pixel_wei.saturating_mul(u128::try_from(count).unwrap_or(u128::MAX))
}

/// Digest committing to who painted which pixels in which color:
/// `keccak256(abi.encode(address user, string[] ids, string color))`.
#[must_use]
pub fn pixels_hash(user: &Address, ids: &[String], color: &str) -> [u8; 32] {
    Keccak256::digest(abi_encode_paint(user, ids, color)).into()
}

/// Solidity ABI encoding of `(address, string[], string)`.
///
/// The head holds the address and the byte offsets of the two dynamic tails.
/// The array tail is its length, one offset per element (relative to the
/// first offset word), then each element as length plus zero-padded bytes.
#[must_use]
pub fn abi_encode_paint(user: &Address, ids: &[String], color: &str) -> Vec<u8> {
    let mut array = word(ids.len());
    let mut offset = ids.len() * WORD;
    for id in ids {
        array.extend_from_slice(&word(offset));
        offset += encoded_len(id.as_bytes());
    }
    for id in ids {
        push_bytes(&mut array, id.as_bytes());
    }

    let mut out = Vec::with_capacity(3 * WORD + array.len() + encoded_len(color.as_bytes()));
    out.extend_from_slice(&[0u8; 12]);
    out.extend_from_slice(&user.to_bytes());
    out.extend_from_slice(&word(3 * WORD));
    out.extend_from_slice(&word(3 * WORD + array.len()));
    out.extend_from_slice(&array);
    push_bytes(&mut out, color.as_bytes());
    out
}

const WORD: usize = 32;

/// Big-endian `uint256` holding `n`.
fn word(n: usize) -> Vec<u8> {
    let mut w = vec![0u8; WORD];
    w[WORD - 8..].copy_from_slice(&(n as u64).to_be_bytes());
    w
}

fn encoded_len(bytes: &[u8]) -> usize {
    WORD + bytes.len().div_ceil(WORD) * WORD
}

fn push_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&word(bytes.len()));
    out.extend_from_slice(bytes);
    out.resize(out.len() + (WORD - bytes.len() % WORD) % WORD, 0);
}

/// `0x`-prefixed lowercase hex.
#[must_use]
pub fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// Render wei as a decimal ETH amount without trailing zeros, e.g. `0.00003`.
#[must_use]
pub fn format_eth(wei: u128) -> String {
    let whole = wei / WEI_PER_ETH;
    let frac = wei % WEI_PER_ETH;
    if frac == 0 {
        return whole.to_string();
    }
    let digits = format!("{frac:018}");
    format!("{whole}.{}", digits.trim_end_matches('0'))
}
