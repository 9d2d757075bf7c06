//! Wallet provider seam: discovered browser wallets and chain management.
//!
//! The real JSON-RPC binding lives in the host. This module defines what the
//! client needs from a provider ([`WalletProvider`]), the registry of
//! providers discovered at startup, and [`ensure_chain`], the switch-or-add
//! dance run before every transaction.

#[cfg(test)]
#[path = "wallet_test.rs"]
mod wallet_test;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::AppError;

/// EIP-1193 code for a rejected user request.
pub const CODE_USER_REJECTED: i64 = 4001;
/// EIP-3326 code for "chain not added to the wallet".
pub const CODE_UNRECOGNIZED_CHAIN: i64 = 4902;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    #[error("request rejected by user")]
    Rejected,
    #[error("chain {0} is not known to the wallet")]
    UnrecognizedChain(u64),
    #[error("provider returned no accounts")]
    NoAccounts,
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    #[error("provider error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl ProviderError {
    /// Numeric provider error code.
    #[must_use]
    pub fn code(&self) -> i64 {
        match self {
            Self::Rejected => CODE_USER_REJECTED,
            Self::UnrecognizedChain(_) => CODE_UNRECOGNIZED_CHAIN,
            Self::NoAccounts | Self::InvalidAddress(_) => -32_603,
            Self::Rpc { code, .. } => *code,
        }
    }
}

/// A `0x`-prefixed, 20-byte hex account address.
///
/// Keeps the casing it was created with; equality ignores case.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and validate an address.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::InvalidAddress`] unless `raw` is `0x` followed by 40 hex digits.
    pub fn parse(raw: &str) -> Result<Self, ProviderError> {
        let raw = raw.trim();
        let valid = raw
            .strip_prefix("0x")
            .or_else(|| raw.strip_prefix("0X"))
            .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()));
        if !valid {
            return Err(ProviderError::InvalidAddress(raw.to_owned()));
        }
        Ok(Self(raw.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The 20 raw address bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; 20] {
        let hex = self.0.as_bytes().get(2..).unwrap_or_default();
        let mut out = [0u8; 20];
        for (byte, pair) in out.iter_mut().zip(hex.chunks_exact(2)) {
            *byte = (nibble(pair[0]) << 4) | nibble(pair[1]);
        }
        out
    }

    /// Case-insensitive comparison against a raw address string.
    #[must_use]
    pub fn matches(&self, raw: &str) -> bool {
        self.0.eq_ignore_ascii_case(raw)
    }
}

fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        b'A'..=b'F' => digit - b'A' + 10,
        _ => 0,
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Address {
    type Error = ProviderError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

/// Browser wallets the client knows how to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletKind {
    MetaMask,
    Zerion,
    Rabby,
    Trust,
    Coinbase,
}

impl WalletKind {
    /// Every kind, in the order offered to the user.
    pub const ALL: [Self; 5] = [Self::MetaMask, Self::Zerion, Self::Rabby, Self::Trust, Self::Coinbase];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::MetaMask => "MetaMask",
            Self::Zerion => "Zerion",
            Self::Rabby => "Rabby",
            Self::Trust => "Trust Wallet",
            Self::Coinbase => "Coinbase Wallet",
        }
    }

    /// Where to send the user when the extension is missing.
    #[must_use]
    pub fn install_url(self) -> &'static str {
        match self {
            Self::MetaMask => "https://metamask.io/download.html",
            Self::Zerion => "https://zerion.io/wallet",
            Self::Rabby => "https://rabby.io",
            Self::Trust => "https://trustwallet.com/browser-extension",
            Self::Coinbase => "https://www.coinbase.com/wallet/downloads",
        }
    }
}

impl fmt::Display for WalletKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Chain parameters, as passed to `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainDescriptor {
    pub id: u64,
    pub name: String,
    pub currency_name: String,
    pub currency_symbol: String,
    pub decimals: u8,
    pub rpc_url: String,
    pub explorer_url: String,
}

impl ChainDescriptor {
    /// Abstract Testnet, the chain the paint contract is deployed on.
    #[must_use]
    pub fn abstract_testnet() -> Self {
        Self {
            id: 11_124,
            name: "Abstract Testnet".to_owned(),
            currency_name: "ETH".to_owned(),
            currency_symbol: "ETH".to_owned(),
            decimals: 18,
            rpc_url: "https://api.testnet.abs.xyz".to_owned(),
            explorer_url: "https://sepolia.abscan.org/".to_owned(),
        }
    }

    /// Chain id as the `0x`-prefixed hex string wallets expect.
    #[must_use]
    pub fn hex_id(&self) -> String {
        format!("{:#x}", self.id)
    }
}

/// Notifications pushed by a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalletEvent {
    /// The exposed accounts changed. Empty means the user disconnected.
    AccountsChanged(Vec<Address>),
    ChainChanged(u64),
}

/// An injected browser wallet.
#[async_trait::async_trait]
pub trait WalletProvider: Send + Sync {
    /// Prompt the user to expose their accounts.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Accounts already exposed to this origin, without prompting.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    async fn chain_id(&self) -> Result<u64, ProviderError>;

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError>;

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<(), ProviderError>;

    /// Subscribe to account/chain changes.
    fn subscribe(&self) -> broadcast::Receiver<WalletEvent>;
}

/// Providers discovered at startup, keyed by kind.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<WalletKind, Arc<dyn WalletProvider>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a discovered provider, replacing any earlier one of the same kind.
    pub fn register(&mut self, kind: WalletKind, provider: Arc<dyn WalletProvider>) {
        info!(wallet = %kind, "wallet provider registered");
        self.providers.insert(kind, provider);
    }

    /// Look up a provider.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::ProviderUnavailable`] with the install URL when the
    /// wallet was not discovered.
    pub fn get(&self, kind: WalletKind) -> Result<Arc<dyn WalletProvider>, AppError> {
        self.providers
            .get(&kind)
            .cloned()
            .ok_or(AppError::ProviderUnavailable { kind, install_url: kind.install_url() })
    }

    /// Discovered kinds, in display order.
    #[must_use]
    pub fn available(&self) -> Vec<WalletKind> {
        WalletKind::ALL.into_iter().filter(|kind| self.providers.contains_key(kind)).collect()
    }
}

/// Make sure `provider` is on `chain`, switching (and adding the chain on
/// code 4902) if needed. Returns `true` if a switch happened.
///
/// # Errors
///
/// Returns [`AppError::ChainSwitchRejected`] if the switch or add fails, and
/// [`AppError::WrongNetwork`] if the wallet still reports another chain.
pub async fn ensure_chain(provider: &dyn WalletProvider, chain: &ChainDescriptor) -> Result<bool, AppError> {
    let current = provider.chain_id().await?;
    if current == chain.id {
        return Ok(false);
    }

    info!(current, target = chain.id, "switching wallet chain");
    match provider.switch_chain(chain.id).await {
        Ok(()) => {}
        Err(e) if e.code() == CODE_UNRECOGNIZED_CHAIN => {
            info!(chain = %chain.name, "chain unknown to wallet; adding it");
            provider
                .add_chain(chain)
                .await
                .map_err(|source| AppError::ChainSwitchRejected { chain: chain.name.clone(), source })?;
        }
        Err(source) => {
            warn!(error = %source, "chain switch failed");
            return Err(AppError::ChainSwitchRejected { chain: chain.name.clone(), source });
        }
    }

    let actual = provider.chain_id().await?;
    if actual != chain.id {
        return Err(AppError::WrongNetwork { expected: chain.id, actual });
    }
    Ok(true)
}
