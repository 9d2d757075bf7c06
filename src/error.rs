//! Application error taxonomy.
//!
//! Every failure surfaced to the user flows through [`AppError`]. Each variant
//! carries a stable, grepable code via [`ErrorCode`] and says whether retrying
//! the same action can succeed. Nothing here is fatal to the process: callers
//! log, notify, and leave local state untouched.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use crate::contract::ContractError;
use crate::wallet::{ProviderError, WalletKind};

/// Stable error code plus retry hint for user-facing errors.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{kind} wallet not found; install it from {install_url}")]
    ProviderUnavailable { kind: WalletKind, install_url: &'static str },
    #[error("wallet is on chain {actual}, expected {expected}")]
    WrongNetwork { expected: u64, actual: u64 },
    #[error("switch to {chain} was rejected: {source}")]
    ChainSwitchRejected {
        chain: String,
        #[source]
        source: ProviderError,
    },
    #[error("wallet provider error: {0}")]
    Provider(#[from] ProviderError),
    #[error("backend request failed: {0}")]
    Backend(#[from] reqwest::Error),
    #[error("backend returned HTTP {status} for {path}")]
    BackendStatus { status: u16, path: String },
    #[error("push channel error: {0}")]
    Channel(String),
    #[error("wire format error: {0}")]
    Codec(#[from] frames::CodecError),
    #[error("{0}")]
    Transaction(#[from] ContractError),
    #[error("connect a wallet first")]
    NotConnected,
    #[error("select at least one pixel")]
    NothingSelected,
    #[error("a transaction is already pending")]
    TransactionPending,
    #[error("only the fee recipient can do that")]
    NotPrivileged,
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("session storage error: {0}")]
    Session(String),
}

impl ErrorCode for AppError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::ProviderUnavailable { .. } => "E_PROVIDER_UNAVAILABLE",
            Self::WrongNetwork { .. } => "E_WRONG_NETWORK",
            Self::ChainSwitchRejected { .. } => "E_CHAIN_SWITCH_REJECTED",
            Self::Provider(_) => "E_PROVIDER",
            Self::Backend(_) => "E_BACKEND",
            Self::BackendStatus { .. } => "E_BACKEND_STATUS",
            Self::Channel(_) => "E_CHANNEL",
            Self::Codec(_) => "E_CODEC",
            Self::Transaction(_) => "E_TRANSACTION",
            Self::NotConnected => "E_NOT_CONNECTED",
            Self::NothingSelected => "E_NOTHING_SELECTED",
            Self::TransactionPending => "E_TRANSACTION_PENDING",
            Self::NotPrivileged => "E_NOT_PRIVILEGED",
            Self::Config(_) => "E_CONFIG",
            Self::Session(_) => "E_SESSION",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::BackendStatus { status, .. } => *status >= 500,
            Self::ChainSwitchRejected { .. }
            | Self::WrongNetwork { .. }
            | Self::Provider(_)
            | Self::Backend(_)
            | Self::Channel(_)
            | Self::Transaction(_) => true,
            _ => false,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Session(err.to_string())
    }
}
