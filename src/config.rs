//! Runtime configuration loaded from `PIXELBOARD_*` environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::contract::DEFAULT_FEE_PER_PIXEL_WEI;
use crate::error::AppError;
use crate::wallet::{Address, ChainDescriptor};

pub const DEFAULT_BACKEND_URL: &str = "https://abstract-backend.onrender.com";
pub const DEFAULT_CONTRACT_ADDRESS: &str = "0x487C44911853d915A0385FF71cb23C17A02FdFd2";
pub const DEFAULT_FEE_RECIPIENT: &str = "0x5255eF6956a77143D3F18978555c6cdCd4F2aA0A";
pub const DEFAULT_SESSION_PATH: &str = ".pixelboard-session.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CHANNEL_ATTEMPTS: u32 = 5;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// REST base URL, without a trailing slash.
    pub backend_url: String,
    /// Push channel URL.
    pub ws_url: String,
    pub contract_address: Address,
    /// Account exempt from fees and the selection quota.
    pub fee_recipient: Address,
    pub fee_per_pixel_wei: u128,
    pub chain: ChainDescriptor,
    pub session_path: PathBuf,
    pub request_timeout: Duration,
    /// Push channel connect attempts before giving up.
    pub channel_attempts: u32,
}

impl AppConfig {
    /// Load from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] naming the variable that failed to parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the environment.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] naming the variable that failed to parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let backend_url = lookup("PIXELBOARD_BACKEND_URL")
            .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        let ws_url = match lookup("PIXELBOARD_WS_URL") {
            Some(url) => url,
            None => derive_ws_url(&backend_url)?,
        };

        let contract_address = address(&lookup, "PIXELBOARD_CONTRACT_ADDRESS", DEFAULT_CONTRACT_ADDRESS)?;
        let fee_recipient = address(&lookup, "PIXELBOARD_FEE_RECIPIENT", DEFAULT_FEE_RECIPIENT)?;
        let fee_per_pixel_wei = parsed(&lookup, "PIXELBOARD_FEE_PER_PIXEL_WEI", DEFAULT_FEE_PER_PIXEL_WEI)?;

        let mut chain = ChainDescriptor::abstract_testnet();
        chain.id = parsed(&lookup, "PIXELBOARD_CHAIN_ID", chain.id)?;

        let session_path =
            lookup("PIXELBOARD_SESSION_PATH").map_or_else(|| PathBuf::from(DEFAULT_SESSION_PATH), PathBuf::from);
        let timeout_secs: u64 = parsed(&lookup, "PIXELBOARD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(AppError::Config("PIXELBOARD_REQUEST_TIMEOUT_SECS must be positive".to_owned()));
        }

        Ok(Self {
            backend_url,
            ws_url,
            contract_address,
            fee_recipient,
            fee_per_pixel_wei,
            chain,
            session_path,
            request_timeout: Duration::from_secs(timeout_secs),
            channel_attempts: DEFAULT_CHANNEL_ATTEMPTS,
        })
    }

    /// Point the REST and push URLs at a different backend.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if `url` is not `http(s)://`.
    pub fn with_backend_url(mut self, url: &str) -> Result<Self, AppError> {
        let url = url.trim_end_matches('/');
        self.ws_url = derive_ws_url(url)?;
        self.backend_url = url.to_owned();
        Ok(self)
    }

    /// Returns `true` if `address` is the fee recipient.
    #[must_use]
    pub fn is_privileged(&self, address: &Address) -> bool {
        &self.fee_recipient == address
    }
}

/// Engine.IO v4 WebSocket transport endpoint, relative to the backend root.
pub const SOCKET_IO_PATH: &str = "/socket.io/?EIO=4&transport=websocket";

/// `http(s)://host` → `ws(s)://host/socket.io/?EIO=4&transport=websocket`.
fn derive_ws_url(backend_url: &str) -> Result<String, AppError> {
    if let Some(rest) = backend_url.strip_prefix("https://") {
        return Ok(format!("wss://{rest}{SOCKET_IO_PATH}"));
    }
    if let Some(rest) = backend_url.strip_prefix("http://") {
        return Ok(format!("ws://{rest}{SOCKET_IO_PATH}"));
    }
    Err(AppError::Config(format!("backend URL must be http(s): {backend_url}")))
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| AppError::Config(format!("{key}={raw:?}: {e}"))),
    }
}

fn address(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> Result<Address, AppError> {
    let raw = lookup(key).unwrap_or_else(|| default.to_owned());
    Address::parse(&raw).map_err(|e| AppError::Config(format!("{key}: {e}")))
}
