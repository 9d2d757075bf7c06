//! In-memory stand-ins for the wallet, contract, backend, and push channel.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use frames::{ClientEvent, RecordPaint, UserStats, WirePixel, WirePosition};
use tokio::sync::broadcast;

use crate::api::{Backend, retain_valid};
use crate::app::{App, Services};
use crate::channel::PushChannel;
use crate::config::{AppConfig, DEFAULT_FEE_RECIPIENT};
use crate::contract::{ContractError, PixelContract, TxReceipt};
use crate::error::AppError;
use crate::wallet::{Address, ChainDescriptor, ProviderError, ProviderRegistry, WalletEvent, WalletKind, WalletProvider};

pub const TARGET_CHAIN: u64 = 11_124;
pub const OTHER_CHAIN: u64 = 1;
pub const TX_HASH: &str = "0xfeedface";

/// Deterministic address whose hex digits are all `digit`.
pub fn addr(digit: char) -> Address {
    Address::parse(&format!("0x{}", digit.to_string().repeat(40))).unwrap()
}

pub fn fee_recipient() -> Address {
    Address::parse(DEFAULT_FEE_RECIPIENT).unwrap()
}

pub fn wire(id: &str, x: i32, y: i32, color: &str) -> WirePixel {
    WirePixel { id: id.to_owned(), position: WirePosition { x, y }, color: color.to_owned() }
}

pub fn stats(address: &str, points: u64, pixels_painted: u64) -> UserStats {
    UserStats { wallet_address: address.to_owned(), points, pixels_painted }
}

/// Unique scratch path for a session file.
pub fn temp_session_path() -> PathBuf {
    std::env::temp_dir().join(format!("pixelboard-session-{}.json", uuid::Uuid::new_v4()))
}

/// Default configuration with the session file redirected to `session_path`.
pub fn test_config(session_path: &std::path::Path) -> AppConfig {
    let path = session_path.display().to_string();
    AppConfig::from_lookup(|key| (key == "PIXELBOARD_SESSION_PATH").then(|| path.clone())).unwrap()
}

// =========================================================================
// FakeWallet
// =========================================================================

#[derive(Debug, Default)]
pub struct WalletState {
    pub accounts: Vec<Address>,
    pub chain_id: u64,
    /// Chains the wallet can switch to without adding them first.
    pub known_chains: Vec<u64>,
    pub reject_requests: bool,
    pub reject_switch: bool,
    pub reject_add: bool,
    /// Provider calls, in order.
    pub calls: Vec<&'static str>,
}

pub struct FakeWallet {
    pub state: Mutex<WalletState>,
    events: broadcast::Sender<WalletEvent>,
}

impl FakeWallet {
    pub fn new(accounts: Vec<Address>, chain_id: u64) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        let state = WalletState { accounts, chain_id, known_chains: vec![OTHER_CHAIN, TARGET_CHAIN], ..Default::default() };
        Arc::new(Self { state: Mutex::new(state), events })
    }

    pub fn with(&self, f: impl FnOnce(&mut WalletState)) {
        f(&mut self.state.lock().unwrap());
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn chain(&self) -> u64 {
        self.state.lock().unwrap().chain_id
    }

    pub fn emit(&self, event: WalletEvent) {
        let _ = self.events.send(event);
    }

    fn record(&self, call: &'static str) -> std::sync::MutexGuard<'_, WalletState> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        state
    }
}

#[async_trait::async_trait]
impl WalletProvider for FakeWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError> {
        let state = self.record("request_accounts");
        if state.reject_requests {
            return Err(ProviderError::Rejected);
        }
        Ok(state.accounts.clone())
    }

    async fn accounts(&self) -> Result<Vec<Address>, ProviderError> {
        Ok(self.record("accounts").accounts.clone())
    }

    async fn chain_id(&self) -> Result<u64, ProviderError> {
        Ok(self.record("chain_id").chain_id)
    }

    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError> {
        let mut state = self.record("switch_chain");
        if state.reject_switch {
            return Err(ProviderError::Rejected);
        }
        if !state.known_chains.contains(&chain_id) {
            return Err(ProviderError::UnrecognizedChain(chain_id));
        }
        state.chain_id = chain_id;
        Ok(())
    }

    async fn add_chain(&self, chain: &ChainDescriptor) -> Result<(), ProviderError> {
        let mut state = self.record("add_chain");
        if state.reject_add {
            return Err(ProviderError::Rejected);
        }
        state.known_chains.push(chain.id);
        state.chain_id = chain.id;
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.events.subscribe()
    }
}

// =========================================================================
// FakeContract
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaintCall {
    pub pixels_hash: [u8; 32],
    pub count: u64,
    pub fee_wei: u128,
}

#[derive(Default)]
pub struct FakeContract {
    pub fail: Mutex<Option<ContractError>>,
    pub paints: Mutex<Vec<PaintCall>>,
    pub withdrawals: Mutex<usize>,
}

impl FakeContract {
    pub fn failing(error: ContractError) -> Arc<Self> {
        Arc::new(Self { fail: Mutex::new(Some(error)), ..Default::default() })
    }

    pub fn paints(&self) -> Vec<PaintCall> {
        self.paints.lock().unwrap().clone()
    }

    fn outcome(&self) -> Result<TxReceipt, ContractError> {
        match self.fail.lock().unwrap().clone() {
            Some(e) => Err(e),
            None => Ok(TxReceipt { hash: TX_HASH.to_owned() }),
        }
    }
}

#[async_trait::async_trait]
impl PixelContract for FakeContract {
    async fn paint_pixels(&self, pixels_hash: [u8; 32], count: u64, fee_wei: u128) -> Result<TxReceipt, ContractError> {
        let receipt = self.outcome()?;
        self.paints.lock().unwrap().push(PaintCall { pixels_hash, count, fee_wei });
        Ok(receipt)
    }

    async fn withdraw_fees(&self) -> Result<TxReceipt, ContractError> {
        let receipt = self.outcome()?;
        *self.withdrawals.lock().unwrap() += 1;
        Ok(receipt)
    }
}

// =========================================================================
// FakeBackend
// =========================================================================

#[derive(Default)]
pub struct FakeBackend {
    pub pixels: Mutex<Vec<WirePixel>>,
    pub leaderboard: Mutex<Vec<UserStats>>,
    pub users: Mutex<Vec<UserStats>>,
    pub fail_reads: Mutex<bool>,
    pub fail_writes: Mutex<bool>,
    pub registered: Mutex<Vec<String>>,
    pub recorded: Mutex<Vec<RecordPaint>>,
}

impl FakeBackend {
    pub fn with_pixels(pixels: Vec<WirePixel>) -> Arc<Self> {
        Arc::new(Self { pixels: Mutex::new(pixels), ..Default::default() })
    }

    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().unwrap().clone()
    }

    pub fn recorded(&self) -> Vec<RecordPaint> {
        self.recorded.lock().unwrap().clone()
    }

    fn check(&self, flag: &Mutex<bool>, path: &str) -> Result<(), AppError> {
        if *flag.lock().unwrap() {
            return Err(AppError::BackendStatus { status: 503, path: path.to_owned() });
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl Backend for FakeBackend {
    async fn fetch_pixels(&self) -> Result<Vec<WirePixel>, AppError> {
        self.check(&self.fail_reads, "/pixels")?;
        Ok(retain_valid(self.pixels.lock().unwrap().clone()))
    }

    async fn fetch_leaderboard(&self) -> Result<Vec<UserStats>, AppError> {
        self.check(&self.fail_reads, "/leaderboard")?;
        Ok(self.leaderboard.lock().unwrap().clone())
    }

    async fn fetch_user(&self, address: &Address) -> Result<Option<UserStats>, AppError> {
        self.check(&self.fail_reads, "/user")?;
        Ok(self.users.lock().unwrap().iter().find(|u| address.matches(&u.wallet_address)).cloned())
    }

    async fn register_user(&self, address: &Address) -> Result<(), AppError> {
        self.check(&self.fail_writes, "/users")?;
        self.registered.lock().unwrap().push(address.to_string());
        Ok(())
    }

    async fn record_paint(&self, record: &RecordPaint) -> Result<(), AppError> {
        self.check(&self.fail_writes, "/users/stats")?;
        self.recorded.lock().unwrap().push(record.clone());
        Ok(())
    }
}

// =========================================================================
// FakeChannel
// =========================================================================

#[derive(Default)]
pub struct FakeChannel {
    pub emitted: Mutex<Vec<ClientEvent>>,
    pub fail: Mutex<bool>,
}

impl FakeChannel {
    pub fn emitted(&self) -> Vec<ClientEvent> {
        self.emitted.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl PushChannel for FakeChannel {
    async fn emit(&self, event: ClientEvent) -> Result<(), AppError> {
        if *self.fail.lock().unwrap() {
            return Err(AppError::Channel("closed".to_owned()));
        }
        self.emitted.lock().unwrap().push(event);
        Ok(())
    }
}

// =========================================================================
// Harness
// =========================================================================

/// An [`App`] wired to fakes, with handles to each of them.
pub struct Harness {
    pub app: App,
    pub wallet: Arc<FakeWallet>,
    pub backend: Arc<FakeBackend>,
    pub contract: Arc<FakeContract>,
    pub channel: Arc<FakeChannel>,
    pub session_path: PathBuf,
}

impl Harness {
    /// MetaMask registered with `accounts` on the target chain, three pixels
    /// on the backend.
    pub fn new(accounts: Vec<Address>) -> Self {
        Self::build(FakeWallet::new(accounts, TARGET_CHAIN), Arc::new(FakeContract::default()), temp_session_path())
    }

    pub fn build(wallet: Arc<FakeWallet>, contract: Arc<FakeContract>, session_path: PathBuf) -> Self {
        let backend = FakeBackend::with_pixels(vec![
            wire("a", 0, 0, "#ffffff"),
            wire("b", 1, 0, "#ffffff"),
            wire("c", 2, 0, "#ffffff"),
        ]);
        let channel = Arc::new(FakeChannel::default());
        let mut registry = ProviderRegistry::new();
        registry.register(WalletKind::MetaMask, wallet.clone());

        let services = Services { backend: backend.clone(), contract: contract.clone(), channel: channel.clone() };
        let app = App::new(test_config(&session_path), registry, services);
        Self { app, wallet, backend, contract, channel, session_path }
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.session_path);
    }
}
