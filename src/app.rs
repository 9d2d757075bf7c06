//! Application root: wires the canvas engine to the wallet, contract, backend,
//! and push channel.
//!
//! DESIGN
//! ======
//! `App` is driven with `&mut self` from a single task. Network results are
//! applied in the order they are awaited; pushed events are applied in the
//! order they arrive on the channel receiver. Engine [`Action`]s produced by
//! any operation are queued and handed to the host through
//! [`App::drain_actions`]; user-facing messages go through the [`Notifier`].
//!
//! ERROR HANDLING
//! ==============
//! Failed fetches leave local state untouched and surface a notification.
//! A failed paint keeps the selection so the user can retry; secondary
//! effects after a confirmed transaction (push emit, stats) are logged only.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use canvas::engine::{Action, EngineCore};
use frames::{ClientEvent, PaintPixels, RecordPaint, ServerEvent};
use tokio::sync::broadcast::error::TryRecvError;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::api::{Backend, into_pixel};
use crate::channel::PushChannel;
use crate::config::AppConfig;
use crate::contract::{PixelContract, TxReceipt, format_eth, pixels_hash, to_hex, total_fee};
use crate::error::{AppError, ErrorCode};
use crate::leaderboard::Leaderboard;
use crate::notify::{Notification, Notifier};
use crate::session::{SessionStore, StoredSession};
use crate::wallet::{Address, ProviderError, ProviderRegistry, WalletEvent, WalletKind, WalletProvider, ensure_chain};

/// External services the app talks to.
#[derive(Clone)]
pub struct Services {
    pub backend: Arc<dyn Backend>,
    pub contract: Arc<dyn PixelContract>,
    pub channel: Arc<dyn PushChannel>,
}

struct ConnectedWallet {
    kind: WalletKind,
    address: Address,
    provider: Arc<dyn WalletProvider>,
    events: broadcast::Receiver<WalletEvent>,
}

pub struct App {
    config: AppConfig,
    engine: EngineCore,
    registry: ProviderRegistry,
    services: Services,
    session: SessionStore,
    notifier: Notifier,
    leaderboard: Leaderboard,
    wallet: Option<ConnectedWallet>,
    tx_pending: bool,
    withdraw_pending: bool,
    actions: Vec<Action>,
}

impl App {
    #[must_use]
    pub fn new(config: AppConfig, registry: ProviderRegistry, services: Services) -> Self {
        let session = SessionStore::new(config.session_path.clone());
        Self {
            config,
            engine: EngineCore::new(),
            registry,
            services,
            session,
            notifier: Notifier::default(),
            leaderboard: Leaderboard::new(),
            wallet: None,
            tx_pending: false,
            withdraw_pending: false,
            actions: Vec::new(),
        }
    }

    /// Restore a stored session, then load pixels and the leaderboard.
    /// Failures are logged and notified; startup continues.
    pub async fn start(&mut self) {
        if let Err(e) = self.restore_session().await {
            warn!(error = %e, "session restore failed");
        }
        if let Err(e) = self.load_pixels().await {
            debug!(error = %e, "starting without pixel snapshot");
        }
        if let Err(e) = self.load_leaderboard().await {
            debug!(error = %e, "starting without leaderboard");
        }
    }

    // --- Wallet session ---

    /// Connect through the given wallet: request accounts, move to the target
    /// chain, then register the account.
    ///
    /// # Errors
    ///
    /// [`AppError::ProviderUnavailable`] if the wallet is not installed, or any
    /// provider / chain error. Every failure is also notified.
    pub async fn connect_wallet(&mut self, kind: WalletKind) -> Result<Address, AppError> {
        match self.try_connect(kind).await {
            Ok(address) => {
                self.notifier.success("Wallet connected successfully");
                Ok(address)
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), wallet = %kind, "wallet connect failed");
                self.notifier.error(format!("Failed to connect wallet: {e}"));
                if self.wallet.is_none() {
                    self.forget_session().await;
                }
                Err(e)
            }
        }
    }

    async fn try_connect(&mut self, kind: WalletKind) -> Result<Address, AppError> {
        let provider = self.registry.get(kind)?;
        let accounts = provider.request_accounts().await?;
        let address = accounts.into_iter().next().ok_or(ProviderError::NoAccounts)?;
        ensure_chain(provider.as_ref(), &self.config.chain).await?;
        self.adopt(kind, provider, address.clone()).await;
        Ok(address)
    }

    /// Silently reconnect the stored address if a provider still exposes it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Session`] if the session file cannot be read.
    pub async fn restore_session(&mut self) -> Result<Option<Address>, AppError> {
        let Some(stored) = self.session.load().await? else {
            return Ok(None);
        };
        let kinds = stored.wallet_kind.map_or_else(|| self.registry.available(), |kind| vec![kind]);

        for kind in kinds {
            let Ok(provider) = self.registry.get(kind) else {
                continue;
            };
            match provider.accounts().await {
                Ok(accounts) if accounts.contains(&stored.wallet_address) => {
                    info!(address = %stored.wallet_address, wallet = %kind, "wallet session restored");
                    self.check_chain(provider.as_ref()).await;
                    self.adopt(kind, provider, stored.wallet_address.clone()).await;
                    return Ok(Some(stored.wallet_address));
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, wallet = %kind, "could not read accounts"),
            }
        }

        info!(address = %stored.wallet_address, "stored wallet no longer authorized");
        self.session.clear().await?;
        Ok(None)
    }

    /// Drop the connected wallet and its staged selection.
    pub async fn disconnect_wallet(&mut self) {
        let Some(wallet) = self.wallet.take() else {
            return;
        };
        info!(address = %wallet.address, "wallet disconnected");
        self.engine.set_wallet_connected(false);
        self.engine.set_privileged(false);
        let actions = self.engine.reset_selection();
        self.actions.extend(actions);
        self.leaderboard.set_user(None);
        self.forget_session().await;
        self.notifier.success("Wallet disconnected");
    }

    /// React to an account or chain change reported by the provider.
    pub async fn handle_wallet_event(&mut self, event: WalletEvent) {
        match event {
            WalletEvent::AccountsChanged(accounts) => {
                let Some(address) = accounts.into_iter().next() else {
                    self.disconnect_wallet().await;
                    return;
                };
                let Some(wallet) = self.wallet.as_mut() else {
                    return;
                };
                if wallet.address == address {
                    return;
                }
                info!(from = %wallet.address, to = %address, "wallet account changed");
                wallet.address = address.clone();
                let actions = self.engine.reset_selection();
                self.actions.extend(actions);
                self.apply_identity(&address).await;
            }
            WalletEvent::ChainChanged(chain_id) => {
                if chain_id != self.config.chain.id {
                    warn!(chain_id, expected = self.config.chain.id, "wallet moved to another chain");
                    self.notifier.error(format!("Please switch to {}", self.config.chain.name));
                }
            }
        }
    }

    /// Handle every wallet event received since the last call.
    pub async fn poll_wallet_events(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let Some(wallet) = self.wallet.as_mut() else {
                break;
            };
            let event = match wallet.events.try_recv() {
                Ok(event) => event,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "wallet events lagged");
                    continue;
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            };
            self.handle_wallet_event(event).await;
            handled += 1;
        }
        handled
    }

    async fn adopt(&mut self, kind: WalletKind, provider: Arc<dyn WalletProvider>, address: Address) {
        let events = provider.subscribe();
        self.wallet = Some(ConnectedWallet { kind, address: address.clone(), provider, events });
        self.engine.set_wallet_connected(true);
        self.apply_identity(&address).await;
    }

    /// Recompute privilege, persist, register, and fetch stats for `address`.
    async fn apply_identity(&mut self, address: &Address) {
        let privileged = self.config.is_privileged(address);
        self.engine.set_privileged(privileged);
        self.leaderboard.set_user(Some(address.clone()));
        info!(%address, privileged, "wallet active");

        let stored = StoredSession { wallet_address: address.clone(), wallet_kind: self.wallet.as_ref().map(|w| w.kind) };
        if let Err(e) = self.session.save(&stored).await {
            warn!(error = %e, "failed to persist wallet session");
        }
        if let Err(e) = self.services.backend.register_user(address).await {
            warn!(error = %e, %address, "user registration failed");
        }
        match self.services.backend.fetch_user(address).await {
            Ok(Some(stats)) => self.leaderboard.set_user_stats(stats),
            Ok(None) => debug!(%address, "no stats for user yet"),
            Err(e) => warn!(error = %e, %address, "user stats fetch failed"),
        }
    }

    async fn check_chain(&mut self, provider: &dyn WalletProvider) {
        match provider.chain_id().await {
            Ok(id) if id == self.config.chain.id => {}
            Ok(id) => {
                warn!(chain_id = id, expected = self.config.chain.id, "restored wallet is on another chain");
                self.notifier.error(format!("Please switch to {}", self.config.chain.name));
            }
            Err(e) => warn!(error = %e, "could not read wallet chain"),
        }
    }

    async fn forget_session(&mut self) {
        if let Err(e) = self.session.clear().await {
            warn!(error = %e, "failed to clear wallet session");
        }
    }

    // --- Board data ---

    /// Fetch the pixel snapshot into the engine. On failure the engine shows
    /// a load error instead of an empty board.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn load_pixels(&mut self) -> Result<usize, AppError> {
        match self.services.backend.fetch_pixels().await {
            Ok(pixels) => {
                let count = pixels.len();
                let actions = self.engine.load_snapshot(pixels.into_iter().map(into_pixel).collect());
                self.actions.extend(actions);
                info!(count, "pixel snapshot loaded");
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, code = e.error_code(), "pixel snapshot failed");
                let actions = self.engine.mark_load_failed(e.to_string());
                self.actions.extend(actions);
                self.notifier.error(format!("Failed to load pixels: {e}"));
                Err(e)
            }
        }
    }

    /// Fetch the leaderboard. Failures are logged only.
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn load_leaderboard(&mut self) -> Result<usize, AppError> {
        match self.services.backend.fetch_leaderboard().await {
            Ok(entries) => {
                let count = entries.len();
                self.leaderboard.replace(entries);
                Ok(count)
            }
            Err(e) => {
                warn!(error = %e, "leaderboard fetch failed");
                Err(e)
            }
        }
    }

    /// Apply one pushed event.
    pub fn handle_server_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::UpdatePixels(pixels) => {
                debug!(count = pixels.len(), "pixel update received");
                let actions = self.engine.apply_update(pixels.into_iter().map(into_pixel).collect());
                self.actions.extend(actions);
            }
            ServerEvent::LeaderboardUpdate(entries) => {
                debug!(count = entries.len(), "leaderboard update received");
                self.leaderboard.replace(entries);
            }
        }
    }

    /// Apply every event already waiting on `events`, in arrival order.
    pub fn pump(&mut self, events: &mut mpsc::UnboundedReceiver<ServerEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            self.handle_server_event(event);
            applied += 1;
        }
        applied
    }

    // --- Transactions ---

    /// Pay for and paint the staged selection with the pending color.
    ///
    /// On success the selection is cleared, the pixels are recolored locally,
    /// `paintPixels` is emitted, and stats are recorded. On failure the
    /// selection is kept.
    ///
    /// # Errors
    ///
    /// Guard errors ([`AppError::TransactionPending`], [`AppError::NotConnected`],
    /// [`AppError::NothingSelected`]), chain errors, or [`AppError::Transaction`].
    pub async fn submit(&mut self) -> Result<TxReceipt, AppError> {
        if self.tx_pending {
            return Err(AppError::TransactionPending);
        }
        let Some(wallet) = &self.wallet else {
            return Err(AppError::NotConnected);
        };
        if self.engine.selected_ids().is_empty() {
            return Err(AppError::NothingSelected);
        }
        let provider = Arc::clone(&wallet.provider);
        let address = wallet.address.clone();

        self.tx_pending = true;
        let result = self.paint(provider.as_ref(), &address).await;
        self.tx_pending = false;

        if let Err(e) = &result {
            warn!(error = %e, code = e.error_code(), "paint failed");
            self.notifier.error(format!("Failed to update pixels: {e}"));
        }
        result
    }

    async fn paint(&mut self, provider: &dyn WalletProvider, address: &Address) -> Result<TxReceipt, AppError> {
        ensure_chain(provider, &self.config.chain).await?;

        let ids = self.engine.selected_ids().to_vec();
        let color = self.engine.color().to_owned();
        let count = u64::try_from(ids.len()).unwrap_or(u64::MAX);
        let fee = total_fee(self.config.fee_per_pixel_wei, ids.len(), self.config.is_privileged(address));
        let hash = pixels_hash(address, &ids, &color);

        info!(count, %color, fee = %format_eth(fee), hash = %to_hex(&hash), "submitting paint transaction");
        self.notifier.info("Transaction pending...");
        let receipt = self.services.contract.paint_pixels(hash, count, fee).await?;
        info!(tx = %receipt.hash, "paint transaction confirmed");

        let event = ClientEvent::PaintPixels(PaintPixels {
            pixels: ids.clone(),
            color: color.clone(),
            transaction_hash: receipt.hash.clone(),
            user_address: address.to_string(),
        });
        if let Err(e) = self.services.channel.emit(event).await {
            warn!(error = %e, "paintPixels emit failed");
        }

        let record = RecordPaint {
            wallet_address: address.to_string(),
            pixels_painted: count,
            transaction_hash: receipt.hash.clone(),
            fee: fee.to_string(),
        };
        if let Err(e) = self.services.backend.record_paint(&record).await {
            warn!(error = %e, "recording paint stats failed");
        }

        let mut actions = self.engine.apply_local_paint(&ids, &color);
        actions.extend(self.engine.reset_selection());
        self.actions.extend(actions);
        self.notifier.success("Pixels updated successfully!");
        Ok(receipt)
    }

    /// Withdraw accumulated fees. Fee recipient only.
    ///
    /// # Errors
    ///
    /// [`AppError::NotConnected`], [`AppError::NotPrivileged`],
    /// [`AppError::TransactionPending`], chain errors, or [`AppError::Transaction`].
    pub async fn withdraw_fees(&mut self) -> Result<TxReceipt, AppError> {
        let Some(wallet) = &self.wallet else {
            return Err(AppError::NotConnected);
        };
        if !self.config.is_privileged(&wallet.address) {
            return Err(AppError::NotPrivileged);
        }
        if self.withdraw_pending {
            return Err(AppError::TransactionPending);
        }
        let provider = Arc::clone(&wallet.provider);

        self.withdraw_pending = true;
        self.notifier.info("Withdrawing fees...");
        let result = self.withdraw(provider.as_ref()).await;
        self.withdraw_pending = false;

        match &result {
            Ok(receipt) => {
                info!(tx = %receipt.hash, "fees withdrawn");
                self.notifier.success("Fees withdrawn successfully!");
            }
            Err(e) => {
                warn!(error = %e, "fee withdrawal failed");
                self.notifier.error(format!("Failed to withdraw fees: {e}"));
            }
        }
        result
    }

    async fn withdraw(&self, provider: &dyn WalletProvider) -> Result<TxReceipt, AppError> {
        ensure_chain(provider, &self.config.chain).await?;
        Ok(self.services.contract.withdraw_fees().await?)
    }

    // --- Host access ---

    #[must_use]
    pub fn engine(&self) -> &EngineCore {
        &self.engine
    }

    /// Mutable engine access for routing input events.
    pub fn engine_mut(&mut self) -> &mut EngineCore {
        &mut self.engine
    }

    /// Engine actions produced since the last call.
    pub fn drain_actions(&mut self) -> Vec<Action> {
        std::mem::take(&mut self.actions)
    }

    /// Notifications produced since the last call.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.notifier.drain()
    }

    #[must_use]
    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    #[must_use]
    pub fn address(&self) -> Option<&Address> {
        self.wallet.as_ref().map(|w| &w.address)
    }

    #[must_use]
    pub fn wallet_kind(&self) -> Option<WalletKind> {
        self.wallet.as_ref().map(|w| w.kind)
    }

    /// Returns `true` if the connected wallet is the fee recipient.
    #[must_use]
    pub fn is_privileged(&self) -> bool {
        self.address().is_some_and(|a| self.config.is_privileged(a))
    }

    #[must_use]
    pub fn is_tx_pending(&self) -> bool {
        self.tx_pending
    }

    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
