//! Connection to the user's injected wallet.
//!
//! The connector is the only owner of the active account and the cached
//! balance. Everything else reads them through [`WalletConnector::account`],
//! [`WalletConnector::balance`] or [`WalletConnector::active`].

mod discovery;

use std::{sync::Arc, time::Duration};

use rwa_primitives::{
    context::{ChainClient, GlobalContext},
    errors::MarketError,
    types::{Balance, Network},
    wallet::{
        InjectedWallet, LegacyAccountSource, LegacyConnectMethod, WalletAccount,
        WalletCapabilities, WalletCapability, WalletError,
    },
};
use rwa_utils::session::SessionStore;
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{Mutex, RwLock},
    time::timeout,
};
use tracing::{debug, info, warn};

pub use discovery::{InjectedWallets, WALLET_SLOTS};

/// Key under which the connected account is persisted.
pub const SESSION_KEY: &str = "onechain_wallet_session";

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_LEGACY_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectTimeouts {
    /// Bound on `standard:connect`
    pub standard: Duration,
    /// Bound on each legacy connect or account read
    pub legacy: Duration,
}

impl Default for ConnectTimeouts {
    fn default() -> Self {
        Self {
            standard: DEFAULT_CONNECT_TIMEOUT,
            legacy: DEFAULT_LEGACY_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedSession {
    wallet_name: String,
    account: WalletAccount,
}

#[derive(Default)]
struct ConnectorState {
    wallet: Option<Arc<dyn InjectedWallet>>,
    account: Option<WalletAccount>,
    balance: Option<Balance>,
}

// Outcome of one legacy attempt, kept to pick the final error
enum LegacyFailure {
    Timeout,
    Failed(String),
}

pub struct WalletConnector {
    wallets: InjectedWallets,
    chain: Arc<dyn ChainClient>,
    session: Arc<dyn SessionStore>,
    network: Network,
    coin_type: String,
    timeouts: ConnectTimeouts,
    state: RwLock<ConnectorState>,
    connecting: Mutex<()>,
}

impl WalletConnector {
    pub fn new(
        global_ctx: Arc<GlobalContext>,
        wallets: InjectedWallets,
        session: Arc<dyn SessionStore>,
    ) -> Self {
        let config = global_ctx.config();
        Self {
            wallets,
            chain: global_ctx.chain(),
            session,
            network: config.network,
            coin_type: config.coin_type.clone(),
            timeouts: ConnectTimeouts::default(),
            state: RwLock::new(ConnectorState::default()),
            connecting: Mutex::new(()),
        }
    }

    pub fn with_timeouts(mut self, timeouts: ConnectTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Connect to the first discovered wallet and make its first account
    /// active.
    pub async fn connect(&self) -> Result<WalletAccount, MarketError> {
        let _guard = self
            .connecting
            .try_lock()
            .map_err(|_| MarketError::ConnectionInProgress)?;

        let wallet = self.wallets.discover().ok_or(MarketError::NoWalletFound)?;
        let capabilities = wallet.capabilities();
        info!(wallet.name = %wallet.name(), "Connecting to wallet");

        let accounts = if capabilities.has(WalletCapability::StandardConnect) {
            self.standard_connect(wallet.as_ref()).await?
        } else {
            self.legacy_connect(wallet.as_ref(), &capabilities).await?
        };

        let mut account = accounts.into_iter().next().ok_or(MarketError::NoAccounts)?;
        if account.chains.is_empty() {
            account.chains.insert(self.network.chain_id().to_string());
        }

        self.persist(&wallet.name(), &account)?;
        {
            let mut state = self.state.write().await;
            state.wallet = Some(wallet.clone());
            state.account = Some(account.clone());
            state.balance = None;
        }
        info!(wallet.name = %wallet.name(), address = %account.address, "Wallet connected");

        if let Err(e) = self.refresh_balance().await {
            warn!(error = %e, "Could not load balance after connecting");
        }
        Ok(account)
    }

    async fn standard_connect(
        &self,
        wallet: &dyn InjectedWallet,
    ) -> Result<Vec<WalletAccount>, MarketError> {
        match timeout(self.timeouts.standard, wallet.standard_connect()).await {
            Err(_) => Err(MarketError::ConnectionTimeout),
            Ok(Err(e)) => Err(connect_error(&e)),
            Ok(Ok(accounts)) if accounts.is_empty() => Err(MarketError::NoAccounts),
            Ok(Ok(accounts)) => Ok(accounts),
        }
    }

    async fn legacy_connect(
        &self,
        wallet: &dyn InjectedWallet,
        capabilities: &WalletCapabilities,
    ) -> Result<Vec<WalletAccount>, MarketError> {
        let mut last_failure = None;
        let mut connected = false;

        for method in LegacyConnectMethod::ORDER {
            if !capabilities.has(method.capability()) {
                continue;
            }
            match timeout(self.timeouts.legacy, wallet.legacy_connect(method)).await {
                Ok(Ok(())) => {
                    debug!(method = %method.capability(), "Legacy connect succeeded");
                    connected = true;
                    break;
                }
                Ok(Err(e)) if e.is_user_rejection() => return Err(MarketError::ConnectionRejected),
                Ok(Err(e)) => {
                    debug!(method = %method.capability(), error = %e, "Legacy connect failed");
                    last_failure = Some(LegacyFailure::Failed(e.to_string()));
                }
                Err(_) => {
                    debug!(method = %method.capability(), "Legacy connect timed out");
                    last_failure = Some(LegacyFailure::Timeout);
                }
            }
        }

        if !connected {
            return Err(match last_failure {
                Some(LegacyFailure::Timeout) => MarketError::ConnectionTimeout,
                Some(LegacyFailure::Failed(message)) => MarketError::ConnectionFailed(message),
                None => MarketError::ConnectionFailed("wallet exposes no connect method".to_string()),
            });
        }

        for source in LegacyAccountSource::ORDER {
            if !capabilities.has(source.capability()) {
                continue;
            }
            match timeout(self.timeouts.legacy, wallet.legacy_accounts(source)).await {
                Ok(Ok(accounts)) if !accounts.is_empty() => return Ok(accounts),
                Ok(Ok(_)) => debug!(source = %source.capability(), "No accounts returned"),
                Ok(Err(e)) => debug!(source = %source.capability(), error = %e, "Account read failed"),
                Err(_) => debug!(source = %source.capability(), "Account read timed out"),
            }
        }
        Err(MarketError::NoAccounts)
    }

    /// Reload a persisted session without prompting the user.
    pub async fn restore(&self) -> Result<Option<WalletAccount>, MarketError> {
        let Some(raw) = self.session.get(SESSION_KEY).map_err(session_error)? else {
            return Ok(None);
        };
        let saved: PersistedSession = match serde_json::from_str(&raw) {
            Ok(saved) => saved,
            Err(e) => {
                warn!(error = %e, "Dropping unreadable wallet session");
                self.session.remove(SESSION_KEY).map_err(session_error)?;
                return Ok(None);
            }
        };
        let Some(wallet) = self.wallets.discover_named(&saved.wallet_name) else {
            debug!(wallet.name = %saved.wallet_name, "Saved wallet is not available");
            return Ok(None);
        };

        {
            let mut state = self.state.write().await;
            state.wallet = Some(wallet);
            state.account = Some(saved.account.clone());
            state.balance = None;
        }
        info!(address = %saved.account.address, "Wallet session restored");
        if let Err(e) = self.refresh_balance().await {
            warn!(error = %e, "Could not load balance for restored session");
        }
        Ok(Some(saved.account))
    }

    pub async fn disconnect(&self) -> Result<(), MarketError> {
        let wallet = {
            let mut state = self.state.write().await;
            state.account = None;
            state.balance = None;
            state.wallet.take()
        };

        if let Some(wallet) = wallet {
            if wallet.capabilities().has(WalletCapability::StandardDisconnect) {
                if let Err(e) = wallet.standard_disconnect().await {
                    warn!(error = %e, wallet.name = %wallet.name(), "Wallet disconnect failed");
                }
            }
        }

        self.session.remove(SESSION_KEY).map_err(session_error)?;
        info!("Wallet disconnected");
        Ok(())
    }

    /// Re-read the active account's balance from the chain and cache it.
    pub async fn refresh_balance(&self) -> Result<Balance, MarketError> {
        let address = self
            .account()
            .await
            .ok_or(MarketError::WalletNotConnected)?
            .address;
        let balance = self.chain.get_balance(address, &self.coin_type).await?;

        let mut state = self.state.write().await;
        // The account may have changed while the read was in flight
        if state.account.as_ref().map(|a| a.address) == Some(address) {
            state.balance = Some(balance);
        }
        debug!(%address, balance = %balance.display(), "Balance refreshed");
        Ok(balance)
    }

    pub async fn balance(&self) -> Option<Balance> {
        self.state.read().await.balance
    }

    pub async fn account(&self) -> Option<WalletAccount> {
        self.state.read().await.account.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.state.read().await.account.is_some()
    }

    /// Capabilities of the connected wallet
    pub async fn capabilities(&self) -> Option<WalletCapabilities> {
        self.state
            .read()
            .await
            .wallet
            .as_ref()
            .map(|wallet| wallet.capabilities())
    }

    /// The connected wallet together with its active account.
    pub async fn active(&self) -> Option<(Arc<dyn InjectedWallet>, WalletAccount)> {
        let state = self.state.read().await;
        match (&state.wallet, &state.account) {
            (Some(wallet), Some(account)) => Some((wallet.clone(), account.clone())),
            _ => None,
        }
    }

    fn persist(&self, wallet_name: &str, account: &WalletAccount) -> Result<(), MarketError> {
        let session = PersistedSession {
            wallet_name: wallet_name.to_string(),
            account: account.clone(),
        };
        let raw = serde_json::to_string(&session).map_err(|e| MarketError::Session(e.to_string()))?;
        self.session.set(SESSION_KEY, &raw).map_err(session_error)
    }
}

fn session_error(e: rwa_utils::session::SessionError) -> MarketError {
    MarketError::Session(e.to_string())
}

fn connect_error(e: &WalletError) -> MarketError {
    if e.is_user_rejection() {
        MarketError::ConnectionRejected
    } else {
        MarketError::ConnectionFailed(e.to_string())
    }
}
