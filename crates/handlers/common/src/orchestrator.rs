//! Drives one transaction from the built state to a final outcome through
//! the signing paths the connected wallet offers.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use rwa_primitives::{
    context::{ChainClient, ChainClientError, GlobalContext},
    effects::{EffectsStatus, ExecutionOptions, ExecutionResponse},
    errors::MarketError,
    rpc::ObjectId,
    transaction::UnsignedTransaction,
    wallet::{
        InjectedWallet, LegacyExecuteMethod, WalletAccount, WalletCapabilities, WalletCapability,
        WalletError,
    },
};
use serde::Serialize;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::wallet_connector::WalletConnector;

pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_secs(60);

const NO_EXECUTION_PATH: &str = "wallet does not support transaction execution";

/// Progress of the latest submission.
///
/// `Executing` is only entered on the sign-then-execute path, where the node
/// runs the transaction after the wallet signed it. Combined wallet calls go
/// from `Signing` straight to their outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmissionState {
    Built,
    Signing,
    Executing,
    Rejected,
    SignFailed,
    Confirmed,
    ExecutionFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    WalletNotConnected,
    SubmissionInProgress,
    ExecutionFailed,
    ExecutionTimeout,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SubmissionResult {
    Success {
        digest: String,
        created_object_ids: Vec<ObjectId>,
        raw_effects: ExecutionResponse,
    },
    Rejected {
        reason: String,
    },
    Failed {
        error_kind: FailureKind,
        message: String,
    },
}

impl SubmissionResult {
    fn failed(error_kind: FailureKind, message: impl Into<String>) -> Self {
        SubmissionResult::Failed {
            error_kind,
            message: message.into(),
        }
    }

    /// The execution response of a confirmed submission, or the matching
    /// marketplace error.
    pub fn into_response(self) -> Result<ExecutionResponse, MarketError> {
        match self {
            SubmissionResult::Success { raw_effects, .. } => Ok(raw_effects),
            SubmissionResult::Rejected { reason } => Err(MarketError::UserRejectedTransaction(reason)),
            SubmissionResult::Failed { error_kind, message } => Err(match error_kind {
                FailureKind::WalletNotConnected => MarketError::WalletNotConnected,
                FailureKind::SubmissionInProgress => MarketError::SubmissionInProgress,
                FailureKind::ExecutionTimeout => MarketError::ExecutionTimeout,
                FailureKind::ExecutionFailed => MarketError::ExecutionFailed(message),
            }),
        }
    }
}

/// A way of getting a transaction signed and executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigningStrategy {
    /// `sui:signAndExecuteTransaction`
    SignAndExecute,
    /// `sui:signTransaction` followed by execution through the node
    SignThenExecute,
    Legacy(LegacyExecuteMethod),
}

impl SigningStrategy {
    /// Strategies the wallet supports, in the order they are tried.
    pub fn available(capabilities: &WalletCapabilities) -> Vec<SigningStrategy> {
        let mut strategies = Vec::new();
        if capabilities.has(WalletCapability::SignAndExecuteTransaction) {
            strategies.push(SigningStrategy::SignAndExecute);
        }
        if capabilities.has(WalletCapability::SignTransaction) {
            strategies.push(SigningStrategy::SignThenExecute);
        }
        for method in LegacyExecuteMethod::ORDER {
            if capabilities.has(method.capability()) {
                strategies.push(SigningStrategy::Legacy(method));
            }
        }
        strategies
    }
}

#[derive(Debug, thiserror::Error)]
enum StrategyError {
    #[error(transparent)]
    Wallet(#[from] WalletError),
    #[error(transparent)]
    Chain(#[from] ChainClientError),
}

// Clears the in-flight flag however the submission ends
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Orchestrator {
    connector: Arc<WalletConnector>,
    chain: Arc<dyn ChainClient>,
    chain_id: &'static str,
    execution_timeout: Duration,
    options: ExecutionOptions,
    in_flight: AtomicBool,
    state: Mutex<SubmissionState>,
}

impl Orchestrator {
    pub fn new(global_ctx: Arc<GlobalContext>, connector: Arc<WalletConnector>) -> Self {
        Self {
            connector,
            chain: global_ctx.chain(),
            chain_id: global_ctx.config().network.chain_id(),
            execution_timeout: DEFAULT_EXECUTION_TIMEOUT,
            options: ExecutionOptions::default(),
            in_flight: AtomicBool::new(false),
            state: Mutex::new(SubmissionState::Built),
        }
    }

    pub fn with_execution_timeout(mut self, execution_timeout: Duration) -> Self {
        self.execution_timeout = execution_timeout;
        self
    }

    pub fn connector(&self) -> &Arc<WalletConnector> {
        &self.connector
    }

    /// State of the latest submission
    pub fn state(&self) -> SubmissionState {
        self.state.lock().map(|s| *s).unwrap_or(SubmissionState::Built)
    }

    fn set_state(&self, state: SubmissionState) {
        debug!(?state, "Submission state changed");
        if let Ok(mut current) = self.state.lock() {
            *current = state;
        }
    }

    /// Sign and execute `transaction` with the connected wallet.
    ///
    /// Never retries on its own. A rejection or a timeout ends the
    /// submission; any other failure moves on to the next strategy.
    pub async fn submit(&self, transaction: UnsignedTransaction) -> SubmissionResult {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return SubmissionResult::failed(
                FailureKind::SubmissionInProgress,
                MarketError::SubmissionInProgress.to_string(),
            );
        }
        let _in_flight = InFlight(&self.in_flight);

        let Some((wallet, account)) = self.connector.active().await else {
            return SubmissionResult::failed(
                FailureKind::WalletNotConnected,
                MarketError::WalletNotConnected.to_string(),
            );
        };
        self.set_state(SubmissionState::Built);
        let transaction = transaction.with_default_sender(account.address);

        let result = self.run_strategies(wallet.as_ref(), &account, &transaction).await;
        if let SubmissionResult::Success { digest, .. } = &result {
            info!(%digest, "Transaction confirmed");
            if let Err(e) = self.connector.refresh_balance().await {
                warn!(error = %e, "Could not refresh balance after submission");
            }
        }
        result
    }

    async fn run_strategies(
        &self,
        wallet: &dyn InjectedWallet,
        account: &WalletAccount,
        transaction: &UnsignedTransaction,
    ) -> SubmissionResult {
        let strategies = SigningStrategy::available(&wallet.capabilities());
        if strategies.is_empty() {
            self.set_state(SubmissionState::SignFailed);
            return SubmissionResult::failed(FailureKind::ExecutionFailed, NO_EXECUTION_PATH);
        }

        let mut last_error = None;
        for strategy in strategies {
            self.set_state(SubmissionState::Signing);
            debug!(?strategy, wallet.name = %wallet.name(), "Trying signing strategy");

            let attempt = self.run_strategy(strategy, wallet, account, transaction);
            match timeout(self.execution_timeout, attempt).await {
                Err(_) => {
                    self.set_state(SubmissionState::ExecutionFailed);
                    warn!(?strategy, timeout = ?self.execution_timeout, "Transaction execution timed out");
                    return SubmissionResult::failed(
                        FailureKind::ExecutionTimeout,
                        MarketError::ExecutionTimeout.to_string(),
                    );
                }
                Ok(Ok(response)) => return self.classify(response),
                Ok(Err(StrategyError::Wallet(e))) if e.is_user_rejection() => {
                    self.set_state(SubmissionState::Rejected);
                    info!(?strategy, "Transaction rejected by user");
                    return SubmissionResult::Rejected { reason: e.to_string() };
                }
                Ok(Err(e)) => {
                    warn!(?strategy, error = %e, "Signing strategy failed");
                    last_error = Some(e.to_string());
                }
            }
        }

        self.set_state(SubmissionState::SignFailed);
        SubmissionResult::failed(
            FailureKind::ExecutionFailed,
            last_error.unwrap_or_else(|| NO_EXECUTION_PATH.to_string()),
        )
    }

    async fn run_strategy(
        &self,
        strategy: SigningStrategy,
        wallet: &dyn InjectedWallet,
        account: &WalletAccount,
        transaction: &UnsignedTransaction,
    ) -> Result<ExecutionResponse, StrategyError> {
        match strategy {
            SigningStrategy::SignAndExecute => Ok(wallet
                .sign_and_execute_transaction(transaction, account, self.chain_id, self.options)
                .await?),
            SigningStrategy::SignThenExecute => {
                let signed = wallet
                    .sign_transaction(transaction, account, self.chain_id)
                    .await?;
                self.set_state(SubmissionState::Executing);
                Ok(self.chain.execute_transaction(&signed, self.options).await?)
            }
            SigningStrategy::Legacy(method) => Ok(wallet
                .legacy_sign_and_execute(method, transaction, account, self.chain_id, self.options)
                .await?),
        }
    }

    fn classify(&self, response: ExecutionResponse) -> SubmissionResult {
        if let EffectsStatus::Failure(error) = response.status() {
            self.set_state(SubmissionState::ExecutionFailed);
            return SubmissionResult::failed(FailureKind::ExecutionFailed, error);
        }
        let Some(digest) = response.digest.clone() else {
            self.set_state(SubmissionState::ExecutionFailed);
            return SubmissionResult::failed(
                FailureKind::ExecutionFailed,
                "execution response carries no digest",
            );
        };

        self.set_state(SubmissionState::Confirmed);
        let created_object_ids = response
            .created_objects()
            .filter_map(|change| change.object_id.as_deref())
            .filter_map(|id| ObjectId::from_hex(id).ok())
            .collect();
        SubmissionResult::Success {
            digest,
            created_object_ids,
            raw_effects: response,
        }
    }
}
