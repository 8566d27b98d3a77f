use std::{collections::BTreeSet, fmt};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    effects::{ExecutionOptions, ExecutionResponse},
    rpc::Address,
    transaction::{SignedTransaction, UnsignedTransaction},
};

/// Error code wallets use when the user declines a request.
pub const USER_REJECTED_CODE: i64 = 4001;

/// The account a wallet hands out on connect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletAccount {
    pub address: Address,
    #[serde(default, with = "base64_opt", skip_serializing_if = "Option::is_none")]
    pub public_key: Option<Vec<u8>>,
    #[serde(default)]
    pub chains: BTreeSet<String>,
}

impl WalletAccount {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            public_key: None,
            chains: BTreeSet::new(),
        }
    }

    pub fn supports_chain(&self, chain: &str) -> bool {
        self.chains.contains(chain)
    }
}

mod base64_opt {
    use base64::{engine::general_purpose::STANDARD, Engine};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|s| STANDARD.decode(s).map_err(de::Error::custom))
            .transpose()
    }
}

/// A named method group a wallet may or may not expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WalletCapability {
    StandardConnect,
    StandardDisconnect,
    SignTransaction,
    SignAndExecuteTransaction,
    LegacyConnect,
    LegacyRequestPermissions,
    LegacyEnable,
    LegacyGetAccounts,
    LegacyAccounts,
    LegacyGetAccount,
    LegacySignAndExecuteTransaction,
    LegacySignAndExecuteTransactionBlock,
}

impl fmt::Display for WalletCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WalletCapability::StandardConnect => "standard:connect",
            WalletCapability::StandardDisconnect => "standard:disconnect",
            WalletCapability::SignTransaction => "sui:signTransaction",
            WalletCapability::SignAndExecuteTransaction => "sui:signAndExecuteTransaction",
            WalletCapability::LegacyConnect => "connect",
            WalletCapability::LegacyRequestPermissions => "requestPermissions",
            WalletCapability::LegacyEnable => "enable",
            WalletCapability::LegacyGetAccounts => "getAccounts",
            WalletCapability::LegacyAccounts => "accounts",
            WalletCapability::LegacyGetAccount => "getAccount",
            WalletCapability::LegacySignAndExecuteTransaction => "signAndExecuteTransaction",
            WalletCapability::LegacySignAndExecuteTransactionBlock => {
                "signAndExecuteTransactionBlock"
            }
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletCapabilities(BTreeSet<WalletCapability>);

impl WalletCapabilities {
    pub fn new(capabilities: impl IntoIterator<Item = WalletCapability>) -> Self {
        Self(capabilities.into_iter().collect())
    }

    pub fn has(&self, capability: WalletCapability) -> bool {
        self.0.contains(&capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = WalletCapability> + '_ {
        self.0.iter().copied()
    }
}

/// Legacy connect methods, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyConnectMethod {
    Connect,
    RequestPermissions,
    Enable,
}

impl LegacyConnectMethod {
    pub const ORDER: [LegacyConnectMethod; 3] = [
        LegacyConnectMethod::Connect,
        LegacyConnectMethod::RequestPermissions,
        LegacyConnectMethod::Enable,
    ];

    pub fn capability(&self) -> WalletCapability {
        match self {
            LegacyConnectMethod::Connect => WalletCapability::LegacyConnect,
            LegacyConnectMethod::RequestPermissions => WalletCapability::LegacyRequestPermissions,
            LegacyConnectMethod::Enable => WalletCapability::LegacyEnable,
        }
    }
}

/// Legacy ways of reading accounts after a legacy connect, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyAccountSource {
    GetAccounts,
    Accounts,
    GetAccount,
}

impl LegacyAccountSource {
    pub const ORDER: [LegacyAccountSource; 3] = [
        LegacyAccountSource::GetAccounts,
        LegacyAccountSource::Accounts,
        LegacyAccountSource::GetAccount,
    ];

    pub fn capability(&self) -> WalletCapability {
        match self {
            LegacyAccountSource::GetAccounts => WalletCapability::LegacyGetAccounts,
            LegacyAccountSource::Accounts => WalletCapability::LegacyAccounts,
            LegacyAccountSource::GetAccount => WalletCapability::LegacyGetAccount,
        }
    }
}

/// Legacy combined sign-and-execute methods, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyExecuteMethod {
    SignAndExecuteTransaction,
    SignAndExecuteTransactionBlock,
}

impl LegacyExecuteMethod {
    pub const ORDER: [LegacyExecuteMethod; 2] = [
        LegacyExecuteMethod::SignAndExecuteTransaction,
        LegacyExecuteMethod::SignAndExecuteTransactionBlock,
    ];

    pub fn capability(&self) -> WalletCapability {
        match self {
            LegacyExecuteMethod::SignAndExecuteTransaction => {
                WalletCapability::LegacySignAndExecuteTransaction
            }
            LegacyExecuteMethod::SignAndExecuteTransactionBlock => {
                WalletCapability::LegacySignAndExecuteTransactionBlock
            }
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum WalletError {
    #[error("wallet does not support {0}")]
    Unsupported(WalletCapability),
    #[error("{message}")]
    Provider { code: Option<i64>, message: String },
}

impl WalletError {
    pub fn provider(message: impl Into<String>) -> Self {
        WalletError::Provider {
            code: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: i64, message: impl Into<String>) -> Self {
        WalletError::Provider {
            code: Some(code),
            message: message.into(),
        }
    }

    /// Whether the failure means the user declined the request.
    pub fn is_user_rejection(&self) -> bool {
        match self {
            WalletError::Unsupported(_) => false,
            WalletError::Provider { code, message } => {
                if *code == Some(USER_REJECTED_CODE) {
                    return true;
                }
                let message = message.to_ascii_lowercase();
                message.contains("rejected") || message.contains("denied")
            }
        }
    }
}

/// A wallet object injected by a browser extension.
///
/// Implementations only override the methods behind the capabilities they
/// advertise. Callers must check [`InjectedWallet::capabilities`] first.
#[async_trait]
pub trait InjectedWallet: Send + Sync {
    fn name(&self) -> String;

    fn capabilities(&self) -> WalletCapabilities;

    async fn standard_connect(&self) -> Result<Vec<WalletAccount>, WalletError> {
        Err(WalletError::Unsupported(WalletCapability::StandardConnect))
    }

    async fn standard_disconnect(&self) -> Result<(), WalletError> {
        Err(WalletError::Unsupported(WalletCapability::StandardDisconnect))
    }

    async fn legacy_connect(&self, method: LegacyConnectMethod) -> Result<(), WalletError> {
        Err(WalletError::Unsupported(method.capability()))
    }

    async fn legacy_accounts(
        &self,
        source: LegacyAccountSource,
    ) -> Result<Vec<WalletAccount>, WalletError> {
        Err(WalletError::Unsupported(source.capability()))
    }

    async fn sign_transaction(
        &self,
        _transaction: &UnsignedTransaction,
        _account: &WalletAccount,
        _chain: &str,
    ) -> Result<SignedTransaction, WalletError> {
        Err(WalletError::Unsupported(WalletCapability::SignTransaction))
    }

    async fn sign_and_execute_transaction(
        &self,
        _transaction: &UnsignedTransaction,
        _account: &WalletAccount,
        _chain: &str,
        _options: ExecutionOptions,
    ) -> Result<ExecutionResponse, WalletError> {
        Err(WalletError::Unsupported(WalletCapability::SignAndExecuteTransaction))
    }

    async fn legacy_sign_and_execute(
        &self,
        method: LegacyExecuteMethod,
        _transaction: &UnsignedTransaction,
        _account: &WalletAccount,
        _chain: &str,
        _options: ExecutionOptions,
    ) -> Result<ExecutionResponse, WalletError> {
        Err(WalletError::Unsupported(method.capability()))
    }
}
