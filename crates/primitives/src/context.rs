use std::sync::Arc;

use serde::Serialize;

use crate::{
    effects::{ExecutionOptions, ExecutionResponse},
    rpc::{Address, ObjectId},
    transaction::SignedTransaction,
    types::{Balance, ChainEvent, ChainObject, Network},
};

/// Coin type of the chain's native token.
pub const DEFAULT_COIN_TYPE: &str = "0x2::oct::OCT";

/// Marketplace package published on testnet.
pub const DEFAULT_PACKAGE_ID: &str =
    "0x7b8e0864967427679b4e129f79dc332a885c6087ec9e187b53451a9006ee15f2";

#[derive(Debug, Clone, thiserror::Error, Serialize, PartialEq, Eq)]
pub enum ChainClientError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Node returned an error: {0}")]
    Rpc(String),
    #[error("Unexpected response: {0}")]
    InvalidResponse(String),
}

/// Read and execute interface of a full node.
///
/// Implemented over JSON-RPC for real networks and by an in-memory fake in
/// tests.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Read an object with its content, `None` if it does not exist
    async fn get_object(&self, object_id: ObjectId) -> Result<Option<ChainObject>, ChainClientError>;

    /// Total balance of `owner` for `coin_type`
    async fn get_balance(&self, owner: Address, coin_type: &str) -> Result<Balance, ChainClientError>;

    /// Most recent events of a Move event type
    async fn query_events(
        &self,
        event_type: &str,
        limit: usize,
    ) -> Result<Vec<ChainEvent>, ChainClientError>;

    /// Objects owned by `owner` whose struct type is `struct_type`
    async fn get_owned_objects(
        &self,
        owner: Address,
        struct_type: &str,
    ) -> Result<Vec<ChainObject>, ChainClientError>;

    /// Execute a transaction that was signed elsewhere
    async fn execute_transaction(
        &self,
        signed: &SignedTransaction,
        options: ExecutionOptions,
    ) -> Result<ExecutionResponse, ChainClientError>;
}

/// Deployment the marketplace talks to. Loaded once at start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketConfig {
    pub package_id: ObjectId,
    pub network: Network,
    pub coin_type: String,
}

impl MarketConfig {
    pub fn new(package_id: ObjectId, network: Network) -> Self {
        Self {
            package_id,
            network,
            coin_type: DEFAULT_COIN_TYPE.to_string(),
        }
    }

    pub fn with_coin_type(mut self, coin_type: impl Into<String>) -> Self {
        self.coin_type = coin_type.into();
        self
    }

    /// `package::property_nft::<name>` struct or event type.
    pub fn property_nft_type(&self, name: &str) -> String {
        format!("{}::property_nft::{}", self.package_id, name)
    }
}

pub struct GlobalContext {
    chain: Arc<dyn ChainClient>,
    config: MarketConfig,
}

impl GlobalContext {
    pub fn new(chain: Arc<dyn ChainClient>, config: MarketConfig) -> Self {
        Self { chain, config }
    }

    pub fn chain(&self) -> Arc<dyn ChainClient> {
        self.chain.clone()
    }

    pub fn config(&self) -> &MarketConfig {
        &self.config
    }
}
