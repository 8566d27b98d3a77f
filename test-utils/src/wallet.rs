use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use rwa_primitives::{
    effects::{ExecutionOptions, ExecutionResponse, ObjectChange, ObjectChangeKind},
    rpc::ObjectId,
    transaction::{SignedTransaction, UnsignedTransaction},
    wallet::{
        InjectedWallet, LegacyAccountSource, LegacyConnectMethod, LegacyExecuteMethod,
        WalletAccount, WalletCapabilities, WalletCapability, WalletError,
    },
};
use serde_json::json;

#[derive(Clone)]
enum Scripted {
    Unit(Result<(), WalletError>),
    Accounts(Result<Vec<WalletAccount>, WalletError>),
    Signed(Result<SignedTransaction, WalletError>),
    Executed(Result<ExecutionResponse, WalletError>),
}

/// Wallet double. It advertises exactly the capabilities that were scripted
/// and records every call it receives.
pub struct MockWallet {
    name: String,
    responses: HashMap<WalletCapability, Scripted>,
    delays: HashMap<WalletCapability, Duration>,
    calls: Mutex<Vec<WalletCapability>>,
    seen: Mutex<Vec<(UnsignedTransaction, String)>>,
}

impl MockWallet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            responses: HashMap::new(),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Standard connect that yields `account`, and a sign-and-execute that
    /// returns a successful response with `digest`.
    pub fn always_succeeds(name: impl Into<String>, account: WalletAccount, digest: &str) -> Self {
        Self::new(name)
            .with_standard_connect(Ok(vec![account]))
            .with_sign_and_execute(Ok(success_response(digest, &[])))
    }

    pub fn with_standard_connect(mut self, result: Result<Vec<WalletAccount>, WalletError>) -> Self {
        self.responses
            .insert(WalletCapability::StandardConnect, Scripted::Accounts(result));
        self
    }

    pub fn with_standard_disconnect(mut self, result: Result<(), WalletError>) -> Self {
        self.responses
            .insert(WalletCapability::StandardDisconnect, Scripted::Unit(result));
        self
    }

    pub fn with_legacy_connect(
        mut self,
        method: LegacyConnectMethod,
        result: Result<(), WalletError>,
    ) -> Self {
        self.responses.insert(method.capability(), Scripted::Unit(result));
        self
    }

    pub fn with_legacy_accounts(
        mut self,
        source: LegacyAccountSource,
        result: Result<Vec<WalletAccount>, WalletError>,
    ) -> Self {
        self.responses.insert(source.capability(), Scripted::Accounts(result));
        self
    }

    pub fn with_sign_transaction(mut self, result: Result<SignedTransaction, WalletError>) -> Self {
        self.responses
            .insert(WalletCapability::SignTransaction, Scripted::Signed(result));
        self
    }

    pub fn with_sign_and_execute(mut self, result: Result<ExecutionResponse, WalletError>) -> Self {
        self.responses
            .insert(WalletCapability::SignAndExecuteTransaction, Scripted::Executed(result));
        self
    }

    pub fn with_legacy_execute(
        mut self,
        method: LegacyExecuteMethod,
        result: Result<ExecutionResponse, WalletError>,
    ) -> Self {
        self.responses.insert(method.capability(), Scripted::Executed(result));
        self
    }

    /// Make `capability` sleep before answering
    pub fn with_delay(mut self, capability: WalletCapability, delay: Duration) -> Self {
        self.delays.insert(capability, delay);
        self
    }

    pub fn into_arc(self) -> Arc<dyn InjectedWallet> {
        Arc::new(self)
    }

    /// Number of calls made to `capability`
    pub fn calls(&self, capability: WalletCapability) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| **c == capability)
            .count()
    }

    /// Every call in the order it was made
    pub fn call_log(&self) -> Vec<WalletCapability> {
        self.calls.lock().unwrap().clone()
    }

    /// Transactions handed to the signing methods together with the chain id
    pub fn seen_transactions(&self) -> Vec<(UnsignedTransaction, String)> {
        self.seen.lock().unwrap().clone()
    }

    async fn answer(&self, capability: WalletCapability) -> Option<Scripted> {
        self.calls.lock().unwrap().push(capability);
        if let Some(delay) = self.delays.get(&capability) {
            tokio::time::sleep(*delay).await;
        }
        self.responses.get(&capability).cloned()
    }

    fn record(&self, transaction: &UnsignedTransaction, chain: &str) {
        self.seen
            .lock()
            .unwrap()
            .push((transaction.clone(), chain.to_string()));
    }
}

#[async_trait]
impl InjectedWallet for MockWallet {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn capabilities(&self) -> WalletCapabilities {
        WalletCapabilities::new(self.responses.keys().copied())
    }

    async fn standard_connect(&self) -> Result<Vec<WalletAccount>, WalletError> {
        match self.answer(WalletCapability::StandardConnect).await {
            Some(Scripted::Accounts(result)) => result,
            _ => Err(WalletError::Unsupported(WalletCapability::StandardConnect)),
        }
    }

    async fn standard_disconnect(&self) -> Result<(), WalletError> {
        match self.answer(WalletCapability::StandardDisconnect).await {
            Some(Scripted::Unit(result)) => result,
            _ => Err(WalletError::Unsupported(WalletCapability::StandardDisconnect)),
        }
    }

    async fn legacy_connect(&self, method: LegacyConnectMethod) -> Result<(), WalletError> {
        match self.answer(method.capability()).await {
            Some(Scripted::Unit(result)) => result,
            _ => Err(WalletError::Unsupported(method.capability())),
        }
    }

    async fn legacy_accounts(
        &self,
        source: LegacyAccountSource,
    ) -> Result<Vec<WalletAccount>, WalletError> {
        match self.answer(source.capability()).await {
            Some(Scripted::Accounts(result)) => result,
            _ => Err(WalletError::Unsupported(source.capability())),
        }
    }

    async fn sign_transaction(
        &self,
        transaction: &UnsignedTransaction,
        _account: &WalletAccount,
        chain: &str,
    ) -> Result<SignedTransaction, WalletError> {
        self.record(transaction, chain);
        match self.answer(WalletCapability::SignTransaction).await {
            Some(Scripted::Signed(result)) => result,
            _ => Err(WalletError::Unsupported(WalletCapability::SignTransaction)),
        }
    }

    async fn sign_and_execute_transaction(
        &self,
        transaction: &UnsignedTransaction,
        _account: &WalletAccount,
        chain: &str,
        _options: ExecutionOptions,
    ) -> Result<ExecutionResponse, WalletError> {
        self.record(transaction, chain);
        match self.answer(WalletCapability::SignAndExecuteTransaction).await {
            Some(Scripted::Executed(result)) => result,
            _ => Err(WalletError::Unsupported(WalletCapability::SignAndExecuteTransaction)),
        }
    }

    async fn legacy_sign_and_execute(
        &self,
        method: LegacyExecuteMethod,
        transaction: &UnsignedTransaction,
        _account: &WalletAccount,
        chain: &str,
        _options: ExecutionOptions,
    ) -> Result<ExecutionResponse, WalletError> {
        self.record(transaction, chain);
        match self.answer(method.capability()).await {
            Some(Scripted::Executed(result)) => result,
            _ => Err(WalletError::Unsupported(method.capability())),
        }
    }
}

/// A successful execution response creating `created` (id, type) objects.
pub fn success_response(digest: &str, created: &[(ObjectId, &str)]) -> ExecutionResponse {
    ExecutionResponse {
        digest: Some(digest.to_string()),
        effects: Some(json!({ "status": { "status": "success" } })),
        object_changes: created
            .iter()
            .map(|(id, object_type)| ObjectChange {
                kind: ObjectChangeKind::Created,
                object_id: Some(id.to_string()),
                object_type: Some(object_type.to_string()),
            })
            .collect(),
        ..Default::default()
    }
}

/// An execution response whose effects report an on-chain abort.
pub fn failure_response(digest: &str, error: &str) -> ExecutionResponse {
    ExecutionResponse {
        digest: Some(digest.to_string()),
        effects: Some(json!({ "status": { "status": "failure", "error": error } })),
        ..Default::default()
    }
}
