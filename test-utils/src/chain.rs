use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Mutex,
    },
};

use async_trait::async_trait;
use rwa_primitives::{
    context::{ChainClient, ChainClientError},
    effects::{ExecutionOptions, ExecutionResponse},
    rpc::{Address, ObjectId},
    transaction::SignedTransaction,
    types::{Balance, ChainEvent, ChainObject},
};

/// Node double backed by maps. Reads return whatever was seeded.
#[derive(Default)]
pub struct FakeChainClient {
    objects: Mutex<HashMap<ObjectId, ChainObject>>,
    balances: Mutex<HashMap<(Address, String), u128>>,
    events: Mutex<HashMap<String, Vec<ChainEvent>>>,
    owned: Mutex<HashMap<(Address, String), Vec<ChainObject>>>,
    execute_response: Mutex<Option<Result<ExecutionResponse, ChainClientError>>>,
    fail_reads: AtomicBool,
    balance_calls: AtomicUsize,
    object_calls: AtomicUsize,
    executed: Mutex<Vec<SignedTransaction>>,
}

impl FakeChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, object: ChainObject) -> Self {
        self.insert_object(object);
        self
    }

    pub fn with_balance(self, owner: Address, coin_type: &str, base_units: u128) -> Self {
        self.set_balance(owner, coin_type, base_units);
        self
    }

    pub fn with_event(self, event: ChainEvent) -> Self {
        self.events
            .lock()
            .unwrap()
            .entry(event.event_type.clone())
            .or_default()
            .push(event);
        self
    }

    pub fn with_owned_object(self, owner: Address, struct_type: &str, object: ChainObject) -> Self {
        self.owned
            .lock()
            .unwrap()
            .entry((owner, struct_type.to_string()))
            .or_default()
            .push(object);
        self
    }

    pub fn with_execute_response(self, response: Result<ExecutionResponse, ChainClientError>) -> Self {
        *self.execute_response.lock().unwrap() = Some(response);
        self
    }

    pub fn insert_object(&self, object: ChainObject) {
        self.objects.lock().unwrap().insert(object.object_id, object);
    }

    pub fn set_balance(&self, owner: Address, coin_type: &str, base_units: u128) {
        self.balances
            .lock()
            .unwrap()
            .insert((owner, coin_type.to_string()), base_units);
    }

    /// Make every read fail with a transport error from now on
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn object_calls(&self) -> usize {
        self.object_calls.load(Ordering::SeqCst)
    }

    pub fn executed(&self) -> Vec<SignedTransaction> {
        self.executed.lock().unwrap().clone()
    }

    fn check_reads(&self) -> Result<(), ChainClientError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ChainClientError::Transport("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ChainClient for FakeChainClient {
    async fn get_object(&self, object_id: ObjectId) -> Result<Option<ChainObject>, ChainClientError> {
        self.object_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        Ok(self.objects.lock().unwrap().get(&object_id).cloned())
    }

    async fn get_balance(&self, owner: Address, coin_type: &str) -> Result<Balance, ChainClientError> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.check_reads()?;
        let balances = self.balances.lock().unwrap();
        Ok(Balance(
            balances
                .get(&(owner, coin_type.to_string()))
                .copied()
                .unwrap_or_default(),
        ))
    }

    async fn query_events(
        &self,
        event_type: &str,
        limit: usize,
    ) -> Result<Vec<ChainEvent>, ChainClientError> {
        self.check_reads()?;
        let events = self.events.lock().unwrap();
        Ok(events
            .get(event_type)
            .map(|events| events.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn get_owned_objects(
        &self,
        owner: Address,
        struct_type: &str,
    ) -> Result<Vec<ChainObject>, ChainClientError> {
        self.check_reads()?;
        let owned = self.owned.lock().unwrap();
        Ok(owned
            .get(&(owner, struct_type.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn execute_transaction(
        &self,
        signed: &SignedTransaction,
        _options: ExecutionOptions,
    ) -> Result<ExecutionResponse, ChainClientError> {
        self.executed.lock().unwrap().push(signed.clone());
        self.execute_response
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(ChainClientError::Rpc("no execute response scripted".to_string())))
    }
}
