use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use jsonrpsee::{
    core::{client::ClientT, params::ArrayParams, ClientError},
    http_client::{HttpClient, HttpClientBuilder},
    rpc_params,
};
use rwa_primitives::{
    context::{ChainClient, ChainClientError},
    effects::{ExecutionOptions, ExecutionResponse},
    rpc::{Address, ObjectId},
    transaction::SignedTransaction,
    types::{Balance, ChainEvent, ChainObject},
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, trace, warn};
use url::Url;

use responses::{BalanceResponse, EventResponse, ObjectResponse, Page};

pub mod responses;

/// Public testnet endpoint.
pub const DEFAULT_RPC_URL: &str = "https://rpc-testnet.onelabs.cc:443";

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// Page size for owned object listings
const OWNED_OBJECTS_PAGE_SIZE: usize = 50;
// Upper bound on pages fetched for one owner
const MAX_OWNED_OBJECT_PAGES: usize = 20;

/// [`ChainClient`] over a full node's JSON-RPC API.
pub struct OneChainClient {
    client: HttpClient,
    url: Url,
    max_owned_object_pages: usize,
}

impl OneChainClient {
    pub fn new(rpc_url: Url) -> anyhow::Result<Self> {
        Self::with_timeout(rpc_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(rpc_url: Url, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = HttpClientBuilder::default()
            .request_timeout(request_timeout)
            .build(rpc_url.as_str())
            .with_context(|| format!("Failed to build JSON-RPC client for {}", rpc_url))?;
        Ok(Self {
            client,
            url: rpc_url,
            max_owned_object_pages: MAX_OWNED_OBJECT_PAGES,
        })
    }

    /// Bound the number of pages read by one owned object listing.
    pub fn with_max_owned_object_pages(mut self, pages: usize) -> Self {
        self.max_owned_object_pages = pages.max(1);
        self
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn call<R: DeserializeOwned>(
        &self,
        method: &'static str,
        params: ArrayParams,
    ) -> Result<R, ChainClientError> {
        trace!(method, url = %self.url, "Calling node");
        self.client
            .request::<R, _>(method, params)
            .await
            .map_err(|e| classify(method, e))
    }
}

fn classify(method: &str, error: ClientError) -> ChainClientError {
    match error {
        ClientError::Call(call) => ChainClientError::Rpc(format!("{}: {}", method, call.message())),
        ClientError::ParseError(e) => ChainClientError::InvalidResponse(format!("{}: {}", method, e)),
        other => ChainClientError::Transport(format!("{}: {}", method, other)),
    }
}

fn object_options() -> Value {
    json!({
        "showType": true,
        "showContent": true,
        "showOwner": true,
    })
}

#[async_trait]
impl ChainClient for OneChainClient {
    async fn get_object(&self, object_id: ObjectId) -> Result<Option<ChainObject>, ChainClientError> {
        let response: ObjectResponse = self
            .call("sui_getObject", rpc_params![object_id, object_options()])
            .await?;
        response.into_object()
    }

    async fn get_balance(&self, owner: Address, coin_type: &str) -> Result<Balance, ChainClientError> {
        let response: BalanceResponse = self
            .call("suix_getBalance", rpc_params![owner, coin_type])
            .await?;
        Ok(Balance(response.total()?))
    }

    async fn query_events(
        &self,
        event_type: &str,
        limit: usize,
    ) -> Result<Vec<ChainEvent>, ChainClientError> {
        let filter = json!({ "MoveEventType": event_type });
        // Newest first
        let page: Page<EventResponse> = self
            .call(
                "suix_queryEvents",
                rpc_params![filter, Value::Null, limit, true],
            )
            .await?;
        debug!(event_type, count = page.data.len(), "Queried events");
        Ok(page.data.into_iter().map(Into::into).collect())
    }

    async fn get_owned_objects(
        &self,
        owner: Address,
        struct_type: &str,
    ) -> Result<Vec<ChainObject>, ChainClientError> {
        let query = json!({
            "filter": { "StructType": struct_type },
            "options": object_options(),
        });

        let mut objects = Vec::new();
        let mut cursor = Value::Null;
        let mut pages = 0;
        loop {
            let page: Page<ObjectResponse> = self
                .call(
                    "suix_getOwnedObjects",
                    rpc_params![owner, query.clone(), cursor, OWNED_OBJECTS_PAGE_SIZE],
                )
                .await?;
            pages += 1;
            for response in page.data {
                objects.extend(response.into_object()?);
            }
            let next = match page.next_cursor {
                Some(next) if page.has_next_page && !next.is_null() => next,
                _ => break,
            };
            if pages >= self.max_owned_object_pages {
                warn!(
                    %owner,
                    struct_type,
                    pages,
                    count = objects.len(),
                    "Owned object listing truncated at page limit"
                );
                break;
            }
            cursor = next;
        }
        debug!(%owner, struct_type, count = objects.len(), "Fetched owned objects");
        Ok(objects)
    }

    async fn execute_transaction(
        &self,
        signed: &SignedTransaction,
        options: ExecutionOptions,
    ) -> Result<ExecutionResponse, ChainClientError> {
        let options = json!({
            "showEffects": options.show_effects,
            "showObjectChanges": options.show_object_changes,
            "showEvents": options.show_events,
            "showBalanceChanges": true,
        });
        self.call(
            "sui_executeTransactionBlock",
            rpc_params![
                &signed.transaction_bytes,
                &signed.signatures,
                options,
                "WaitForLocalExecution"
            ],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use jsonrpsee::{
        server::{Server, ServerHandle},
        types::ErrorObjectOwned,
        RpcModule,
    };
    use rwa_primitives::effects::EffectsStatus;

    fn id(hex: &str) -> ObjectId {
        ObjectId::from_hex(hex).unwrap()
    }

    // A node that knows one property, one balance and one owned page chain
    async fn fake_node() -> (OneChainClient, ServerHandle) {
        let mut module = RpcModule::new(());
        module
            .register_method("sui_getObject", |params, _| -> Result<Value, ErrorObjectOwned> {
                let (object_id, _options): (String, Value) = params.parse()?;
                if object_id.ends_with("5ea") {
                    Ok(json!({
                        "data": {
                            "objectId": object_id,
                            "type": "0x7b::property_nft::PropertyNFT",
                            "content": {
                                "dataType": "moveObject",
                                "fields": { "name": "Villa" }
                            }
                        }
                    }))
                } else {
                    Ok(json!({ "error": { "code": "notExists", "object_id": object_id } }))
                }
            })
            .unwrap();
        module
            .register_method("suix_getBalance", |params, _| -> Result<Value, ErrorObjectOwned> {
                let (_owner, coin_type): (String, String) = params.parse()?;
                Ok(json!({
                    "coinType": coin_type,
                    "coinObjectCount": 1,
                    "totalBalance": "1500000000",
                    "lockedBalance": {}
                }))
            })
            .unwrap();
        module
            .register_method("suix_getOwnedObjects", |params, _| -> Result<Value, ErrorObjectOwned> {
                let (_owner, _query, cursor, _limit): (String, Value, Value, usize) = params.parse()?;
                let (id, next) = if cursor.is_null() { ("0x11", json!("page-2")) } else { ("0x12", Value::Null) };
                Ok(json!({
                    "data": [{ "data": { "objectId": id, "type": "0x7b::property_nft::Investment" } }],
                    "nextCursor": next,
                    "hasNextPage": !next.is_null()
                }))
            })
            .unwrap();
        module
            .register_method("sui_executeTransactionBlock", |params, _| -> Result<Value, ErrorObjectOwned> {
                let (bytes, _signatures, _options, _request): (String, Vec<String>, Value, String) =
                    params.parse()?;
                if bytes.is_empty() {
                    return Err(ErrorObjectOwned::owned(-32602, "empty transaction", None::<()>));
                }
                Ok(json!({
                    "digest": "ExecD1g",
                    "effects": { "status": { "status": "success" } },
                    "objectChanges": []
                }))
            })
            .unwrap();

        let server = Server::builder().build("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        let handle = server.start(module);
        let url = Url::parse(&format!("http://{}", addr)).unwrap();
        (OneChainClient::new(url).unwrap(), handle)
    }

    #[tokio::test]
    async fn test_object_reads() {
        let (client, _handle) = fake_node().await;

        let object = client.get_object(id("0x5ea")).await.unwrap().unwrap();
        assert_eq!(object.fields["name"], "Villa");
        assert_eq!(client.get_object(id("0x1")).await, Ok(None));
    }

    #[tokio::test]
    async fn test_balance() {
        let (client, _handle) = fake_node().await;
        assert_eq!(
            client.get_balance(id("0xa11ce"), "0x2::oct::OCT").await,
            Ok(Balance(1_500_000_000))
        );
    }

    #[tokio::test]
    async fn test_owned_objects_follow_cursor() {
        let (client, _handle) = fake_node().await;
        let objects = client
            .get_owned_objects(id("0xa11ce"), "0x7b::property_nft::Investment")
            .await
            .unwrap();
        let ids: Vec<ObjectId> = objects.iter().map(|o| o.object_id).collect();
        assert_eq!(ids, vec![id("0x11"), id("0x12")]);
    }

    #[tokio::test]
    async fn test_owned_objects_stop_at_page_limit() {
        let (client, _handle) = fake_node().await;
        let client = client.with_max_owned_object_pages(1);
        let objects = client
            .get_owned_objects(id("0xa11ce"), "0x7b::property_nft::Investment")
            .await
            .unwrap();
        let ids: Vec<ObjectId> = objects.iter().map(|o| o.object_id).collect();
        assert_eq!(ids, vec![id("0x11")]);
    }

    #[tokio::test]
    async fn test_execute_transaction() {
        let (client, _handle) = fake_node().await;
        let signed = SignedTransaction {
            transaction_bytes: "AAAB".to_string(),
            signatures: vec!["c2ln".to_string()],
        };

        let response = client
            .execute_transaction(&signed, ExecutionOptions::default())
            .await
            .unwrap();
        assert_eq!(response.digest.as_deref(), Some("ExecD1g"));
        assert_eq!(response.status(), EffectsStatus::Success);

        let empty = SignedTransaction {
            transaction_bytes: String::new(),
            signatures: vec![],
        };
        assert_matches!(
            client.execute_transaction(&empty, ExecutionOptions::default()).await,
            Err(ChainClientError::Rpc(msg)) if msg.contains("empty transaction")
        );
    }

    #[tokio::test]
    async fn test_unknown_method_and_dead_node() {
        let (client, handle) = fake_node().await;
        assert_matches!(
            client.query_events("0x7b::property_nft::PropertyCreated", 50).await,
            Err(ChainClientError::Rpc(_))
        );

        handle.stop().unwrap();
        handle.stopped().await;
        assert_matches!(
            client.get_balance(id("0x1"), "0x2::oct::OCT").await,
            Err(ChainClientError::Transport(_))
        );
    }
}
