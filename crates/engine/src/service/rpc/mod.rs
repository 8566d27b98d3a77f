use std::{net::SocketAddr, sync::Arc};

use jsonrpsee::server::ServerHandle;
use rwa_primitives::context::GlobalContext;
use rwa_rpc::{rpc_api_user, RpcContext};
use rwa_utils::service::Service;
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::cli::rpc::RpcParams;

use self::server::{start_server, ServerConfig};

mod server;

pub struct RpcService {
    config: RpcParams,
    global_ctx: Arc<GlobalContext>,
    server_handle: Arc<Mutex<Option<ServerHandle>>>,
    local_addr: Arc<Mutex<Option<SocketAddr>>>,
}

impl RpcService {
    pub fn user(config: RpcParams, global_ctx: Arc<GlobalContext>) -> Self {
        Self {
            config,
            global_ctx,
            server_handle: Arc::new(Mutex::new(None)),
            local_addr: Arc::new(Mutex::new(None)),
        }
    }

    /// Address the server is listening on, once started.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        *self.local_addr.lock().await
    }
}

#[async_trait::async_trait]
impl Service for RpcService {
    async fn start(&self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let rpc_ctx = RpcContext::new(Arc::clone(&self.global_ctx));

        let server_config = ServerConfig {
            name: "JSON-RPC".to_string(),
            addr: self.config.addr(),
            max_connections: self.config.rpc_max_connections,
            max_payload_in_mb: self.config.rpc_max_request_size,
            max_payload_out_mb: self.config.rpc_max_response_size,
            methods: rpc_api_user(&rpc_ctx)?.into(),
            cors: self.config.cors(),
        };

        let (handle, addr) = start_server(server_config).await?;
        *self.local_addr.lock().await = Some(addr);
        *self.server_handle.lock().await = Some(handle.clone());

        let _ = shutdown_rx.recv().await;
        info!(%addr, "Stopping JSON-RPC server");
        // Already stopped when `shutdown` ran first
        let _ = handle.stop();
        handle.stopped().await;

        anyhow::Ok(())
    }

    async fn shutdown(&self) -> anyhow::Result<()> {
        if let Some(handle) = self.server_handle.lock().await.take() {
            if handle.stop().is_err() {
                warn!("JSON-RPC server was already stopped");
            }
        }
        anyhow::Ok(())
    }

    fn name(&self) -> String {
        "rpc".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::{
        core::client::ClientT,
        http_client::HttpClientBuilder,
        rpc_params,
    };
    use rstest::rstest;
    use rwa_primitives::context::MarketConfig;
    use rwa_tests_utils::{chain::FakeChainClient, fixtures::testnet_config};
    use std::time::Duration;

    fn params() -> RpcParams {
        RpcParams {
            rpc_port: 0,
            rpc_external: false,
            rpc_max_connections: 4,
            rpc_max_request_size: 1,
            rpc_max_response_size: 1,
            rpc_cors: Some(vec!["*".to_string()]),
        }
    }

    #[rstest]
    #[tokio::test]
    async fn test_serves_until_shutdown(testnet_config: MarketConfig) {
        let global_ctx = Arc::new(GlobalContext::new(Arc::new(FakeChainClient::new()), testnet_config));
        let service = Arc::new(RpcService::user(params(), global_ctx));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let running = tokio::spawn({
            let service = service.clone();
            async move { service.start(shutdown_rx).await }
        });

        let addr = loop {
            if let Some(addr) = service.local_addr().await {
                break addr;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        };

        let client = HttpClientBuilder::default()
            .build(format!("http://{}", addr))
            .unwrap();
        let deployed: bool = client.request("rwa_isPackageDeployed", rpc_params![]).await.unwrap();
        assert!(!deployed);

        shutdown_tx.send(()).unwrap();
        running.await.unwrap().unwrap();
        service.shutdown().await.unwrap();
    }
}
