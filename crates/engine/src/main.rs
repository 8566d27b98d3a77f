mod cli;
mod service;

use std::sync::Arc;

use crate::cli::CliArgs;
use anyhow::Context;
use clap::Parser;
use rwa_handlers_onechain::OneChainClient;
use rwa_primitives::context::GlobalContext;
use rwa_telemetery::Telemetery;
use rwa_utils::service::ServiceManager;
use service::rpc::RpcService;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let mut telemetery = Telemetery::new(
        args.telemetry.telemetry_service_name,
        args.telemetry.telemetry_collection_endpoint,
    )?;
    telemetery.setup()?;
    info!("Starting RWA Marketplace Engine");

    // Create the global context
    let config = args.chain.market_config();
    let chain = OneChainClient::with_timeout(args.chain.rpc_url.clone(), args.chain.request_timeout())
        .context("Failed to create the chain client")?;
    info!(
        network = %config.network,
        package_id = %config.package_id,
        rpc_url = %chain.url(),
        "Chain configured"
    );
    let global_ctx = Arc::new(GlobalContext::new(Arc::new(chain), config));

    // Create the service manager
    let service_manager = ServiceManager::new();
    service_manager
        .register_service(Arc::new(RpcService::user(args.rpc, global_ctx.clone())))
        .await?;
    service_manager.start_all().await?;

    // Wait for interrupt signal
    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal, initiating graceful shutdown");

    // Trigger shutdown on service manager
    service_manager.shutdown_all().await?;
    info!("All services stopped successfully");
    telemetery.shutdown();

    Ok(())
}
