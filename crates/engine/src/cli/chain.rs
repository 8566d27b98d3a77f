use std::time::Duration;

use clap::Args;
use rwa_handlers_onechain::DEFAULT_RPC_URL;
use rwa_primitives::{
    context::{MarketConfig, DEFAULT_COIN_TYPE, DEFAULT_PACKAGE_ID},
    rpc::HexBytes32,
    types::Network,
};
use rwa_utils::url::parse_http_url;
use url::Url;

/// Parameters used to reach the chain and locate the marketplace package.
#[derive(Debug, Clone, Args)]
pub struct ChainParams {
    /// Full node JSON-RPC endpoint.
    #[arg(
        env = "RWA_ENGINE_RPC_URL",
        long,
        value_parser = parse_http_url,
        default_value = DEFAULT_RPC_URL
    )]
    pub rpc_url: Url,
    /// Published marketplace package.
    #[arg(
        env = "RWA_ENGINE_PACKAGE_ID",
        long,
        value_parser = HexBytes32::from_hex,
        default_value = DEFAULT_PACKAGE_ID
    )]
    pub package_id: HexBytes32,
    /// `testnet` or `mainnet`.
    #[arg(env = "RWA_ENGINE_NETWORK", long, default_value = "testnet")]
    pub network: Network,
    #[arg(env = "RWA_ENGINE_COIN_TYPE", long, default_value = DEFAULT_COIN_TYPE)]
    pub coin_type: String,
    /// Timeout of a single node request, in seconds.
    #[arg(env = "RWA_ENGINE_REQUEST_TIMEOUT", long, default_value_t = 30)]
    pub request_timeout: u64,
}

impl ChainParams {
    pub fn market_config(&self) -> MarketConfig {
        MarketConfig::new(self.package_id, self.network).with_coin_type(self.coin_type.clone())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}
