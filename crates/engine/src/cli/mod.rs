use clap::Parser;

pub mod chain;
pub mod rpc;
mod telemetery;
use chain::ChainParams;
use rpc::RpcParams;
use telemetery::TelemetryParams;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct CliArgs {
    #[command(flatten)]
    pub telemetry: TelemetryParams,
    #[command(flatten)]
    pub rpc: RpcParams,
    #[command(flatten)]
    pub chain: ChainParams,
}
