use std::sync::Arc;

use jsonrpsee::RpcModule;
use rwa_primitives::context::GlobalContext;

mod rwa;

pub use rwa::errors::RwaRpcApiError;

/// JSON-RPC server state for the marketplace
#[derive(Clone)]
pub struct RpcContext {
    global_ctx: Arc<GlobalContext>,
}

impl RpcContext {
    pub fn new(global_ctx: Arc<GlobalContext>) -> Self {
        Self { global_ctx }
    }
}

/// Returns the RpcModule merged with all the supported RPC versions.
pub fn rpc_api_user(rpc_ctx: &RpcContext) -> anyhow::Result<RpcModule<()>> {
    let mut rpc_api = RpcModule::new(());

    rpc_api.merge(rwa::v0_1_0::RwaReadRpcApiServer::into_rpc(rpc_ctx.clone()))?;
    rpc_api.merge(rwa::v0_1_0::RwaBuildRpcApiServer::into_rpc(rpc_ctx.clone()))?;

    Ok(rpc_api)
}
