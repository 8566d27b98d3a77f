use jsonrpsee::{core::RpcResult, proc_macros::rpc};
use rwa_primitives::{
    rpc::{
        CreatePropertyParams, GetInvestmentsParams, GetInvestmentsResult, GetPropertiesResult,
        GetPropertyParams, InvestParams, TransferParams,
    },
    transaction::UnsignedTransaction,
    types::PropertyRecord,
};

#[rpc(server, namespace = "rwa")]
pub trait RwaReadRpcApi {
    /// List properties announced by recent creation events
    #[method(name = "getProperties")]
    async fn get_properties(&self) -> RpcResult<GetPropertiesResult>;

    /// Get a property by its object id
    #[method(name = "getProperty")]
    async fn get_property(&self, get_property: GetPropertyParams) -> RpcResult<PropertyRecord>;

    /// Get the investments of an owner with their properties
    #[method(name = "getInvestments")]
    async fn get_investments(
        &self,
        get_investments: GetInvestmentsParams,
    ) -> RpcResult<GetInvestmentsResult>;

    /// Whether the marketplace package exists on chain
    #[method(name = "isPackageDeployed")]
    async fn is_package_deployed(&self) -> RpcResult<bool>;
}

/// Unsigned transactions for a browser wallet to sign
#[rpc(server, namespace = "rwa")]
pub trait RwaBuildRpcApi {
    #[method(name = "buildCreateProperty")]
    async fn build_create_property(
        &self,
        create_property: CreatePropertyParams,
    ) -> RpcResult<UnsignedTransaction>;

    #[method(name = "buildInvest")]
    async fn build_invest(&self, invest: InvestParams) -> RpcResult<UnsignedTransaction>;

    #[method(name = "buildTransfer")]
    async fn build_transfer(&self, transfer: TransferParams) -> RpcResult<UnsignedTransaction>;
}
