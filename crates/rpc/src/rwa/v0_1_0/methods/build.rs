use crate::{
    rwa::{errors::RwaRpcApiError, v0_1_0::api::RwaBuildRpcApiServer},
    RpcContext,
};
use jsonrpsee::core::{async_trait, RpcResult};
use rwa_handlers_common::transaction_builder;
use rwa_primitives::{
    rpc::{CreatePropertyParams, InvestParams, TransferParams},
    transaction::UnsignedTransaction,
};
use tracing::debug;

#[async_trait]
impl RwaBuildRpcApiServer for RpcContext {
    async fn build_create_property(
        &self,
        create_property: CreatePropertyParams,
    ) -> RpcResult<UnsignedTransaction> {
        let package = self.global_ctx.config().package_id;
        let transaction = transaction_builder::build_create_property(package, &create_property)
            .map_err(RwaRpcApiError::from)?;
        debug!(name = %create_property.name, "Built create_property transaction");
        Ok(transaction)
    }

    async fn build_invest(&self, invest: InvestParams) -> RpcResult<UnsignedTransaction> {
        let package = self.global_ctx.config().package_id;
        let transaction = transaction_builder::build_invest(
            package,
            invest.property_id,
            invest.shares,
            &invest.payment_amount,
        )
        .map_err(RwaRpcApiError::from)?;
        Ok(transaction)
    }

    async fn build_transfer(&self, transfer: TransferParams) -> RpcResult<UnsignedTransaction> {
        let package = self.global_ctx.config().package_id;
        let transaction =
            transaction_builder::build_transfer(package, transfer.investment_id, transfer.recipient)
                .map_err(RwaRpcApiError::from)?;
        Ok(transaction)
    }
}
