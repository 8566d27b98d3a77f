use crate::{
    rwa::{errors::RwaRpcApiError, v0_1_0::api::RwaReadRpcApiServer},
    RpcContext,
};
use jsonrpsee::core::{async_trait, RpcResult};
use rwa_primitives::{
    rpc::{GetInvestmentsParams, GetInvestmentsResult, GetPropertiesResult, GetPropertyParams},
    types::PropertyRecord,
};

#[async_trait]
impl RwaReadRpcApiServer for RpcContext {
    async fn get_properties(&self) -> RpcResult<GetPropertiesResult> {
        let result = rwa_handlers_common::properties::list_properties(self.global_ctx.clone())
            .await
            .map_err(RwaRpcApiError::from)?;
        Ok(result)
    }

    async fn get_property(&self, get_property: GetPropertyParams) -> RpcResult<PropertyRecord> {
        let result =
            rwa_handlers_common::properties::get_property(self.global_ctx.clone(), get_property)
                .await
                .map_err(RwaRpcApiError::from)?;
        Ok(result)
    }

    async fn get_investments(
        &self,
        get_investments: GetInvestmentsParams,
    ) -> RpcResult<GetInvestmentsResult> {
        let result = rwa_handlers_common::investments::get_user_investments(
            self.global_ctx.clone(),
            get_investments,
        )
        .await
        .map_err(RwaRpcApiError::from)?;
        Ok(result)
    }

    async fn is_package_deployed(&self) -> RpcResult<bool> {
        let deployed = rwa_handlers_common::package::is_package_deployed(self.global_ctx.clone())
            .await
            .map_err(RwaRpcApiError::from)?;
        Ok(deployed)
    }
}
