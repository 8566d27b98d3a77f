use std::sync::Arc;

use rwa_primitives::{
    context::GlobalContext,
    errors::MarketError,
    rpc::{CreatePropertyParams, CreatePropertyResult},
};
use tracing::info;

use crate::{
    balance::{check_balance, CREATE_PROPERTY_GAS_RESERVE},
    orchestrator::Orchestrator,
    result_mapper::map_result,
    transaction_builder::build_create_property,
    PROPERTY_STRUCT,
};

/// Mint a property NFT with the connected wallet.
pub async fn create_property(
    global_ctx: Arc<GlobalContext>,
    orchestrator: &Orchestrator,
    params: CreatePropertyParams,
) -> Result<CreatePropertyResult, MarketError> {
    let transaction = build_create_property(global_ctx.config().package_id, &params)?;
    let account = orchestrator
        .connector()
        .account()
        .await
        .ok_or(MarketError::WalletNotConnected)?;
    let balance = check_balance(global_ctx, account.address, CREATE_PROPERTY_GAS_RESERVE).await?;

    let response = orchestrator.submit(transaction).await.into_response()?;
    let mapped = map_result(&response, PROPERTY_STRUCT);
    info!(
        name = %params.name,
        property_id = ?mapped.created_object_id,
        "Property created"
    );
    Ok(CreatePropertyResult {
        transaction_digest: mapped.digest.unwrap_or_default(),
        property_id: mapped.created_object_id,
        balance_warning: balance.warning(),
    })
}
