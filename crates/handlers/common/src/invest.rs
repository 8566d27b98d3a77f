use std::sync::Arc;

use rwa_primitives::{
    context::GlobalContext,
    errors::MarketError,
    rpc::{GetPropertyParams, InvestParams, InvestResult},
};
use tracing::info;

use crate::{
    balance::check_balance,
    orchestrator::Orchestrator,
    properties::get_property,
    result_mapper::map_result,
    transaction_builder::{build_invest, to_base_units, INVEST_GAS_BUDGET},
    INVESTMENT_STRUCT,
};

/// Buy shares of a property with the connected wallet.
pub async fn invest_in_property(
    global_ctx: Arc<GlobalContext>,
    orchestrator: &Orchestrator,
    params: InvestParams,
) -> Result<InvestResult, MarketError> {
    let transaction = build_invest(
        global_ctx.config().package_id,
        params.property_id,
        params.shares,
        &params.payment_amount,
    )?;
    let account = orchestrator
        .connector()
        .account()
        .await
        .ok_or(MarketError::WalletNotConnected)?;

    let property = get_property(
        global_ctx.clone(),
        GetPropertyParams {
            property_id: params.property_id,
        },
    )
    .await?;
    if !property.is_active {
        return Err(MarketError::InvalidArgument("property is not active".to_string()));
    }
    if property.available_shares < params.shares {
        return Err(MarketError::InvalidArgument(format!(
            "only {} shares available",
            property.available_shares
        )));
    }

    let payment = to_base_units(&params.payment_amount, "payment amount")?;
    let required = payment as u128 + INVEST_GAS_BUDGET as u128;
    let balance = check_balance(global_ctx, account.address, required).await?;

    let response = orchestrator.submit(transaction).await.into_response()?;
    let mapped = map_result(&response, INVESTMENT_STRUCT);
    info!(
        property_id = %params.property_id,
        shares = params.shares,
        investment_id = ?mapped.created_object_id,
        "Investment made"
    );
    Ok(InvestResult {
        transaction_digest: mapped.digest.unwrap_or_default(),
        investment_id: mapped.created_object_id,
        shares_purchased: params.shares,
        balance_warning: balance.warning(),
    })
}
