use std::sync::Arc;

use rwa_primitives::{
    context::GlobalContext,
    errors::MarketError,
    rpc::{TransferParams, TransferResult},
};
use tracing::info;

use crate::{orchestrator::Orchestrator, transaction_builder::build_transfer};

/// Transfer an investment to another address with the connected wallet.
pub async fn transfer_investment(
    global_ctx: Arc<GlobalContext>,
    orchestrator: &Orchestrator,
    params: TransferParams,
) -> Result<TransferResult, MarketError> {
    let transaction = build_transfer(
        global_ctx.config().package_id,
        params.investment_id,
        params.recipient,
    )?;
    let response = orchestrator.submit(transaction).await.into_response()?;
    let transaction_digest = response.digest.unwrap_or_default();
    info!(
        investment_id = %params.investment_id,
        recipient = %params.recipient,
        digest = %transaction_digest,
        "Investment transferred"
    );
    Ok(TransferResult { transaction_digest })
}
