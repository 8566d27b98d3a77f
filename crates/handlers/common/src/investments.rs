use std::sync::Arc;

use futures::future::join_all;
use rwa_primitives::{
    context::GlobalContext,
    errors::MarketError,
    rpc::{GetInvestmentsParams, GetInvestmentsResult, GetPropertyParams, PortfolioEntry},
    types::InvestmentRecord,
};
use tracing::warn;

use crate::{properties::get_property, INVESTMENT_STRUCT};

/// Investments held by `owner`, each joined with its property.
pub async fn get_user_investments(
    global_ctx: Arc<GlobalContext>,
    params: GetInvestmentsParams,
) -> Result<GetInvestmentsResult, MarketError> {
    let struct_type = global_ctx.config().property_nft_type(INVESTMENT_STRUCT);
    let objects = global_ctx
        .chain()
        .get_owned_objects(params.owner, &struct_type)
        .await?;

    let investments: Vec<InvestmentRecord> = objects
        .iter()
        .filter_map(|object| match InvestmentRecord::from_object(object) {
            Ok(investment) => Some(investment),
            Err(e) => {
                warn!(error = %e, object_id = %object.object_id, "Skipping malformed investment");
                None
            }
        })
        .collect();

    let entries = investments.into_iter().map(|investment| {
        let global_ctx = global_ctx.clone();
        async move {
            let params = GetPropertyParams {
                property_id: investment.property_id,
            };
            let property = match get_property(global_ctx, params).await {
                Ok(property) => Some(property),
                Err(e @ MarketError::Chain(_)) => return Err(e),
                Err(_) => None,
            };
            Ok(PortfolioEntry { investment, property })
        }
    });

    let investments = join_all(entries)
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GetInvestmentsResult { investments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use rwa_primitives::context::MarketConfig;
    use rwa_tests_utils::{
        chain::FakeChainClient,
        fixtures::{id, investment_object, property_object, testnet_config},
    };

    #[rstest]
    #[tokio::test]
    async fn test_portfolio_joins_properties(testnet_config: MarketConfig) {
        let package = testnet_config.package_id;
        let owner = id("0xa11ce");
        let investment_type = testnet_config.property_nft_type(INVESTMENT_STRUCT);
        let mut broken = investment_object(package, id("0x13"), id("0x1"), 1, 1);
        broken.fields.remove("shares");

        let chain = FakeChainClient::new()
            .with_object(property_object(package, id("0x1"), "Villa", 100, 90))
            .with_owned_object(owner, &investment_type, investment_object(package, id("0x11"), id("0x1"), 10, 100_000_000_000))
            .with_owned_object(owner, &investment_type, investment_object(package, id("0x12"), id("0x2"), 3, 30_000_000_000))
            .with_owned_object(owner, &investment_type, broken);
        let ctx = Arc::new(GlobalContext::new(Arc::new(chain), testnet_config));

        let result = get_user_investments(ctx, GetInvestmentsParams { owner }).await.unwrap();

        assert_eq!(result.investments.len(), 2);
        assert_eq!(result.investments[0].property_name(), "Villa");
        assert_eq!(result.investments[0].investment.investment_amount_display().as_str(), "100");
        assert_eq!(result.investments[1].property, None);
        assert_eq!(result.investments[1].property_name(), "Unknown Property");
    }

    #[rstest]
    #[tokio::test]
    async fn test_no_investments(testnet_config: MarketConfig) {
        let ctx = Arc::new(GlobalContext::new(Arc::new(FakeChainClient::new()), testnet_config));
        let result = get_user_investments(ctx, GetInvestmentsParams { owner: id("0xa11ce") })
            .await
            .unwrap();
        assert!(result.investments.is_empty());
    }
}
