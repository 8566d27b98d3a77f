use std::sync::Arc;

use rwa_primitives::{context::GlobalContext, errors::MarketError};
use tracing::debug;

/// Whether the configured marketplace package exists on the node.
pub async fn is_package_deployed(global_ctx: Arc<GlobalContext>) -> Result<bool, MarketError> {
    let package_id = global_ctx.config().package_id;
    let deployed = global_ctx.chain().get_object(package_id).await?.is_some();
    debug!(%package_id, deployed, "Checked package deployment");
    Ok(deployed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;
    use rwa_primitives::{context::MarketConfig, types::ChainObject};
    use rwa_tests_utils::{chain::FakeChainClient, fixtures::testnet_config};

    #[rstest]
    #[case(true)]
    #[case(false)]
    #[tokio::test]
    async fn test_is_package_deployed(testnet_config: MarketConfig, #[case] deployed: bool) {
        let mut chain = FakeChainClient::new();
        if deployed {
            chain = chain.with_object(ChainObject {
                object_id: testnet_config.package_id,
                object_type: Some("package".to_string()),
                fields: Default::default(),
            });
        }
        let ctx = Arc::new(GlobalContext::new(Arc::new(chain), testnet_config));
        assert_eq!(is_package_deployed(ctx).await, Ok(deployed));
    }
}
