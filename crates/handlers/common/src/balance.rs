use std::sync::Arc;

use rwa_primitives::{
    context::GlobalContext,
    errors::MarketError,
    rpc::{Address, BalanceWarning},
    types::Balance,
};
use rwa_utils::units::BASE_UNITS_PER_COIN;
use serde::Serialize;
use tracing::warn;

/// Balance a creator must hold to pay for minting a property (0.1 coin).
pub const CREATE_PROPERTY_GAS_RESERVE: u128 = (BASE_UNITS_PER_COIN / 10) as u128;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum BalanceCheck {
    Sufficient { available: u128 },
    /// Shortfall tolerated outside production networks
    Insufficient { required: u128, available: u128 },
}

impl BalanceCheck {
    /// The shortfall to report to the caller, if any.
    pub fn warning(&self) -> Option<BalanceWarning> {
        match *self {
            BalanceCheck::Sufficient { .. } => None,
            BalanceCheck::Insufficient { required, available } => {
                Some(BalanceWarning { required, available })
            }
        }
    }
}

/// Compare the balance of `owner` with `required` base units.
///
/// A shortfall is a hard error on production networks and only a warning on
/// test networks, where the node may still accept the transaction.
pub async fn check_balance(
    global_ctx: Arc<GlobalContext>,
    owner: Address,
    required: u128,
) -> Result<BalanceCheck, MarketError> {
    let config = global_ctx.config();
    let Balance(available) = global_ctx
        .chain()
        .get_balance(owner, &config.coin_type)
        .await?;

    if available >= required {
        return Ok(BalanceCheck::Sufficient { available });
    }
    if config.network.is_production() {
        return Err(MarketError::InsufficientBalance { required, available });
    }
    warn!(
        %owner,
        required = %Balance(required).display(),
        available = %Balance(available).display(),
        network = %config.network,
        "Balance below requirement"
    );
    Ok(BalanceCheck::Insufficient { required, available })
}
