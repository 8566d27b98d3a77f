use rwa_primitives::errors::MarketError;
use serde_json::json;

#[cfg_attr(test, derive(PartialEq, Eq))]
#[derive(thiserror::Error, Debug)]
pub enum RwaRpcApiError {
    #[error(transparent)]
    Market(#[from] MarketError),
}

impl From<&RwaRpcApiError> for i32 {
    fn from(err: &RwaRpcApiError) -> Self {
        let RwaRpcApiError::Market(err) = err;
        match err {
            MarketError::NoWalletFound => 1,
            MarketError::NoAccounts => 2,
            MarketError::ConnectionRejected => 3,
            MarketError::ConnectionTimeout => 4,
            MarketError::ConnectionFailed(_) => 5,
            MarketError::ConnectionInProgress => 6,
            MarketError::WalletNotConnected => 7,
            MarketError::InvalidArgument(_) => 10,
            MarketError::UserRejectedTransaction(_) => 11,
            MarketError::ExecutionFailed(_) => 12,
            MarketError::ExecutionTimeout => 13,
            MarketError::SubmissionInProgress => 14,
            MarketError::InsufficientBalance { .. } => 15,
            MarketError::NotFound(_) => 20,
            MarketError::MalformedObject { .. } => 21,
            MarketError::Chain(_) => 30,
            MarketError::Session(_) => 31,
        }
    }
}

impl RwaRpcApiError {
    pub fn data(&self) -> Option<serde_json::Value> {
        match self {
            RwaRpcApiError::Market(
                MarketError::InvalidArgument(_)
                | MarketError::InsufficientBalance { .. }
                | MarketError::NotFound(_)
                | MarketError::MalformedObject { .. }
                | MarketError::Chain(_),
            ) => Some(json!(self.market())),
            _ => None,
        }
    }

    fn market(&self) -> &MarketError {
        let RwaRpcApiError::Market(err) = self;
        err
    }
}

impl From<RwaRpcApiError> for jsonrpsee::types::ErrorObjectOwned {
    fn from(err: RwaRpcApiError) -> Self {
        jsonrpsee::types::ErrorObjectOwned::owned((&err).into(), err.to_string(), err.data())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonrpsee::types::ErrorObjectOwned;
    use rstest::rstest;
    use rwa_primitives::{context::ChainClientError, rpc::ObjectId};

    #[rstest]
    #[case(MarketError::NotFound(ObjectId::ZERO), 20, true)]
    #[case(MarketError::InvalidArgument("shares".into()), 10, true)]
    #[case(MarketError::Chain(ChainClientError::Transport("down".into())), 30, true)]
    #[case(MarketError::WalletNotConnected, 7, false)]
    fn test_error_object(#[case] err: MarketError, #[case] code: i32, #[case] has_data: bool) {
        let message = err.to_string();
        let object: ErrorObjectOwned = RwaRpcApiError::from(err).into();
        assert_eq!(object.code(), code);
        assert_eq!(object.message(), message);
        assert_eq!(object.data().is_some(), has_data);
    }
}
