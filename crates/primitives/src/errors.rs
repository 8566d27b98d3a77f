use serde::Serialize;

use crate::{context::ChainClientError, rpc::ObjectId};

/// Everything a marketplace caller can observe going wrong.
///
/// Wallet and node failures are reclassified into these variants before they
/// leave the handlers, so callers never inspect provider errors.
#[derive(Debug, Clone, thiserror::Error, Serialize, PartialEq, Eq)]
pub enum MarketError {
    #[error("No wallet extension found")]
    NoWalletFound,
    #[error("Wallet returned no accounts")]
    NoAccounts,
    #[error("Connection rejected by user")]
    ConnectionRejected,
    #[error("Wallet connection timed out")]
    ConnectionTimeout,
    #[error("Wallet connection failed: {0}")]
    ConnectionFailed(String),
    #[error("A wallet connection is already in progress")]
    ConnectionInProgress,
    #[error("Wallet not connected")]
    WalletNotConnected,
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Transaction was rejected by user: {0}")]
    UserRejectedTransaction(String),
    #[error("Transaction execution failed: {0}")]
    ExecutionFailed(String),
    #[error("Transaction execution timed out")]
    ExecutionTimeout,
    #[error("A transaction submission is already in progress")]
    SubmissionInProgress,
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u128, available: u128 },
    #[error("Not found: {0}")]
    NotFound(ObjectId),
    #[error("Malformed object {id}: {reason}")]
    MalformedObject { id: ObjectId, reason: String },
    #[error("Chain client error: {0}")]
    Chain(#[from] ChainClientError),
    #[error("Session store error: {0}")]
    Session(String),
}
