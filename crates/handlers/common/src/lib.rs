pub mod balance;
pub mod create_property;
pub mod invest;
pub mod investments;
pub mod orchestrator;
pub mod package;
pub mod properties;
pub mod result_mapper;
pub mod transaction_builder;
pub mod transfer;
pub mod wallet_connector;

/// Move module of the marketplace package.
pub const PROPERTY_MODULE: &str = "property_nft";
/// Struct type of a property NFT.
pub const PROPERTY_STRUCT: &str = "PropertyNFT";
/// Struct type of an investment.
pub const INVESTMENT_STRUCT: &str = "Investment";
/// Event emitted when a property is minted.
pub const PROPERTY_CREATED_EVENT: &str = "PropertyCreated";
