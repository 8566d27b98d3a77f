use rstest::fixture;
use rwa_primitives::{
    context::{MarketConfig, DEFAULT_COIN_TYPE},
    rpc::{Address, CreatePropertyParams, ObjectId},
    types::{ChainObject, Network},
    wallet::WalletAccount,
};
use serde_json::json;

pub const TEST_PACKAGE_ID: &str =
    "0x7b8e0864967427679b4e129f79dc332a885c6087ec9e187b53451a9006ee15f2";

pub fn id(hex: &str) -> ObjectId {
    ObjectId::from_hex(hex).expect("test ids are valid hex")
}

#[fixture]
pub fn package_id() -> ObjectId {
    id(TEST_PACKAGE_ID)
}

#[fixture]
pub fn testnet_config() -> MarketConfig {
    MarketConfig::new(id(TEST_PACKAGE_ID), Network::Testnet).with_coin_type(DEFAULT_COIN_TYPE)
}

#[fixture]
pub fn mainnet_config() -> MarketConfig {
    MarketConfig::new(id(TEST_PACKAGE_ID), Network::Mainnet)
}

#[fixture]
pub fn test_account() -> WalletAccount {
    let mut account = WalletAccount::new(id("0xa11ce"));
    account.chains.insert("sui:testnet".to_string());
    account
}

#[fixture]
pub fn villa_params() -> CreatePropertyParams {
    CreatePropertyParams {
        name: "Test Villa".to_string(),
        description: "Three bedrooms by the sea".to_string(),
        image_url: "https://images.example/villa.png".to_string(),
        location: "Lisbon, Portugal".to_string(),
        property_type: "Residential".to_string(),
        total_value: 10_000,
        total_shares: 1000,
        price_per_share: 10u64.into(),
        rental_yield: "6.5%".to_string(),
    }
}

/// A property object as the node would return it.
pub fn property_object(
    package: ObjectId,
    property_id: ObjectId,
    name: &str,
    total_shares: u64,
    available_shares: u64,
) -> ChainObject {
    ChainObject {
        object_id: property_id,
        object_type: Some(format!("{}::property_nft::PropertyNFT", package)),
        fields: json!({
            "id": { "id": property_id.to_string() },
            "name": name,
            "description": "A property",
            "image_url": "https://images.example/p.png",
            "location": "Somewhere",
            "property_type": "Residential",
            "total_value": "100000",
            "total_shares": total_shares.to_string(),
            "available_shares": available_shares.to_string(),
            "price_per_share": "10000000000",
            "rental_yield": "5%",
            "is_active": true,
            "owner": "0xb0b"
        })
        .as_object()
        .cloned()
        .unwrap_or_default(),
    }
}

/// An investment object as the node would return it.
pub fn investment_object(
    package: ObjectId,
    investment_id: ObjectId,
    property_id: ObjectId,
    shares: u64,
    amount_base_units: u64,
) -> ChainObject {
    ChainObject {
        object_id: investment_id,
        object_type: Some(format!("{}::property_nft::Investment", package)),
        fields: json!({
            "id": { "id": investment_id.to_string() },
            "property_id": property_id.to_string(),
            "shares": shares.to_string(),
            "investment_amount": amount_base_units.to_string(),
            "timestamp": "1700000000000"
        })
        .as_object()
        .cloned()
        .unwrap_or_default(),
    }
}

pub fn owner(hex: &str) -> Address {
    id(hex)
}

#[fixture]
pub fn session_store() -> std::sync::Arc<rwa_utils::session::MemorySessionStore> {
    std::sync::Arc::new(rwa_utils::session::MemorySessionStore::new())
}
