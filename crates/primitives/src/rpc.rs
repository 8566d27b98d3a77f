use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::types::{DisplayAmount, InvestmentRecord, PropertyRecord};

//------------------------------------------------------------------------------
// Base Types
//------------------------------------------------------------------------------

/// A 32-byte chain identifier encoded as a hex string with 0x prefix
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexBytes32([u8; 32]);

#[derive(Debug, thiserror::Error, Serialize, PartialEq, Eq)]
pub enum HexBytes32Error {
    #[error("hex string exceeds 32 bytes")]
    TooLong,
    #[error("invalid hex string: {0}")]
    InvalidHex(String),
}

impl HexBytes32 {
    pub const ZERO: HexBytes32 = HexBytes32([0u8; 32]);

    pub fn from_hex(hex_str: &str) -> Result<Self, HexBytes32Error> {
        let hex_str = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        // If hex string has odd length, prefix with '0' to make it even
        let hex_str = if hex_str.len() % 2 != 0 {
            format!("0{}", hex_str)
        } else {
            hex_str.to_string()
        };
        let bytes = hex::decode(hex_str).map_err(|e| HexBytes32Error::InvalidHex(e.to_string()))?;

        if bytes.len() > 32 {
            return Err(HexBytes32Error::TooLong);
        }

        let mut array = [0u8; 32];
        array[32 - bytes.len()..].copy_from_slice(&bytes);
        Ok(Self(array))
    }

    /// Lowercase hex with the 0x prefix, always 64 nibbles.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    pub fn to_bytes_be(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for HexBytes32 {
    fn from(value: [u8; 32]) -> Self {
        HexBytes32(value)
    }
}

impl FromStr for HexBytes32 {
    type Err = HexBytes32Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for HexBytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for HexBytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HexBytes32({})", self.to_hex())
    }
}

impl Serialize for HexBytes32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HexBytes32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        HexBytes32::from_hex(&s).map_err(de::Error::custom)
    }
}

/// Identifier of an on-chain object
pub type ObjectId = HexBytes32;

/// Owner address of an account
pub type Address = HexBytes32;

//------------------------------------------------------------------------------
// RPC Methods - Parameters and Results
//------------------------------------------------------------------------------

/// Parameters for creating a property NFT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyParams {
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub location: String,
    pub property_type: String,
    pub total_value: u64,
    pub total_shares: u64,
    /// Price of one share in whole coins
    pub price_per_share: DisplayAmount,
    pub rental_yield: String,
}

/// Balance shortfall tolerated on a test network, in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceWarning {
    pub required: u128,
    pub available: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyResult {
    pub transaction_digest: String,
    pub property_id: Option<ObjectId>,
    /// Set when the creator's balance was below the gas reserve
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_warning: Option<BalanceWarning>,
}

/// Parameters for buying shares of a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestParams {
    pub property_id: ObjectId,
    pub shares: u64,
    /// Total payment in whole coins
    pub payment_amount: DisplayAmount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestResult {
    pub transaction_digest: String,
    pub investment_id: Option<ObjectId>,
    pub shares_purchased: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance_warning: Option<BalanceWarning>,
}

/// Parameters for transferring an investment to another owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferParams {
    pub investment_id: ObjectId,
    pub recipient: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub transaction_digest: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPropertyParams {
    pub property_id: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPropertiesResult {
    pub properties: Vec<PropertyRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetInvestmentsParams {
    pub owner: Address,
}

/// An investment joined with the property it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioEntry {
    pub investment: InvestmentRecord,
    pub property: Option<PropertyRecord>,
}

impl PortfolioEntry {
    pub fn property_name(&self) -> &str {
        self.property
            .as_ref()
            .map(|p| p.name.as_str())
            .unwrap_or("Unknown Property")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetInvestmentsResult {
    pub investments: Vec<PortfolioEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("0x0", vec![0; 32])]
    #[case("0", vec![0; 32])]
    #[case("0x01", {
        let mut bytes = vec![0; 31];
        bytes.push(1);
        bytes
    })]
    #[case("0x2", {
        let mut bytes = vec![0; 31];
        bytes.push(2);
        bytes
    })]
    #[case("0xdeadbeef", {
        let mut bytes = vec![0; 28];
        bytes.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
        bytes
    })]
    fn test_hexbytes32_from_hex_valid(#[case] input: &str, #[case] expected: Vec<u8>) {
        let result = HexBytes32::from_hex(input).unwrap();
        assert_eq!(result.0.to_vec(), expected);
    }

    #[rstest]
    #[case("0xzz")]
    #[case("0xgh")]
    #[case("not an id")]
    fn test_hexbytes32_from_hex_invalid_hex(#[case] input: &str) {
        assert_matches::assert_matches!(
            HexBytes32::from_hex(input),
            Err(HexBytes32Error::InvalidHex(_))
        );
    }

    #[test]
    fn test_hexbytes32_from_hex_too_long() {
        let input = format!("0x{}", "1".repeat(66));
        assert_eq!(HexBytes32::from_hex(&input), Err(HexBytes32Error::TooLong));
    }

    #[test]
    fn test_hexbytes32_display_is_padded_and_prefixed() {
        let id = HexBytes32::from_hex("0xdeadbeef").unwrap();
        assert_eq!(
            id.to_string(),
            "0x00000000000000000000000000000000000000000000000000000000deadbeef"
        );
    }

    #[test]
    fn test_hexbytes32_serializes_as_string() {
        let id = HexBytes32::from_hex("0x2").unwrap();
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(
            json,
            serde_json::json!("0x0000000000000000000000000000000000000000000000000000000000000002")
        );
        let back: HexBytes32 = serde_json::from_value(json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_invest_params_accept_numeric_payment() {
        let params: InvestParams = serde_json::from_value(serde_json::json!({
            "propertyId": "0x5",
            "shares": 3,
            "paymentAmount": 30
        }))
        .unwrap();
        assert_eq!(params.payment_amount.as_str(), "30");
        assert_eq!(params.shares, 3);
    }

    #[test]
    fn test_portfolio_entry_unknown_property_name() {
        let entry = PortfolioEntry {
            investment: InvestmentRecord {
                id: HexBytes32::from_hex("0x1").unwrap(),
                property_id: HexBytes32::from_hex("0x2").unwrap(),
                shares: 4,
                investment_amount: 40_000_000_000,
                timestamp: 0,
            },
            property: None,
        };
        assert_eq!(entry.property_name(), "Unknown Property");
    }
}
