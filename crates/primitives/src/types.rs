use std::{fmt, str::FromStr};

use rwa_utils::units::{base_units_to_display, display_to_base_units, AmountError, COIN_DECIMALS};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::rpc::{HexBytes32, ObjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Testnet,
    Mainnet,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown network: {0} (expected testnet or mainnet)")]
pub struct UnknownNetwork(String);

impl Network {
    /// Chain identifier wallets use for this network.
    pub fn chain_id(&self) -> &'static str {
        match self {
            Network::Testnet => "sui:testnet",
            Network::Mainnet => "sui:mainnet",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Network::Mainnet)
    }
}

impl FromStr for Network {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "testnet" => Ok(Network::Testnet),
            "mainnet" => Ok(Network::Mainnet),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Testnet => write!(f, "testnet"),
            Network::Mainnet => write!(f, "mainnet"),
        }
    }
}

/// An amount in whole coins as the user typed it, e.g. `"10"` or `"0.25"`.
///
/// The value is kept as decimal text and only ever converted to base units
/// with integer arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DisplayAmount(String);

impl DisplayAmount {
    pub fn new(amount: impl Into<String>) -> Self {
        Self(amount.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_base_units(&self) -> Result<u64, AmountError> {
        display_to_base_units(&self.0, COIN_DECIMALS)
    }

    pub fn from_base_units(value: u64) -> Self {
        Self(base_units_to_display(value as u128, COIN_DECIMALS))
    }
}

impl From<u64> for DisplayAmount {
    fn from(whole_coins: u64) -> Self {
        Self(whole_coins.to_string())
    }
}

impl From<&str> for DisplayAmount {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for DisplayAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DisplayAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => DisplayAmount(text),
            Raw::Number(number) => DisplayAmount(number.to_string()),
        })
    }
}

/// Coin balance of an owner in base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Balance(pub u128);

impl Balance {
    pub fn base_units(&self) -> u128 {
        self.0
    }

    pub fn display(&self) -> String {
        base_units_to_display(self.0, COIN_DECIMALS)
    }
}

/// A Move object as returned by an object read, reduced to what the
/// marketplace consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainObject {
    pub object_id: ObjectId,
    pub object_type: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

/// A Move event as returned by an event query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEvent {
    pub event_type: String,
    #[serde(default)]
    pub parsed_json: Value,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("available shares {available} exceed total shares {total}")]
    SharesOutOfRange { available: u64, total: u64 },
}

fn field<'a>(fields: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, RecordError> {
    fields.get(name).ok_or(RecordError::MissingField(name))
}

fn field_string(fields: &Map<String, Value>, name: &'static str) -> Result<String, RecordError> {
    match field(fields, name)? {
        Value::String(s) => Ok(s.clone()),
        other => Err(RecordError::InvalidField {
            field: name,
            reason: format!("expected string, got {}", other),
        }),
    }
}

// u64 fields come back as decimal strings from the node
fn field_u64(fields: &Map<String, Value>, name: &'static str) -> Result<u64, RecordError> {
    let invalid = |reason: String| RecordError::InvalidField { field: name, reason };
    match field(fields, name)? {
        Value::String(s) => s.parse::<u64>().map_err(|e| invalid(e.to_string())),
        Value::Number(n) => n.as_u64().ok_or_else(|| invalid(format!("not a u64: {}", n))),
        other => Err(invalid(format!("expected integer, got {}", other))),
    }
}

fn field_id(fields: &Map<String, Value>, name: &'static str) -> Result<HexBytes32, RecordError> {
    let raw = match field(fields, name)? {
        Value::String(s) => s.clone(),
        // UID fields are nested as { "id": "0x..." }
        Value::Object(inner) => match inner.get("id") {
            Some(Value::String(s)) => s.clone(),
            _ => {
                return Err(RecordError::InvalidField {
                    field: name,
                    reason: "object without id".to_string(),
                })
            }
        },
        other => {
            return Err(RecordError::InvalidField {
                field: name,
                reason: format!("expected id, got {}", other),
            })
        }
    };
    HexBytes32::from_hex(&raw).map_err(|e| RecordError::InvalidField {
        field: name,
        reason: e.to_string(),
    })
}

/// A tokenized property as stored on chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    pub id: ObjectId,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub location: String,
    pub property_type: String,
    pub total_value: u64,
    pub total_shares: u64,
    pub available_shares: u64,
    /// In base units
    pub price_per_share: u64,
    pub rental_yield: String,
    pub is_active: bool,
    pub owner: HexBytes32,
}

impl PropertyRecord {
    pub fn from_object(object: &ChainObject) -> Result<Self, RecordError> {
        let fields = &object.fields;
        let total_shares = field_u64(fields, "total_shares")?;
        let available_shares = field_u64(fields, "available_shares")?;
        if available_shares > total_shares {
            return Err(RecordError::SharesOutOfRange {
                available: available_shares,
                total: total_shares,
            });
        }
        let is_active = match fields.get("is_active") {
            Some(Value::Bool(b)) => *b,
            None => true,
            Some(other) => {
                return Err(RecordError::InvalidField {
                    field: "is_active",
                    reason: format!("expected bool, got {}", other),
                })
            }
        };

        Ok(Self {
            id: object.object_id,
            name: field_string(fields, "name")?,
            description: field_string(fields, "description")?,
            image_url: field_string(fields, "image_url")?,
            location: field_string(fields, "location")?,
            property_type: field_string(fields, "property_type")?,
            total_value: field_u64(fields, "total_value")?,
            total_shares,
            available_shares,
            price_per_share: field_u64(fields, "price_per_share")?,
            rental_yield: field_string(fields, "rental_yield")?,
            is_active,
            owner: field_id(fields, "owner")?,
        })
    }

    pub fn sold_shares(&self) -> u64 {
        self.total_shares - self.available_shares
    }
}

/// Fractional ownership of a property held by one address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRecord {
    pub id: ObjectId,
    pub property_id: ObjectId,
    pub shares: u64,
    /// In base units
    pub investment_amount: u64,
    pub timestamp: u64,
}

impl InvestmentRecord {
    pub fn from_object(object: &ChainObject) -> Result<Self, RecordError> {
        let fields = &object.fields;
        Ok(Self {
            id: object.object_id,
            property_id: field_id(fields, "property_id")?,
            shares: field_u64(fields, "shares")?,
            investment_amount: field_u64(fields, "investment_amount")?,
            timestamp: match fields.get("timestamp") {
                Some(_) => field_u64(fields, "timestamp")?,
                None => 0,
            },
        })
    }

    pub fn investment_amount_display(&self) -> DisplayAmount {
        DisplayAmount::from_base_units(self.investment_amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::*;
    use serde_json::json;

    fn object(fields: Value) -> ChainObject {
        ChainObject {
            object_id: HexBytes32::from_hex("0xabc").unwrap(),
            object_type: Some("0x7b::property_nft::PropertyNFT".to_string()),
            fields: fields.as_object().cloned().unwrap(),
        }
    }

    #[fixture]
    fn property_fields() -> Value {
        json!({
            "id": { "id": "0xabc" },
            "name": "Test Villa",
            "description": "Sea view",
            "image_url": "https://img.example/villa.png",
            "location": "Lisbon",
            "property_type": "Residential",
            "total_value": "1000000",
            "total_shares": "1000",
            "available_shares": "750",
            "price_per_share": "10000000000",
            "rental_yield": "5.5%",
            "is_active": true,
            "owner": "0x11"
        })
    }

    #[rstest]
    fn test_property_from_object(property_fields: Value) {
        let record = PropertyRecord::from_object(&object(property_fields)).unwrap();
        assert_eq!(record.name, "Test Villa");
        assert_eq!(record.total_shares, 1000);
        assert_eq!(record.available_shares, 750);
        assert_eq!(record.sold_shares(), 250);
        assert_eq!(record.price_per_share, 10_000_000_000);
        assert_eq!(record.owner, HexBytes32::from_hex("0x11").unwrap());
    }

    #[rstest]
    fn test_property_rejects_available_above_total(mut property_fields: Value) {
        property_fields["available_shares"] = json!("1001");
        assert_matches!(
            PropertyRecord::from_object(&object(property_fields)),
            Err(RecordError::SharesOutOfRange {
                available: 1001,
                total: 1000
            })
        );
    }

    #[rstest]
    fn test_property_missing_field(mut property_fields: Value) {
        property_fields.as_object_mut().unwrap().remove("rental_yield");
        assert_eq!(
            PropertyRecord::from_object(&object(property_fields)),
            Err(RecordError::MissingField("rental_yield"))
        );
    }

    #[rstest]
    #[case(json!("12"), Ok(12))]
    #[case(json!(12), Ok(12))]
    #[case(json!("-3"), Err(()))]
    #[case(json!(true), Err(()))]
    fn test_field_u64(#[case] value: Value, #[case] expected: Result<u64, ()>) {
        let mut fields = Map::new();
        fields.insert("shares".to_string(), value);
        assert_eq!(field_u64(&fields, "shares").map_err(|_| ()), expected);
    }

    #[test]
    fn test_investment_from_object() {
        let record = InvestmentRecord::from_object(&object(json!({
            "property_id": "0xabc",
            "shares": "3",
            "investment_amount": "30000000000",
            "timestamp": "1700000000000"
        })))
        .unwrap();
        assert_eq!(record.shares, 3);
        assert_eq!(record.investment_amount_display().as_str(), "30");
        assert_eq!(record.timestamp, 1_700_000_000_000);
    }

    #[rstest]
    #[case("testnet", Network::Testnet)]
    #[case("MAINNET", Network::Mainnet)]
    fn test_network_from_str(#[case] input: &str, #[case] expected: Network) {
        assert_eq!(input.parse::<Network>().unwrap(), expected);
    }

    #[test]
    fn test_network_chain_id() {
        assert_eq!(Network::Testnet.chain_id(), "sui:testnet");
        assert!(Network::Mainnet.is_production());
        assert!("devnet".parse::<Network>().is_err());
    }

    #[test]
    fn test_display_amount_deserializes_numbers_and_strings() {
        let from_number: DisplayAmount = serde_json::from_value(json!(0.5)).unwrap();
        let from_text: DisplayAmount = serde_json::from_value(json!("0.5")).unwrap();
        assert_eq!(from_number, from_text);
        assert_eq!(from_number.to_base_units(), Ok(500_000_000));
    }

    #[test]
    fn test_balance_display() {
        assert_eq!(Balance(1_250_000_000).display(), "1.25");
    }
}
