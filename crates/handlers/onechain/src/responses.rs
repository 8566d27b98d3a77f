//! Node response shapes, reduced to the fields the marketplace reads.

use rwa_primitives::{
    context::ChainClientError,
    rpc::ObjectId,
    types::{ChainEvent, ChainObject},
};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectResponse {
    #[serde(default)]
    pub data: Option<ObjectData>,
    #[serde(default)]
    pub error: Option<ObjectResponseError>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    pub object_id: ObjectId,
    #[serde(rename = "type", default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub content: Option<ObjectContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectContent {
    pub data_type: String,
    #[serde(rename = "type", default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub struct ObjectResponseError {
    pub code: String,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

const OBJECT_NOT_FOUND_CODES: [&str; 2] = ["notExists", "deleted"];

impl ObjectResponse {
    /// `None` when the node reports the object as missing or deleted.
    pub fn into_object(self) -> Result<Option<ChainObject>, ChainClientError> {
        if let Some(error) = self.error {
            if OBJECT_NOT_FOUND_CODES.contains(&error.code.as_str()) {
                return Ok(None);
            }
            return Err(ChainClientError::Rpc(format!(
                "object error {}: {}",
                error.code,
                Value::Object(error.rest)
            )));
        }
        let Some(data) = self.data else {
            return Ok(None);
        };
        let (content_type, fields) = match data.content {
            Some(content) => (content.object_type, content.fields),
            None => (None, Map::new()),
        };
        Ok(Some(ChainObject {
            object_id: data.object_id,
            object_type: data.object_type.or(content_type),
            fields,
        }))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub coin_type: String,
    pub total_balance: String,
}

impl BalanceResponse {
    pub fn total(&self) -> Result<u128, ChainClientError> {
        self.total_balance.parse().map_err(|_| {
            ChainClientError::InvalidResponse(format!(
                "total balance `{}` of {} is not an integer",
                self.total_balance, self.coin_type
            ))
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<Value>,
    #[serde(default)]
    pub has_next_page: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub parsed_json: Value,
}

impl From<EventResponse> for ChainEvent {
    fn from(event: EventResponse) -> Self {
        ChainEvent {
            event_type: event.event_type,
            parsed_json: event.parsed_json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_move_object_response() {
        let response: ObjectResponse = serde_json::from_value(json!({
            "data": {
                "objectId": "0x5ea",
                "version": "12",
                "digest": "abc",
                "type": "0x7b::property_nft::PropertyNFT",
                "content": {
                    "dataType": "moveObject",
                    "type": "0x7b::property_nft::PropertyNFT",
                    "hasPublicTransfer": true,
                    "fields": { "name": "Villa", "total_shares": "100" }
                }
            }
        }))
        .unwrap();

        let object = response.into_object().unwrap().unwrap();
        assert_eq!(object.object_id, ObjectId::from_hex("0x5ea").unwrap());
        assert_eq!(object.object_type.as_deref(), Some("0x7b::property_nft::PropertyNFT"));
        assert_eq!(object.fields["name"], "Villa");
    }

    #[test]
    fn test_package_response_has_no_fields() {
        let response: ObjectResponse = serde_json::from_value(json!({
            "data": {
                "objectId": "0x7b",
                "type": "package",
                "content": { "dataType": "package", "disassembled": {} }
            }
        }))
        .unwrap();
        let object = response.into_object().unwrap().unwrap();
        assert_eq!(object.object_type.as_deref(), Some("package"));
        assert!(object.fields.is_empty());
    }

    #[test]
    fn test_missing_object() {
        let response: ObjectResponse = serde_json::from_value(json!({
            "error": { "code": "notExists", "object_id": "0x1" }
        }))
        .unwrap();
        assert_eq!(response.into_object(), Ok(None));

        let response: ObjectResponse = serde_json::from_value(json!({
            "error": { "code": "displayError", "error": "bad" }
        }))
        .unwrap();
        assert_matches!(response.into_object(), Err(ChainClientError::Rpc(_)));
    }

    #[test]
    fn test_balance_response() {
        let response: BalanceResponse = serde_json::from_value(json!({
            "coinType": "0x2::oct::OCT",
            "coinObjectCount": 3,
            "totalBalance": "2500000000",
            "lockedBalance": {}
        }))
        .unwrap();
        assert_eq!(response.total(), Ok(2_500_000_000));

        let response = BalanceResponse {
            coin_type: "0x2::oct::OCT".to_string(),
            total_balance: "lots".to_string(),
        };
        assert_matches!(response.total(), Err(ChainClientError::InvalidResponse(_)));
    }

    #[test]
    fn test_event_page() {
        let page: Page<EventResponse> = serde_json::from_value(json!({
            "data": [{
                "id": { "txDigest": "d", "eventSeq": "0" },
                "type": "0x7b::property_nft::PropertyCreated",
                "parsedJson": { "property_id": "0x5ea" }
            }],
            "nextCursor": { "txDigest": "d", "eventSeq": "0" },
            "hasNextPage": false
        }))
        .unwrap();
        let events: Vec<ChainEvent> = page.data.into_iter().map(Into::into).collect();
        assert_eq!(events[0].parsed_json["property_id"], "0x5ea");
        assert!(!page.has_next_page);
    }
}
