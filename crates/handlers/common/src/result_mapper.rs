use rwa_primitives::{effects::ExecutionResponse, rpc::ObjectId};
use serde::Serialize;

/// Identifiers a caller needs out of an execution response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MappedResult {
    pub digest: Option<String>,
    pub created_object_id: Option<ObjectId>,
}

/// Pick the digest and the first created object whose type contains
/// `expected_type`. When several matching objects are created only the first
/// one, in effects order, is returned.
pub fn map_result(response: &ExecutionResponse, expected_type: &str) -> MappedResult {
    let created_object_id = response
        .created_objects()
        .find(|change| {
            change
                .object_type
                .as_deref()
                .is_some_and(|t| t.contains(expected_type))
        })
        .and_then(|change| change.object_id.as_deref())
        .and_then(|id| ObjectId::from_hex(id).ok());

    MappedResult {
        digest: response.digest.clone(),
        created_object_id,
    }
}
