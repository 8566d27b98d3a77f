use std::{collections::BTreeSet, sync::Arc};

use futures::future::join_all;
use rwa_primitives::{
    context::GlobalContext,
    errors::MarketError,
    rpc::{GetPropertiesResult, GetPropertyParams, ObjectId},
    types::{ChainEvent, PropertyRecord},
};
use tracing::{debug, warn};

use crate::PROPERTY_CREATED_EVENT;

/// How many creation events are scanned when listing properties.
pub const PROPERTY_EVENT_LIMIT: usize = 50;

/// Read one property from the chain.
pub async fn get_property(
    global_ctx: Arc<GlobalContext>,
    params: GetPropertyParams,
) -> Result<PropertyRecord, MarketError> {
    let property_id = params.property_id;
    let object = global_ctx
        .chain()
        .get_object(property_id)
        .await?
        .ok_or(MarketError::NotFound(property_id))?;

    PropertyRecord::from_object(&object).map_err(|e| MarketError::MalformedObject {
        id: property_id,
        reason: e.to_string(),
    })
}

fn created_property_id(event: &ChainEvent) -> Option<ObjectId> {
    event
        .parsed_json
        .get("property_id")
        .and_then(|v| v.as_str())
        .and_then(|id| ObjectId::from_hex(id).ok())
}

/// Properties announced by recent creation events.
///
/// Properties that no longer exist or cannot be decoded are left out.
pub async fn list_properties(global_ctx: Arc<GlobalContext>) -> Result<GetPropertiesResult, MarketError> {
    let event_type = global_ctx.config().property_nft_type(PROPERTY_CREATED_EVENT);
    let events = global_ctx
        .chain()
        .query_events(&event_type, PROPERTY_EVENT_LIMIT)
        .await?;

    let mut seen = BTreeSet::new();
    let ids: Vec<ObjectId> = events
        .iter()
        .filter_map(created_property_id)
        .filter(|id| seen.insert(*id))
        .collect();
    debug!(events = events.len(), properties = ids.len(), "Loading properties");

    let reads = ids.into_iter().map(|property_id| {
        let global_ctx = global_ctx.clone();
        async move { get_property(global_ctx, GetPropertyParams { property_id }).await }
    });

    let mut properties = Vec::new();
    for result in join_all(reads).await {
        match result {
            Ok(property) => properties.push(property),
            Err(e @ MarketError::Chain(_)) => return Err(e),
            Err(e) => warn!(error = %e, "Skipping property"),
        }
    }
    Ok(GetPropertiesResult { properties })
}
