//! API handlers.

pub mod customers;
pub mod documents;
pub mod export;
pub mod health;
pub mod invoices;
pub mod ledger;
pub mod products;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tallybook_core::RecordId;

use crate::error::ApiError;

/// Parse an identity taken from the request path.
pub(crate) fn parse_id(raw: &str) -> Result<RecordId, ApiError> {
    Ok(raw.parse::<RecordId>()?)
}

/// Deserialize an edited record, taking its identity from the path.
///
/// Any `id` in the body is ignored.
pub(crate) fn record_with_id<T: DeserializeOwned>(
    id: &RecordId,
    body: Value,
) -> Result<T, ApiError> {
    let Value::Object(mut fields) = body else {
        return Err(ApiError::BadRequest("expected a JSON object".into()));
    };
    fields.insert("id".into(), Value::String(id.to_string()));
    serde_json::from_value(Value::Object(fields)).map_err(|e| ApiError::BadRequest(e.to_string()))
}
