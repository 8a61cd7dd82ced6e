//! Turning result cursors into JSON payloads.
//!
//! Stored values are spliced into the output as-is; they are expected to be
//! JSON already. A value that is not JSON makes the output array malformed.
//! A value that is not UTF-8 cannot be spliced and fails the whole result.

use gensc_state::ResultCursor;
use serde::Serialize;

use crate::envelope::PaginationMetadata;
use crate::error::{AssetError, AssetResult};

/// Drain `cursor` into `[{"Key":<key>,"Record":<value>},...]`.
///
/// An iteration failure discards everything collected so far.
pub fn materialize(cursor: ResultCursor) -> AssetResult<String> {
    let mut buffer = String::from("[");
    let mut first = true;
    for entry in cursor {
        let entry = entry.map_err(AssetError::IterationError)?;
        if !first {
            buffer.push(',');
        }
        first = false;

        let key = serde_json::to_string(&entry.key)
            .map_err(|e| AssetError::Serialization(e.to_string()))?;
        buffer.push_str("{\"Key\":");
        buffer.push_str(&key);
        let record = std::str::from_utf8(&entry.value).map_err(|e| {
            AssetError::Serialization(format!("record under key {key} is not UTF-8: {e}"))
        })?;
        buffer.push_str(",\"Record\":");
        buffer.push_str(record);
        buffer.push('}');
    }
    buffer.push(']');
    Ok(buffer)
}

#[derive(Serialize)]
struct MetadataEntry<'a> {
    #[serde(rename = "ResponseMetadata")]
    response_metadata: &'a PaginationMetadata,
}

/// `[{"ResponseMetadata":{"RecordsCount":"<n>","Bookmark":"<b>"}}]`
///
/// The result holds the metadata only, never records.
pub fn attach_pagination_metadata(metadata: &PaginationMetadata) -> AssetResult<String> {
    serde_json::to_string(&[MetadataEntry {
        response_metadata: metadata,
    }])
    .map_err(|e| AssetError::Serialization(e.to_string()))
}

/// `{"ResponseMetadata":{...},"Records":<records_json>}`
///
/// `records_json` is the output of [`materialize`].
pub fn combine_with_metadata(records_json: &str, metadata: &PaginationMetadata) -> AssetResult<String> {
    let metadata =
        serde_json::to_string(metadata).map_err(|e| AssetError::Serialization(e.to_string()))?;
    Ok(format!(
        "{{\"ResponseMetadata\":{metadata},\"Records\":{records_json}}}"
    ))
}
