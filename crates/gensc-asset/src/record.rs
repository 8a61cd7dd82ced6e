//! Decoding of record bodies at the ingestion boundary.
//!
//! Records are opaque everywhere except here, where the fields named in an
//! envelope's `keys` are pulled out to build composite keys.

use serde_json::{Map, Value};

use crate::error::{AssetError, AssetResult};

/// A decoded record: its field map plus the exact bytes to store.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordBody {
    fields: Map<String, Value>,
    payload: Vec<u8>,
}

impl RecordBody {
    /// Decode the `assetDatas` entry at `index`.
    ///
    /// A JSON object is stored as its compact serialization. A JSON string
    /// whose contents parse as an object is stored as the string's bytes.
    pub fn decode(index: usize, data: &Value) -> AssetResult<Self> {
        match data {
            Value::Object(fields) => {
                let payload = serde_json::to_vec(data)
                    .map_err(|e| AssetError::Serialization(e.to_string()))?;
                Ok(Self {
                    fields: fields.clone(),
                    payload,
                })
            }
            Value::String(raw) => match serde_json::from_str::<Value>(raw) {
                Ok(Value::Object(fields)) => Ok(Self {
                    fields,
                    payload: raw.as_bytes().to_vec(),
                }),
                _ => Err(AssetError::RecordNotObject { index }),
            },
            _ => Err(AssetError::RecordNotObject { index }),
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The string value of `field`, used as one composite key part.
    pub fn key_part(&self, field: &str) -> AssetResult<String> {
        match self.fields.get(field) {
            Some(Value::String(part)) => Ok(part.clone()),
            Some(other) => Err(AssetError::KeyFieldNotString {
                field: field.to_string(),
                found: json_type_name(other),
            }),
            None => Err(AssetError::KeyFieldMissing {
                field: field.to_string(),
            }),
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
