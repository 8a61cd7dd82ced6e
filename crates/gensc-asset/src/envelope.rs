//! Request/response envelope and result types.
//!
//! One [`AssetEnvelope`] is decoded from the single JSON argument of every
//! call and, on success, returned with the results written into
//! `assetDatas`. Empty optional fields are left out of the encoding and every
//! field tolerates `null` on input.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{AssetError, AssetResult};

/// Result text of a successful create.
pub const INSERTED: &str = "Data inserted successfully in the ledger";

/// Generic asset request and response.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetEnvelope {
    /// Namespace of the records, e.g. `IOTdevice`.
    #[serde(default, deserialize_with = "nullable")]
    pub asset_name: String,
    /// Field names whose values form the composite key of each record.
    #[serde(default, deserialize_with = "nullable")]
    pub keys: Vec<String>,
    /// Records in `assetDatas` to process, or the page size of a query.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "is_zero")]
    pub entity_count: i32,
    /// Record bodies on input; results on output.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Vec::is_empty")]
    pub asset_datas: Vec<Value>,
    /// Rich query forwarded verbatim to the state database.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub query_string: String,
    /// Pagination cursor from a previous page.
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "String::is_empty")]
    pub bookmark: String,
}

impl AssetEnvelope {
    /// Decode an envelope from JSON bytes.
    pub fn from_json(data: &[u8]) -> AssetResult<Self> {
        serde_json::from_slice(data).map_err(|e| AssetError::BadRequest(e.to_string()))
    }

    /// Decode the envelope carried by a call's first argument.
    pub fn from_argument(argument: Option<&str>) -> AssetResult<Self> {
        match argument {
            Some(raw) if !raw.trim().is_empty() => Self::from_json(raw.as_bytes()),
            _ => Err(AssetError::InvalidArguments(
                "need to add one argument to this function call".into(),
            )),
        }
    }

    pub fn to_json(&self) -> AssetResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|e| AssetError::Serialization(e.to_string()))
    }

    /// `entityCount` clamped to `0..=len(assetDatas)`.
    pub fn clamped_entity_count(&self) -> usize {
        usize::try_from(self.entity_count)
            .unwrap_or(0)
            .min(self.asset_datas.len())
    }
}

/// Outcome of one create attempt in a batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub result: String,
}

impl BatchOutcome {
    pub fn inserted(keys: Vec<String>) -> Self {
        Self {
            keys,
            result: INSERTED.to_string(),
        }
    }

    pub fn failed(keys: Vec<String>, error: &AssetError) -> Self {
        Self {
            keys,
            result: format!("Error inserting Object {error}"),
        }
    }

    pub fn is_inserted(&self) -> bool {
        self.result == INSERTED
    }
}

/// One materialized query match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryResultItem {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Record")]
    pub record: Value,
}

/// Pagination details of a query page.
///
/// Encodes as `{"RecordsCount":"<n>","Bookmark":"<b>"}`; the count travels
/// as a string.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    #[serde(
        rename = "RecordsCount",
        serialize_with = "count_as_string",
        deserialize_with = "count_from_string"
    )]
    pub records_count: i32,
    #[serde(rename = "Bookmark")]
    pub bookmark: String,
}

impl From<gensc_state::QueryResponseMetadata> for PaginationMetadata {
    fn from(meta: gensc_state::QueryResponseMetadata) -> Self {
        Self {
            records_count: meta.fetched_records_count,
            bookmark: meta.bookmark,
        }
    }
}

fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn is_zero(value: &i32) -> bool {
    *value == 0
}

fn count_as_string<S: Serializer>(count: &i32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&count.to_string())
}

fn count_from_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_create_request() {
        let raw = r#"{"assetName":"IOTdevice","keys":["id"],"entityCount":1,
            "assetDatas":[{"id":"01","Value":"200F"}]}"#;
        let env = AssetEnvelope::from_json(raw.as_bytes()).unwrap();
        assert_eq!(env.asset_name, "IOTdevice");
        assert_eq!(env.keys, vec!["id"]);
        assert_eq!(env.entity_count, 1);
        assert_eq!(env.asset_datas[0]["Value"], "200F");
        assert!(env.query_string.is_empty());
    }

    #[test]
    fn decode_minimal_and_null_fields() {
        let env = AssetEnvelope::from_json(br#"{"assetName":"IOTdevice"}"#).unwrap();
        assert!(env.keys.is_empty());
        assert_eq!(env.entity_count, 0);

        let env = AssetEnvelope::from_json(br#"{"assetName":"x","keys":null,"bookmark":null}"#)
            .unwrap();
        assert!(env.keys.is_empty());
        assert!(env.bookmark.is_empty());
    }

    #[test]
    fn decode_failure_is_bad_request() {
        let err = AssetEnvelope::from_json(b"{not json").unwrap_err();
        assert!(matches!(err, AssetError::BadRequest(_)));
        let err = AssetEnvelope::from_json(br#"{"entityCount":"one"}"#).unwrap_err();
        assert!(matches!(err, AssetError::BadRequest(_)));
    }

    #[test]
    fn missing_argument_is_invalid_arguments() {
        assert!(matches!(
            AssetEnvelope::from_argument(None),
            Err(AssetError::InvalidArguments(_))
        ));
        assert!(matches!(
            AssetEnvelope::from_argument(Some("  ")),
            Err(AssetError::InvalidArguments(_))
        ));
        assert!(AssetEnvelope::from_argument(Some(r#"{"assetName":"a"}"#)).is_ok());
    }

    #[test]
    fn encode_omits_empty_fields() {
        let env = AssetEnvelope {
            asset_name: "IOTdevice".into(),
            ..Default::default()
        };
        let json: Value = serde_json::from_slice(&env.to_json().unwrap()).unwrap();
        assert_eq!(json, json!({"assetName": "IOTdevice", "keys": []}));
    }

    #[test]
    fn encode_keeps_populated_fields() {
        let env = AssetEnvelope {
            asset_name: "IOTdevice".into(),
            keys: vec!["id".into()],
            entity_count: 2,
            asset_datas: vec![json!("x")],
            query_string: "{}".into(),
            bookmark: "bm".into(),
        };
        let json: Value = serde_json::from_slice(&env.to_json().unwrap()).unwrap();
        assert_eq!(json["entityCount"], 2);
        assert_eq!(json["queryString"], "{}");
        assert_eq!(json["bookmark"], "bm");
        assert_eq!(json["assetDatas"], json!(["x"]));
    }

    #[test]
    fn entity_count_is_clamped() {
        let mut env = AssetEnvelope {
            entity_count: 5,
            asset_datas: vec![json!({}), json!({})],
            ..Default::default()
        };
        assert_eq!(env.clamped_entity_count(), 2);
        env.entity_count = 1;
        assert_eq!(env.clamped_entity_count(), 1);
        env.entity_count = -3;
        assert_eq!(env.clamped_entity_count(), 0);
    }

    #[test]
    fn batch_outcome_encoding() {
        let ok = BatchOutcome::inserted(vec!["01".into()]);
        assert!(ok.is_inserted());
        assert_eq!(
            serde_json::to_string(&ok).unwrap(),
            r#"{"keys":["01"],"result":"Data inserted successfully in the ledger"}"#
        );

        let failed = BatchOutcome::failed(Vec::new(), &AssetError::RecordNotObject { index: 0 });
        assert!(!failed.is_inserted());
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"result": "Error inserting Object asset data at index 0 is not a JSON object"})
        );
    }

    #[test]
    fn pagination_metadata_count_is_a_string() {
        let meta = PaginationMetadata {
            records_count: 3,
            bookmark: "abc".into(),
        };
        let encoded = serde_json::to_string(&meta).unwrap();
        assert_eq!(encoded, r#"{"RecordsCount":"3","Bookmark":"abc"}"#);
        let decoded: PaginationMetadata = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, meta);
    }
}
