use gensc_state::StateGateway;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::envelope::{AssetEnvelope, BatchOutcome};
use crate::error::{AssetError, AssetResult};
use crate::record::RecordBody;
use crate::store::AssetStore;

/// How the key fields of a record turn into create calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyStrategy {
    /// One create per leading run of key fields: `keys = [id, type]` creates
    /// the record under `[id]` and again under `[id, type]`.
    #[default]
    Prefixes,
    /// One create per record under the complete key.
    FullKey,
}

/// Drives [`AssetStore::create`] over every record of a batch envelope.
///
/// A failing record never aborts the batch; each create attempt yields one
/// [`BatchOutcome`].
pub struct BatchIngestor<'a, S: ?Sized> {
    store: AssetStore<'a, S>,
    strategy: KeyStrategy,
}

impl<'a, S: StateGateway + ?Sized> BatchIngestor<'a, S> {
    pub fn new(state: &'a S, strategy: KeyStrategy) -> Self {
        Self {
            store: AssetStore::new(state),
            strategy,
        }
    }

    pub fn strategy(&self) -> KeyStrategy {
        self.strategy
    }

    /// Ingest `envelope` and return it with the outcomes, JSON encoded, as
    /// the first element of `assetDatas`.
    pub fn ingest(&self, mut envelope: AssetEnvelope) -> AssetResult<AssetEnvelope> {
        info!(
            asset_name = %envelope.asset_name,
            keys = ?envelope.keys,
            entity_count = envelope.entity_count,
            supplied = envelope.asset_datas.len(),
            "ingesting assets"
        );

        let outcomes = self.ingest_records(&envelope);
        let encoded =
            serde_json::to_string(&outcomes).map_err(|e| AssetError::Serialization(e.to_string()))?;

        match envelope.asset_datas.first_mut() {
            Some(first) => *first = Value::String(encoded),
            None => envelope.asset_datas.push(Value::String(encoded)),
        }
        Ok(envelope)
    }

    /// Run every create of the batch and collect the outcomes in order.
    pub fn ingest_records(&self, envelope: &AssetEnvelope) -> Vec<BatchOutcome> {
        let count = envelope.clamped_entity_count();
        let mut outcomes = Vec::with_capacity(count);

        // No key fields means no prefixes, so nothing to create.
        if envelope.keys.is_empty() && self.strategy == KeyStrategy::Prefixes {
            return outcomes;
        }

        for (index, data) in envelope.asset_datas.iter().take(count).enumerate() {
            self.ingest_record(&envelope.asset_name, &envelope.keys, index, data, &mut outcomes);
        }
        outcomes
    }

    fn ingest_record(
        &self,
        asset_name: &str,
        key_fields: &[String],
        index: usize,
        data: &Value,
        outcomes: &mut Vec<BatchOutcome>,
    ) {
        debug!(index, %data, "decoding asset data");
        let body = match RecordBody::decode(index, data) {
            Ok(body) => body,
            Err(err) => {
                error!(index, error = %err, "error decoding asset data");
                outcomes.push(BatchOutcome::failed(Vec::new(), &err));
                return;
            }
        };

        let mut parts = Vec::with_capacity(key_fields.len());
        for field in key_fields {
            match body.key_part(field) {
                Ok(part) => parts.push(part),
                Err(err) => {
                    error!(index, field = %field, error = %err, "error extracting key field");
                    outcomes.push(BatchOutcome::failed(parts, &err));
                    return;
                }
            }
            if self.strategy == KeyStrategy::Prefixes {
                outcomes.push(self.create(asset_name, &parts, body.payload()));
            }
        }

        if self.strategy == KeyStrategy::FullKey {
            outcomes.push(self.create(asset_name, &parts, body.payload()));
        }
    }

    fn create(&self, asset_name: &str, parts: &[String], payload: &[u8]) -> BatchOutcome {
        match self.store.create(asset_name, parts, payload) {
            Ok(()) => BatchOutcome::inserted(parts.to_vec()),
            Err(err) => {
                error!(asset_name, keys = ?parts, error = %err, "error inserting object into ledger state");
                BatchOutcome::failed(parts.to_vec(), &err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FailingState;
    use gensc_state::InMemoryState;
    use serde_json::json;

    fn envelope(keys: &[&str], entity_count: i32, datas: Vec<Value>) -> AssetEnvelope {
        AssetEnvelope {
            asset_name: "IOTdevice".into(),
            keys: keys.iter().map(|k| k.to_string()).collect(),
            entity_count,
            asset_datas: datas,
            ..Default::default()
        }
    }

    fn outcomes_of(envelope: &AssetEnvelope) -> Vec<BatchOutcome> {
        let raw = envelope.asset_datas[0].as_str().expect("outcomes are a JSON string");
        serde_json::from_str(raw).unwrap()
    }

    fn parts(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    // -----------------------------------------------------------------------
    // Prefix strategy
    // -----------------------------------------------------------------------

    #[test]
    fn single_key_batch() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let env = envelope(
            &["id"],
            2,
            vec![json!({"id": "01", "Value": "200F"}), json!({"id": "02", "Value": "180F"})],
        );

        let result = ingestor.ingest(env).unwrap();
        let outcomes = outcomes_of(&result);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(BatchOutcome::is_inserted));
        assert_eq!(outcomes[1].keys, parts(&["02"]));
        // Only the first element is replaced.
        assert_eq!(result.asset_datas[1], json!({"id": "02", "Value": "180F"}));
        assert_eq!(state.len().unwrap(), 2);
    }

    #[test]
    fn one_create_per_key_prefix() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let env = envelope(&["id", "type"], 1, vec![json!({"id": "01", "type": "sensor"})]);

        let outcomes = ingestor.ingest_records(&env);
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].keys, parts(&["01"]));
        assert_eq!(outcomes[1].keys, parts(&["01", "sensor"]));
        assert_eq!(state.len().unwrap(), 2);
    }

    #[test]
    fn outcome_count_is_records_times_keys() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let datas: Vec<Value> = (0..4)
            .map(|i| json!({"a": format!("a{i}"), "b": "b", "c": "c"}))
            .collect();

        // entityCount larger than the data is clamped.
        let outcomes = ingestor.ingest_records(&envelope(&["a", "b", "c"], 10, datas.clone()));
        assert_eq!(outcomes.len(), 4 * 3);

        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let outcomes = ingestor.ingest_records(&envelope(&["a", "b", "c"], 2, datas));
        assert_eq!(outcomes.len(), 2 * 3);
    }

    #[test]
    fn duplicates_do_not_abort_the_batch() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let env = envelope(
            &["id"],
            3,
            vec![json!({"id": "01"}), json!({"id": "01"}), json!({"id": "02"})],
        );

        let outcomes = ingestor.ingest_records(&env);
        assert!(outcomes[0].is_inserted());
        assert!(!outcomes[1].is_inserted());
        assert!(outcomes[1].result.starts_with("Error inserting Object data exist"));
        assert!(outcomes[2].is_inserted());
    }

    #[test]
    fn shared_leading_key_collides_across_records() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let env = envelope(
            &["id", "type"],
            2,
            vec![json!({"id": "01", "type": "a"}), json!({"id": "01", "type": "b"})],
        );
        let outcomes = ingestor.ingest_records(&env);
        let inserted: Vec<bool> = outcomes.iter().map(BatchOutcome::is_inserted).collect();
        assert_eq!(inserted, vec![true, true, false, true]);
    }

    #[test]
    fn non_string_key_field_fails_only_that_record() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let env = envelope(
            &["id", "type"],
            2,
            vec![json!({"id": "01", "type": 7}), json!({"id": "02", "type": "b"})],
        );

        let outcomes = ingestor.ingest_records(&env);
        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].is_inserted());
        assert_eq!(outcomes[1].keys, parts(&["01"]));
        assert!(outcomes[1].result.contains("is not a string"));
        assert!(outcomes[2].is_inserted() && outcomes[3].is_inserted());
    }

    #[test]
    fn undecodable_record_yields_one_failure() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let env = envelope(&["id"], 2, vec![json!(42), json!({"id": "02"})]);

        let outcomes = ingestor.ingest_records(&env);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].keys.is_empty());
        assert!(outcomes[0].result.contains("not a JSON object"));
        assert!(outcomes[1].is_inserted());
    }

    #[test]
    fn string_wrapped_records_are_accepted() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let raw = r#"{"id":"01","firmware_version":"1.0.1"}"#;
        let env = envelope(&["id"], 1, vec![Value::String(raw.into())]);

        let outcomes = ingestor.ingest_records(&env);
        assert!(outcomes[0].is_inserted());
        let stored = AssetStore::new(&state).read("IOTdevice", &parts(&["01"])).unwrap();
        assert_eq!(stored, raw.as_bytes());
    }

    #[test]
    fn no_key_fields_creates_nothing() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let result = ingestor
            .ingest(envelope(&[], 1, vec![json!({"id": "01"})]))
            .unwrap();
        assert!(outcomes_of(&result).is_empty());
        assert!(state.is_empty().unwrap());
    }

    #[test]
    fn empty_batch_still_reports() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let result = ingestor.ingest(envelope(&["id"], 3, Vec::new())).unwrap();
        assert_eq!(result.asset_datas, vec![json!("[]")]);
    }

    #[test]
    fn store_failures_become_outcomes() {
        let state = FailingState::writes_fail();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let outcomes = ingestor.ingest_records(&envelope(&["id"], 1, vec![json!({"id": "01"})]));
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].result.contains("state error"));
    }

    // -----------------------------------------------------------------------
    // Full-key strategy
    // -----------------------------------------------------------------------

    #[test]
    fn full_key_creates_once_per_record() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::FullKey);
        let env = envelope(
            &["id", "type"],
            2,
            vec![json!({"id": "01", "type": "a"}), json!({"id": "01", "type": "b"})],
        );

        let outcomes = ingestor.ingest_records(&env);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(BatchOutcome::is_inserted));
        assert_eq!(outcomes[1].keys, parts(&["01", "b"]));
        assert!(AssetStore::new(&state).read("IOTdevice", &parts(&["01"])).is_err());
    }

    #[test]
    fn full_key_without_key_fields_reports_missing_key() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::FullKey);
        let outcomes = ingestor.ingest_records(&envelope(&[], 1, vec![json!({"id": "01"})]));
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].result.contains("key is not provided"));
    }

    #[test]
    fn strategy_names() {
        assert_eq!(serde_json::to_string(&KeyStrategy::FullKey).unwrap(), "\"full_key\"");
        assert_eq!(KeyStrategy::default(), KeyStrategy::Prefixes);
        let state = InMemoryState::new();
        assert_eq!(BatchIngestor::new(&state, KeyStrategy::FullKey).strategy(), KeyStrategy::FullKey);
    }

    // -----------------------------------------------------------------------
    // Wide requests
    // -----------------------------------------------------------------------

    #[test]
    fn wide_key_list_over_empty_records() {
        let state = InMemoryState::new();
        let ingestor = BatchIngestor::new(&state, KeyStrategy::Prefixes);
        let keys: Vec<String> = (0..5_000).map(|i| format!("k{i}")).collect();
        let key_refs: Vec<&str> = keys.iter().map(String::as_str).collect();
        let env = envelope(&key_refs, i32::MAX, vec![json!({}); 5_000]);

        let outcomes = ingestor.ingest_records(&env);
        assert_eq!(outcomes.len(), 5_000);
        assert!(outcomes.iter().all(|o| o.keys.is_empty() && !o.is_inserted()));
        assert!(outcomes[0].result.contains("k0"));
        assert!(state.is_empty().unwrap());
    }
}
