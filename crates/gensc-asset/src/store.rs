use gensc_state::{CompositeKey, StateGateway};
use tracing::{error, info};

use crate::error::{AssetError, AssetResult};

/// Create-only record store addressed by composite key.
///
/// Records are written once: creating over an existing key fails with
/// [`AssetError::DuplicateKey`] no matter what payload is supplied.
pub struct AssetStore<'a, S: ?Sized> {
    state: &'a S,
}

impl<'a, S: StateGateway + ?Sized> AssetStore<'a, S> {
    pub fn new(state: &'a S) -> Self {
        Self { state }
    }

    /// Store `payload` under `(asset_type, key_parts)` if nothing is there yet.
    pub fn create(&self, asset_type: &str, key_parts: &[String], payload: &[u8]) -> AssetResult<()> {
        if key_parts.is_empty() {
            return Err(AssetError::MissingKey {
                asset_type: asset_type.to_string(),
            });
        }
        let key = CompositeKey::new(asset_type, key_parts.to_vec())?;
        let encoded = key.encode();
        info!(key = %key, bytes = payload.len(), "creating asset");

        let existing = self.state.get_state(&encoded).map_err(|e| {
            error!(key = %key, error = %e, "error querying object in state database");
            AssetError::from(e)
        })?;
        if existing.is_some() {
            return Err(AssetError::DuplicateKey {
                asset_type: asset_type.to_string(),
                keys: key_parts.to_vec(),
            });
        }

        self.state.put_state(&encoded, payload).map_err(|e| {
            error!(key = %key, error = %e, "error inserting object into state database");
            AssetError::from(e)
        })
    }

    /// Return the payload stored under `(asset_type, key_parts)`, unchanged.
    pub fn read(&self, asset_type: &str, key_parts: &[String]) -> AssetResult<Vec<u8>> {
        if key_parts.is_empty() {
            return Err(AssetError::MissingKey {
                asset_type: asset_type.to_string(),
            });
        }
        let key = CompositeKey::new(asset_type, key_parts.to_vec())?;
        info!(key = %key, "querying asset");

        let data = self.state.get_state(&key.encode()).map_err(|e| {
            error!(key = %key, error = %e, "error querying object in state database");
            AssetError::from(e)
        })?;
        data.ok_or_else(|| AssetError::NotFound(format!("data does not exist for composite key {key}")))
    }
}
