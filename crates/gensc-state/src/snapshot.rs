//! JSON snapshots of an [`InMemoryState`].
//!
//! Keys and values are hex encoded: composite keys contain U+0000 delimiters
//! and values are opaque bytes. Files are written to a temporary sibling and
//! renamed into place, so a crash never leaves a truncated snapshot.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{StateError, StateResult};
use crate::memory::{InMemoryState, MemoryStateConfig};

/// Serializable copy of every entry in a state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// `hex(key) -> hex(value)`
    pub entries: BTreeMap<String, String>,
}

impl StateSnapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl InMemoryState {
    /// Copy every entry into a snapshot.
    pub fn snapshot(&self) -> StateResult<StateSnapshot> {
        let entries = self.read_entries()?;
        Ok(StateSnapshot {
            entries: entries
                .iter()
                .map(|(k, v)| (hex::encode(k.as_bytes()), hex::encode(v)))
                .collect(),
        })
    }

    /// Replace the current contents with those of `snapshot`.
    pub fn restore(&self, snapshot: &StateSnapshot) -> StateResult<()> {
        let mut decoded = BTreeMap::new();
        for (key, value) in &snapshot.entries {
            let key = hex::decode(key)
                .ok()
                .and_then(|bytes| String::from_utf8(bytes).ok())
                .ok_or_else(|| StateError::Serialization(format!("invalid snapshot key {key:?}")))?;
            let value = hex::decode(value)
                .map_err(|e| StateError::Serialization(format!("invalid snapshot value: {e}")))?;
            decoded.insert(key, value);
        }
        *self.write_entries()? = decoded;
        Ok(())
    }

    /// Write a snapshot of this state to `path`.
    pub fn save_to(&self, path: &Path) -> StateResult<()> {
        let snapshot = self.snapshot()?;
        let json = serde_json::to_vec_pretty(&snapshot)
            .map_err(|e| StateError::Serialization(e.to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent_dir(path))?;
        tmp.write_all(&json)?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| StateError::Io(e.error))?;

        tracing::debug!(path = %path.display(), entries = snapshot.len(), "state snapshot saved");
        Ok(())
    }

    /// Load a state from a snapshot file written by [`Self::save_to`].
    ///
    /// A missing file yields an empty state.
    pub fn load_from(path: &Path, config: MemoryStateConfig) -> StateResult<Self> {
        let state = Self::with_config(config);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no state snapshot, starting empty");
            return Ok(state);
        }
        let bytes = fs::read(path)?;
        let snapshot: StateSnapshot = serde_json::from_slice(&bytes)
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        state.restore(&snapshot)?;
        tracing::debug!(path = %path.display(), entries = snapshot.len(), "state snapshot loaded");
        Ok(state)
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
