use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{StateError, StateResult};
use crate::key::CompositeKey;
use crate::selector::RichQuery;
use crate::traits::{KeyValue, QueryResponseMetadata, ResultCursor, StateGateway};

/// Options for [`InMemoryState`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryStateConfig {
    /// Evaluate rich queries. When `false` the backend behaves like a
    /// key-only state database and rejects them.
    pub rich_queries: bool,
    /// Upper bound applied to the page size of paginated queries. `0` is
    /// treated as no bound.
    pub max_page_size: Option<u32>,
}

impl Default for MemoryStateConfig {
    fn default() -> Self {
        Self {
            rich_queries: true,
            max_page_size: None,
        }
    }
}

/// Ordered, `BTreeMap`-based world state.
///
/// Intended for tests, local invocation and embedding. Entries live behind a
/// `RwLock`; writes are visible to subsequent reads immediately. Scans and
/// queries snapshot their results at call time, so a cursor never observes
/// writes made after it was opened.
pub struct InMemoryState {
    config: MemoryStateConfig,
    entries: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryState {
    /// Create an empty state with default options.
    pub fn new() -> Self {
        Self::with_config(MemoryStateConfig::default())
    }

    pub fn with_config(config: MemoryStateConfig) -> Self {
        Self {
            config,
            entries: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn config(&self) -> &MemoryStateConfig {
        &self.config
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> StateResult<usize> {
        Ok(self.read_entries()?.len())
    }

    pub fn is_empty(&self) -> StateResult<bool> {
        Ok(self.read_entries()?.is_empty())
    }

    pub(crate) fn read_entries(&self) -> StateResult<RwLockReadGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.entries
            .read()
            .map_err(|e| StateError::LockPoisoned(e.to_string()))
    }

    pub(crate) fn write_entries(
        &self,
    ) -> StateResult<RwLockWriteGuard<'_, BTreeMap<String, Vec<u8>>>> {
        self.entries
            .write()
            .map_err(|e| StateError::LockPoisoned(e.to_string()))
    }

    fn parse_rich_query(&self, query: &str) -> StateResult<RichQuery> {
        if !self.config.rich_queries {
            return Err(StateError::RichQueryUnsupported);
        }
        RichQuery::parse(query)
    }

    /// Matching entries in key order, starting strictly after `after`.
    fn matching_entries(
        &self,
        query: &RichQuery,
        after: Option<&str>,
        limit: Option<usize>,
    ) -> StateResult<Vec<KeyValue>> {
        let entries = self.read_entries()?;
        let lower = match after {
            Some(key) => Bound::Excluded(key),
            None => Bound::Unbounded,
        };
        let matches = entries
            .range::<str, _>((lower, Bound::Unbounded))
            .filter(|(_, value)| {
                serde_json::from_slice::<Value>(value)
                    .map(|doc| doc.is_object() && query.matches(&doc))
                    .unwrap_or(false)
            })
            .map(|(key, value)| KeyValue::new(key.clone(), value.clone()));
        Ok(match limit {
            Some(limit) => matches.take(limit).collect(),
            None => matches.collect(),
        })
    }
}

impl Default for InMemoryState {
    fn default() -> Self {
        Self::new()
    }
}

impl StateGateway for InMemoryState {
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        Ok(self.read_entries()?.get(key).cloned())
    }

    fn put_state(&self, key: &str, value: &[u8]) -> StateResult<()> {
        if key.is_empty() {
            return Err(StateError::EmptyKey);
        }
        self.write_entries()?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn state_by_partial_composite_key(
        &self,
        namespace: &str,
        parts: &[String],
    ) -> StateResult<ResultCursor> {
        let prefix = CompositeKey::new(namespace, parts.to_vec())?.encode();
        let entries = self.read_entries()?;
        let found: Vec<KeyValue> = entries
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, value)| KeyValue::new(key.clone(), value.clone()))
            .collect();
        tracing::debug!(namespace, parts = ?parts, count = found.len(), "partial key scan");
        Ok(ResultCursor::from_entries(found))
    }

    fn query_result(&self, query: &str) -> StateResult<ResultCursor> {
        let parsed = self.parse_rich_query(query)?;
        let found = self.matching_entries(&parsed, None, parsed.limit())?;
        tracing::debug!(count = found.len(), "rich query");
        Ok(ResultCursor::from_entries(found))
    }

    fn query_result_with_pagination(
        &self,
        query: &str,
        page_size: i32,
        bookmark: &str,
    ) -> StateResult<(ResultCursor, QueryResponseMetadata)> {
        if page_size <= 0 {
            return Err(StateError::InvalidPageSize(page_size));
        }
        let parsed = self.parse_rich_query(query)?;

        let after = if bookmark.is_empty() {
            None
        } else {
            Some(decode_bookmark(bookmark)?)
        };

        let mut page = page_size as usize;
        // 0 means no cap.
        if let Some(max) = self.config.max_page_size.filter(|&max| max > 0) {
            page = page.min(max as usize);
        }

        let found = self.matching_entries(&parsed, after.as_deref(), Some(page))?;
        // Past the last match the incoming bookmark is echoed back, so callers
        // stop on an empty page instead of wrapping to the start.
        let next_bookmark = match found.last() {
            Some(last) => hex::encode(last.key.as_bytes()),
            None => bookmark.to_string(),
        };
        let metadata = QueryResponseMetadata {
            fetched_records_count: found.len() as i32,
            bookmark: next_bookmark,
        };
        tracing::debug!(
            count = metadata.fetched_records_count,
            bookmark = %metadata.bookmark,
            "paginated rich query"
        );
        Ok((ResultCursor::from_entries(found), metadata))
    }
}

impl std::fmt::Debug for InMemoryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.len().unwrap_or_default();
        f.debug_struct("InMemoryState")
            .field("entry_count", &count)
            .field("config", &self.config)
            .finish()
    }
}

fn decode_bookmark(bookmark: &str) -> StateResult<String> {
    let bytes = hex::decode(bookmark).map_err(|_| StateError::InvalidBookmark(bookmark.into()))?;
    String::from_utf8(bytes).map_err(|_| StateError::InvalidBookmark(bookmark.into()))
}
