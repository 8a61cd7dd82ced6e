use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StateResult;
use crate::key::CompositeKey;

/// One entry produced by a range scan or rich query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Pagination details returned alongside a paginated query page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryResponseMetadata {
    /// Number of records fetched into the current page.
    pub fetched_records_count: i32,
    /// Opaque cursor to pass back to continue after this page.
    pub bookmark: String,
}

/// Forward-only, single-pass cursor over a gateway result set.
///
/// The cursor owns its results and is consumed by iteration; it cannot be
/// cloned or rewound. Dropping it releases the underlying result set.
pub struct ResultCursor {
    inner: Box<dyn Iterator<Item = StateResult<KeyValue>> + Send>,
}

impl ResultCursor {
    /// Wrap any fallible iterator of entries.
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = StateResult<KeyValue>>,
        I::IntoIter: Send + 'static,
    {
        Self {
            inner: Box::new(entries.into_iter()),
        }
    }

    /// A cursor over already-fetched entries.
    pub fn from_entries(entries: Vec<KeyValue>) -> Self {
        Self::new(entries.into_iter().map(Ok))
    }

    /// A cursor that yields nothing.
    pub fn empty() -> Self {
        Self::from_entries(Vec::new())
    }
}

impl Iterator for ResultCursor {
    type Item = StateResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl fmt::Debug for ResultCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultCursor").finish_non_exhaustive()
    }
}

/// Gateway to an ordered, transactional world state.
///
/// This is the whole contract the asset layer consumes. Implementations must
/// satisfy:
/// - read-your-writes within a single invocation;
/// - scans and queries return entries in the store's iteration order;
/// - stored values are opaque and returned byte-for-byte;
/// - failures are returned, never swallowed.
pub trait StateGateway: Send + Sync {
    /// Read the value stored at `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored there.
    fn get_state(&self, key: &str) -> StateResult<Option<Vec<u8>>>;

    /// Store `value` at `key`, replacing any previous value.
    fn put_state(&self, key: &str, value: &[u8]) -> StateResult<()>;

    /// Scan every entry whose composite key starts with the partial key
    /// `(namespace, parts)`.
    fn state_by_partial_composite_key(
        &self,
        namespace: &str,
        parts: &[String],
    ) -> StateResult<ResultCursor>;

    /// Evaluate a rich query. The query text is backend specific and opaque
    /// to callers.
    fn query_result(&self, query: &str) -> StateResult<ResultCursor>;

    /// Evaluate a rich query one page at a time.
    ///
    /// An empty `bookmark` starts from the first match.
    fn query_result_with_pagination(
        &self,
        query: &str,
        page_size: i32,
        bookmark: &str,
    ) -> StateResult<(ResultCursor, QueryResponseMetadata)>;

    /// Encode `(namespace, parts)` as a composite key.
    fn create_composite_key(&self, namespace: &str, parts: &[String]) -> StateResult<String> {
        CompositeKey::new(namespace, parts.to_vec()).map(|key| key.encode())
    }
}
