use gensc_state::{ResultCursor, StateGateway};
use tracing::{error, info};

use crate::envelope::{AssetEnvelope, PaginationMetadata};
use crate::error::{AssetError, AssetResult};

/// Retrieval mode, selected by the shape of the request envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryMode<'a> {
    /// Every record in the namespace.
    Enumerate { asset_type: &'a str },
    /// Rich query without a page size.
    Rich { query: &'a str },
    /// Rich query, one page at a time.
    Paginated {
        query: &'a str,
        page_size: i32,
        bookmark: &'a str,
    },
}

impl<'a> QueryMode<'a> {
    /// Pick the mode for `envelope`.
    ///
    /// Without a query string the whole namespace is enumerated; `keys` is
    /// not consulted. With one, a positive `entityCount` is the page size.
    pub fn from_envelope(envelope: &'a AssetEnvelope) -> Self {
        if envelope.query_string.is_empty() {
            Self::Enumerate {
                asset_type: &envelope.asset_name,
            }
        } else if envelope.entity_count > 0 {
            Self::Paginated {
                query: &envelope.query_string,
                page_size: envelope.entity_count,
                bookmark: &envelope.bookmark,
            }
        } else {
            Self::Rich {
                query: &envelope.query_string,
            }
        }
    }
}

/// Cursor over the matches of one query, plus paging details when paginated.
#[derive(Debug)]
pub struct QueryOutcome {
    pub cursor: ResultCursor,
    pub metadata: Option<PaginationMetadata>,
}

/// Read-side access to stored assets.
pub struct QueryEngine<'a, S: ?Sized> {
    state: &'a S,
}

impl<'a, S: StateGateway + ?Sized> QueryEngine<'a, S> {
    pub fn new(state: &'a S) -> Self {
        Self { state }
    }

    /// Scan the whole `asset_type` namespace.
    pub fn list_all(&self, asset_type: &str) -> AssetResult<ResultCursor> {
        self.state
            .state_by_partial_composite_key(asset_type, &[])
            .map_err(|e| {
                error!(asset_type, error = %e, "instance not found in ledger");
                AssetError::NotFound("instance not found in ledger".into())
            })
    }

    /// Forward `query` verbatim to the state database.
    pub fn rich_query(&self, query: &str) -> AssetResult<ResultCursor> {
        self.state.query_result(query).map_err(|source| {
            error!(query, error = %source, "rich query rejected");
            AssetError::QueryError {
                query: query.to_string(),
                source,
            }
        })
    }

    /// Fetch one page of `query`. An empty `bookmark` starts at the beginning.
    pub fn rich_query_paginated(
        &self,
        query: &str,
        page_size: i32,
        bookmark: &str,
    ) -> AssetResult<(ResultCursor, PaginationMetadata)> {
        self.state
            .query_result_with_pagination(query, page_size, bookmark)
            .map(|(cursor, meta)| (cursor, PaginationMetadata::from(meta)))
            .map_err(|source| {
                error!(query, page_size, bookmark, error = %source, "paginated rich query rejected");
                AssetError::QueryError {
                    query: query.to_string(),
                    source,
                }
            })
    }

    pub fn execute(&self, mode: QueryMode<'_>) -> AssetResult<QueryOutcome> {
        info!(?mode, "executing query");
        match mode {
            QueryMode::Enumerate { asset_type } => Ok(QueryOutcome {
                cursor: self.list_all(asset_type)?,
                metadata: None,
            }),
            QueryMode::Rich { query } => Ok(QueryOutcome {
                cursor: self.rich_query(query)?,
                metadata: None,
            }),
            QueryMode::Paginated {
                query,
                page_size,
                bookmark,
            } => {
                let (cursor, metadata) = self.rich_query_paginated(query, page_size, bookmark)?;
                Ok(QueryOutcome {
                    cursor,
                    metadata: Some(metadata),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::AssetStore;
    use crate::testing::FailingState;
    use gensc_state::{CompositeKey, InMemoryState, MemoryStateConfig, StateError};

    const SENSORS: &str = r#"{"selector":{"docType":"sensor"}}"#;

    fn seeded(config: MemoryStateConfig) -> InMemoryState {
        let state = InMemoryState::with_config(config);
        let store = AssetStore::new(&state);
        for id in ["01", "02", "03"] {
            let body = format!(r#"{{"id":"{id}","docType":"sensor"}}"#);
            store.create("IOTdevice", &[id.to_string()], body.as_bytes()).unwrap();
        }
        store
            .create("gateway", &["g1".to_string()], br#"{"docType":"gateway"}"#)
            .unwrap();
        state
    }

    fn keys(cursor: ResultCursor) -> Vec<String> {
        cursor.map(|kv| kv.unwrap().key).collect()
    }

    fn device(id: &str) -> String {
        CompositeKey::new("IOTdevice", vec![id.to_string()]).unwrap().encode()
    }

    // -----------------------------------------------------------------------
    // Mode selection
    // -----------------------------------------------------------------------

    #[test]
    fn mode_from_envelope() {
        let mut env = AssetEnvelope {
            asset_name: "IOTdevice".into(),
            keys: vec!["id".into()],
            entity_count: 2,
            ..Default::default()
        };
        assert_eq!(
            QueryMode::from_envelope(&env),
            QueryMode::Enumerate { asset_type: "IOTdevice" }
        );

        env.query_string = SENSORS.into();
        env.bookmark = "bm".into();
        assert_eq!(
            QueryMode::from_envelope(&env),
            QueryMode::Paginated { query: SENSORS, page_size: 2, bookmark: "bm" }
        );

        env.entity_count = 0;
        assert_eq!(QueryMode::from_envelope(&env), QueryMode::Rich { query: SENSORS });
        env.entity_count = -1;
        assert_eq!(QueryMode::from_envelope(&env), QueryMode::Rich { query: SENSORS });
    }

    // -----------------------------------------------------------------------
    // Enumeration
    // -----------------------------------------------------------------------

    #[test]
    fn enumeration_returns_whole_namespace() {
        let state = seeded(MemoryStateConfig::default());
        let engine = QueryEngine::new(&state);
        let env = AssetEnvelope {
            asset_name: "IOTdevice".into(),
            keys: vec!["02".into()],
            ..Default::default()
        };
        let outcome = engine.execute(QueryMode::from_envelope(&env)).unwrap();
        assert!(outcome.metadata.is_none());
        assert_eq!(keys(outcome.cursor), vec![device("01"), device("02"), device("03")]);
    }

    #[test]
    fn enumeration_of_unknown_namespace_is_empty() {
        let state = seeded(MemoryStateConfig::default());
        assert_eq!(QueryEngine::new(&state).list_all("nothing").unwrap().count(), 0);
    }

    #[test]
    fn enumeration_failure_is_not_found() {
        let err = QueryEngine::new(&FailingState::scan_fails())
            .list_all("IOTdevice")
            .unwrap_err();
        assert!(matches!(err, AssetError::NotFound(ref msg) if msg == "instance not found in ledger"));
    }

    // -----------------------------------------------------------------------
    // Rich queries
    // -----------------------------------------------------------------------

    #[test]
    fn rich_query_forwards_verbatim() {
        let state = seeded(MemoryStateConfig::default());
        let found = keys(QueryEngine::new(&state).rich_query(SENSORS).unwrap());
        assert_eq!(found, vec![device("01"), device("02"), device("03")]);
    }

    #[test]
    fn rich_query_rejection_is_query_error() {
        let state = seeded(MemoryStateConfig {
            rich_queries: false,
            ..Default::default()
        });
        let err = QueryEngine::new(&state).rich_query(SENSORS).unwrap_err();
        match err {
            AssetError::QueryError { query, source } => {
                assert_eq!(query, SENSORS);
                assert!(matches!(source, StateError::RichQueryUnsupported));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_query_is_query_error() {
        let state = seeded(MemoryStateConfig::default());
        let err = QueryEngine::new(&state).rich_query("{oops").unwrap_err();
        assert!(matches!(err, AssetError::QueryError { .. }));
    }

    // -----------------------------------------------------------------------
    // Pagination
    // -----------------------------------------------------------------------

    #[test]
    fn paginated_query_follows_bookmark() {
        let state = seeded(MemoryStateConfig::default());
        let engine = QueryEngine::new(&state);

        let (cursor, first) = engine.rich_query_paginated(SENSORS, 1, "").unwrap();
        assert_eq!(keys(cursor), vec![device("01")]);
        assert_eq!(first.records_count, 1);
        assert!(!first.bookmark.is_empty());

        let (cursor, second) = engine.rich_query_paginated(SENSORS, 1, &first.bookmark).unwrap();
        assert_eq!(keys(cursor), vec![device("02")]);
        assert_eq!(second.records_count, 1);
        assert_ne!(second.bookmark, first.bookmark);
    }

    #[test]
    fn execute_paginated_carries_metadata() {
        let state = seeded(MemoryStateConfig::default());
        let outcome = QueryEngine::new(&state)
            .execute(QueryMode::Paginated { query: SENSORS, page_size: 2, bookmark: "" })
            .unwrap();
        assert_eq!(outcome.metadata.unwrap().records_count, 2);
        assert_eq!(outcome.cursor.count(), 2);
    }
}
