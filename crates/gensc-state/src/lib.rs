//! World-state gateway for GenSC.
//!
//! The asset layer never talks to a ledger directly. It consumes the
//! [`StateGateway`] trait: get/put by key, range scans by partial composite
//! key, and (optionally) rich queries with bookmark pagination.
//!
//! # Backends
//!
//! - [`InMemoryState`] -- ordered `BTreeMap` backend for tests, local
//!   invocation and embedding. Evaluates Mango-style rich queries unless
//!   configured as a key-only store.
//!
//! # Design Rules
//!
//! 1. Keys are strings; composite keys use the [`CompositeKey`] encoding.
//! 2. Values are opaque bytes and are returned exactly as written.
//! 3. Result sets are exposed as single-pass [`ResultCursor`]s.
//! 4. All errors are propagated, never silently ignored.

pub mod error;
pub mod key;
pub mod memory;
pub mod selector;
pub mod snapshot;
pub mod traits;

pub use error::{StateError, StateResult};
pub use key::CompositeKey;
pub use memory::{InMemoryState, MemoryStateConfig};
pub use selector::RichQuery;
pub use snapshot::StateSnapshot;
pub use traits::{KeyValue, QueryResponseMetadata, ResultCursor, StateGateway};
