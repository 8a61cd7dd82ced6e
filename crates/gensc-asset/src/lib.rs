//! Schema-agnostic asset storage for GenSC.
//!
//! Records are arbitrary JSON bodies stored under composite keys built from
//! an asset name plus the string values of selected fields. This crate
//! provides:
//! - the [`AssetEnvelope`] request/response model
//! - [`AssetStore`]: create-only writes and exact-byte reads
//! - [`QueryEngine`]: namespace enumeration and (paginated) rich queries
//! - [`materialize`]: cursor to JSON array conversion
//! - [`BatchIngestor`]: multi-record creates with per-record outcomes
//!
//! Everything runs against any [`gensc_state::StateGateway`].

pub mod envelope;
pub mod error;
pub mod ingest;
pub mod materialize;
pub mod query;
pub mod record;
pub mod store;

pub use envelope::{AssetEnvelope, BatchOutcome, PaginationMetadata, QueryResultItem, INSERTED};
pub use error::{AssetError, AssetResult};
pub use ingest::{BatchIngestor, KeyStrategy};
pub use materialize::{attach_pagination_metadata, combine_with_metadata, materialize};
pub use query::{QueryEngine, QueryMode, QueryOutcome};
pub use record::RecordBody;
pub use store::AssetStore;
