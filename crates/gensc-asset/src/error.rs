use gensc_state::StateError;

/// Errors produced by asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// A required argument was missing or empty.
    #[error("incorrect number of arguments: {0}")]
    InvalidArguments(String),

    /// The request envelope could not be decoded.
    #[error("error parsing request data: {0}")]
    BadRequest(String),

    /// No key parts were supplied for a keyed operation.
    #[error("key is not provided for object {asset_type}")]
    MissingKey { asset_type: String },

    /// A record already exists at the composite key.
    #[error("data exist for asset type {asset_type} with key {keys:?}")]
    DuplicateKey { asset_type: String, keys: Vec<String> },

    /// Nothing stored at the requested key or namespace.
    #[error("not found: {0}")]
    NotFound(String),

    /// The state database rejected a rich query.
    #[error("error {source} found with query string {query}")]
    QueryError { query: String, source: StateError },

    /// A result cursor failed mid-scan.
    #[error("error {0} found when generating result string")]
    IterationError(#[source] StateError),

    /// Any other state database failure.
    #[error("state error: {0}")]
    StoreError(#[from] StateError),

    /// A record does not carry a field named in `keys`.
    #[error("key field {field:?} is missing from the record")]
    KeyFieldMissing { field: String },

    /// A key field holds something other than a string.
    #[error("key field {field:?} is not a string (found {found})")]
    KeyFieldNotString { field: String, found: &'static str },

    /// An `assetDatas` entry is neither an object nor a string holding one.
    #[error("asset data at index {index} is not a JSON object")]
    RecordNotObject { index: usize },

    /// Serialization failure while building a response.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result alias for asset operations.
pub type AssetResult<T> = Result<T, AssetError>;
