use gensc_asset::AssetError;

/// Errors surfaced by contract operations.
#[derive(Debug, thiserror::Error)]
pub enum ContractError {
    /// No command is registered under the requested name.
    #[error("Invalid Function Name: {0}")]
    UnknownOperation(String),

    /// The call did not carry the arguments the command needs.
    #[error("incorrect number of arguments: {0}")]
    InvalidArguments(String),

    /// The request envelope could not be decoded.
    #[error("error parsing request data: {0}")]
    BadRequest(String),

    /// Storage or query failure from the asset layer.
    #[error(transparent)]
    Asset(AssetError),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<AssetError> for ContractError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::InvalidArguments(msg) => Self::InvalidArguments(msg),
            AssetError::BadRequest(msg) => Self::BadRequest(msg),
            AssetError::Serialization(msg) => Self::Serialization(msg),
            other => Self::Asset(other),
        }
    }
}

impl From<serde_json::Error> for ContractError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type ContractResult<T> = Result<T, ContractError>;
