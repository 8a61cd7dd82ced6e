use gensc_asset::KeyStrategy;
use serde::{Deserialize, Serialize};

/// Output layout of paginated list results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaginationLayout {
    /// `[{"ResponseMetadata":{...}}]` with no records.
    #[default]
    MetadataOnly,
    /// `{"ResponseMetadata":{...},"Records":[...]}`.
    Combined,
}

/// Behaviour switches of the built-in commands.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// How batch creates derive keys from each record.
    pub key_strategy: KeyStrategy,
    /// What a paginated list returns.
    pub pagination_layout: PaginationLayout,
}
