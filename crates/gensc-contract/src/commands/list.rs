use gensc_asset::{
    attach_pagination_metadata, combine_with_metadata, materialize, AssetEnvelope, QueryEngine,
    QueryMode,
};
use serde_json::Value;
use tracing::info;

use crate::command::{Command, InvocationContext};
use crate::config::PaginationLayout;
use crate::error::ContractResult;

use super::LIST_GEN_ASSETS;

/// Enumerate a namespace or run a (paginated) rich query.
///
/// The materialized result is appended to `assetDatas` as a JSON string.
pub struct ListGenAssets;

impl Command for ListGenAssets {
    fn name(&self) -> &str {
        LIST_GEN_ASSETS
    }

    fn execute(&self, ctx: &InvocationContext<'_>, args: &[String]) -> ContractResult<Vec<u8>> {
        let mut envelope = AssetEnvelope::from_argument(args.first().map(String::as_str))?;

        let mode = QueryMode::from_envelope(&envelope);
        info!(?mode, "list request decoded");
        let outcome = QueryEngine::new(ctx.state).execute(mode)?;
        let records = materialize(outcome.cursor)?;

        let body = match outcome.metadata {
            None => records,
            Some(metadata) => match ctx.config.pagination_layout {
                PaginationLayout::MetadataOnly => attach_pagination_metadata(&metadata)?,
                PaginationLayout::Combined => combine_with_metadata(&records, &metadata)?,
            },
        };

        envelope.asset_datas.push(Value::String(body));
        Ok(envelope.to_json()?)
    }
}
