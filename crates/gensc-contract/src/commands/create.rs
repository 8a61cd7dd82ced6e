use gensc_asset::{AssetEnvelope, BatchIngestor};
use tracing::info;

use crate::command::{Command, InvocationContext};
use crate::error::ContractResult;

use super::CREATE_GEN_ASSETS;

/// Batch create from the envelope in the first argument.
///
/// Per-record failures are reported inside the returned envelope; only a
/// missing or undecodable envelope fails the call.
pub struct CreateGenAssets;

impl Command for CreateGenAssets {
    fn name(&self) -> &str {
        CREATE_GEN_ASSETS
    }

    fn execute(&self, ctx: &InvocationContext<'_>, args: &[String]) -> ContractResult<Vec<u8>> {
        let envelope = AssetEnvelope::from_argument(args.first().map(String::as_str))?;
        info!(asset_name = %envelope.asset_name, "create request decoded");

        let result = BatchIngestor::new(ctx.state, ctx.config.key_strategy).ingest(envelope)?;
        Ok(result.to_json()?)
    }
}
