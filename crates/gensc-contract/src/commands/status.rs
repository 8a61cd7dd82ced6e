use serde::Serialize;

use crate::command::{Command, InvocationContext};
use crate::error::ContractResult;

use super::STATUS_CHECK;

#[derive(Serialize)]
struct StatusReport<'a> {
    #[serde(rename = "Status")]
    status: &'a str,
}

/// Liveness probe. Never touches the ledger.
pub struct StatusCheck;

impl StatusCheck {
    pub const RUNNING: &'static str = "ChainCode Running Successfully";
}

impl Command for StatusCheck {
    fn name(&self) -> &str {
        STATUS_CHECK
    }

    fn execute(&self, _ctx: &InvocationContext<'_>, _args: &[String]) -> ContractResult<Vec<u8>> {
        Ok(serde_json::to_vec(&StatusReport {
            status: Self::RUNNING,
        })?)
    }
}
