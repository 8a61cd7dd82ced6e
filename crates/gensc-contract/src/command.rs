use gensc_state::StateGateway;

use crate::config::ContractConfig;
use crate::error::ContractResult;

/// What a command sees for the duration of one invocation.
pub struct InvocationContext<'a> {
    /// Ledger state of the current transaction.
    pub state: &'a dyn StateGateway,
    pub config: &'a ContractConfig,
}

impl<'a> InvocationContext<'a> {
    pub fn new(state: &'a dyn StateGateway, config: &'a ContractConfig) -> Self {
        Self { state, config }
    }
}

/// A named contract operation.
///
/// Commands are registered with the [`Dispatcher`](crate::Dispatcher) before
/// it starts serving and are shared immutably afterwards, hence `Send + Sync`.
pub trait Command: Send + Sync {
    /// The function name callers invoke this command by.
    fn name(&self) -> &str;

    /// Run against `ctx` with the call's positional `args`. The returned bytes
    /// become the response payload.
    fn execute(&self, ctx: &InvocationContext<'_>, args: &[String]) -> ContractResult<Vec<u8>>;
}
