use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use gensc_state::StateGateway;
use tracing::{debug, error, info};

use crate::command::{Command, InvocationContext};
use crate::commands::{CreateGenAssets, ListGenAssets, StatusCheck};
use crate::config::ContractConfig;
use crate::error::{ContractError, ContractResult};
use crate::response::Response;

/// Routes invocations to named commands.
///
/// The command table is filled while the dispatcher is owned mutably and is
/// read-only once it is shared. Invocations through a shared dispatcher run
/// one at a time: [`StateGateway`] has no compare-and-set, so the existence
/// check and write of a create must not interleave with another invocation.
pub struct Dispatcher {
    config: ContractConfig,
    commands: BTreeMap<String, Box<dyn Command>>,
    invocation: Mutex<()>,
}

impl Dispatcher {
    /// Create a dispatcher with no commands.
    pub fn new(config: ContractConfig) -> Self {
        Self {
            config,
            commands: BTreeMap::new(),
            invocation: Mutex::new(()),
        }
    }

    /// Create a dispatcher with `StatusCheck`, `CreateGenAssets` and
    /// `ListGenAssets` registered.
    pub fn with_builtin_commands(config: ContractConfig) -> Self {
        let mut dispatcher = Self::new(config);
        dispatcher.register(Box::new(StatusCheck));
        dispatcher.register(Box::new(CreateGenAssets));
        dispatcher.register(Box::new(ListGenAssets));
        dispatcher
    }

    /// Register `command` under its name, returning the handler it replaced.
    pub fn register(&mut self, command: Box<dyn Command>) -> Option<Box<dyn Command>> {
        let name = command.name().to_string();
        debug!(command = %name, "registering command");
        self.commands.insert(name, command)
    }

    pub fn config(&self) -> &ContractConfig {
        &self.config
    }

    /// Registered function names in sorted order.
    pub fn command_names(&self) -> impl Iterator<Item = &str> {
        self.commands.keys().map(String::as_str)
    }

    pub fn contains(&self, function: &str) -> bool {
        self.commands.contains_key(function)
    }

    /// Run `function` and return its payload or typed error.
    pub fn dispatch(
        &self,
        state: &dyn StateGateway,
        function: &str,
        args: &[String],
    ) -> ContractResult<Vec<u8>> {
        if function.is_empty() {
            error!("function name is not passed correctly while invoking contract");
        }
        let command = self
            .commands
            .get(function)
            .ok_or_else(|| ContractError::UnknownOperation(function.to_string()))?;

        info!(function, args = args.len(), "invoking contract function");
        // Poisoning is ignored; the guard protects no data.
        let _guard = self.invocation.lock().unwrap_or_else(PoisonError::into_inner);
        command.execute(&InvocationContext::new(state, &self.config), args)
    }

    /// Run `function` and wrap the outcome in a [`Response`].
    ///
    /// Failures of a found command carry `"<function> : <cause>"`.
    pub fn invoke(&self, state: &dyn StateGateway, function: &str, args: &[String]) -> Response {
        match self.dispatch(state, function, args) {
            Ok(payload) => Response::success(payload),
            Err(err @ ContractError::UnknownOperation(_)) => {
                error!(function, "{err}");
                Response::error(err.to_string())
            }
            Err(err) => {
                error!(function, error = %err, "contract function failed");
                Response::error(format!("{function} : {err}"))
            }
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("commands", &self.commands.keys().collect::<Vec<_>>())
            .finish()
    }
}
