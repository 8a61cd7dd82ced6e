//! Command dispatcher for GenSC.
//!
//! A [`Dispatcher`] maps function names to [`Command`] handlers and turns
//! every invocation into a [`Response`]. The built-in commands expose the
//! asset layer of `gensc-asset`.
//!
//! # Quick Start
//!
//! ```rust
//! use gensc_contract::{ContractConfig, Dispatcher};
//! use gensc_state::InMemoryState;
//!
//! let dispatcher = Dispatcher::with_builtin_commands(ContractConfig::default());
//! let state = InMemoryState::new();
//! let response = dispatcher.invoke(&state, "StatusCheck", &[]);
//! assert!(response.is_ok());
//! ```

pub mod command;
pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod response;

pub use command::{Command, InvocationContext};
pub use commands::{CreateGenAssets, ListGenAssets, StatusCheck};
pub use config::{ContractConfig, PaginationLayout};
pub use dispatcher::Dispatcher;
pub use error::{ContractError, ContractResult};
pub use response::Response;
