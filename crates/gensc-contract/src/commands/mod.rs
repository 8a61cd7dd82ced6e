//! Built-in contract commands.

pub mod create;
pub mod list;
pub mod status;

pub use create::CreateGenAssets;
pub use list::ListGenAssets;
pub use status::StatusCheck;

/// Function name of [`StatusCheck`].
pub const STATUS_CHECK: &str = "StatusCheck";
/// Function name of [`CreateGenAssets`].
pub const CREATE_GEN_ASSETS: &str = "CreateGenAssets";
/// Function name of [`ListGenAssets`].
pub const LIST_GEN_ASSETS: &str = "ListGenAssets";
