mod dispatch;
mod relay;
mod types;


pub use dispatch::CommandBridge;
pub use types::{CallbackId, CommandInvocation, CommandResult, ResultStatus};
