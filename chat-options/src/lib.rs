//! Chat generation options and tool callbacks.
//!
//! Public API:
//! - [`ChatOptions`]: immutable sampling parameters (temperature, top-p, top-k, ...).
//! - [`FunctionCallback`]: a named, described, typed tool implementation.
//! - [`FunctionCallingOptions`]: chat options plus a tool registry with lookup by name.
//! - [`tool_dispatch::dispatch`]: decode → invoke → encode for one model tool call.
//!
//! Errors are unified under [`ChatOptionsError`]; logging goes through `tracing`
//! (see [`telemetry`]).

pub mod config;
pub mod error_handler;
pub mod function;
pub mod telemetry;
pub mod tool_dispatch;

pub use config::chat_options::{ChatOptions, ChatOptionsBuilder, GenerationOptions};
pub use error_handler::{ChatOptionsError, Result};
pub use function::function_callback::{FunctionCallback, FunctionCallbackBuilder};
pub use function::function_calling_options::{
    FunctionCallingOptions, FunctionCallingOptionsBuilder, ToolCallbacks,
};
pub use function::input_type::InputType;
pub use tool_dispatch::{ToolCall, ToolResult};
