//! Executes model-issued tool calls against a registry.
//!
//! This is the small piece of the tool loop that sits next to the registry:
//! resolve the callback by name, decode the JSON arguments into the
//! callback's [`InputType`](crate::function::input_type::InputType), invoke
//! it, and encode the result back to JSON. Retries, timeouts and reporting
//! errors back to the model belong to the caller.
//!
//! # Example
//!
//! ```
//! use std::convert::Infallible;
//! use serde::Deserialize;
//! use serde_json::json;
//! use chat_options::function::function_callback::FunctionCallback;
//! use chat_options::function::function_calling_options::FunctionCallingOptions;
//! use chat_options::tool_dispatch::{ToolCall, dispatch};
//!
//! #[derive(Deserialize)]
//! struct Add { a: i64, b: i64 }
//!
//! let options = FunctionCallingOptions::builder()
//!     .function_callback(
//!         FunctionCallback::builder()
//!             .function("add", |args: Add| Ok::<_, Infallible>(args.a + args.b))
//!             .description("Add two numbers")
//!             .build()?,
//!     )
//!     .build()?;
//!
//! let call = ToolCall::new("add", json!({ "a": 2, "b": 3 }));
//! assert_eq!(dispatch(&options, &call)?, json!(5));
//! # Ok::<(), chat_options::error_handler::ChatOptionsError>(())
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::error_handler::{CallbackError, Result};
use crate::function::function_calling_options::ToolCallbacks;

/// A model request to run a registered tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned call id, echoed back in [`ToolResult`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Tool name.
    pub name: String,
    /// Raw arguments as produced by the model.
    #[serde(default)]
    pub arguments: Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            arguments,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Output of a successful tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    /// Id copied from the originating [`ToolCall`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// JSON-encoded function result.
    pub content: Value,
}

/// Resolves, decodes, invokes and encodes a single tool call.
///
/// # Errors
/// - [`RegistryError::NotFound`](crate::error_handler::RegistryError::NotFound) for an unknown tool
/// - [`CallbackError::Decode`] if the arguments do not fit the input type
/// - [`CallbackError::Function`] with the implementation's own error
/// - [`CallbackError::Encode`] if the result cannot be serialized
#[instrument(skip_all, fields(tool = %call.name))]
pub fn dispatch<R>(registry: &R, call: &ToolCall) -> Result<Value>
where
    R: ToolCallbacks + ?Sized,
{
    let callback = registry.resolve(&call.name).inspect_err(|_| {
        warn!("tool call for unregistered function");
    })?;

    let input_type = callback.input_type();
    debug!(input = input_type.name(), "decoding tool arguments");
    let input = input_type
        .decode(call.arguments.clone())
        .map_err(|source| CallbackError::Decode {
            name: callback.name().to_string(),
            source,
        })?;

    let output = callback.invoke_erased(input)?;
    let value = callback.encode_output(output)?;
    debug!("tool call completed");
    Ok(value)
}

/// Like [`dispatch`], but wraps the value in a [`ToolResult`] carrying the call id.
///
/// # Errors
/// Same as [`dispatch`].
pub fn dispatch_call<R>(registry: &R, call: &ToolCall) -> Result<ToolResult>
where
    R: ToolCallbacks + ?Sized,
{
    let content = dispatch(registry, call)?;
    Ok(ToolResult {
        id: call.id.clone(),
        name: call.name.clone(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use serde_json::json;

    use super::*;
    use crate::error_handler::{ChatOptionsError, RegistryError};
    use crate::function::function_callback::FunctionCallback;
    use crate::function::function_calling_options::FunctionCallingOptions;

    #[derive(Debug, Deserialize)]
    struct WeatherQuery {
        city: String,
        #[serde(default)]
        celsius: bool,
    }

    #[derive(Debug, Serialize)]
    struct Forecast {
        city: String,
        temperature: f64,
        unit: &'static str,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("unknown city: {0}")]
    struct UnknownCity(String);

    fn registry() -> FunctionCallingOptions {
        let weather = FunctionCallback::builder()
            .function("weather", |q: WeatherQuery| {
                if q.city == "Atlantis" {
                    return Err(UnknownCity(q.city));
                }
                Ok(Forecast {
                    city: q.city,
                    temperature: if q.celsius { 21.0 } else { 69.8 },
                    unit: if q.celsius { "C" } else { "F" },
                })
            })
            .description("Current weather for a city")
            .build()
            .unwrap();

        let echo = FunctionCallback::builder()
            .function("echo", |i: i32| Ok::<_, Infallible>(i))
            .build()
            .unwrap();

        FunctionCallingOptions::builder()
            .function_callbacks([weather, echo])
            .temperature(0.0)
            .build()
            .unwrap()
    }

    #[test]
    fn decodes_invokes_and_encodes() {
        let out = dispatch(
            &registry(),
            &ToolCall::new("weather", json!({ "city": "Paris", "celsius": true })),
        )
        .unwrap();
        assert_eq!(
            out,
            json!({ "city": "Paris", "temperature": 21.0, "unit": "C" })
        );
    }

    #[test]
    fn scalar_arguments_work() {
        let out = dispatch(&registry(), &ToolCall::new("echo", json!(111))).unwrap();
        assert_eq!(out, json!(111));
    }

    #[test]
    fn unknown_tool_is_not_found() {
        let err = dispatch(&registry(), &ToolCall::new("stock", json!({}))).unwrap_err();
        assert!(matches!(
            err,
            ChatOptionsError::Registry(RegistryError::NotFound(ref n)) if n == "stock"
        ));
    }

    #[test]
    fn bad_arguments_fail_to_decode() {
        let err = dispatch(&registry(), &ToolCall::new("echo", json!("eleven"))).unwrap_err();
        assert!(matches!(
            err,
            ChatOptionsError::Callback(CallbackError::Decode { ref name, .. }) if name == "echo"
        ));
    }

    #[test]
    fn implementation_failure_reaches_the_caller() {
        let err = dispatch(
            &registry(),
            &ToolCall::new("weather", json!({ "city": "Atlantis" })),
        )
        .unwrap_err();

        let ChatOptionsError::Callback(inner) = err else {
            panic!("expected callback error");
        };
        let source = inner.function_error().expect("function error");
        let unknown = source.downcast_ref::<UnknownCity>().expect("UnknownCity");
        assert_eq!(unknown.0, "Atlantis");
    }

    #[test]
    fn dispatch_call_echoes_id() {
        let call = ToolCall::new("echo", json!(3)).with_id("call_1");
        let result = dispatch_call(&registry(), &call).unwrap();
        assert_eq!(result.id.as_deref(), Some("call_1"));
        assert_eq!(result.name, "echo");
        assert_eq!(result.content, json!(3));
    }

    #[test]
    fn tool_call_deserializes_from_wire_shape() {
        let call: ToolCall =
            serde_json::from_value(json!({ "name": "echo", "arguments": 9 })).unwrap();
        assert_eq!(call, ToolCall::new("echo", json!(9)));
    }
}
